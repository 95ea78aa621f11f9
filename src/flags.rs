use bitflags::bitflags;

bitflags! {
    /// The raw option bitmask accepted by all compression and decompression
    /// functions.
    ///
    /// The mask has three mutually exclusive groups (method, colour fit and
    /// colour metric) plus the independent [`Flags::WEIGHT_COLOUR_BY_ALPHA`]
    /// bit. Masks with missing or conflicting bits are valid input; they are
    /// resolved with [`Flags::normalized()`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Flags: u32 {
        /// BC1: 8 bytes per block, no alpha (except 1-bit transparency).
        const DXT1 = 1 << 0;
        /// BC2: 16 bytes per block, explicit 4-bit alpha.
        const DXT3 = 1 << 1;
        /// BC3: 16 bytes per block, interpolated alpha.
        const DXT5 = 1 << 2;

        /// Exhaustive cluster fit. The default fit.
        const COLOUR_CLUSTER_FIT = 1 << 3;
        /// Fast fit along the principal axis of the colours.
        const COLOUR_RANGE_FIT = 1 << 4;
        /// Cluster fit that re-orders the colours along the best fit line
        /// until the result stops improving.
        const COLOUR_ITERATIVE_CLUSTER_FIT = 1 << 8;

        /// Weigh the error of each channel by its perceived brightness. The
        /// default metric.
        const COLOUR_METRIC_PERCEPTUAL = 1 << 5;
        /// All channels contribute equally to the error.
        const COLOUR_METRIC_UNIFORM = 1 << 6;

        /// Weigh the colour of each pixel by its alpha value during fitting.
        const WEIGHT_COLOUR_BY_ALPHA = 1 << 7;

        const METHODS = Self::DXT1.bits() | Self::DXT3.bits() | Self::DXT5.bits();
        const FITS = Self::COLOUR_CLUSTER_FIT.bits()
            | Self::COLOUR_RANGE_FIT.bits()
            | Self::COLOUR_ITERATIVE_CLUSTER_FIT.bits();
        const METRICS = Self::COLOUR_METRIC_PERCEPTUAL.bits() | Self::COLOUR_METRIC_UNIFORM.bits();
    }
}

impl Flags {
    /// Returns the canonical form of the flags.
    ///
    /// Exactly one method, one fit and one metric bit will be set. A group
    /// with no bit or more than one bit set falls back to its default:
    /// DXT1, cluster fit and the perceptual metric respectively.
    ///
    /// This is idempotent.
    pub fn normalized(self) -> Self {
        Config::from(self).flags()
    }
}

impl Default for Flags {
    fn default() -> Self {
        Config::default().flags()
    }
}

/// The block layout to compress to or decompress from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// BC1/DXT1. Colour only, with 1-bit transparency.
    #[default]
    Dxt1,
    /// BC2/DXT3. Colour plus explicit 4-bit alpha.
    Dxt3,
    /// BC3/DXT5. Colour plus interpolated 8-bit alpha.
    Dxt5,
}
impl Method {
    /// The number of bytes of one encoded 4x4 block.
    pub const fn bytes_per_block(self) -> usize {
        match self {
            Method::Dxt1 => 8,
            Method::Dxt3 | Method::Dxt5 => 16,
        }
    }

    /// Whether the block carries a separate alpha block in front of the
    /// colour block.
    pub const fn has_alpha_block(self) -> bool {
        !matches!(self, Method::Dxt1)
    }
}

/// The algorithm used to find the colour endpoints of a block.
///
/// Ordered from fastest to best quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum FitQuality {
    Range,
    #[default]
    Cluster,
    IterativeCluster,
}

/// How the error between two colours is measured while fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColourMetric {
    /// Channels are weighted by their contribution to perceived brightness
    /// (Rec. 709 luma coefficients).
    #[default]
    Perceptual,
    /// All channels are weighted equally.
    Uniform,
}
impl ColourMetric {
    pub(crate) fn weights(self) -> glam::Vec3A {
        match self {
            ColourMetric::Perceptual => glam::Vec3A::new(0.2126, 0.7152, 0.0722),
            ColourMetric::Uniform => glam::Vec3A::ONE,
        }
    }
}

/// A fully resolved configuration.
///
/// Unlike [`Flags`], a `Config` cannot represent conflicting options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Config {
    pub method: Method,
    pub fit: FitQuality,
    pub metric: ColourMetric,
    pub weight_by_alpha: bool,
}
impl Config {
    pub const fn new(method: Method) -> Self {
        Self {
            method,
            fit: FitQuality::Cluster,
            metric: ColourMetric::Perceptual,
            weight_by_alpha: false,
        }
    }

    /// Converts the configuration back to its (normalized) bitmask.
    pub fn flags(&self) -> Flags {
        let method = match self.method {
            Method::Dxt1 => Flags::DXT1,
            Method::Dxt3 => Flags::DXT3,
            Method::Dxt5 => Flags::DXT5,
        };
        let fit = match self.fit {
            FitQuality::Range => Flags::COLOUR_RANGE_FIT,
            FitQuality::Cluster => Flags::COLOUR_CLUSTER_FIT,
            FitQuality::IterativeCluster => Flags::COLOUR_ITERATIVE_CLUSTER_FIT,
        };
        let metric = match self.metric {
            ColourMetric::Perceptual => Flags::COLOUR_METRIC_PERCEPTUAL,
            ColourMetric::Uniform => Flags::COLOUR_METRIC_UNIFORM,
        };

        let mut flags = method | fit | metric;
        flags.set(Flags::WEIGHT_COLOUR_BY_ALPHA, self.weight_by_alpha);
        flags
    }
}
impl From<Flags> for Config {
    fn from(flags: Flags) -> Self {
        let method = flags & Flags::METHODS;
        let method = if method == Flags::DXT3 {
            Method::Dxt3
        } else if method == Flags::DXT5 {
            Method::Dxt5
        } else {
            Method::Dxt1
        };

        let fit = flags & Flags::FITS;
        let fit = if fit == Flags::COLOUR_RANGE_FIT {
            FitQuality::Range
        } else if fit == Flags::COLOUR_ITERATIVE_CLUSTER_FIT {
            FitQuality::IterativeCluster
        } else {
            FitQuality::Cluster
        };

        let metric = if flags & Flags::METRICS == Flags::COLOUR_METRIC_UNIFORM {
            ColourMetric::Uniform
        } else {
            ColourMetric::Perceptual
        };

        Self {
            method,
            fit,
            metric,
            weight_by_alpha: flags.contains(Flags::WEIGHT_COLOUR_BY_ALPHA),
        }
    }
}
impl From<u32> for Config {
    fn from(bits: u32) -> Self {
        Flags::from_bits_truncate(bits).into()
    }
}
