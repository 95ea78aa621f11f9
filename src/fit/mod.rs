//! Strategies for finding the two endpoints and per-pixel indices of a
//! colour block.
//!
//! All fits work on a [`ColourSet`] and produce a [`FitResult`]. Each fit can
//! target the 3-colour palette (DXT1 only) and the 4-colour palette. A fit is
//! given an error bound and only returns a result if it beats the bound.

mod cluster;
mod line;
mod range;
mod single;
mod two_colour;

use glam::Vec3A;

use crate::{
    block::{write_colour_block3, write_colour_block4},
    colour_set::ColourSet,
    Config, FitQuality, Method,
};

use cluster::ClusterFit;
use range::RangeFit;
use single::SingleColourFit;
use two_colour::TwoColourFit;

/// Which palette layout the indices of a [`FitResult`] refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Palette {
    /// `[start, end, (start + end) / 2, transparent]`
    Three,
    /// `[start, end, 2/3 start + 1/3 end, 1/3 start + 2/3 end]`
    Four,
}

#[derive(Debug, Clone)]
pub(crate) struct FitResult {
    pub palette: Palette,
    pub start: Vec3A,
    pub end: Vec3A,
    /// The palette index of each pixel of the block.
    pub indices: [u8; 16],
    /// The weighted squared error of the fit. Only comparable between
    /// results of the same fit.
    pub error: f32,
}
impl FitResult {
    pub fn to_block(&self) -> [u8; 8] {
        match self.palette {
            Palette::Three => write_colour_block3(self.start, self.end, &self.indices),
            Palette::Four => write_colour_block4(self.start, self.end, &self.indices),
        }
    }
}

pub(crate) enum ColourFit<'a> {
    Single(SingleColourFit<'a>),
    TwoColour(TwoColourFit<'a>),
    Range(RangeFit<'a>),
    Cluster(ClusterFit<'a>),
}
impl<'a> ColourFit<'a> {
    /// Picks the fit for a block.
    ///
    /// Single colour blocks use the lookup tables, empty blocks and range
    /// fits use [`RangeFit`] and everything else the (iterative) cluster fit.
    pub fn select(set: &'a ColourSet, config: Config) -> Self {
        match set.count() {
            1 => Self::Single(SingleColourFit::new(set)),
            0 => Self::Range(RangeFit::new(set, config)),
            _ if config.fit == FitQuality::Range => Self::Range(RangeFit::new(set, config)),
            _ => Self::Cluster(ClusterFit::new(set, config)),
        }
    }

    /// Picks the fit for an opaque DXT1 block.
    ///
    /// Blocks with 2 colours are reproduced exactly. Blocks with few colours
    /// are not worth the cost of the cluster fit.
    pub fn select_opaque(set: &'a ColourSet, config: Config) -> Self {
        match set.count() {
            1 => Self::Single(SingleColourFit::new(set)),
            2 => Self::TwoColour(TwoColourFit::new(set, config)),
            n if n <= 4 || config.fit == FitQuality::Range => {
                Self::Range(RangeFit::new(set, config))
            }
            _ => Self::Cluster(ClusterFit::new(set, config)),
        }
    }

    fn fit3(&self, bound: f32) -> Option<FitResult> {
        match self {
            Self::Single(fit) => fit.fit3(bound),
            Self::TwoColour(fit) => fit.fit3(bound),
            Self::Range(fit) => fit.fit3(bound),
            Self::Cluster(fit) => fit.fit3(bound),
        }
    }
    fn fit4(&self, bound: f32) -> Option<FitResult> {
        match self {
            Self::Single(fit) => fit.fit4(bound),
            Self::TwoColour(fit) => fit.fit4(bound),
            Self::Range(fit) => fit.fit4(bound),
            Self::Cluster(fit) => fit.fit4(bound),
        }
    }

    /// Compresses the set into a colour block.
    ///
    /// For DXT1, both palettes are tried and the better one is kept. The
    /// 4-colour palette is skipped if the block has transparent pixels, since
    /// only the 3-colour palette can represent them. DXT3 and DXT5 colour
    /// blocks always use the 4-colour palette.
    pub fn compress(&self, set: &ColourSet, method: Method) -> [u8; 8] {
        let best = if method == Method::Dxt1 {
            let three = self.fit3(f32::INFINITY);
            if set.is_transparent() {
                three
            } else {
                let bound = three.as_ref().map_or(f32::INFINITY, |r| r.error);
                self.fit4(bound).or(three)
            }
        } else {
            self.fit4(f32::INFINITY)
        };

        match best {
            Some(result) => result.to_block(),
            None => self.fallback(set, method),
        }
    }

    /// Compresses the set into a colour block using only the 3-colour
    /// palette.
    pub fn compress3(&self, set: &ColourSet) -> [u8; 8] {
        match self.fit3(f32::INFINITY) {
            Some(result) => result.to_block(),
            None => self.fallback(set, Method::Dxt1),
        }
    }

    /// Used when a fit finds no solution at all, which only happens for
    /// degenerate inputs to the cluster fit.
    fn fallback(&self, set: &ColourSet, method: Method) -> [u8; 8] {
        let range = RangeFit::new(set, Config::new(method));
        let result = if method == Method::Dxt1 {
            range.fit3(f32::INFINITY)
        } else {
            range.fit4(f32::INFINITY)
        };
        match result {
            Some(result) => result.to_block(),
            None => write_colour_block3(Vec3A::ZERO, Vec3A::ZERO, &[3; 16]),
        }
    }
}
