use crate::{
    alpha::{compress_alpha_dxt3, compress_alpha_dxt5, decompress_alpha_dxt3, decompress_alpha_dxt5},
    block::decompress_colour,
    colour_set::ColourSet,
    fit::ColourFit,
    CompressError, Config, Method,
};

/// One encoded block. DXT1 blocks are 8 bytes long, DXT3 and DXT5 blocks 16
/// bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedBlock {
    bytes: [u8; 16],
    method: Method,
}
impl EncodedBlock {
    pub fn method(&self) -> Method {
        self.method
    }
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.method.bytes_per_block()]
    }
}
impl AsRef<[u8]> for EncodedBlock {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
impl std::ops::Deref for EncodedBlock {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

/// Compresses a 4x4 block of RGBA pixels.
///
/// `rgba` holds the 16 pixels in row-major order, 4 bytes per pixel.
///
/// `options` is anything that converts into a [`Config`], e.g. [`Flags`](crate::Flags).
/// Invalid combinations of flags fall back to their defaults.
pub fn compress(rgba: &[u8; 64], options: impl Into<Config>) -> EncodedBlock {
    compress_masked(rgba, 0xFFFF, options)
}

/// Compresses a 4x4 block of RGBA pixels, ignoring some of the pixels.
///
/// Bit `i` of `mask` corresponds to pixel `i` (`x + 4 * y`). Pixels whose
/// bit is not set do not influence the colour endpoints, and, for DXT5, the
/// alpha endpoints. They will decode to arbitrary values.
///
/// For DXT3, the alpha of all 16 pixels is encoded regardless of the mask.
pub fn compress_masked(rgba: &[u8; 64], mask: u16, options: impl Into<Config>) -> EncodedBlock {
    let config: Config = options.into();
    let pixels: &[[u8; 4]; 16] = bytemuck::cast_ref(rgba);

    let set = ColourSet::new(pixels, mask, config);
    let colour = ColourFit::select(&set, config).compress(&set, config.method);

    let mut bytes = [0_u8; 16];
    let colour_offset = if config.method.has_alpha_block() {
        let alpha = match config.method {
            Method::Dxt3 => compress_alpha_dxt3(pixels),
            _ => compress_alpha_dxt5(pixels, mask),
        };
        bytes[..8].copy_from_slice(&alpha);
        8
    } else {
        0
    };
    bytes[colour_offset..colour_offset + 8].copy_from_slice(&colour);

    EncodedBlock {
        bytes,
        method: config.method,
    }
}

/// Compresses a 4x4 block to a DXT1 block using only the 3-colour palette.
///
/// This is faster than [`compress`], since only half the palette layouts
/// are searched and blocks with few colours take shortcuts. The method in
/// `options` is ignored. Pixels with an alpha below 128 become transparent.
pub fn compress_opaque(rgba: &[u8; 64], options: impl Into<Config>) -> [u8; 8] {
    let config = Config {
        method: Method::Dxt1,
        ..options.into()
    };
    let pixels: &[[u8; 4]; 16] = bytemuck::cast_ref(rgba);

    let set = ColourSet::new(pixels, 0xFFFF, config);
    ColourFit::select_opaque(&set, config).compress3(&set)
}

/// Decompresses one block into 16 RGBA pixels.
///
/// `block` must be exactly as long as a block of the configured method.
/// For DXT1, the alpha is 255 except for pixels using the transparent
/// palette entry.
pub fn decompress(block: &[u8], options: impl Into<Config>) -> Result<[u8; 64], CompressError> {
    let config: Config = options.into();

    let expected = config.method.bytes_per_block();
    let size_error = CompressError::UnexpectedBufferSize {
        expected,
        actual: block.len(),
    };

    let pixels = match config.method {
        Method::Dxt1 => {
            let colour: &[u8; 8] = block.try_into().map_err(|_| size_error)?;
            decompress_colour(colour, true)
        }
        Method::Dxt3 | Method::Dxt5 => {
            let block: &[u8; 16] = block.try_into().map_err(|_| size_error)?;
            let [alpha, colour]: &[[u8; 8]; 2] = bytemuck::cast_ref(block);

            let mut pixels = decompress_colour(colour, false);
            let alpha = if config.method == Method::Dxt3 {
                decompress_alpha_dxt3(alpha)
            } else {
                decompress_alpha_dxt5(alpha)
            };
            for (pixel, a) in pixels.iter_mut().zip(alpha) {
                pixel[3] = a;
            }
            pixels
        }
    };

    Ok(bytemuck::cast(pixels))
}
