//! Compression and decompression of whole images.
//!
//! Images are split into 4x4 tiles in row-major order. The encoded blocks are
//! stored contiguously in the same order, without padding.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    compress_masked, compress_opaque, decompress,
    progress::Report,
    util::div_ceil,
    CompressError, Config, Method, Progress,
};

/// Returns the number of bytes needed to store the compressed image.
///
/// Partial tiles at the right and bottom edge need a full block each.
pub fn storage_requirements(
    width: usize,
    height: usize,
    options: impl Into<Config>,
) -> Result<usize, CompressError> {
    let config: Config = options.into();
    blocks_across(width)
        .checked_mul(blocks_across(height))
        .and_then(|blocks| blocks.checked_mul(config.method.bytes_per_block()))
        .ok_or(CompressError::DataLayoutTooBig)
}

fn blocks_across(pixels: usize) -> usize {
    div_ceil(pixels, 4)
}

fn check_size(expected: Option<usize>, actual: usize) -> Result<(), CompressError> {
    let expected = expected.ok_or(CompressError::DataLayoutTooBig)?;
    if expected != actual {
        return Err(CompressError::UnexpectedBufferSize { expected, actual });
    }
    Ok(())
}

/// The pixels of an image, with either 3 or 4 channels.
#[derive(Clone, Copy)]
enum Pixels<'a> {
    Rgba(&'a [[u8; 4]]),
    Rgb(&'a [[u8; 3]]),
}

#[derive(Clone, Copy)]
struct Image<'a> {
    pixels: Pixels<'a>,
    width: usize,
    height: usize,
}
impl<'a> Image<'a> {
    fn new_rgba(rgba: &'a [u8], width: usize, height: usize) -> Result<Self, CompressError> {
        check_size(width.checked_mul(height).and_then(|n| n.checked_mul(4)), rgba.len())?;
        Ok(Self {
            pixels: Pixels::Rgba(bytemuck::cast_slice(rgba)),
            width,
            height,
        })
    }
    fn new_rgb(rgb: &'a [u8], width: usize, height: usize) -> Result<Self, CompressError> {
        check_size(width.checked_mul(height).and_then(|n| n.checked_mul(3)), rgb.len())?;
        Ok(Self {
            pixels: Pixels::Rgb(bytemuck::cast_slice(rgb)),
            width,
            height,
        })
    }

    fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let index = y * self.width + x;
        match self.pixels {
            Pixels::Rgba(rgba) => rgba[index],
            Pixels::Rgb(rgb) => {
                let [r, g, b] = rgb[index];
                [r, g, b, 255]
            }
        }
    }

    /// Gathers the tile at pixel `(x, y)`.
    ///
    /// Pixels outside the image are zero and their bit in the returned mask
    /// is not set.
    fn masked_tile(&self, x: usize, y: usize) -> ([u8; 64], u16) {
        let mut tile = [[0_u8; 4]; 16];
        let mut mask = 0_u16;
        for py in 0..4 {
            for px in 0..4 {
                let sx = x + px;
                let sy = y + py;
                if sx < self.width && sy < self.height {
                    tile[4 * py + px] = self.pixel(sx, sy);
                    mask |= 1 << (4 * py + px);
                }
            }
        }
        (bytemuck::cast(tile), mask)
    }

    /// Gathers the tile at pixel `(x, y)`, repeating the pixels inside the
    /// image to fill up partial tiles.
    fn wrapped_tile(&self, x: usize, y: usize, channel_mask: [u8; 3]) -> [u8; 64] {
        let extent_x = (self.width - x).min(4);
        let extent_y = (self.height - y).min(4);

        let mut tile = [[0_u8; 4]; 16];
        for py in 0..4 {
            for px in 0..4 {
                let [r, g, b, _] = self.pixel(x + px % extent_x, y + py % extent_y);
                tile[4 * py + px] = [
                    r & channel_mask[0],
                    g & channel_mask[1],
                    b & channel_mask[2],
                    255,
                ];
            }
        }
        bytemuck::cast(tile)
    }

    /// Compresses one row of tiles into `out`.
    fn compress_row(&self, block_y: usize, out: &mut [u8], config: Config) {
        let bytes_per_block = config.method.bytes_per_block();
        for (block_x, block) in out.chunks_exact_mut(bytes_per_block).enumerate() {
            let (tile, mask) = self.masked_tile(block_x * 4, block_y * 4);
            block.copy_from_slice(&compress_masked(&tile, mask, config));
        }
    }
}

/// Compresses an RGBA image.
///
/// `rgba` must hold exactly `width * height` pixels with 4 bytes each, in
/// row-major order. `blocks` must be exactly
/// [`storage_requirements(width, height, options)`](storage_requirements)
/// bytes long.
///
/// Tiles that extend past the right or bottom edge of the image are
/// compressed with only the pixels inside the image.
pub fn compress_image(
    rgba: &[u8],
    width: usize,
    height: usize,
    blocks: &mut [u8],
    options: impl Into<Config>,
) -> Result<(), CompressError> {
    let config: Config = options.into();
    let image = Image::new_rgba(rgba, width, height)?;
    compress_image_impl(image, blocks, config)
}

/// Compresses an RGB image. All pixels are treated as fully opaque.
///
/// `rgb` must hold exactly `width * height` pixels with 3 bytes each, in
/// row-major order. See [`compress_image`] for everything else.
pub fn compress_image_rgb(
    rgb: &[u8],
    width: usize,
    height: usize,
    blocks: &mut [u8],
    options: impl Into<Config>,
) -> Result<(), CompressError> {
    let config: Config = options.into();
    let image = Image::new_rgb(rgb, width, height)?;
    compress_image_impl(image, blocks, config)
}

fn compress_image_impl(image: Image, blocks: &mut [u8], config: Config) -> Result<(), CompressError> {
    check_size(
        storage_requirements(image.width, image.height, config).ok(),
        blocks.len(),
    )?;
    tracing::trace!(
        width = image.width,
        height = image.height,
        method = ?config.method,
        "compressing image"
    );

    let row_bytes = blocks_across(image.width) * config.method.bytes_per_block();
    if row_bytes == 0 {
        return Ok(());
    }
    for (block_y, row) in blocks.chunks_exact_mut(row_bytes).enumerate() {
        image.compress_row(block_y, row, config);
    }
    Ok(())
}

/// Compresses an RGBA image using multiple threads.
///
/// The output is identical to [`compress_image`]. Rows of tiles are
/// compressed in parallel. Progress is reported as the fraction of completed
/// rows, but only if `progress` was created with [`Progress::new`].
#[cfg(feature = "rayon")]
pub fn compress_image_parallel(
    rgba: &[u8],
    width: usize,
    height: usize,
    blocks: &mut [u8],
    options: impl Into<Config>,
    mut progress: Option<&mut Progress>,
) -> Result<(), CompressError> {
    use rayon::{iter::IndexedParallelIterator, iter::ParallelIterator, slice::ParallelSliceMut};

    use crate::progress::ParallelProgress;

    let config: Config = options.into();
    let image = Image::new_rgba(rgba, width, height)?;
    check_size(storage_requirements(width, height, config).ok(), blocks.len())?;
    tracing::trace!(width, height, method = ?config.method, "compressing image in parallel");

    let row_bytes = blocks_across(width) * config.method.bytes_per_block();
    if row_bytes == 0 {
        return Ok(());
    }

    let rows = blocks_across(height) as u64;
    let parallel_progress = ParallelProgress::new(&mut progress, rows);
    blocks
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(block_y, row)| {
            image.compress_row(block_y, row, config);
            parallel_progress.submit(1);
        });

    Ok(())
}

/// Compresses an RGB image to DXT1 with the 3-colour palette only, with
/// optional flattening of the colour depth and cooperative cancellation.
///
/// This is meant for bulk pipelines:
///
/// - If `flatten` is set, the low 3, 2 and 3 bits of red, green and blue are
///   cleared before compression.
/// - Partial tiles at the right and bottom edge are filled by repeating the
///   pixels inside the image instead of masking.
/// - Every block is compressed with [`compress_opaque`]. The method in
///   `options` is ignored and `blocks` must be
///   `storage_requirements(width, height, Flags::DXT1)` bytes long.
/// - After each row of tiles, `progress` receives the fraction of completed
///   rows and then `abort` is checked. If it is set, no further rows are
///   compressed. Blocks already written are kept.
///
/// Returns the number of blocks written.
#[allow(clippy::too_many_arguments)]
pub fn compress_image_rgb_flatten(
    rgb: &[u8],
    width: usize,
    height: usize,
    blocks: &mut [u8],
    options: impl Into<Config>,
    flatten: bool,
    mut progress: Option<&mut Progress>,
    abort: &AtomicBool,
) -> Result<usize, CompressError> {
    let config = Config {
        method: Method::Dxt1,
        ..options.into()
    };
    let image = Image::new_rgb(rgb, width, height)?;
    check_size(storage_requirements(width, height, config).ok(), blocks.len())?;
    tracing::trace!(width, height, flatten, "compressing image with the opaque fast path");

    let channel_mask = if flatten {
        [0xF8, 0xFC, 0xF8]
    } else {
        [0xFF; 3]
    };

    let bytes_per_block = Method::Dxt1.bytes_per_block();
    let row_bytes = blocks_across(width) * bytes_per_block;
    if row_bytes == 0 {
        return Ok(0);
    }
    let rows = blocks_across(height);

    let mut written = 0;
    for (block_y, row) in blocks.chunks_exact_mut(row_bytes).enumerate() {
        for (block_x, block) in row.chunks_exact_mut(bytes_per_block).enumerate() {
            let tile = image.wrapped_tile(block_x * 4, block_y * 4, channel_mask);
            block.copy_from_slice(&compress_opaque(&tile, config));
            written += 1;
        }

        progress.report((block_y + 1) as f32 / rows as f32);

        if abort.load(Ordering::Relaxed) {
            tracing::debug!(rows_done = block_y + 1, rows, written, "compression aborted");
            break;
        }
    }

    Ok(written)
}

/// Decompresses an image into RGBA pixels.
///
/// `rgba` must have room for exactly `width * height` pixels with 4 bytes
/// each. `blocks` must be exactly
/// [`storage_requirements(width, height, options)`](storage_requirements)
/// bytes long. Pixels of partial tiles that lie outside the image are
/// discarded.
pub fn decompress_image(
    rgba: &mut [u8],
    width: usize,
    height: usize,
    blocks: &[u8],
    options: impl Into<Config>,
) -> Result<(), CompressError> {
    let config: Config = options.into();
    check_size(width.checked_mul(height).and_then(|n| n.checked_mul(4)), rgba.len())?;
    check_size(storage_requirements(width, height, config).ok(), blocks.len())?;
    tracing::trace!(width, height, method = ?config.method, "decompressing image");

    let bytes_per_block = config.method.bytes_per_block();
    let blocks_x = blocks_across(width);
    if blocks_x == 0 {
        return Ok(());
    }

    let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(rgba);
    for (index, block) in blocks.chunks_exact(bytes_per_block).enumerate() {
        let x = (index % blocks_x) * 4;
        let y = (index / blocks_x) * 4;

        let decoded = decompress(block, config)?;
        let decoded: &[[u8; 4]; 16] = bytemuck::cast_ref(&decoded);
        for py in 0..4 {
            for px in 0..4 {
                let sx = x + px;
                let sy = y + py;
                if sx < width && sy < height {
                    pixels[sy * width + sx] = decoded[4 * py + px];
                }
            }
        }
    }
    Ok(())
}
