//! The alpha blocks of DXT3 (explicit 4-bit alpha) and DXT5 (interpolated
//! alpha).
//!
//! Both are 8 bytes and sit in front of the colour block.

use crate::colour::n4;

/// Encodes the alpha of all 16 pixels as 4-bit values.
///
/// The mask is not considered here. Pixels outside the mask are encoded
/// from whatever alpha they carry, since the decoder has no notion of a mask.
pub(crate) fn compress_alpha_dxt3(rgba: &[[u8; 4]; 16]) -> [u8; 8] {
    let mut block = [0_u8; 8];
    for (i, pair) in rgba.chunks_exact(2).enumerate() {
        let low = n4::from_n8(pair[0][3]);
        let high = n4::from_n8(pair[1][3]);
        block[i] = low | (high << 4);
    }
    block
}

pub(crate) fn decompress_alpha_dxt3(block: &[u8; 8]) -> [u8; 16] {
    let mut alpha = [0_u8; 16];
    for (i, &byte) in block.iter().enumerate() {
        alpha[2 * i] = n4::n8(byte & 0xF);
        alpha[2 * i + 1] = n4::n8(byte >> 4);
    }
    alpha
}

/// One of the two DXT5 alpha palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ramp {
    /// 4 interpolated values between the endpoints plus the sentinels 0 and 255.
    /// Encoded with `alpha0 <= alpha1`.
    Inter4,
    /// 6 interpolated values between the endpoints.
    /// Encoded with `alpha0 > alpha1`.
    Inter6,
}
impl Ramp {
    /// The number of interpolation steps between the two endpoints.
    const fn steps(self) -> i32 {
        match self {
            Ramp::Inter4 => 5,
            Ramp::Inter6 => 7,
        }
    }

    /// The palette for `min <= max`, in the index order of the fit: the two
    /// endpoints first, then the interpolated values from `min` to `max`.
    fn codes(self, min: u8, max: u8) -> [u8; 8] {
        let (min, max) = (min as i32, max as i32);
        let steps = self.steps();

        let mut codes = [0_u8; 8];
        codes[0] = min as u8;
        codes[1] = max as u8;
        for i in 1..steps {
            codes[1 + i as usize] = (((steps - i) * min + i * max) / steps) as u8;
        }
        if self == Ramp::Inter4 {
            codes[6] = 0;
            codes[7] = 255;
        }
        codes
    }

    /// Widens the range so that `max - min` covers at least `steps` values,
    /// staying within `0..=255`.
    fn fix_range(self, mut min: i32, mut max: i32) -> (i32, i32) {
        let steps = self.steps();
        if max - min < steps {
            max = (min + steps).min(255);
        }
        if max - min < steps {
            min = (max - steps).max(0);
        }
        (min, max)
    }
}

/// Finds the closest code for each masked-in pixel and returns the total
/// squared error. Masked-out pixels get index 0.
fn fit_codes(rgba: &[[u8; 4]; 16], mask: u16, codes: &[u8; 8], indices: &mut [u8; 16]) -> u32 {
    let mut error = 0;
    for i in 0..16 {
        if mask & (1 << i) == 0 {
            indices[i] = 0;
            continue;
        }

        let value = rgba[i][3] as i32;
        let mut least = i32::MAX;
        let mut index = 0;
        for (j, &code) in codes.iter().enumerate() {
            let diff = value - code as i32;
            let dist = diff * diff;
            if dist < least {
                least = dist;
                index = j as u8;
            }
        }

        indices[i] = index;
        error += least as u32;
    }
    error
}

/// Improves the endpoints of a ramp with a local search.
///
/// Endpoints move by a step that halves each round. A move is kept if it
/// lowers the error and the endpoints stay at least `steps` apart.
fn refine_endpoints(
    rgba: &[[u8; 4]; 16],
    mask: u16,
    ramp: Ramp,
    mut min: i32,
    mut max: i32,
) -> (i32, i32, u32) {
    let mut indices = [0; 16];
    let mut error_of =
        |min: i32, max: i32| fit_codes(rgba, mask, &ramp.codes(min as u8, max as u8), &mut indices);

    let mut error = error_of(min, max);
    let mut step = ((max - min) / 4).max(1);
    while step > 0 && error > 0 {
        for (delta_min, delta_max) in [(step, 0), (0, step), (-step, 0), (0, -step)] {
            let new_min = (min + delta_min).clamp(0, 255);
            let new_max = (max + delta_max).clamp(0, 255);
            if new_max - new_min < ramp.steps() {
                continue;
            }

            let new_error = error_of(new_min, new_max);
            if new_error < error {
                error = new_error;
                min = new_min;
                max = new_max;
            }
        }
        step /= 2;
    }

    (min, max, error)
}

/// Encodes the alpha of the masked-in pixels with an interpolated ramp.
///
/// Both ramps are tried. For the 4-value ramp, pixels at exactly 0 or 255
/// are left to the sentinels and do not stretch the endpoints.
pub(crate) fn compress_alpha_dxt5(rgba: &[[u8; 4]; 16], mask: u16) -> [u8; 8] {
    let mut min4 = 255;
    let mut max4 = 0;
    let mut min6 = 255;
    let mut max6 = 0;
    for (i, pixel) in rgba.iter().enumerate() {
        if mask & (1 << i) == 0 {
            continue;
        }

        let value = pixel[3] as i32;
        min6 = min6.min(value);
        max6 = max6.max(value);
        if value != 0 {
            min4 = min4.min(value);
        }
        if value != 255 {
            max4 = max4.max(value);
        }
    }

    // handle the case where no valid range was found
    if min4 > max4 {
        min4 = max4;
    }
    if min6 > max6 {
        min6 = max6;
    }

    let (min4, max4) = Ramp::Inter4.fix_range(min4, max4);
    let (min6, max6) = Ramp::Inter6.fix_range(min6, max6);

    let (min4, max4, error4) = refine_endpoints(rgba, mask, Ramp::Inter4, min4, max4);
    let (min6, max6, error6) = refine_endpoints(rgba, mask, Ramp::Inter6, min6, max6);

    let mut indices = [0_u8; 16];
    if error4 <= error6 {
        fit_codes(rgba, mask, &Ramp::Inter4.codes(min4 as u8, max4 as u8), &mut indices);
        write_alpha_block4(min4 as u8, max4 as u8, &indices)
    } else {
        fit_codes(rgba, mask, &Ramp::Inter6.codes(min6 as u8, max6 as u8), &mut indices);
        write_alpha_block6(min6 as u8, max6 as u8, &indices)
    }
}

/// Writes a block with `alpha0 <= alpha1`.
///
/// `indices` are in the order of [`Ramp::codes`] with `min`, `max`.
fn write_alpha_block4(min: u8, max: u8, indices: &[u8; 16]) -> [u8; 8] {
    debug_assert!(min <= max);
    // the encoded order is [min, max, interpolants from min, 0, 255], which
    // matches the fit order
    write_alpha_block(min, max, indices)
}

/// Writes a block with `alpha0 > alpha1`.
///
/// `indices` are in the order of [`Ramp::codes`] with `min`, `max`. The
/// encoded palette starts at `max`, so the order is reversed.
fn write_alpha_block6(min: u8, max: u8, indices: &[u8; 16]) -> [u8; 8] {
    debug_assert!(min < max);
    let swapped = indices.map(|index| match index {
        0 => 1,
        1 => 0,
        i => 9 - i,
    });
    write_alpha_block(max, min, &swapped)
}

fn write_alpha_block(alpha0: u8, alpha1: u8, indices: &[u8; 16]) -> [u8; 8] {
    let mut block = [0_u8; 8];
    block[0] = alpha0;
    block[1] = alpha1;

    // two groups of 8 three-bit indices, 3 bytes each
    for (group, chunk) in indices.chunks_exact(8).enumerate() {
        let mut value: u32 = 0;
        for (j, &index) in chunk.iter().enumerate() {
            debug_assert!(index < 8);
            value |= (index as u32 & 7) << (3 * j);
        }
        let bytes = value.to_le_bytes();
        block[2 + 3 * group..5 + 3 * group].copy_from_slice(&bytes[..3]);
    }
    block
}

/// Returns the 8 palette entries of an encoded DXT5 alpha block.
pub(crate) fn alpha_palette(alpha0: u8, alpha1: u8) -> [u8; 8] {
    let a0 = alpha0 as u32;
    let a1 = alpha1 as u32;

    let mut codes = [0_u8; 8];
    codes[0] = alpha0;
    codes[1] = alpha1;
    if alpha0 <= alpha1 {
        for i in 1..5 {
            codes[1 + i as usize] = (((5 - i) * a0 + i * a1) / 5) as u8;
        }
        codes[6] = 0;
        codes[7] = 255;
    } else {
        for i in 1..7 {
            codes[1 + i as usize] = (((7 - i) * a0 + i * a1) / 7) as u8;
        }
    }
    codes
}

pub(crate) fn decompress_alpha_dxt5(block: &[u8; 8]) -> [u8; 16] {
    let codes = alpha_palette(block[0], block[1]);

    let mut alpha = [0_u8; 16];
    for (group, pixels) in alpha.chunks_exact_mut(8).enumerate() {
        let b = &block[2 + 3 * group..5 + 3 * group];
        let value = u32::from_le_bytes([b[0], b[1], b[2], 0]);
        for (j, pixel) in pixels.iter_mut().enumerate() {
            let index = (value >> (3 * j)) & 7;
            *pixel = codes[index as usize];
        }
    }
    alpha
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_alpha(alpha: [u8; 16]) -> [[u8; 4]; 16] {
        alpha.map(|a| [0, 0, 0, a])
    }

    #[test]
    fn dxt3_nibbles() {
        let mut alpha = [0_u8; 16];
        alpha[0] = 0x11;
        alpha[1] = 0xEE;
        alpha[15] = 255;
        let block = compress_alpha_dxt3(&with_alpha(alpha));
        assert_eq!(block[0], 0xE1);
        assert_eq!(block[7], 0xF0);

        let decoded = decompress_alpha_dxt3(&block);
        assert_eq!(decoded[0], 0x11);
        assert_eq!(decoded[1], 0xEE);
        assert_eq!(decoded[15], 255);
    }

    #[test]
    fn dxt3_error_is_at_most_half_a_step() {
        let alpha: [u8; 16] = std::array::from_fn(|i| (i * 16 + 3) as u8);
        let decoded = decompress_alpha_dxt3(&compress_alpha_dxt3(&with_alpha(alpha)));
        for (a, b) in alpha.iter().zip(&decoded) {
            assert!((*a as i32 - *b as i32).abs() <= 8);
        }
    }

    #[test]
    fn palettes_match_the_encoder() {
        for (min, max) in [(0, 255), (10, 17), (100, 200), (3, 250)] {
            // 6-entry ramp: the encoder writes min first
            let codes = Ramp::Inter4.codes(min, max);
            assert_eq!(alpha_palette(min, max), codes);

            // 8-entry ramp: the encoder writes max first and reverses indices
            let codes = Ramp::Inter6.codes(min, max);
            let palette = alpha_palette(max, min);
            for i in 0..8_u8 {
                let swapped = match i {
                    0 => 1,
                    1 => 0,
                    i => 9 - i,
                };
                assert_eq!(codes[i as usize], palette[swapped as usize], "{min} {max} {i}");
            }
        }
    }

    #[test]
    fn packing() {
        let indices: [u8; 16] = std::array::from_fn(|i| (i % 8) as u8);
        let block = write_alpha_block(1, 2, &indices);
        assert_eq!(&block[..2], &[1, 2]);
        // 0,1,2,3,4,5,6,7 packed as 3-bit values: 0o76543210
        assert_eq!(&block[2..5], &[0x88, 0xC6, 0xFA]);
        assert_eq!(&block[5..8], &[0x88, 0xC6, 0xFA]);
    }

    #[test]
    fn dxt5_round_trip_is_close() {
        let alpha: [u8; 16] = std::array::from_fn(|i| (i * 9 + 40) as u8);
        let decoded = decompress_alpha_dxt5(&compress_alpha_dxt5(&with_alpha(alpha), 0xFFFF));
        for (a, b) in alpha.iter().zip(&decoded) {
            assert!((*a as i32 - *b as i32).abs() <= 12, "{a} vs {b}");
        }
    }

    #[test]
    fn dxt5_sentinels_are_exact() {
        let alpha: [u8; 16] = std::array::from_fn(|i| match i % 4 {
            0 => 0,
            1 => 255,
            2 => 100,
            _ => 110,
        });
        let block = compress_alpha_dxt5(&with_alpha(alpha), 0xFFFF);
        assert!(block[0] <= block[1], "expected the 6-entry ramp");

        let decoded = decompress_alpha_dxt5(&block);
        for (a, b) in alpha.iter().zip(&decoded) {
            if *a == 0 || *a == 255 {
                assert_eq!(a, b);
            } else {
                assert!((*a as i32 - *b as i32).abs() <= 2);
            }
        }
    }

    #[test]
    fn dxt5_constant_alpha() {
        for value in [0, 1, 128, 254, 255] {
            let block = compress_alpha_dxt5(&with_alpha([value; 16]), 0xFFFF);
            assert_eq!(decompress_alpha_dxt5(&block), [value; 16]);
        }
    }

    #[test]
    fn dxt5_masked_pixels_are_ignored() {
        let mut alpha = [200_u8; 16];
        alpha[5] = 0;
        let mask = !(1 << 5);
        let block = compress_alpha_dxt5(&with_alpha(alpha), mask);
        let decoded = decompress_alpha_dxt5(&block);
        for (i, (a, b)) in alpha.iter().zip(&decoded).enumerate() {
            if i != 5 {
                assert_eq!(a, b);
            }
        }

        // an empty mask must still produce a valid block
        let block = compress_alpha_dxt5(&with_alpha(alpha), 0);
        decompress_alpha_dxt5(&block);
    }
}
