use glam::Vec3A;

use crate::{colour::n8, Config, Method};

/// Pixels with an alpha below this value are treated as transparent by DXT1.
pub(crate) const DXT1_ALPHA_THRESHOLD: u8 = 128;

/// The distinct colours of a 4x4 block, with weights.
///
/// Points are stored in the order they first appear in the block. This order
/// determines the order of equal-error candidates in the fits, so it must be
/// deterministic.
#[derive(Debug, Clone)]
pub(crate) struct ColourSet {
    count: usize,
    points: [Vec3A; 16],
    weights: [f32; 16],
    /// For each pixel, the index of its point, or `None` if the pixel is not
    /// part of the set.
    remap: [Option<u8>; 16],
    transparent: bool,
}
impl ColourSet {
    /// Creates the set from the pixels of a block.
    ///
    /// Pixels whose bit in `mask` is not set are ignored. For DXT1, pixels
    /// with an alpha below 128 are ignored too, and mark the set as
    /// transparent.
    pub fn new(rgba: &[[u8; 4]; 16], mask: u16, config: Config) -> Self {
        let is_dxt1 = config.method == Method::Dxt1;

        let mut set = Self {
            count: 0,
            points: [Vec3A::ZERO; 16],
            weights: [0.0; 16],
            remap: [None; 16],
            transparent: false,
        };

        let is_included = |i: usize| -> bool { mask & (1 << i) != 0 };
        let weight_of = |pixel: [u8; 4]| -> f32 {
            if config.weight_by_alpha {
                (pixel[3] as f32 + 1.0) / 256.0
            } else {
                1.0
            }
        };

        for i in 0..16 {
            if !is_included(i) {
                continue;
            }

            let pixel = rgba[i];
            if is_dxt1 && pixel[3] < DXT1_ALPHA_THRESHOLD {
                set.transparent = true;
                continue;
            }

            // look for an earlier pixel with the same colour
            let existing = (0..i).find(|&j| {
                is_included(j)
                    && rgba[j][..3] == pixel[..3]
                    && (!is_dxt1 || rgba[j][3] >= DXT1_ALPHA_THRESHOLD)
            });

            match existing.and_then(|j| set.remap[j]) {
                Some(index) => {
                    set.weights[index as usize] += weight_of(pixel);
                    set.remap[i] = Some(index);
                }
                None => {
                    set.points[set.count] =
                        Vec3A::new(n8::f32(pixel[0]), n8::f32(pixel[1]), n8::f32(pixel[2]));
                    set.weights[set.count] = weight_of(pixel);
                    set.remap[i] = Some(set.count as u8);
                    set.count += 1;
                }
            }
        }

        // square root the weights
        for weight in set.weights[..set.count].iter_mut() {
            *weight = weight.sqrt();
        }

        set
    }

    /// The number of distinct colours.
    pub fn count(&self) -> usize {
        self.count
    }
    pub fn points(&self) -> &[Vec3A] {
        &self.points[..self.count]
    }
    pub fn weights(&self) -> &[f32] {
        &self.weights[..self.count]
    }
    /// Whether any pixel was excluded for being transparent.
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Maps per-point indices back to the 16 pixels of the block.
    ///
    /// Pixels that are not part of the set get index 3, which is transparent
    /// black in the 3-colour palette.
    pub fn remap_indices(&self, source: &[u8]) -> [u8; 16] {
        debug_assert!(source.len() >= self.count);
        self.remap.map(|index| match index {
            Some(index) => source[index as usize],
            None => 3,
        })
    }
}
