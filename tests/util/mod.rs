#![allow(unused)]

use rand::{Rng, SeedableRng};

pub fn create_rng() -> impl Rng {
    rand_chacha::ChaChaRng::seed_from_u64(123456789)
}

/// A random image with `channels` bytes per pixel.
pub fn random_image(rng: &mut impl Rng, width: usize, height: usize, channels: usize) -> Vec<u8> {
    let mut data = vec![0_u8; width * height * channels];
    rng.fill(data.as_mut_slice());
    data
}

/// A random 4x4 block with a smooth colour gradient plus some noise.
///
/// Real textures look more like this than like white noise.
pub fn gradient_block(rng: &mut impl Rng) -> [u8; 64] {
    let start: [f32; 4] = rng.gen::<[u8; 4]>().map(f32::from);
    let end: [f32; 4] = rng.gen::<[u8; 4]>().map(f32::from);

    let mut block = [0_u8; 64];
    for (i, pixel) in block.chunks_exact_mut(4).enumerate() {
        let t = i as f32 / 15.0;
        for c in 0..4 {
            let noise: f32 = rng.gen_range(-6.0..6.0);
            let value = start[c] + (end[c] - start[c]) * t + noise;
            pixel[c] = value.round().clamp(0.0, 255.0) as u8;
        }
    }
    block
}

/// The sum of squared differences of the RGB channels of two RGBA buffers.
pub fn rgb_error(a: &[u8], b: &[u8]) -> u64 {
    assert_eq!(a.len(), b.len());
    a.chunks_exact(4)
        .zip(b.chunks_exact(4))
        .map(|(a, b)| {
            (0..3)
                .map(|c| {
                    let d = a[c] as i64 - b[c] as i64;
                    (d * d) as u64
                })
                .sum::<u64>()
        })
        .sum()
}

/// The largest absolute difference of any RGB channel.
pub fn max_rgb_diff(a: &[u8], b: &[u8]) -> u8 {
    a.chunks_exact(4)
        .zip(b.chunks_exact(4))
        .flat_map(|(a, b)| (0..3).map(move |c| a[c].abs_diff(b[c])))
        .max()
        .unwrap_or(0)
}
