use std::sync::atomic::AtomicBool;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;
use squish_bc::*;

struct Image {
    data: Vec<u8>,
    width: usize,
    height: usize,
}
impl Image {
    fn random(width: usize, height: usize, channels: usize) -> Self {
        let mut data = vec![0; width * height * channels];
        let mut rng = rand::thread_rng();
        rng.fill(data.as_mut_slice());
        Self {
            data,
            width,
            height,
        }
    }

    /// A smooth image, which is closer to real textures than noise.
    fn gradient(width: usize, height: usize) -> Self {
        let data = (0..width * height)
            .flat_map(|i| {
                let (x, y) = (i % width, i / width);
                [(x * 255 / width) as u8, (y * 255 / height) as u8, 128, 255]
            })
            .collect();
        Self {
            data,
            width,
            height,
        }
    }
}

fn bench_compress(c: &mut Criterion, flags: Flags, image: &Image, image_name: &str) {
    let name = format!("{flags:?} - {image_name} {}x{}", image.width, image.height);

    c.bench_function(&name, |b| {
        let size = storage_requirements(image.width, image.height, flags).unwrap();
        let mut output = vec![0; size];

        b.iter(|| {
            let image = black_box(image);
            let result = compress_image(
                &image.data,
                image.width,
                image.height,
                black_box(&mut output),
                black_box(flags),
            );
            black_box(result).unwrap();
        });
    });
}

pub fn compress_blocks(c: &mut Criterion) {
    let random = Image::random(256, 256, 4);
    let gradient = Image::gradient(256, 256);

    for method in [Flags::DXT1, Flags::DXT3, Flags::DXT5] {
        for fit in [
            Flags::COLOUR_RANGE_FIT,
            Flags::COLOUR_CLUSTER_FIT,
            Flags::COLOUR_ITERATIVE_CLUSTER_FIT,
        ] {
            bench_compress(c, method | fit, &random, "random");
        }
        bench_compress(c, method, &gradient, "gradient");
    }

    bench_compress(c, Flags::DXT1 | Flags::WEIGHT_COLOUR_BY_ALPHA, &random, "random");
    bench_compress(c, Flags::DXT1 | Flags::COLOUR_METRIC_UNIFORM, &random, "random");
}

pub fn compress_flatten(c: &mut Criterion) {
    let image = Image::random(256, 256, 3);
    let abort = AtomicBool::new(false);

    for flatten in [false, true] {
        let name = format!("rgb flatten={flatten} - random 256x256");
        c.bench_function(&name, |b| {
            let size = storage_requirements(image.width, image.height, Flags::DXT1).unwrap();
            let mut output = vec![0; size];

            b.iter(|| {
                let result = compress_image_rgb_flatten(
                    black_box(&image.data),
                    image.width,
                    image.height,
                    black_box(&mut output),
                    Flags::COLOUR_CLUSTER_FIT,
                    flatten,
                    None,
                    &abort,
                );
                black_box(result).unwrap();
            });
        });
    }
}

#[cfg(feature = "rayon")]
pub fn compress_parallel(c: &mut Criterion) {
    // Create a new group to make the benchmark faster.
    // It's fine if the results are less accurate in this case.
    let mut group = c.benchmark_group("par");
    group.warm_up_time(std::time::Duration::from_millis(500));
    group.measurement_time(std::time::Duration::from_secs(3));
    group.sample_size(10);

    for size in [64, 256, 1024] {
        let image = Image::random(size, size, 4);
        let output_size = storage_requirements(size, size, Flags::DXT5).unwrap();

        for parallel in [true, false] {
            let name = format!(
                "DXT5 {} - {size}x{size}",
                if parallel { "parallel" } else { "!parallel" }
            );

            group.bench_function(&name, |b| {
                let mut output = vec![0; output_size];
                b.iter(|| {
                    let image = black_box(&image);
                    let result = if parallel {
                        compress_image_parallel(
                            &image.data,
                            size,
                            size,
                            &mut output,
                            Flags::DXT5,
                            None,
                        )
                    } else {
                        compress_image(&image.data, size, size, &mut output, Flags::DXT5)
                    };
                    black_box(result).unwrap();
                });
            });
        }
    }
}
#[cfg(not(feature = "rayon"))]
pub fn compress_parallel(_: &mut Criterion) {}

criterion_group!(benches, compress_blocks, compress_flatten, compress_parallel);
criterion_main!(benches);
