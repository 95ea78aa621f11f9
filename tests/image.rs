use squish_bc::*;

mod util;

#[test]
fn odd_sized_images_round_trip() {
    let mut rng = util::create_rng();

    for (width, height) in [(1, 1), (3, 7), (5, 5), (9, 4), (16, 13)] {
        // a diagonal grey ramp keeps the colours of every tile on a line
        let rgba: Vec<u8> = (0..width * height)
            .flat_map(|i| {
                let v = ((i % width + i / width) * 8) as u8;
                [v, v, 100, 255]
            })
            .collect();

        for method in [Flags::DXT1, Flags::DXT3, Flags::DXT5] {
            let size = storage_requirements(width, height, method).unwrap();
            let mut blocks = vec![0; size];
            compress_image(&rgba, width, height, &mut blocks, method).unwrap();

            let mut decoded = vec![0; width * height * 4];
            decompress_image(&mut decoded, width, height, &blocks, method).unwrap();
            assert!(
                util::max_rgb_diff(&rgba, &decoded) <= 16,
                "{width}x{height} {method:?}"
            );
            assert!(decoded.chunks_exact(4).all(|p| p[3] == 255));
        }
    }

    // random data must at least survive the trip with the right sizes
    let rgba = util::random_image(&mut rng, 7, 3, 4);
    let mut blocks = vec![0; storage_requirements(7, 3, Flags::DXT5).unwrap()];
    compress_image(&rgba, 7, 3, &mut blocks, Flags::DXT5).unwrap();
    let mut decoded = vec![0; 7 * 3 * 4];
    decompress_image(&mut decoded, 7, 3, &blocks, Flags::DXT5).unwrap();
}

#[test]
fn decompression_only_writes_inside_the_image() {
    let (width, height) = (5, 6);
    let rgba = vec![200_u8; width * height * 4];
    let mut blocks = vec![0; storage_requirements(width, height, Flags::DXT1).unwrap()];
    compress_image(&rgba, width, height, &mut blocks, Flags::DXT1).unwrap();

    // the right column and bottom rows come from partial tiles
    let mut decoded = vec![0; width * height * 4];
    decompress_image(&mut decoded, width, height, &blocks, Flags::DXT1).unwrap();
    assert!(decoded.iter().all(|&b| b.abs_diff(200) <= 1 || b == 255));

    let mut too_big = vec![0; (width + 1) * height * 4];
    assert!(decompress_image(&mut too_big, width, height, &blocks, Flags::DXT1).is_err());
}

#[test]
fn rgb_images_are_opaque() {
    let mut rng = util::create_rng();
    let (width, height) = (6, 5);
    let rgb = util::random_image(&mut rng, width, height, 3);

    let rgba: Vec<u8> = rgb
        .chunks_exact(3)
        .flat_map(|p| [p[0], p[1], p[2], 255])
        .collect();

    for method in [Flags::DXT1, Flags::DXT3, Flags::DXT5] {
        let size = storage_requirements(width, height, method).unwrap();
        let mut from_rgb = vec![0; size];
        compress_image_rgb(&rgb, width, height, &mut from_rgb, method).unwrap();
        let mut from_rgba = vec![0; size];
        compress_image(&rgba, width, height, &mut from_rgba, method).unwrap();
        assert_eq!(from_rgb, from_rgba, "{method:?}");

        let mut decoded = vec![0; width * height * 4];
        decompress_image(&mut decoded, width, height, &from_rgb, method).unwrap();
        assert!(decoded.chunks_exact(4).all(|p| p[3] == 255), "{method:?}");
    }
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_compression_matches_serial() {
    let mut rng = util::create_rng();
    let (width, height) = (37, 29);
    let rgba = util::random_image(&mut rng, width, height, 4);

    for flags in [
        Flags::DXT1,
        Flags::DXT3 | Flags::COLOUR_RANGE_FIT,
        Flags::DXT5 | Flags::WEIGHT_COLOUR_BY_ALPHA,
    ] {
        let size = storage_requirements(width, height, flags).unwrap();
        let mut serial = vec![0; size];
        compress_image(&rgba, width, height, &mut serial, flags).unwrap();

        let mut reports = Vec::new();
        let mut f = |p: f32| reports.push(p);
        let mut progress = Progress::new(&mut f);
        let mut parallel = vec![0; size];
        compress_image_parallel(&rgba, width, height, &mut parallel, flags, Some(&mut progress))
            .unwrap();
        drop(progress);

        assert_eq!(serial, parallel, "{flags:?}");
        // one report per row of blocks, always increasing
        assert_eq!(reports.len(), 8);
        assert!(reports.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(reports.last(), Some(&1.0));
    }
}
