use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec2;

use panorama::math::DMat3;
use panorama::pyramid::Pyramid;
use panorama::{blend, BlendConfig, BlendType, Frame};

fn textured_frames(count: usize, width: usize, height: usize, step: f64) -> Vec<Frame> {
    (0..count)
        .map(|i| {
            let x0 = step * i as f64;
            let y: Vec<u8> = (0..height)
                .flat_map(|row| {
                    (0..width).map(move |col| {
                        let x = col as f64 + x0;
                        (128.0 + 60.0 * (x * 0.05).sin() + 40.0 * (row as f64 * 0.07).cos()) as u8
                    })
                })
                .collect();
            Frame::from_luma(width, height, y, DMat3::translation(DVec2::new(x0, 0.0)))
                .unwrap_or_else(|e| panic!("Failed to build benchmark frame {i}: {e}"))
        })
        .collect()
}

fn bench_pyramid(c: &mut Criterion) {
    let (width, height) = (640, 480);
    let plane: Vec<u8> = (0..width * height).map(|i| (i % 251) as u8).collect();
    let mut pyramid = Pyramid::allocate(6, width, height, 8)
        .unwrap_or_else(|e| panic!("Failed to allocate benchmark pyramid: {e}"));

    c.bench_function("pyramid_laplacian_collapse_640x480", |b| {
        b.iter(|| {
            pyramid.load_plane(black_box(&plane));
            pyramid.laplacian();
            pyramid.collapse();
            black_box(pyramid.level(0).get(0, 0));
        })
    });
}

fn bench_blend(c: &mut Criterion) {
    let frames = textured_frames(5, 320, 240, 200.0);
    let mut group = c.benchmark_group("blend_5x320x240");
    group.sample_size(10);
    for blend_type in [BlendType::None, BlendType::Full] {
        let config = BlendConfig::default().with_blend_type(blend_type);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{blend_type:?}")),
            &config,
            |b, config| {
                b.iter(|| {
                    let image = blend(black_box(&frames), config)
                        .unwrap_or_else(|e| panic!("Benchmark blend failed: {e}"));
                    black_box(image);
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_pyramid, bench_blend);
criterion_main!(benches);
