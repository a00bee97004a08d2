//! Testing utilities for panorama.

#![allow(dead_code)]

use glam::DVec2;

use crate::frame::Frame;
use crate::math::DMat3;

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    common::log_setup::init_test_logging();
}

/// Frame filled with one luma value and neutral chroma.
pub fn flat_frame(width: usize, height: usize, luma: u8, transform: DMat3) -> Frame {
    Frame::from_luma(width, height, vec![luma; width * height], transform).unwrap()
}

/// Frame cut from a synthetic scene at `offset`, placed by a pure translation.
///
/// `scene` is evaluated at scene coordinates and returns `(y, u, v)`.
pub fn scene_frame(
    width: usize,
    height: usize,
    offset: DVec2,
    scene: impl Fn(f64, f64) -> (u8, u8, u8),
) -> Frame {
    let n = width * height;
    let (mut y, mut u, mut v) = (Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n));
    for row in 0..height {
        for col in 0..width {
            let (sy, su, sv) = scene(col as f64 + offset.x, row as f64 + offset.y);
            y.push(sy);
            u.push(su);
            v.push(sv);
        }
    }
    Frame::new(width, height, y, u, v, DMat3::translation(offset)).unwrap()
}

/// Smooth, non-constant scene: diagonal ramps in every plane.
pub fn gradient_scene(x: f64, y: f64) -> (u8, u8, u8) {
    let clamp = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    (
        clamp(30.0 + 0.5 * x + 0.3 * y),
        clamp(100.0 + 0.2 * x),
        clamp(150.0 - 0.25 * y),
    )
}

/// `count` flat frames stepped horizontally by `step`, frame `i` with luma `luma(i)`.
pub fn flat_strip(
    count: usize,
    width: usize,
    height: usize,
    step: f64,
    luma: impl Fn(usize) -> u8,
) -> Vec<Frame> {
    (0..count)
        .map(|i| {
            let transform = DMat3::translation(DVec2::new(step * i as f64, 0.0));
            flat_frame(width, height, luma(i), transform)
        })
        .collect()
}

/// `count` gradient-scene frames of a horizontal sweep turning by `rotation` per frame.
pub fn sweep_frames(count: usize, width: usize, height: usize, step: f64, rotation: f64) -> Vec<Frame> {
    (0..count)
        .map(|i| {
            let offset = DVec2::new(step * i as f64, 0.0);
            let base = scene_frame(width, height, offset, gradient_scene);
            let transform = DMat3::euclidean(offset, rotation * i as f64);
            Frame::new(
                width,
                height,
                base.y().to_vec(),
                base.u().to_vec(),
                base.v().to_vec(),
                transform,
            )
            .unwrap()
        })
        .collect()
}
