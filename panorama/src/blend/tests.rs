use glam::DVec2;

use super::*;
use crate::config::BlendType;
use crate::error::BlendStatus;
use crate::testing::{flat_frame, flat_strip, gradient_scene, init_tracing, scene_frame, sweep_frames};

fn max_column_step(image: &MosaicImage, row: usize, columns: std::ops::Range<usize>) -> u8 {
    columns
        .map(|x| image.luma(x, row).abs_diff(image.luma(x + 1, row)))
        .max()
        .unwrap_or(0)
}

/// Three flat 100x100 frames at x = 0, 40, 80 with luma 100, 110, 120.
fn stepped_strip() -> Vec<Frame> {
    flat_strip(3, 100, 100, 40.0, |i| 100 + 10 * i as u8)
}

// -- Layout ---------------------------------------------------------------------

#[test]
fn test_layout_of_horizontal_strip() {
    let blender = Blender::new(BlendConfig::default());
    let layout = blender.layout(&stepped_strip()).unwrap();

    assert_eq!((layout.width, layout.height), (180, 100));
    assert_eq!(layout.origin, DVec2::ZERO);
    assert!(layout.projection.is_planar());
    assert_eq!(layout.sites.len(), 3);
    assert!((layout.sites[1].center - DVec2::new(89.5, 49.5)).length() < 1e-9);
    assert!(layout.sites[1].neighbors.contains(&0));
    assert!(layout.sites[1].neighbors.contains(&2));
    // Middle region shrinks to the bisectors at 69.5 and 109.5 plus overlap.
    assert!((layout.sites[1].vcrect.left - 68.0).abs() < 1e-9);
    assert!((layout.sites[1].vcrect.right - 111.0).abs() < 1e-9);
}

#[test]
fn test_layout_shifts_negative_origin() {
    let frames = vec![
        flat_frame(40, 40, 50, DMat3::translation(DVec2::new(-30.0, -10.0))),
        flat_frame(40, 40, 50, DMat3::translation(DVec2::new(0.0, 0.0))),
    ];
    let layout = Blender::new(BlendConfig::default()).layout(&frames).unwrap();
    assert_eq!(layout.origin, DVec2::new(-30.0, -10.0));
    assert_eq!((layout.width, layout.height), (72, 52));
    assert_eq!(layout.sites[0].brect, BlendRect::new(0.0, 0.0, 39.0, 39.0));
}

// -- Exact reproduction ---------------------------------------------------------

#[test]
fn test_single_frame_is_reproduced_exactly() {
    init_tracing();
    let frame = scene_frame(100, 100, DVec2::ZERO, gradient_scene);
    for blend_type in [
        BlendType::None,
        BlendType::Full,
        BlendType::Pan,
        BlendType::CylindricalPan,
        BlendType::HorizontalStrip,
    ] {
        let config = BlendConfig::default().with_blend_type(blend_type);
        let image = blend(std::slice::from_ref(&frame), &config).unwrap();
        assert_eq!((image.width, image.height), (100, 100), "{blend_type:?}");
        assert_eq!(image.y_plane(), frame.y(), "{blend_type:?}");
        assert_eq!(image.u_plane(), frame.u(), "{blend_type:?}");
        assert_eq!(image.v_plane(), frame.v(), "{blend_type:?}");
        assert_eq!(image.crop, MosaicRect::of_size(100, 100));
    }
}

// -- Seams ----------------------------------------------------------------------

#[test]
fn test_full_blend_smooths_seams() {
    init_tracing();
    let config = BlendConfig::default().with_depth(4, 4);
    let image = blend(&stepped_strip(), &config).unwrap();
    assert_eq!((image.width, image.height), (180, 100));

    // Bisectors sit between columns 69/70 and 109/110.
    for seam in [69, 109] {
        let step = max_column_step(&image, 50, seam - 2..seam + 3);
        assert!(step < 2, "seam at {seam}: step {step}");
    }
    assert!(max_column_step(&image, 50, 0..179) < 2);

    // Far from the seams each frame comes through unchanged.
    assert_eq!(image.luma(20, 50), 100);
    assert_eq!(image.luma(90, 50), 110);
    assert_eq!(image.luma(160, 50), 120);
}

#[test]
fn test_none_blend_keeps_hard_seams() {
    let config = BlendConfig::default().with_blend_type(BlendType::None);
    let image = blend(&stepped_strip(), &config).unwrap();
    assert_eq!(image.luma(69, 50), 100);
    assert_eq!(image.luma(70, 50), 110);
    assert_eq!(image.luma(109, 50), 110);
    assert_eq!(image.luma(110, 50), 120);
    assert_eq!(max_column_step(&image, 50, 60..80), 10);
}

// -- Background and cropping ----------------------------------------------------

#[test]
fn test_unclaimed_pixels_are_background() {
    let background = Background { y: 7, u: 8, v: 9 };
    let frames = vec![
        Frame::new(
            40,
            40,
            vec![200; 1600],
            vec![60; 1600],
            vec![60; 1600],
            DMat3::identity(),
        )
        .unwrap(),
        Frame::new(
            40,
            40,
            vec![200; 1600],
            vec![60; 1600],
            vec![60; 1600],
            DMat3::translation(DVec2::new(60.0, 30.0)),
        )
        .unwrap(),
    ];
    let config = BlendConfig::default()
        .with_depth(3, 3)
        .with_background(background);
    let image = blend(&frames, &config).unwrap();
    assert_eq!((image.width, image.height), (100, 72));

    let at = |x: usize, y: usize| {
        let i = y * image.width + x;
        let n = image.width * image.height;
        (image.data[i], image.data[2 * n + i], image.data[n + i])
    };
    // Top-right and bottom-left corners lie outside both frames; the last
    // two rows come from rounding the height up.
    for (x, y) in [(99, 0), (0, 69), (50, 71), (0, 70)] {
        assert_eq!(at(x, y), (7, 8, 9), "({x}, {y})");
    }
    assert_ne!(at(10, 10), (7, 8, 9));
    assert!(MosaicRect::of_size(100, 72).contains_rect(&image.crop));
}

#[test]
fn test_curved_blend_is_repacked_to_crop() {
    init_tracing();
    let frames = sweep_frames(5, 64, 48, 30.0, 0.02);
    let config = BlendConfig::default()
        .with_blend_type(BlendType::CylindricalPan)
        .with_depth(3, 2);
    let image = blend(&frames, &config).unwrap();

    assert_eq!(image.full_width % MOSAIC_ALIGNMENT, 0);
    assert_eq!(image.full_height % MOSAIC_ALIGNMENT, 0);
    assert!(MosaicRect::of_size(image.full_width, image.full_height).contains_rect(&image.crop));
    assert_eq!(image.width, image.crop.width());
    assert_eq!(image.height, image.crop.height());
    assert_eq!(image.data.len(), 3 * image.width * image.height);
}

#[test]
fn test_planar_blend_keeps_full_mosaic() {
    let config = BlendConfig::default().with_depth(3, 3);
    let image = blend(&stepped_strip(), &config).unwrap();
    assert!(!image.is_repacked());
    assert_eq!(image.data.len(), 3 * 180 * 100);
    assert_eq!(image.crop, MosaicRect::of_size(180, 100));
}

// -- Determinism ----------------------------------------------------------------

#[test]
fn test_runs_are_deterministic() {
    let frames = sweep_frames(4, 80, 60, 35.0, 0.01);
    let blender = Blender::new(
        BlendConfig::default()
            .with_blend_type(BlendType::Pan)
            .with_depth(4, 2),
    );
    let first = blender
        .run(&frames, &CancelFlag::new(), &Progress::new())
        .unwrap();
    let second = blender
        .run(&frames, &CancelFlag::new(), &Progress::new())
        .unwrap();
    assert_eq!(first, second);
}

// -- Triangulator seam ----------------------------------------------------------

struct Isolated;

impl Triangulator for Isolated {
    fn neighbors(&self, points: &[DVec2]) -> Vec<Vec<usize>> {
        vec![Vec::new(); points.len()]
    }
}

#[test]
fn test_custom_triangulator_is_used() {
    let blender = Blender::new(BlendConfig::default().with_blend_type(BlendType::None))
        .with_triangulator(Isolated);
    let layout = blender.layout(&stepped_strip()).unwrap();
    assert!(layout.sites.iter().all(|s| s.neighbors.is_empty() && s.vcrect == s.brect));

    // Without neighbors the first frame keeps its whole footprint.
    let image = blender
        .run(&stepped_strip(), &CancelFlag::new(), &Progress::new())
        .unwrap();
    assert_eq!(image.luma(99, 50), 100);
    assert_eq!(image.luma(120, 50), 110);
}

// -- Progress and cancellation --------------------------------------------------

#[test]
fn test_progress_completes() {
    let progress = Progress::new();
    let blender = Blender::new(BlendConfig::default().with_depth(3, 3));
    blender
        .run(&stepped_strip(), &CancelFlag::new(), &progress)
        .unwrap();
    assert_eq!(progress.get(), 1.0);
}

#[test]
fn test_cancel_before_run() {
    let cancel = CancelFlag::new();
    cancel.cancel();
    let progress = Progress::new();
    let result = Blender::new(BlendConfig::default()).run(&stepped_strip(), &cancel, &progress);
    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(BlendStatus::of(&result), BlendStatus::Cancelled);
    assert!(progress.get() < 1.0);
}

// -- Errors ---------------------------------------------------------------------

#[test]
fn test_no_frames() {
    let result = blend(&[], &BlendConfig::default());
    assert!(matches!(result, Err(Error::NoFrames)));
}

#[test]
fn test_shrinking_transform_is_inconsistent() {
    let half = DMat3::from_array([0.5, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 1.0]);
    let frames = vec![flat_frame(100, 100, 80, half)];
    let err = blend(&frames, &BlendConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::InconsistentGeometry {
            mosaic_width: 52,
            mosaic_height: 52,
            frame_width: 100,
            frame_height: 100,
        }
    ));
    assert_eq!(err.status(), BlendStatus::Error);
}

#[test]
fn test_mismatched_frames_are_rejected() {
    let frames = vec![
        flat_frame(40, 40, 10, DMat3::identity()),
        flat_frame(40, 30, 10, DMat3::identity()),
    ];
    let err = blend(&frames, &BlendConfig::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidFrame { index: 1, .. }));
}
