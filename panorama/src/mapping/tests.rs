use super::*;
use crate::config::BlendType;

const ROUND_TRIP_TOL: f64 = 1e-3;

fn sweep_transforms(count: usize, step: f64, rotation: f64) -> Vec<DMat3> {
    (0..count)
        .map(|i| DMat3::euclidean(DVec2::new(step * i as f64, 0.0), rotation * i as f64))
        .collect()
}

fn interior_points() -> Vec<DVec2> {
    let mut points = Vec::new();
    for y in [1.0, 17.5, 50.0, 98.0] {
        for x in [0.5, 33.0, 64.25, 99.0] {
            points.push(DVec2::new(x, y));
        }
    }
    points
}

fn assert_round_trip(projection: &Projection, transform: &DMat3) {
    let inverse = transform.inverse().unwrap();
    for p in interior_points() {
        let m = projection.frame_to_mosaic(transform, p).unwrap();
        let back = projection.mosaic_to_frame(&inverse, m).unwrap();
        assert!(
            (back - p).length() < ROUND_TRIP_TOL,
            "{p:?} -> {m:?} -> {back:?}"
        );
    }
}

// -- Planar ---------------------------------------------------------------------

#[test]
fn test_planar_round_trip() {
    let transforms = [
        DMat3::identity(),
        DMat3::euclidean(DVec2::new(40.0, -3.0), 0.05),
        DMat3::from_array([1.02, 0.01, 12.0, -0.02, 0.98, 4.0, 1e-4, -2e-4, 1.0]),
    ];
    for t in &transforms {
        assert_round_trip(&Projection::Planar, t);
    }
}

#[test]
fn test_planar_at_infinity_is_out_of_bounds() {
    let t = DMat3::from_array([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, -0.01, 0.0, 1.0]);
    assert!(Projection::Planar
        .frame_to_mosaic(&t, DVec2::new(100.0, 0.0))
        .is_none());
}

// -- Curved ---------------------------------------------------------------------

#[test]
fn test_curved_round_trip_horizontal() {
    let warp = CurvedWarp {
        theta: 0.5,
        width: 500.0,
        radius: 1000.0,
        center: DVec2::new(50.0, -1000.0),
        axis: SweepAxis::Horizontal,
        correction: 3.0,
        direction: 1.0,
    };
    let projection = Projection::Curved(warp);
    assert_round_trip(&projection, &DMat3::identity());
    assert_round_trip(&projection, &DMat3::translation(DVec2::new(120.0, 8.0)));
}

#[test]
fn test_curved_round_trip_vertical() {
    let warp = CurvedWarp {
        theta: -0.3,
        width: -420.0,
        radius: 800.0,
        center: DVec2::new(900.0, 50.0),
        axis: SweepAxis::Vertical,
        correction: -1.5,
        direction: -1.0,
    };
    assert_round_trip(&Projection::Curved(warp), &DMat3::identity());
}

#[test]
fn test_curved_warp_rejects_centre() {
    let warp = CurvedWarp {
        theta: 0.5,
        width: 500.0,
        radius: 1000.0,
        center: DVec2::new(50.0, -1000.0),
        axis: SweepAxis::Horizontal,
        correction: 0.0,
        direction: 1.0,
    };
    assert!(warp.warp(warp.center).is_none());
}

// -- Derivation -----------------------------------------------------------------

#[test]
fn test_derive_planar_types_stay_planar() {
    let transforms = sweep_transforms(5, 40.0, 0.02);
    for blend_type in [BlendType::None, BlendType::Full, BlendType::Pan] {
        let projection = Projection::derive(&transforms, 100, 100, blend_type, true).unwrap();
        assert!(projection.is_planar(), "{blend_type:?}");
    }
}

#[test]
fn test_derive_without_rotation_is_planar() {
    let transforms = sweep_transforms(5, 40.0, 0.0);
    let projection =
        Projection::derive(&transforms, 100, 100, BlendType::CylindricalPan, true).unwrap();
    assert!(projection.is_planar());
}

#[test]
fn test_derive_horizontal_sweep() {
    let transforms = sweep_transforms(5, 40.0, 0.02);
    let projection =
        Projection::derive(&transforms, 100, 100, BlendType::CylindricalPan, true).unwrap();
    let Projection::Curved(warp) = projection else {
        panic!("expected curved projection, got {projection:?}");
    };
    assert_eq!(warp.axis, SweepAxis::Horizontal);
    assert!((warp.theta - 0.08).abs() < 1e-12);
    assert!(warp.radius > 1000.0, "radius {}", warp.radius);
    // The sweep bends downwards, so the centre lies below the strip.
    assert_eq!(warp.direction, -1.0);
    assert!(warp.center.y > 1000.0);
    assert!(warp.correction.is_finite());

    for t in &transforms {
        assert_round_trip(&projection, t);
    }
}

#[test]
fn test_derive_partial_sweep_matches_summed_rotation() {
    let transforms = sweep_transforms(4, 40.0, 0.03);
    let projection =
        Projection::derive(&transforms, 100, 100, BlendType::HorizontalStrip, false).unwrap();
    let Projection::Curved(warp) = projection else {
        panic!("expected curved projection, got {projection:?}");
    };
    assert!((warp.theta - 0.09).abs() < 1e-12);
    for t in &transforms {
        assert_round_trip(&projection, t);
    }
}

// -- Rectangles and centroids ---------------------------------------------------

#[test]
fn test_frame_rect_of_translated_frame() {
    let t = DMat3::translation(DVec2::new(40.0, 5.0));
    let rect = frame_to_mosaic_rect(&Projection::Planar, 100, 50, &t);
    assert_eq!(rect, BlendRect::new(40.0, 5.0, 139.0, 54.0));
}

#[test]
fn test_frame_rect_contains_curved_corners() {
    let transforms = sweep_transforms(5, 40.0, 0.02);
    let projection =
        Projection::derive(&transforms, 100, 100, BlendType::CylindricalPan, true).unwrap();
    for t in &transforms {
        let rect = frame_to_mosaic_rect(&projection, 100, 100, t);
        assert!(!rect.is_empty());
        for corner in frame_corners(&projection, 100, 100, t).unwrap() {
            assert!(rect.contains(corner), "{corner:?} outside {rect:?}");
        }
    }
}

#[test]
fn test_quad_centroid_of_rectangle() {
    let corners = [
        DVec2::new(0.0, 0.0),
        DVec2::new(0.0, 10.0),
        DVec2::new(20.0, 10.0),
        DVec2::new(20.0, 0.0),
    ];
    let c = quad_centroid(corners);
    assert!((c - DVec2::new(10.0, 5.0)).length() < 1e-12);
    assert!((quad_area(corners) - 200.0).abs() < 1e-12);
}

#[test]
fn test_quad_centroid_of_trapezoid_is_area_weighted() {
    // The centroid sits closer to the wide side than the vertex mean does.
    let corners = [
        DVec2::new(0.0, 0.0),
        DVec2::new(4.0, 6.0),
        DVec2::new(6.0, 6.0),
        DVec2::new(10.0, 0.0),
    ];
    let c = quad_centroid(corners);
    assert!((c.x - 5.0).abs() < 1e-12);
    // Trapezoid with parallel sides 10 and 2, height 6: y = 6 * (10 + 2*2) / (3 * 12).
    assert!((c.y - 6.0 * 14.0 / 36.0).abs() < 1e-12);
}

#[test]
fn test_quad_centroid_degenerate_falls_back_to_mean() {
    let p = DVec2::new(3.0, 4.0);
    assert_eq!(quad_centroid([p; 4]), p);
}
