//! Coordinate mapping between frame pixels and the mosaic.

mod projection;

#[cfg(test)]
mod tests;

pub use projection::{CurvedWarp, Projection, SweepAxis};

use glam::DVec2;

use crate::math::{BlendRect, DMat3};

/// Below this absolute area a projected quad is treated as collapsed.
const MIN_QUAD_AREA: f64 = 1e-9;

/// Mosaic-space bounding rectangle of a `width` x `height` frame.
///
/// Walks every perimeter pixel since curved projections bend the borders.
/// Perimeter points that fail to project are skipped; the result is empty when
/// none project.
pub fn frame_to_mosaic_rect(
    projection: &Projection,
    width: usize,
    height: usize,
    transform: &DMat3,
) -> BlendRect {
    let mut rect = BlendRect::EMPTY;
    let last_x = width as f64 - 1.0;
    let last_y = height as f64 - 1.0;
    let mut include = |p: DVec2| {
        if let Some(m) = projection.frame_to_mosaic(transform, p) {
            rect.include_point(m);
        }
    };
    for i in 0..width {
        include(DVec2::new(i as f64, 0.0));
        include(DVec2::new(i as f64, last_y));
    }
    for j in 0..height {
        include(DVec2::new(0.0, j as f64));
        include(DVec2::new(last_x, j as f64));
    }
    rect
}

/// Projected frame corners in perimeter order, or `None` if any fails to project.
pub fn frame_corners(
    projection: &Projection,
    width: usize,
    height: usize,
    transform: &DMat3,
) -> Option<[DVec2; 4]> {
    let last_x = width as f64 - 1.0;
    let last_y = height as f64 - 1.0;
    Some([
        projection.frame_to_mosaic(transform, DVec2::new(0.0, 0.0))?,
        projection.frame_to_mosaic(transform, DVec2::new(0.0, last_y))?,
        projection.frame_to_mosaic(transform, DVec2::new(last_x, last_y))?,
        projection.frame_to_mosaic(transform, DVec2::new(last_x, 0.0))?,
    ])
}

/// Area centroid of a (possibly non-convex) quadrilateral.
///
/// Falls back to the vertex mean when the quad has near-zero area, which only
/// happens for single-pixel frames or collapsed transforms.
pub fn quad_centroid(corners: [DVec2; 4]) -> DVec2 {
    let mut area2 = 0.0;
    let mut acc = DVec2::ZERO;
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let cross = a.perp_dot(b);
        area2 += cross;
        acc += (a + b) * cross;
    }
    if area2.abs() < MIN_QUAD_AREA {
        return corners.iter().copied().sum::<DVec2>() / 4.0;
    }
    acc / (3.0 * area2)
}

/// Absolute area of a quadrilateral in perimeter order.
pub fn quad_area(corners: [DVec2; 4]) -> f64 {
    (0..4)
        .map(|i| corners[i].perp_dot(corners[(i + 1) % 4]))
        .sum::<f64>()
        .abs()
        / 2.0
}
