//! Shrinks a site's footprint to its Voronoi cell plus an overlap margin.

use glam::DVec2;

use crate::math::BlendRect;

/// Centroid offsets below this are treated as aligned on that axis.
const AXIS_EPSILON: f64 = 1e-5;

/// Clip `footprint` to the half-planes closer to `center` than to each of `neighbors`.
///
/// Every bisector is widened by `overlap` towards the neighbor, so adjacent
/// regions overlap slightly. Bisectors are evaluated against the unclipped
/// footprint and combined with min/max, which makes the result independent of
/// neighbor order. The result never exceeds `footprint`.
pub fn clip_region(
    center: DVec2,
    footprint: &BlendRect,
    neighbors: impl IntoIterator<Item = DVec2>,
    overlap: f64,
) -> BlendRect {
    let mut clipped = *footprint;
    for other in neighbors {
        let d = other - center;
        let mid = center + d / 2.0;

        if d.x > AXIS_EPSILON {
            // Neighbor to the right: bound the right edge by the bisector's widest x.
            let y = if d.y >= 0.0 { footprint.top } else { footprint.bottom };
            let x = overlap + mid.x - d.y * (y - mid.y) / d.x;
            clipped.right = clipped.right.min(x);
        } else if d.x < -AXIS_EPSILON {
            let y = if d.y >= 0.0 { footprint.top } else { footprint.bottom };
            let x = -overlap + mid.x - d.y * (y - mid.y) / d.x;
            clipped.left = clipped.left.max(x);
        }

        if d.y > AXIS_EPSILON {
            // Neighbor below: bound the bottom edge.
            let x = if d.x >= 0.0 { footprint.left } else { footprint.right };
            let y = overlap + mid.y - d.x * (x - mid.x) / d.y;
            clipped.bottom = clipped.bottom.min(y);
        } else if d.y < -AXIS_EPSILON {
            let x = if d.x >= 0.0 { footprint.left } else { footprint.right };
            let y = -overlap + mid.y - d.x * (x - mid.x) / d.y;
            clipped.top = clipped.top.max(y);
        }
    }
    clipped
}
