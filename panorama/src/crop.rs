//! Trimming background padding off the finished mosaic.

use common::Buffer2;

use crate::config::Background;
use crate::math::MosaicRect;

/// The three planes of a finished mosaic.
#[derive(Debug, Clone)]
pub struct MosaicPlanes {
    pub y: Buffer2<u8>,
    pub u: Buffer2<u8>,
    pub v: Buffer2<u8>,
}

impl MosaicPlanes {
    #[inline]
    pub fn width(&self) -> usize {
        self.y.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.y.height()
    }

    #[inline]
    fn is_background(&self, x: usize, y: usize, background: &Background) -> bool {
        self.y[(x, y)] == background.y
            && self.u[(x, y)] == background.u
            && self.v[(x, y)] == background.v
    }

    /// Copy `rect` out as one buffer: Y rows, then V rows, then U rows.
    pub fn pack_yvu(&self, rect: &MosaicRect) -> Vec<u8> {
        let (x, y, w, h) = (
            rect.left as usize,
            rect.top as usize,
            rect.width(),
            rect.height(),
        );
        let mut out = Vec::with_capacity(3 * w * h);
        for plane in [&self.y, &self.v, &self.u] {
            for row in y..y + h {
                out.extend_from_slice(&plane.row(row)[x..x + w]);
            }
        }
        out
    }
}

/// Innermost rectangle of the mosaic free of ragged background edges.
///
/// Each row pulls the left edge in to its first content pixel, but only when
/// that pixel lies inside a guard band of `frame_width / 8` columns from the
/// edge; the right edge likewise. Columns do the same for the top and bottom
/// with `frame_height / 8`. Content that merely happens to match the
/// background colour further in therefore cannot cut into the mosaic.
/// Returns the full rectangle when there is no background border.
pub fn find_crop(
    planes: &MosaicPlanes,
    background: &Background,
    frame_width: usize,
    frame_height: usize,
) -> MosaicRect {
    let (width, height) = (planes.width(), planes.height());
    let full = MosaicRect::of_size(width, height);
    if width == 0 || height == 0 {
        return full;
    }

    let is_content = |x: usize, y: usize| !planes.is_background(x, y, background);
    let guard_x = frame_width / 8;
    let guard_y = frame_height / 8;

    let (mut min_col, mut max_col) = (0, width - 1);
    for y in 0..height {
        let (lo, hi) = guarded_extent(width, guard_x, |x| is_content(x, y));
        min_col = min_col.max(lo);
        max_col = max_col.min(hi);
    }

    let (mut min_row, mut max_row) = (0, height - 1);
    for x in 0..width {
        let (lo, hi) = guarded_extent(height, guard_y, |y| is_content(x, y));
        min_row = min_row.max(lo);
        max_row = max_row.min(hi);
    }

    let crop = MosaicRect::new(
        min_col as i64,
        min_row as i64,
        max_col as i64,
        max_row as i64,
    );
    if crop.is_empty() {
        tracing::warn!(?crop, "Crop scan found no consistent content, keeping full mosaic");
        return full;
    }
    crop
}

/// First and last content index along a line of `len` samples, each kept only
/// when it falls inside the `guard` band at its end of the line.
fn guarded_extent(len: usize, guard: usize, is_content: impl Fn(usize) -> bool) -> (usize, usize) {
    let first = (0..len).find(|&i| is_content(i));
    let last = (0..len).rev().find(|&i| is_content(i));
    let lo = match first {
        Some(i) if i < guard => i,
        _ => 0,
    };
    let hi = match last {
        Some(i) if i > len.saturating_sub(guard) => i,
        _ => len - 1,
    };
    (lo, hi)
}
