//! Axis-aligned rectangles in mosaic space.

use glam::DVec2;

/// Floating-point rectangle with inclusive edges.
///
/// An empty rectangle has `left > right`; including a point into it yields
/// a degenerate rectangle at that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BlendRect {
    pub const EMPTY: BlendRect = BlendRect {
        left: f64::INFINITY,
        top: f64::INFINITY,
        right: f64::NEG_INFINITY,
        bottom: f64::NEG_INFINITY,
    };

    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.left <= self.right && self.top <= self.bottom)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn include_point(&mut self, p: DVec2) {
        self.left = self.left.min(p.x);
        self.right = self.right.max(p.x);
        self.top = self.top.min(p.y);
        self.bottom = self.bottom.max(p.y);
    }

    pub fn include_rect(&mut self, other: &BlendRect) {
        if other.is_empty() {
            return;
        }
        self.left = self.left.min(other.left);
        self.right = self.right.max(other.right);
        self.top = self.top.min(other.top);
        self.bottom = self.bottom.max(other.bottom);
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Whether `inner` lies inside `self`, allowing `eps` of slack.
    pub fn contains_rect(&self, inner: &BlendRect, eps: f64) -> bool {
        inner.left >= self.left - eps
            && inner.right <= self.right + eps
            && inner.top >= self.top - eps
            && inner.bottom <= self.bottom + eps
    }

    /// Same rectangle shifted by `offset`.
    pub fn translated(&self, offset: DVec2) -> BlendRect {
        BlendRect::new(
            self.left + offset.x,
            self.top + offset.y,
            self.right + offset.x,
            self.bottom + offset.y,
        )
    }

    /// Integer rectangle covering this one (floor of the low edges, ceil of the high edges).
    pub fn enclosing(&self) -> MosaicRect {
        MosaicRect::new(
            self.left.floor() as i64,
            self.top.floor() as i64,
            self.right.ceil() as i64,
            self.bottom.ceil() as i64,
        )
    }
}

impl Default for BlendRect {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Integer rectangle with inclusive edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MosaicRect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl MosaicRect {
    pub const fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle covering a `width` x `height` grid anchored at the origin.
    pub const fn of_size(width: usize, height: usize) -> Self {
        Self::new(0, 0, width as i64 - 1, height as i64 - 1)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }

    /// Number of columns, zero when empty.
    #[inline]
    pub fn width(&self) -> usize {
        (self.right - self.left + 1).max(0) as usize
    }

    /// Number of rows, zero when empty.
    #[inline]
    pub fn height(&self) -> usize {
        (self.bottom - self.top + 1).max(0) as usize
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    pub fn contains_rect(&self, inner: &MosaicRect) -> bool {
        inner.left >= self.left
            && inner.right <= self.right
            && inner.top >= self.top
            && inner.bottom <= self.bottom
    }

    pub fn intersect(&self, other: &MosaicRect) -> MosaicRect {
        MosaicRect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_blend_rect_accumulates_points() {
        let mut rect = BlendRect::EMPTY;
        assert!(rect.is_empty());
        rect.include_point(DVec2::new(3.0, 4.0));
        assert!(!rect.is_empty());
        assert_eq!(rect, BlendRect::new(3.0, 4.0, 3.0, 4.0));
        rect.include_point(DVec2::new(-1.0, 10.0));
        assert_eq!(rect, BlendRect::new(-1.0, 4.0, 3.0, 10.0));
        assert_eq!(rect.width(), 4.0);
        assert_eq!(rect.height(), 6.0);
    }

    #[test]
    fn test_include_rect_ignores_empty() {
        let mut rect = BlendRect::new(0.0, 0.0, 1.0, 1.0);
        rect.include_rect(&BlendRect::EMPTY);
        assert_eq!(rect, BlendRect::new(0.0, 0.0, 1.0, 1.0));
        rect.include_rect(&BlendRect::new(2.0, -1.0, 5.0, 0.5));
        assert_eq!(rect, BlendRect::new(0.0, -1.0, 5.0, 1.0));
    }

    #[test]
    fn test_enclosing_rounds_outwards() {
        let rect = BlendRect::new(-0.5, 1.2, 9.1, 9.0);
        assert_eq!(rect.enclosing(), MosaicRect::new(-1, 1, 10, 9));
    }

    #[test]
    fn test_mosaic_rect_size_and_intersection() {
        let full = MosaicRect::of_size(180, 100);
        assert_eq!(full.width(), 180);
        assert_eq!(full.height(), 100);

        let clipped = full.intersect(&MosaicRect::new(-8, 50, 20, 140));
        assert_eq!(clipped, MosaicRect::new(0, 50, 20, 99));
        assert!(full.contains_rect(&clipped));

        let disjoint = full.intersect(&MosaicRect::new(200, 0, 210, 10));
        assert!(disjoint.is_empty());
        assert_eq!(disjoint.width(), 0);
    }
}
