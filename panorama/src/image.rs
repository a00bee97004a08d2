//! The finished mosaic handed back to callers.

use crate::math::MosaicRect;

/// Blended output: three 8-bit planes packed Y, then V, then U.
///
/// For repacking blend types `data` holds only the crop rectangle and
/// `width` x `height` are its size; otherwise it holds the full mosaic and
/// `crop` just reports where the content is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
    /// Content rectangle in full-mosaic pixels.
    pub crop: MosaicRect,
    /// Size of the mosaic before any repacking.
    pub full_width: usize,
    pub full_height: usize,
}

impl MosaicImage {
    #[inline]
    fn plane_len(&self) -> usize {
        self.width * self.height
    }

    pub fn y_plane(&self) -> &[u8] {
        &self.data[..self.plane_len()]
    }

    pub fn v_plane(&self) -> &[u8] {
        let n = self.plane_len();
        &self.data[n..2 * n]
    }

    pub fn u_plane(&self) -> &[u8] {
        let n = self.plane_len();
        &self.data[2 * n..3 * n]
    }

    /// Whether `data` was cut down to the crop rectangle.
    pub fn is_repacked(&self) -> bool {
        self.width != self.full_width || self.height != self.full_height
    }

    /// Luma sample at `(x, y)` of the stored image.
    #[inline]
    pub fn luma(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
}
