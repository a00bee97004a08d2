use std::collections::TryReserveError;
use std::ops::{Deref, DerefMut, Index, IndexMut};

/// Row-major 2-D grid of samples, indexed by `(x, y)`.
///
/// Derefs to the flat sample slice so whole-plane operations (iteration,
/// `chunks_mut`, rayon's `par_chunks_mut`) work on it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer2<T> {
    samples: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> Buffer2<T> {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.samples
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.width;
        &self.samples[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.width;
        &mut self.samples[start..start + self.width]
    }

    /// Sample at signed coordinates, `None` outside the grid.
    #[inline]
    pub fn try_get(&self, x: isize, y: isize) -> Option<&T> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (x < self.width && y < self.height).then(|| &self.samples[y * self.width + x])
    }
}

impl<T: Clone> Buffer2<T> {
    pub fn new_filled(width: usize, height: usize, value: T) -> Self {
        Self {
            samples: vec![value; width * height],
            width,
            height,
        }
    }

    /// Like [`new_filled`](Self::new_filled), but reports allocation failure
    /// instead of aborting.
    pub fn try_new_filled(width: usize, height: usize, value: T) -> Result<Self, TryReserveError> {
        let len = width.saturating_mul(height);
        let mut samples = Vec::new();
        samples.try_reserve_exact(len)?;
        samples.resize(len, value);
        Ok(Self {
            samples,
            width,
            height,
        })
    }

    #[inline]
    pub fn fill(&mut self, value: T) {
        self.samples.fill(value);
    }
}

impl<T> Index<(usize, usize)> for Buffer2<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        &self.samples[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Buffer2<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        &mut self.samples[y * self.width + x]
    }
}

impl<T> Deref for Buffer2<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        &self.samples
    }
}

impl<T> DerefMut for Buffer2<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.samples
    }
}
