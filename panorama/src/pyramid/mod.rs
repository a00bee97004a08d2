//! Bordered multi-resolution image pyramids.
//!
//! Each level is a single-channel `i16` plane surrounded by `border` samples on
//! every side. Level 0 has the declared size, level k+1 is level k halved
//! rounding up. Samples are kept in 8x fixed point (`u8 << 3`) so the Laplacian
//! residuals and the collapse stay in integer arithmetic.
//!
//! - [`Pyramid::reduce`] builds the Gaussian stack with the separable 5-tap
//!   `[1 4 6 4 1] / 16` kernel.
//! - [`Pyramid::expand`] upsamples a level with `[1 6 1] / 8` at even and
//!   `[4 4] / 8` at odd positions, then subtracts (Laplacian) or adds (collapse).
//!
//! Building the Laplacian and collapsing it reproduces level 0 exactly because
//! both directions use the same integer expand over the full bordered extent.


use common::Buffer2;
use rayon::prelude::*;

use crate::error::Error;

/// Fixed-point shift applied to 8-bit samples.
pub const FIXED_POINT_SHIFT: u32 = 3;

const REDUCE_TAPS: [i32; 5] = [1, 4, 6, 4, 1];

/// Which sides of a level get their border replicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edges {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Edges {
    pub const ALL: Edges = Edges {
        top: true,
        bottom: true,
        left: true,
        right: true,
    };
}

/// Whether [`Pyramid::expand`] builds residuals or collapses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandMode {
    /// Subtract the upsampled coarser level, finest level first.
    Subtract,
    /// Add the upsampled coarser level, coarsest level first.
    Add,
}

impl ExpandMode {
    #[inline]
    fn sign(self) -> i32 {
        match self {
            ExpandMode::Subtract => -1,
            ExpandMode::Add => 1,
        }
    }
}

/// Convert an 8-bit sample to pyramid fixed point.
#[inline]
pub fn to_fixed(v: u8) -> i16 {
    (v as i16) << FIXED_POINT_SHIFT
}

/// Convert a pyramid sample back to 8 bits, clamping.
#[inline]
pub fn from_fixed(v: i16) -> u8 {
    (v >> FIXED_POINT_SHIFT).clamp(0, 255) as u8
}

/// One bordered pyramid level.
#[derive(Debug, Clone)]
pub struct Level {
    plane: Buffer2<i16>,
    width: usize,
    height: usize,
    border: usize,
}

impl Level {
    fn allocate(width: usize, height: usize, border: usize) -> Result<Self, Error> {
        let padded_width = width + 2 * border;
        let padded_height = height + 2 * border;
        let plane = Buffer2::try_new_filled(padded_width, padded_height, 0i16).map_err(|_| {
            Error::OutOfMemory {
                what: "pyramid level",
                bytes: padded_width
                    .saturating_mul(padded_height)
                    .saturating_mul(std::mem::size_of::<i16>()),
            }
        })?;
        Ok(Self {
            plane,
            width,
            height,
            border,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn border(&self) -> usize {
        self.border
    }

    /// Lowest valid signed coordinate on either axis.
    #[inline]
    pub fn min_coord(&self) -> i64 {
        -(self.border as i64)
    }

    /// Highest valid signed column.
    #[inline]
    pub fn max_x(&self) -> i64 {
        (self.width + self.border) as i64 - 1
    }

    /// Highest valid signed row.
    #[inline]
    pub fn max_y(&self) -> i64 {
        (self.height + self.border) as i64 - 1
    }

    /// Whether `(x, y)` lies inside the allocated (bordered) extent.
    #[inline]
    pub fn in_extent(&self, x: i64, y: i64) -> bool {
        x >= self.min_coord() && x <= self.max_x() && y >= self.min_coord() && y <= self.max_y()
    }

    #[inline]
    fn offset(&self, x: i64, y: i64) -> (usize, usize) {
        debug_assert!(self.in_extent(x, y), "({x}, {y}) outside level extent");
        let b = self.border as i64;
        ((x + b) as usize, (y + b) as usize)
    }

    /// Sample at signed level coordinates; `(0, 0)` is the first interior sample.
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> i16 {
        self.plane[self.offset(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: i64, y: i64, value: i16) {
        let idx = self.offset(x, y);
        self.plane[idx] = value;
    }

    /// Sample with coordinates clamped into the allocated extent.
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> i16 {
        self.get(
            x.clamp(self.min_coord(), self.max_x()),
            y.clamp(self.min_coord(), self.max_y()),
        )
    }

    /// Padded row including the border.
    #[inline]
    pub fn padded_row(&self, y: i64) -> &[i16] {
        self.plane.row((y + self.border as i64) as usize)
    }

    /// Padded rows `top..=bottom` paired with their signed row index, for parallel writes.
    pub fn par_rows_mut(
        &mut self,
        top: i64,
        bottom: i64,
    ) -> impl IndexedParallelIterator<Item = (i64, &mut [i16])> + '_ {
        debug_assert!(self.in_extent(0, top) && self.in_extent(0, bottom));
        let b = self.border as i64;
        let stride = self.plane.width();
        self.plane
            .par_chunks_mut(stride)
            .enumerate()
            .skip((top + b) as usize)
            .take((bottom - top + 1).max(0) as usize)
            .map(move |(padded_y, row)| (padded_y as i64 - b, row))
    }

    /// Replicate the outermost interior samples into the border on the requested sides.
    pub fn spread_border(&mut self, edges: Edges) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let b = self.border;
        let w = self.width;
        let h = self.height;

        if edges.left || edges.right {
            for y in b..b + h {
                let row = self.plane.row_mut(y);
                if edges.left {
                    let v = row[b];
                    row[..b].fill(v);
                }
                if edges.right {
                    let v = row[b + w - 1];
                    row[b + w..].fill(v);
                }
            }
        }

        let stride = self.plane.width();
        let pixels = self.plane.pixels_mut();
        if edges.top {
            for y in 0..b {
                pixels.copy_within(b * stride..(b + 1) * stride, y * stride);
            }
        }
        if edges.bottom {
            let last = b + h - 1;
            for y in b + h..h + 2 * b {
                pixels.copy_within(last * stride..(last + 1) * stride, y * stride);
            }
        }
    }
}

/// Owned multi-level bordered pyramid.
#[derive(Debug, Clone)]
pub struct Pyramid {
    levels: Vec<Level>,
}

impl Pyramid {
    /// Allocate `levels` zeroed levels for a `width` x `height` base.
    pub fn allocate(
        levels: usize,
        width: usize,
        height: usize,
        border: usize,
    ) -> Result<Self, Error> {
        assert!(levels >= 1, "pyramid needs at least one level");
        let mut out = Vec::new();
        out.try_reserve_exact(levels)
            .map_err(|_| Error::OutOfMemory {
                what: "pyramid level table",
                bytes: levels.saturating_mul(std::mem::size_of::<Level>()),
            })?;
        let (mut w, mut h) = (width, height);
        for _ in 0..levels {
            out.push(Level::allocate(w, h, border)?);
            w = w.div_ceil(2);
            h = h.div_ceil(2);
        }
        Ok(Self { levels: out })
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn level(&self, k: usize) -> &Level {
        &self.levels[k]
    }

    #[inline]
    pub fn level_mut(&mut self, k: usize) -> &mut Level {
        &mut self.levels[k]
    }

    /// Fill level 0 from an 8-bit plane in fixed point and spread its border.
    pub fn load_plane(&mut self, plane: &[u8]) {
        let base = &mut self.levels[0];
        assert_eq!(
            plane.len(),
            base.width * base.height,
            "plane length must equal pyramid base width * height"
        );
        let b = base.border;
        let w = base.width;
        if w > 0 {
            for (y, src) in plane.chunks_exact(w).enumerate() {
                let row = base.plane.row_mut(y + b);
                for (dst, &v) in row[b..b + w].iter_mut().zip(src) {
                    *dst = to_fixed(v);
                }
            }
        }
        base.spread_border(Edges::ALL);
    }

    /// Populate every level below 0 with the low-passed, subsampled level above it.
    pub fn reduce(&mut self) {
        for k in 1..self.levels.len() {
            let (fine, coarse) = self.levels.split_at_mut(k);
            reduce_level(&fine[k - 1], &mut coarse[0]);
            coarse[0].spread_border(Edges::ALL);
        }
    }

    /// Expand every coarser level into the next finer one.
    ///
    /// `Subtract` walks finest first so each level subtracts the still-Gaussian
    /// level below it; `Add` walks coarsest first so each level adds the already
    /// collapsed level below it.
    pub fn expand(&mut self, mode: ExpandMode) {
        let depth = self.levels.len();
        if depth < 2 {
            return;
        }
        let apply = |levels: &mut [Level], k: usize| {
            let (fine, coarse) = levels.split_at_mut(k + 1);
            expand_level(&coarse[0], &mut fine[k], mode.sign());
        };
        match mode {
            ExpandMode::Subtract => (0..depth - 1).for_each(|k| apply(&mut self.levels, k)),
            ExpandMode::Add => (0..depth - 1).rev().for_each(|k| apply(&mut self.levels, k)),
        }
    }

    /// Turn a loaded base level into a Laplacian pyramid.
    pub fn laplacian(&mut self) {
        self.reduce();
        self.expand(ExpandMode::Subtract);
    }

    /// Collapse a Laplacian pyramid back into level 0.
    pub fn collapse(&mut self) {
        self.expand(ExpandMode::Add);
    }
}

fn reduce_level(fine: &Level, coarse: &mut Level) {
    let cb = coarse.border;
    let cw = coarse.width;
    let ch = coarse.height;
    if cw == 0 || ch == 0 {
        return;
    }
    let stride = coarse.plane.width();

    coarse
        .plane
        .par_chunks_mut(stride)
        .enumerate()
        .skip(cb)
        .take(ch)
        .for_each(|(padded_y, row)| {
            let y = (padded_y - cb) as i64;
            let mut acc = vec![0i32; cw];
            for (dy, &wy) in REDUCE_TAPS.iter().enumerate() {
                let fy = (2 * y + dy as i64 - 2).clamp(fine.min_coord(), fine.max_y());
                let src = fine.padded_row(fy);
                for (x, a) in acc.iter_mut().enumerate() {
                    let mut h = 0i32;
                    for (dx, &wx) in REDUCE_TAPS.iter().enumerate() {
                        let fx = (2 * x as i64 + dx as i64 - 2).clamp(fine.min_coord(), fine.max_x());
                        h += wx * src[(fx + fine.border as i64) as usize] as i32;
                    }
                    *a += wy * h;
                }
            }
            for (dst, a) in row[cb..cb + cw].iter_mut().zip(acc) {
                *dst = ((a + 128) >> 8) as i16;
            }
        });
}

/// Coarse taps and weights (summing to 8) that upsample fine position `x`.
#[inline]
fn expand_taps(x: i64) -> [(i64, i32); 3] {
    let c = x.div_euclid(2);
    if x.rem_euclid(2) == 0 {
        [(c - 1, 1), (c, 6), (c + 1, 1)]
    } else {
        [(c, 4), (c + 1, 4), (c + 1, 0)]
    }
}

fn expand_level(coarse: &Level, fine: &mut Level, sign: i32) {
    let fb = fine.border as i64;
    let stride = fine.plane.width();
    let coarse_stride = coarse.plane.width();
    let cb = coarse.border as i64;
    let (cmin, cmax_x, cmax_y) = (coarse.min_coord(), coarse.max_x(), coarse.max_y());

    fine.plane
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(padded_y, row)| {
            let y = padded_y as i64 - fb;
            let mut vertical = vec![0i32; coarse_stride];
            for (cy, wy) in expand_taps(y) {
                if wy == 0 {
                    continue;
                }
                let src = coarse.padded_row(cy.clamp(cmin, cmax_y));
                for (v, &s) in vertical.iter_mut().zip(src) {
                    *v += wy * s as i32;
                }
            }
            for (padded_x, dst) in row.iter_mut().enumerate() {
                let x = padded_x as i64 - fb;
                let mut sum = 0i32;
                for (cx, wx) in expand_taps(x) {
                    sum += wx * vertical[(cx.clamp(cmin, cmax_x) + cb) as usize];
                }
                let up = (sum + 32) >> 6;
                let value = *dst as i32 + sign * up;
                *dst = value.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
            }
        });
}
