//! Copies each frame's Laplacian coefficients into the mosaic pyramid where
//! the ownership mask gives that frame the pixel.

use glam::DVec2;
use rayon::prelude::*;

use crate::config::BlendConfig;
use crate::error::Error;
use crate::frame::Frame;
use crate::mapping::Projection;
use crate::mask::{OwnershipMask, UNASSIGNED};
use crate::math::{DMat3, MosaicRect};
use crate::pyramid::{Level, Pyramid};
use crate::sites::Site;

/// Luma and chroma pyramids of one image. Chroma may be shallower than luma.
#[derive(Debug)]
pub(crate) struct PlanePyramids {
    pub y: Pyramid,
    pub u: Pyramid,
    pub v: Pyramid,
}

impl PlanePyramids {
    pub fn allocate(config: &BlendConfig, width: usize, height: usize) -> Result<Self, Error> {
        let luma = config.effective_luma_depth();
        let chroma = config.effective_chroma_depth();
        Ok(Self {
            y: Pyramid::allocate(luma, width, height, config.border)?,
            u: Pyramid::allocate(chroma, width, height, config.border)?,
            v: Pyramid::allocate(chroma, width, height, config.border)?,
        })
    }

    /// Replace the contents with the Laplacian pyramids of `frame`.
    pub fn load_laplacian(&mut self, frame: &Frame) {
        for (pyramid, plane) in [
            (&mut self.y, frame.y()),
            (&mut self.u, frame.u()),
            (&mut self.v, frame.v()),
        ] {
            pyramid.load_plane(plane);
            pyramid.laplacian();
        }
    }

    pub fn collapse(&mut self) {
        self.y.collapse();
        self.u.collapse();
        self.v.collapse();
    }
}

/// What happens to one mosaic cell during a site's pass.
enum Visit {
    /// Another site owns the cell, or it maps nowhere outside the mosaic.
    Skip,
    /// The cell maps nowhere; release its mask entry.
    Release,
    /// Copy the frame coefficient at `at` (level coordinates).
    Sample { at: DVec2, release: bool },
}

/// Per-run state shared by every site's composite pass.
pub(crate) struct Compositor<'a> {
    pub projection: &'a Projection,
    /// World position of mosaic pixel `(0, 0)`.
    pub origin: DVec2,
    pub frame_width: usize,
    pub frame_height: usize,
    pub border: usize,
}

struct LevelPass<'a> {
    level: usize,
    owner: u8,
    inverse: &'a DMat3,
    mask: &'a OwnershipMask,
    columns: (i64, i64),
}

impl Compositor<'_> {
    /// Write `source`'s coefficients for `sites[index]` into `target` at every level.
    ///
    /// Cells owned by another site are left alone. Cells whose mosaic position
    /// falls outside the frame are still sampled (edge-clamped) so the pyramid
    /// stays smooth, but their mask entry is released so the final store paints
    /// them as background unless a later site claims them. Returns the number
    /// of cells written across all levels.
    pub fn composite(
        &self,
        site: &Site,
        index: usize,
        inverse: &DMat3,
        source: &PlanePyramids,
        target: &mut PlanePyramids,
        mask: &mut OwnershipMask,
    ) -> usize {
        let owner = index as u8;
        let chroma_depth = target.u.depth().min(source.u.depth());
        let mut written = 0;

        for k in 0..target.y.depth() {
            let (width, height, extent) = {
                let level = target.y.level(k);
                let extent = MosaicRect::new(
                    level.min_coord(),
                    level.min_coord(),
                    level.max_x(),
                    level.max_y(),
                );
                (level.width(), level.height(), extent)
            };
            let span = site
                .level_span(k, width, height, self.border, true)
                .intersect(&extent);
            if span.is_empty() {
                continue;
            }

            let pass = LevelPass {
                level: k,
                owner,
                inverse,
                mask: &*mask,
                columns: (span.left, span.right),
            };

            let rows: Vec<(usize, Vec<(usize, usize)>)> = if k < chroma_depth {
                let (sy, su, sv) = (source.y.level(k), source.u.level(k), source.v.level(k));
                let ty = target.y.level_mut(k).par_rows_mut(span.top, span.bottom);
                let tu = target.u.level_mut(k).par_rows_mut(span.top, span.bottom);
                let tv = target.v.level_mut(k).par_rows_mut(span.top, span.bottom);
                ty.zip(tu)
                    .zip(tv)
                    .map(|(((j, y_row), (_, u_row)), (_, v_row))| {
                        self.composite_row(&pass, j, &mut [(y_row, sy), (u_row, su), (v_row, sv)])
                    })
                    .collect()
            } else {
                let sy = source.y.level(k);
                target
                    .y
                    .level_mut(k)
                    .par_rows_mut(span.top, span.bottom)
                    .map(|(j, y_row)| self.composite_row(&pass, j, &mut [(y_row, sy)]))
                    .collect()
            };

            for (count, released) in rows {
                written += count;
                for (x, y) in released {
                    mask.set(x, y, UNASSIGNED);
                }
            }
        }

        tracing::debug!(site = index, written, "Composited site");
        written
    }

    /// Fill row `j` of the current level. Returns the cells written and the
    /// mask entries to release.
    fn composite_row(
        &self,
        pass: &LevelPass<'_>,
        j: i64,
        planes: &mut [(&mut [i16], &Level)],
    ) -> (usize, Vec<(usize, usize)>) {
        let mut written = 0;
        let mut released = Vec::new();
        for i in pass.columns.0..=pass.columns.1 {
            let (ii, jj) = (i << pass.level, j << pass.level);
            match self.visit(pass, ii, jj) {
                Visit::Skip => {}
                Visit::Release => released.push((ii as usize, jj as usize)),
                Visit::Sample { at, release } => {
                    for (row, level) in planes.iter_mut() {
                        row[(i + level.border() as i64) as usize] = sample(level, at);
                    }
                    written += 1;
                    if release {
                        released.push((ii as usize, jj as usize));
                    }
                }
            }
        }
        (written, released)
    }

    fn visit(&self, pass: &LevelPass<'_>, ii: i64, jj: i64) -> Visit {
        let cell = pass.mask.try_get(ii, jj);
        if matches!(cell, Some(o) if o != UNASSIGNED && o != pass.owner) {
            return Visit::Skip;
        }
        let in_mosaic = cell.is_some();

        let world = DVec2::new(ii as f64, jj as f64) + self.origin;
        let Some(f) = self.projection.mosaic_to_frame(pass.inverse, world) else {
            return if in_mosaic {
                Visit::Release
            } else {
                Visit::Skip
            };
        };

        let outside = f.x < 0.0
            || f.y < 0.0
            || f.x > (self.frame_width - 1) as f64
            || f.y > (self.frame_height - 1) as f64;
        let scale = 1.0 / (1u64 << pass.level) as f64;
        Visit::Sample {
            at: f * scale,
            release: outside && in_mosaic,
        }
    }
}

/// Bilinear sample at level coordinates `p`, or the nearest edge-clamped
/// sample when the 2x2 footprint would leave the bordered extent.
fn sample(level: &Level, p: DVec2) -> i16 {
    let (fx, fy) = (p.x.floor(), p.y.floor());
    let (x, y) = (fx as i64, fy as i64);
    let b = level.border() as i64;
    let fits = |c: i64, n: usize| c > -b && c <= n as i64 + b - 3;

    if fits(x, level.width()) && fits(y, level.height()) {
        let (tx, ty) = (p.x - fx, p.y - fy);
        let at = |dx: i64, dy: i64| level.get(x + dx, y + dy) as f64;
        let top = at(0, 0) + (at(1, 0) - at(0, 0)) * tx;
        let bottom = at(0, 1) + (at(1, 1) - at(0, 1)) * tx;
        (top + (bottom - top) * ty).round() as i16
    } else {
        level.get_clamped(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_level() -> Pyramid {
        // 4x4 ramp: value = 10 * x + y, border 2.
        let plane: Vec<u8> = (0..4)
            .flat_map(|y| (0..4).map(move |x| (10 * x + y) as u8))
            .collect();
        let mut pyramid = Pyramid::allocate(1, 4, 4, 2).unwrap();
        pyramid.load_plane(&plane);
        pyramid
    }

    #[test]
    fn test_sample_is_exact_on_grid() {
        let pyramid = ramp_level();
        let level = pyramid.level(0);
        assert_eq!(sample(level, DVec2::new(2.0, 1.0)), level.get(2, 1));
        assert_eq!(sample(level, DVec2::new(0.0, 0.0)), 0);
    }

    #[test]
    fn test_sample_interpolates_between_samples() {
        let pyramid = ramp_level();
        let level = pyramid.level(0);
        // Halfway between x = 1 and x = 2 on row 0: (80 + 160) / 2 in fixed point.
        assert_eq!(sample(level, DVec2::new(1.5, 0.0)), 120);
        // Quarter way down from row 1 to row 2 at x = 1: 88 + 0.25 * 8.
        assert_eq!(sample(level, DVec2::new(1.0, 1.25)), 90);
    }

    #[test]
    fn test_sample_far_outside_clamps() {
        let pyramid = ramp_level();
        let level = pyramid.level(0);
        assert_eq!(sample(level, DVec2::new(-100.0, -100.0)), level.get(0, 0));
        assert_eq!(sample(level, DVec2::new(100.0, 2.0)), level.get(3, 2));
    }
}
