//! Per-pixel ownership of the mosaic.

use common::Buffer2;
use glam::DVec2;

use crate::error::Error;
use crate::math::MosaicRect;
use crate::sites::Site;

/// Mask value of a pixel no site owns.
pub const UNASSIGNED: u8 = 255;

/// Most sites a mask can tell apart; `UNASSIGNED` is reserved.
pub const MAX_SITES: usize = UNASSIGNED as usize;

/// Which site owns each mosaic pixel.
#[derive(Debug, Clone)]
pub struct OwnershipMask {
    cells: Buffer2<u8>,
}

impl OwnershipMask {
    /// Mask with every pixel unassigned.
    pub fn new(width: usize, height: usize) -> Result<Self, Error> {
        let cells = Buffer2::try_new_filled(width, height, UNASSIGNED).map_err(|_| {
            Error::OutOfMemory {
                what: "ownership mask",
                bytes: width.saturating_mul(height),
            }
        })?;
        Ok(Self { cells })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.cells.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.cells.height()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[(x, y)]
    }

    /// Owner at signed coordinates, `None` outside the mosaic.
    #[inline]
    pub fn try_get(&self, x: i64, y: i64) -> Option<u8> {
        self.cells.try_get(x as isize, y as isize).copied()
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, owner: u8) {
        self.cells[(x, y)] = owner;
    }

    #[inline]
    pub fn is_claimed(&self, x: usize, y: usize) -> bool {
        self.get(x, y) != UNASSIGNED
    }

    pub fn cells(&self) -> &Buffer2<u8> {
        &self.cells
    }

    /// Claim the pixels of `sites[site]` that no neighbor is closer to.
    ///
    /// Ties go to the lowest site index: a site yields to an equidistant
    /// neighbor with a smaller index, and only unassigned cells are written,
    /// so no pixel is ever claimed twice. Returns the number of pixels claimed.
    pub fn claim(&mut self, sites: &[Site], site: usize, border: usize) -> usize {
        let owner = &sites[site];
        let (width, height) = (self.width(), self.height());
        let span = owner
            .level_span(0, width, height, border, false)
            .intersect(&MosaicRect::of_size(width, height));
        if span.is_empty() {
            return 0;
        }

        let neighbor_centers: Vec<(usize, DVec2)> = owner
            .neighbors
            .iter()
            .map(|&n| (n, sites[n].center))
            .collect();

        let mut claimed = 0;
        for y in span.top..=span.bottom {
            for x in span.left..=span.right {
                let p = DVec2::new(x as f64, y as f64);
                let own = p.distance_squared(owner.center);
                let yields = neighbor_centers.iter().any(|&(n, c)| {
                    let d = p.distance_squared(c);
                    d < own || (d == own && n < site)
                });
                if yields {
                    continue;
                }
                let (x, y) = (x as usize, y as usize);
                if !self.is_claimed(x, y) {
                    self.set(x, y, site as u8);
                    claimed += 1;
                }
            }
        }

        tracing::debug!(site, claimed, neighbors = owner.neighbors.len(), "Site ownership");
        claimed
    }
}
