//! Site graph: one site per frame at the centroid of its mosaic footprint,
//! linked to its Delaunay neighbors.

mod delaunay;


pub use delaunay::DelaunayTriangulator;

use glam::DVec2;

use crate::math::{BlendRect, MosaicRect};

/// Produces the neighbor graph of a point set.
///
/// Implementations return one list per input point, each sorted ascending,
/// never containing the point itself, and symmetric (`j` lists `i` whenever
/// `i` lists `j`).
pub trait Triangulator {
    fn neighbors(&self, points: &[DVec2]) -> Vec<Vec<usize>>;
}

/// One frame's seat in the ownership partition.
#[derive(Debug, Clone)]
pub struct Site {
    /// Index of the frame this site stands for.
    pub frame: usize,
    /// Centroid of the frame's projected footprint, in mosaic pixels.
    pub center: DVec2,
    /// Footprint bounding rectangle, in mosaic pixels.
    pub brect: BlendRect,
    /// `brect` shrunk to the Voronoi cell plus overlap.
    pub vcrect: BlendRect,
    /// Sorted neighbor site indices.
    pub neighbors: Vec<usize>,
}

impl Site {
    pub fn new(frame: usize, center: DVec2, brect: BlendRect) -> Self {
        Self {
            frame,
            center,
            brect,
            vcrect: brect,
            neighbors: Vec::new(),
        }
    }

    /// Cells of a pyramid level the site works on.
    ///
    /// The clipped rectangle is scaled to `level` (`width` x `height` being that
    /// level's size); the high edges are rounded when `round_high` is set and
    /// truncated otherwise. Sides the clip left on the footprint are grown by
    /// `border` and everything is clamped to the level's bordered extent.
    pub fn level_span(
        &self,
        level: usize,
        width: usize,
        height: usize,
        border: usize,
        round_high: bool,
    ) -> MosaicRect {
        let scale = (1u64 << level) as f64;
        let high_bias = if round_high { 0.5 } else { 0.0 };
        let border = border as i64;
        let (w, h) = (width as i64, height as i64);

        let low_edge = |clipped: f64, footprint: f64| {
            let v = (clipped / scale) as i64;
            if clipped == footprint {
                if v <= 0 {
                    -border
                } else {
                    v - border
                }
            } else {
                v.max(-border)
            }
        };
        let high_edge = |clipped: f64, footprint: f64, dim: i64| {
            let v = (clipped / scale + high_bias) as i64;
            if clipped == footprint {
                if v >= dim {
                    dim + border - 1
                } else {
                    v + border
                }
            } else {
                v.min(dim + border - 1)
            }
        };

        MosaicRect::new(
            low_edge(self.vcrect.left, self.brect.left),
            low_edge(self.vcrect.top, self.brect.top),
            high_edge(self.vcrect.right, self.brect.right, w),
            high_edge(self.vcrect.bottom, self.brect.bottom, h),
        )
    }
}

/// Link every site to its neighbors using `triangulator`.
pub fn link_neighbors(sites: &mut [Site], triangulator: &dyn Triangulator) {
    let centers: Vec<DVec2> = sites.iter().map(|s| s.center).collect();
    let neighbors = triangulator.neighbors(&centers);
    debug_assert_eq!(neighbors.len(), sites.len());
    for (site, mut list) in sites.iter_mut().zip(neighbors) {
        list.sort_unstable();
        list.dedup();
        site.neighbors = list;
    }
}
