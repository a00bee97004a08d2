//! Blending pipeline: lays out the mosaic, partitions it between frames and
//! merges their Laplacian pyramids.
//!
//! A run goes through these stages:
//! 1. Validate the frames and prepare their transforms for the blend type.
//! 2. Derive the output projection and place every frame's footprint.
//! 3. Link one site per frame to its Delaunay neighbors and clip each site's
//!    region to its Voronoi cell plus overlap.
//! 4. Build the ownership mask.
//! 5. Composite every frame's Laplacian pyramid into the mosaic pyramid.
//! 6. Collapse, store to 8 bits and crop.

mod composite;

#[cfg(test)]
mod tests;

use std::time::Instant;

use common::Buffer2;
use glam::DVec2;
use rayon::prelude::*;

use crate::config::{Background, BlendConfig};
use crate::crop::{find_crop, MosaicPlanes};
use crate::error::Error;
use crate::frame::{prepare_transforms, validate_frames, Frame};
use crate::image::MosaicImage;
use crate::mapping::{frame_corners, frame_to_mosaic_rect, quad_area, quad_centroid, Projection};
use crate::mask::OwnershipMask;
use crate::math::{BlendRect, DMat3, MosaicRect};
use crate::progress::{CancelFlag, Progress, COMPOSITE_SHARE};
use crate::pyramid::{from_fixed, Level};
use crate::region::clip_region;
use crate::sites::{link_neighbors, DelaunayTriangulator, Site, Triangulator};

use composite::{Compositor, PlanePyramids};

/// Projected quads smaller than this are collapsed.
const MIN_FOOTPRINT_AREA: f64 = 1e-9;

/// Mosaic dimensions are rounded up to a multiple of this.
const MOSAIC_ALIGNMENT: usize = 4;

/// Where every frame lands in the mosaic.
#[derive(Debug, Clone)]
pub struct MosaicLayout {
    pub projection: Projection,
    /// World position of mosaic pixel `(0, 0)`.
    pub origin: DVec2,
    pub width: usize,
    pub height: usize,
    /// One site per frame, in mosaic pixels.
    pub sites: Vec<Site>,
}

/// Blends a set of aligned frames into one mosaic.
///
/// # Example
///
/// ```rust,ignore
/// let blender = Blender::new(BlendConfig::default().with_depth(4, 2));
/// let image = blender.run(&frames, &CancelFlag::new(), &Progress::new())?;
/// ```
pub struct Blender {
    config: BlendConfig,
    triangulator: Box<dyn Triangulator + Send + Sync>,
}

impl std::fmt::Debug for Blender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blender")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Blender {
    /// # Panics
    /// Panics if `config` fails [`BlendConfig::validate`].
    pub fn new(config: BlendConfig) -> Self {
        config.validate();
        Self {
            config,
            triangulator: Box::new(DelaunayTriangulator),
        }
    }

    /// Replace the neighbor graph builder.
    pub fn with_triangulator(mut self, triangulator: impl Triangulator + Send + Sync + 'static) -> Self {
        self.triangulator = Box::new(triangulator);
        self
    }

    pub fn config(&self) -> &BlendConfig {
        &self.config
    }

    /// Place the frames and build the site graph without blending.
    pub fn layout(&self, frames: &[Frame]) -> Result<MosaicLayout, Error> {
        validate_frames(frames)?;
        let transforms = prepare_transforms(frames, &self.config)?;
        self.layout_prepared(frames, &transforms)
    }

    fn layout_prepared(&self, frames: &[Frame], transforms: &[DMat3]) -> Result<MosaicLayout, Error> {
        let config = &self.config;
        let (frame_width, frame_height) = (frames[0].width(), frames[0].height());
        let projection = Projection::derive(
            transforms,
            frame_width,
            frame_height,
            config.blend_type,
            config.full_circle,
        )?;

        let mut footprints = Vec::with_capacity(frames.len());
        let mut global = BlendRect::EMPTY;
        for (index, transform) in transforms.iter().enumerate() {
            let brect = frame_to_mosaic_rect(&projection, frame_width, frame_height, transform);
            let corners = frame_corners(&projection, frame_width, frame_height, transform)
                .ok_or(Error::DegenerateTransform { index })?;
            if brect.is_empty()
                || (frame_width > 1 && frame_height > 1 && quad_area(corners) < MIN_FOOTPRINT_AREA)
            {
                return Err(Error::DegenerateTransform { index });
            }
            global.include_rect(&brect);
            footprints.push((quad_centroid(corners), brect));
        }

        let bounds = global.enclosing();
        let width = bounds.width().next_multiple_of(MOSAIC_ALIGNMENT);
        let height = bounds.height().next_multiple_of(MOSAIC_ALIGNMENT);
        if width < frame_width || height < frame_height {
            return Err(Error::InconsistentGeometry {
                mosaic_width: width,
                mosaic_height: height,
                frame_width,
                frame_height,
            });
        }
        let origin = DVec2::new(bounds.left as f64, bounds.top as f64);

        let mut sites: Vec<Site> = footprints
            .into_iter()
            .enumerate()
            .map(|(index, (center, brect))| {
                Site::new(index, center - origin, brect.translated(-origin))
            })
            .collect();
        link_neighbors(&mut sites, self.triangulator.as_ref());
        let centers: Vec<DVec2> = sites.iter().map(|s| s.center).collect();
        for site in sites.iter_mut() {
            let neighbors = site.neighbors.iter().map(|&n| centers[n]);
            site.vcrect = clip_region(site.center, &site.brect, neighbors, config.overlap);
        }

        tracing::info!(
            width,
            height,
            origin_x = origin.x,
            origin_y = origin.y,
            curved = !projection.is_planar(),
            "Mosaic layout"
        );

        Ok(MosaicLayout {
            projection,
            origin,
            width,
            height,
            sites,
        })
    }

    /// Blend `frames` into a mosaic.
    ///
    /// `cancel` is polled once per site in the mask and compositing passes;
    /// `progress` is reset on entry and reaches 1.0 only on success.
    pub fn run(
        &self,
        frames: &[Frame],
        cancel: &CancelFlag,
        progress: &Progress,
    ) -> Result<MosaicImage, Error> {
        let start = Instant::now();
        progress.reset();
        let result = self.run_inner(frames, cancel, progress);
        match &result {
            Ok(image) => tracing::info!(
                width = image.width,
                height = image.height,
                "Blending took {:.2}ms",
                start.elapsed().as_secs_f64() * 1000.0
            ),
            Err(Error::Cancelled) => tracing::info!("Blending cancelled"),
            Err(e) => tracing::warn!(error = %e, "Blending failed"),
        }
        result
    }

    fn run_inner(
        &self,
        frames: &[Frame],
        cancel: &CancelFlag,
        progress: &Progress,
    ) -> Result<MosaicImage, Error> {
        let config = &self.config;
        validate_frames(frames)?;
        tracing::info!(
            frames = frames.len(),
            blend_type = ?config.blend_type,
            luma_depth = config.effective_luma_depth(),
            chroma_depth = config.effective_chroma_depth(),
            "Blending frames"
        );

        let transforms = prepare_transforms(frames, config)?;
        let layout = self.layout_prepared(frames, &transforms)?;
        let inverses = transforms
            .iter()
            .enumerate()
            .map(|(index, t)| t.inverse().ok_or(Error::DegenerateTransform { index }))
            .collect::<Result<Vec<_>, _>>()?;

        let mut mask = OwnershipMask::new(layout.width, layout.height)?;
        for index in 0..layout.sites.len() {
            check_cancelled(cancel)?;
            mask.claim(&layout.sites, index, config.border);
        }

        let (frame_width, frame_height) = (frames[0].width(), frames[0].height());
        let mut mosaic = PlanePyramids::allocate(config, layout.width, layout.height)?;
        let mut source = PlanePyramids::allocate(config, frame_width, frame_height)?;
        let compositor = Compositor {
            projection: &layout.projection,
            origin: layout.origin,
            frame_width,
            frame_height,
            border: config.border,
        };
        let count = layout.sites.len();
        for (index, site) in layout.sites.iter().enumerate() {
            check_cancelled(cancel)?;
            source.load_laplacian(&frames[site.frame]);
            compositor.composite(
                site,
                index,
                &inverses[site.frame],
                &source,
                &mut mosaic,
                &mut mask,
            );
            progress.advance_to(COMPOSITE_SHARE * (index + 1) as f32 / count as f32);
        }
        drop(source);

        mosaic.collapse();
        let planes = store_planes(&mosaic, &mask, &config.background)?;
        progress.advance_to(1.0);

        let crop = find_crop(&planes, &config.background, frame_width, frame_height);
        let full = MosaicRect::of_size(layout.width, layout.height);
        let stored = if config.blend_type.repacks_output() {
            crop
        } else {
            full
        };
        Ok(MosaicImage {
            width: stored.width(),
            height: stored.height(),
            data: planes.pack_yvu(&stored),
            crop,
            full_width: layout.width,
            full_height: layout.height,
        })
    }
}

/// Blend `frames` with `config`, without cancellation or progress reporting.
pub fn blend(frames: &[Frame], config: &BlendConfig) -> Result<MosaicImage, Error> {
    Blender::new(config.clone()).run(frames, &CancelFlag::new(), &Progress::new())
}

#[inline]
fn check_cancelled(cancel: &CancelFlag) -> Result<(), Error> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

/// Convert the collapsed base levels to 8 bits, painting unclaimed pixels with `background`.
fn store_planes(
    mosaic: &PlanePyramids,
    mask: &OwnershipMask,
    background: &Background,
) -> Result<MosaicPlanes, Error> {
    let (width, height) = (mask.width(), mask.height());
    let store = |level: &Level, fill: u8| -> Result<Buffer2<u8>, Error> {
        let mut plane = Buffer2::try_new_filled(width, height, fill).map_err(|_| {
            Error::OutOfMemory {
                what: "mosaic plane",
                bytes: width.saturating_mul(height),
            }
        })?;
        plane
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, dst) in row.iter_mut().enumerate() {
                    if mask.is_claimed(x, y) {
                        *dst = from_fixed(level.get(x as i64, y as i64));
                    }
                }
            });
        Ok(plane)
    };
    Ok(MosaicPlanes {
        y: store(mosaic.y.level(0), background.y)?,
        u: store(mosaic.u.level(0), background.u)?,
        v: store(mosaic.v.level(0), background.v)?,
    })
}
