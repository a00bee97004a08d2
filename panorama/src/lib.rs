//! Panorama - multi-resolution blending of aligned frames.
//!
//! Takes a set of same-sized YUV frames, each with a 3x3 transform into a
//! shared mosaic, and merges them with Laplacian pyramid blending so the
//! seams between frames disappear:
//! - Every frame gets a site at the centroid of its projected footprint.
//! - Sites are linked to their Delaunay neighbors and their regions clipped to
//!   the Voronoi cell plus a small overlap.
//! - An ownership mask assigns every mosaic pixel to one frame.
//! - Each frame's Laplacian pyramid is copied into a shared mosaic pyramid
//!   under the mask, which is then collapsed, stored and cropped.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use panorama::prelude::*;
//!
//! let config = BlendConfig::default().with_blend_type(BlendType::Full);
//! let image = blend(&frames, &config)?;
//! println!("{}x{} mosaic", image.width, image.height);
//! ```

mod blend;
mod config;
mod crop;
mod error;
mod frame;
mod image;
pub mod mapping;
pub mod mask;
pub mod math;
mod progress;
pub mod pyramid;
pub mod region;
pub mod sites;

#[cfg(test)]
pub mod testing;

pub mod prelude;

// ============================================================================
// Blending
// ============================================================================

pub use blend::{blend, Blender, MosaicLayout};
pub use image::MosaicImage;
pub use progress::{CancelFlag, Progress};

// ============================================================================
// Inputs and configuration
// ============================================================================

pub use config::{
    Background, BlendConfig, BlendType, DEFAULT_BORDER, DEFAULT_OVERLAP, DEFAULT_PYRAMID_DEPTH,
};
pub use frame::{align_to_middle_frame, balance_rotations, Frame, FrameError};

// ============================================================================
// Errors and cropping
// ============================================================================

pub use crop::{find_crop, MosaicPlanes};
pub use error::{BlendStatus, Error};
