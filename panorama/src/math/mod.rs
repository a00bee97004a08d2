//! Geometry primitives shared by the blending stages.

mod dmat3;
mod rect;

pub use dmat3::{DMat3, MIN_HOMOGENEOUS_W};
pub use rect::{BlendRect, MosaicRect};
