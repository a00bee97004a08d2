//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use panorama::prelude::*;
//! ```

// Blending - main API
pub use crate::{blend, Blender, CancelFlag, MosaicImage, Progress};

// Inputs and configuration
pub use crate::{Background, BlendConfig, BlendType, Frame};

// Errors
pub use crate::{BlendStatus, Error};

// Geometry
pub use crate::math::DMat3;
pub use crate::sites::{DelaunayTriangulator, Triangulator};
