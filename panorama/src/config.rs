//! Blending configuration.

use serde::{Deserialize, Serialize};

/// Default number of pyramid levels for luma and chroma.
pub const DEFAULT_PYRAMID_DEPTH: usize = 6;
/// Default replicated border around every pyramid level, in samples.
pub const DEFAULT_BORDER: usize = 8;
/// Default widening of each region past the bisector, in mosaic pixels.
pub const DEFAULT_OVERLAP: f64 = 1.5;

/// How the frame set is composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendType {
    /// Single-level compositing: every pixel comes from its owning frame.
    None,
    /// Planar multi-resolution blending.
    #[default]
    Full,
    /// Planar blending after balancing the in-plane rotation of the set.
    Pan,
    /// Curved sweep blending, cropped and repacked.
    CylindricalPan,
    /// Curved strip blending, cropped and repacked.
    HorizontalStrip,
}

impl BlendType {
    /// Whether the mosaic is warped onto a derived curved surface.
    pub fn is_curved(self) -> bool {
        matches!(self, BlendType::CylindricalPan | BlendType::HorizontalStrip)
    }

    /// Whether the final buffer is repacked to the crop rectangle.
    pub fn repacks_output(self) -> bool {
        self.is_curved()
    }
}

/// Colour written to mosaic pixels no frame claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
    pub y: u8,
    pub u: u8,
    pub v: u8,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            y: 96,
            u: 128,
            v: 128,
        }
    }
}

/// Configuration for a blending run.
///
/// # Example
///
/// ```rust,ignore
/// let config = BlendConfig::default()
///     .with_blend_type(BlendType::Pan)
///     .with_depth(4, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendConfig {
    pub blend_type: BlendType,
    /// Pyramid levels for luma. At least 1.
    pub luma_depth: usize,
    /// Pyramid levels for chroma. Clamped to `luma_depth`.
    pub chroma_depth: usize,
    /// Replicated border around each pyramid level.
    pub border: usize,
    /// Distance each region is widened past the bisector with a neighbor.
    pub overlap: f64,
    pub background: Background,
    /// Curved warp parameters assume the sweep closes a full circle.
    pub full_circle: bool,
    /// Re-reference all transforms to the middle frame before blending.
    pub align_to_middle: bool,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            blend_type: BlendType::default(),
            luma_depth: DEFAULT_PYRAMID_DEPTH,
            chroma_depth: DEFAULT_PYRAMID_DEPTH,
            border: DEFAULT_BORDER,
            overlap: DEFAULT_OVERLAP,
            background: Background::default(),
            full_circle: true,
            align_to_middle: false,
        }
    }
}

impl BlendConfig {
    pub fn with_blend_type(mut self, blend_type: BlendType) -> Self {
        self.blend_type = blend_type;
        self
    }

    /// Set luma and chroma pyramid depth. Chroma is clamped to luma.
    pub fn with_depth(mut self, luma: usize, chroma: usize) -> Self {
        self.luma_depth = luma;
        self.chroma_depth = chroma.min(luma);
        self
    }

    pub fn with_border(mut self, border: usize) -> Self {
        self.border = border;
        self
    }

    pub fn with_overlap(mut self, overlap: f64) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn with_full_circle(mut self, full_circle: bool) -> Self {
        self.full_circle = full_circle;
        self
    }

    pub fn with_align_to_middle(mut self, align: bool) -> Self {
        self.align_to_middle = align;
        self
    }

    /// Number of luma levels actually built. `BlendType::None` composites at a single level.
    pub fn effective_luma_depth(&self) -> usize {
        match self.blend_type {
            BlendType::None => 1,
            _ => self.luma_depth,
        }
    }

    /// Number of chroma levels actually built, at least one.
    pub fn effective_chroma_depth(&self) -> usize {
        self.chroma_depth.clamp(1, self.effective_luma_depth())
    }

    /// Validate configuration parameters.
    pub fn validate(&self) {
        assert!(
            self.luma_depth >= 1,
            "luma_depth must be at least 1, got {}",
            self.luma_depth
        );
        assert!(
            self.chroma_depth <= self.luma_depth,
            "chroma_depth ({}) must not exceed luma_depth ({})",
            self.chroma_depth,
            self.luma_depth
        );
        assert!(
            self.luma_depth <= 16,
            "luma_depth must be at most 16, got {}",
            self.luma_depth
        );
        assert!(
            self.border >= 2,
            "border must be at least 2 for the 5-tap kernel, got {}",
            self.border
        );
        assert!(
            self.overlap.is_finite() && self.overlap >= 0.0,
            "overlap must be finite and non-negative, got {}",
            self.overlap
        );
    }
}
