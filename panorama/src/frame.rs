//! Input frames and blend-type dependent transform preparation.

use thiserror::Error;

use crate::config::{BlendConfig, BlendType};
use crate::error::Error;
use crate::math::DMat3;

/// Reasons a frame is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("Frame has zero width or height")]
    Empty,

    #[error("{plane} plane has {actual} samples, expected {expected}")]
    PlaneSize {
        plane: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Frame is {actual:?}, the first frame is {expected:?}")]
    SizeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

/// One YUV frame and its placement in the mosaic.
///
/// Planes are full resolution, 8 bits per sample, row-major. `transform` maps
/// homogeneous frame pixel coordinates into mosaic coordinates.
#[derive(Debug, Clone)]
pub struct Frame {
    width: usize,
    height: usize,
    y: Vec<u8>,
    u: Vec<u8>,
    v: Vec<u8>,
    transform: DMat3,
}

impl Frame {
    pub fn new(
        width: usize,
        height: usize,
        y: Vec<u8>,
        u: Vec<u8>,
        v: Vec<u8>,
        transform: DMat3,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty);
        }
        let expected = width * height;
        for (plane, data) in [("Y", &y), ("U", &u), ("V", &v)] {
            if data.len() != expected {
                return Err(FrameError::PlaneSize {
                    plane,
                    expected,
                    actual: data.len(),
                });
            }
        }
        Ok(Self {
            width,
            height,
            y,
            u,
            v,
            transform,
        })
    }

    /// Frame with a single luma plane and neutral chroma.
    pub fn from_luma(
        width: usize,
        height: usize,
        y: Vec<u8>,
        transform: DMat3,
    ) -> Result<Self, FrameError> {
        let n = width * height;
        Self::new(width, height, y, vec![128; n], vec![128; n], transform)
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
    pub fn y(&self) -> &[u8] {
        &self.y
    }

    #[inline]
    pub fn u(&self) -> &[u8] {
        &self.u
    }

    #[inline]
    pub fn v(&self) -> &[u8] {
        &self.v
    }

    #[inline]
    pub fn transform(&self) -> &DMat3 {
        &self.transform
    }
}

/// Check the set is non-empty, fits the ownership mask and shares one frame size.
pub(crate) fn validate_frames(frames: &[Frame]) -> Result<(), Error> {
    let first = frames.first().ok_or(Error::NoFrames)?;
    if frames.len() > crate::mask::MAX_SITES {
        return Err(Error::TooManyFrames {
            count: frames.len(),
        });
    }
    let expected = (first.width, first.height);
    for (index, frame) in frames.iter().enumerate().skip(1) {
        let actual = (frame.width, frame.height);
        if actual != expected {
            return Err(Error::InvalidFrame {
                index,
                source: FrameError::SizeMismatch { expected, actual },
            });
        }
    }
    Ok(())
}

/// Transforms the run blends with, after blend-type dependent preprocessing.
///
/// Frames are never modified; the prepared copies are returned in frame order.
pub(crate) fn prepare_transforms(
    frames: &[Frame],
    config: &BlendConfig,
) -> Result<Vec<DMat3>, Error> {
    let mut transforms: Vec<DMat3> = frames.iter().map(|f| f.transform).collect();
    for (index, t) in transforms.iter().enumerate() {
        if t.inverse().is_none() {
            return Err(Error::DegenerateTransform { index });
        }
    }
    if config.blend_type == BlendType::Pan {
        balance_rotations(&mut transforms);
    }
    if config.align_to_middle {
        align_to_middle_frame(&mut transforms)?;
    }
    Ok(transforms)
}

/// Rotate the whole set so its mean in-plane rotation is zero.
///
/// The mean is taken over the `sin` term of each transform, which is accurate for
/// the small roll angles of a hand-held sweep.
pub fn balance_rotations(transforms: &mut [DMat3]) {
    if transforms.is_empty() {
        return;
    }
    let sine = transforms.iter().map(|t| t.at(0, 1)).sum::<f64>() / transforms.len() as f64;
    let sine = sine.clamp(-1.0, 1.0);
    let cosine = (1.0 - sine * sine).sqrt();
    let rotation = DMat3::from_rows([cosine, -sine, 0.0], [sine, cosine, 0.0], [0.0, 0.0, 1.0]);
    for t in transforms.iter_mut() {
        *t = rotation * *t;
    }
}

/// Re-express every transform relative to the middle frame.
pub fn align_to_middle_frame(transforms: &mut [DMat3]) -> Result<(), Error> {
    if transforms.is_empty() {
        return Ok(());
    }
    let middle = transforms.len() / 2;
    let inverse = transforms[middle]
        .inverse()
        .ok_or(Error::DegenerateTransform { index: middle })?;
    for t in transforms.iter_mut() {
        *t = (inverse * *t).normalized();
    }
    Ok(())
}
