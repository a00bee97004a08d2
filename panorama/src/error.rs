//! Error types for blending runs.

use thiserror::Error;

use crate::frame::FrameError;

/// Coarse outcome of a blending run, for callers that only need a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendStatus {
    Ok,
    Error,
    ErrorMemory,
    Cancelled,
}

/// Errors that can occur while blending a frame set.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No frames provided for blending")]
    NoFrames,

    #[error("Too many frames: {count} (the ownership mask holds at most 255 sites)")]
    TooManyFrames { count: usize },

    #[error("Invalid frame {index}: {source}")]
    InvalidFrame {
        index: usize,
        #[source]
        source: FrameError,
    },

    #[error("Frame {index} has a degenerate transform")]
    DegenerateTransform { index: usize },

    #[error(
        "Mosaic {mosaic_width}x{mosaic_height} is smaller than frame {frame_width}x{frame_height}"
    )]
    InconsistentGeometry {
        mosaic_width: usize,
        mosaic_height: usize,
        frame_width: usize,
        frame_height: usize,
    },

    #[error("Out of memory allocating {what} ({bytes} bytes)")]
    OutOfMemory { what: &'static str, bytes: usize },

    #[error("Blending cancelled")]
    Cancelled,
}

impl Error {
    /// Status code this error reports to callers.
    pub fn status(&self) -> BlendStatus {
        match self {
            Error::OutOfMemory { .. } => BlendStatus::ErrorMemory,
            Error::Cancelled => BlendStatus::Cancelled,
            _ => BlendStatus::Error,
        }
    }
}

impl BlendStatus {
    /// Status of a finished run.
    pub fn of<T>(result: &Result<T, Error>) -> BlendStatus {
        match result {
            Ok(_) => BlendStatus::Ok,
            Err(e) => e.status(),
        }
    }
}
