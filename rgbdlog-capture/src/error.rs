//! Error types for log playback.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which of the two image streams a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Color,
    Depth,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Color => f.write_str("color"),
            Stream::Depth => f.write_str("depth"),
        }
    }
}

/// Errors raised while opening or reading a log container.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("MCAP error: {0}")]
    Mcap(#[from] mcap::McapError),
}

/// Per-frame decode failures. None of these leave the frame buffers half written.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Frame {frame}: {stream} record is unreadable: {reason}")]
    EncodingMismatch {
        frame: usize,
        stream: Stream,
        reason: String,
    },

    #[error("Frame {frame}: {stream} record no longer instantiates as an image")]
    MissingRecord { frame: usize, stream: Stream },

    #[error("Frame {frame}: failed to load {path}: {source}")]
    Asset {
        frame: usize,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Frame {frame}: {stream} asset is {actual_width}x{actual_height}, expected {width}x{height}")]
    ResolutionMismatch {
        frame: usize,
        stream: Stream,
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Output buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Frame buffers are {actual_width}x{actual_height}, decoder expects {width}x{height}")]
    FrameResolution {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

/// Errors surfaced by the reader and calibration query.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("No camera info found on channel '{channel}'")]
    CalibrationNotFound { channel: String },

    #[error("Camera info on '{channel}' declares an unusable resolution {width}x{height}")]
    InvalidCalibration {
        channel: String,
        width: u32,
        height: u32,
    },

    #[error("Frame position {position} is outside the log ({frames} frames)")]
    OutOfRange { position: usize, frames: usize },

    #[error("{0} is not supported")]
    Unsupported(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
