//! RGB-D Capture - Frame-indexed playback of recorded RGB-D logs
//!
//! This crate opens a recorded sensor log, pairs its colour and depth image
//! streams into frames and decodes them one at a time:
//!
//! - Containers: MCAP files (`ros1` and `cdr` message encodings)
//! - Calibration: first `sensor_msgs/CameraInfo` on the calibration channel
//! - Alignment: positional truncation or nearest header stamp
//! - Decoding: from the record payload or from companion PNG files
//!
//! ## Example
//!
//! ```ignore
//! use rgbdlog_capture::{LogConfig, ReaderOptions, RgbdLogReader};
//!
//! let config = LogConfig::new("run.mcap", "/camera/rgb", "/camera/depth", "/camera/info");
//! let mut reader = RgbdLogReader::open(&config, ReaderOptions::default())?;
//! while reader.position() < reader.num_frames() {
//!     let frame = reader.get_next()?;
//!     // Process frame...
//! }
//! ```

pub mod align;
mod calibration;
pub mod config;
pub mod container;
mod cursor;
pub mod decode;
mod error;
mod reader;
mod source;

#[cfg(test)]
mod testing;

pub use align::{FrameIndex, FramePair, StreamAligner};
pub use calibration::{MAX_IMAGE_DIM, query_calibration, resolve_calibration};
pub use config::{AlignmentPolicy, BackendKind, ChannelName, ChannelSet, LogConfig, ReaderOptions};
pub use container::{LogContainer, McapLog, MemoryLog};
pub use cursor::FrameCursor;
pub use decode::{PixelFormat, asset_file_name};
pub use error::{ContainerError, DecodeError, ReaderError, Stream};
pub use reader::RgbdLogReader;
pub use source::{DecodedFrame, FrameSource};

// Re-export calibration types for convenience
pub use rgbdlog_data::{CameraIntrinsics, Timestamp};
