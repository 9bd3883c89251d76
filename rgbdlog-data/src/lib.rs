//! rgbdlog Data Crate
//!
//! Calibration types and message codecs for recorded RGB-D sensor logs.
//! This crate knows nothing about containers or decoding policy; it only turns
//! message payloads into typed values and back.

pub mod msg;
pub mod ros1;
pub mod types;
mod wire;

pub use msg::{
    CameraInfoMessage, Header, ImageMessage, MessageError, RegionOfInterest, is_camera_info_schema,
    is_image_schema,
};
pub use types::{CameraIntrinsics, Timestamp};
pub use wire::WireFormat;
