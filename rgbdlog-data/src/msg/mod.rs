//! Typed `sensor_msgs` payloads.

mod camera_info;
mod image;

pub use camera_info::{CameraInfoMessage, RegionOfInterest};
pub use image::ImageMessage;

use crate::types::Timestamp;
use crate::wire::{WireFormat, WireReader, WireWriter};
use thiserror::Error;

/// Errors raised while decoding a message payload.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Payload truncated at byte {offset}: {needed} more bytes required")]
    Truncated { offset: usize, needed: usize },

    #[error("Unsupported CDR encapsulation kind {0:#06x}")]
    Encapsulation(u16),

    #[error("Invalid UTF-8 in string field: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

const IMAGE_SCHEMAS: [&str; 2] = ["sensor_msgs/Image", "sensor_msgs/msg/Image"];
const CAMERA_INFO_SCHEMAS: [&str; 2] = ["sensor_msgs/CameraInfo", "sensor_msgs/msg/CameraInfo"];

/// Whether a schema name denotes `sensor_msgs/Image` (ROS1 or ROS 2 naming).
pub fn is_image_schema(name: &str) -> bool {
    IMAGE_SCHEMAS.contains(&name)
}

/// Whether a schema name denotes `sensor_msgs/CameraInfo` (ROS1 or ROS 2 naming).
pub fn is_camera_info_schema(name: &str) -> bool {
    CAMERA_INFO_SCHEMAS.contains(&name)
}

/// `std_msgs/Header`. ROS 2 headers carry no sequence number; it reads as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub seq: u32,
    pub stamp: Timestamp,
    pub frame_id: String,
}

impl Header {
    pub fn new(seq: u32, stamp: Timestamp, frame_id: impl Into<String>) -> Self {
        Self {
            seq,
            stamp,
            frame_id: frame_id.into(),
        }
    }

    pub(crate) fn read(r: &mut WireReader<'_>, format: WireFormat) -> Result<Self, MessageError> {
        match format {
            WireFormat::Ros1 => {
                let seq = r.u32()?;
                let stamp = Timestamp::new(r.u32()?, r.u32()?);
                let frame_id = r.string()?;
                Ok(Self {
                    seq,
                    stamp,
                    frame_id,
                })
            }
            WireFormat::Cdr => {
                let sec = r.i32()?;
                let sec = u32::try_from(sec).map_err(|_| MessageError::InvalidField {
                    field: "header.stamp.sec",
                    reason: format!("negative seconds {sec}"),
                })?;
                let stamp = Timestamp::new(sec, r.u32()?);
                let frame_id = r.string()?;
                Ok(Self {
                    seq: 0,
                    stamp,
                    frame_id,
                })
            }
        }
    }

    pub(crate) fn write_ros1(&self, w: &mut WireWriter) {
        w.u32(self.seq);
        w.u32(self.stamp.sec);
        w.u32(self.stamp.nsec);
        w.string(&self.frame_id);
    }
}
