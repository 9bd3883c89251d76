//! Log containers: ordered, channel-tagged message records.

mod mcap_log;
mod memory;

pub use mcap_log::McapLog;
pub use memory::MemoryLog;

use crate::config::ChannelName;
use rgbdlog_data::{
    CameraInfoMessage, ImageMessage, WireFormat, is_camera_info_schema, is_image_schema,
};
use std::path::Path;
use tracing::debug;

/// Returns true when `path` names a log file this crate can open.
pub fn is_log_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mcap"))
}

/// Serialisation declared by a record's channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageEncoding {
    Ros1,
    Cdr,
    Other(String),
}

impl MessageEncoding {
    pub fn from_name(name: &str) -> Self {
        match name {
            "ros1" => MessageEncoding::Ros1,
            "cdr" => MessageEncoding::Cdr,
            other => MessageEncoding::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MessageEncoding::Ros1 => "ros1",
            MessageEncoding::Cdr => "cdr",
            MessageEncoding::Other(name) => name,
        }
    }

    pub fn wire_format(&self) -> Option<WireFormat> {
        match self {
            MessageEncoding::Ros1 => Some(WireFormat::Ros1),
            MessageEncoding::Cdr => Some(WireFormat::Cdr),
            MessageEncoding::Other(_) => None,
        }
    }
}

/// Position of a record within its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub usize);

/// One message as stored in a container.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub channel: String,
    /// Schema name, e.g. `sensor_msgs/Image`. Empty when the channel has no schema.
    pub schema: String,
    pub encoding: MessageEncoding,
    /// Receive time in nanoseconds.
    pub log_time: u64,
    pub payload: Vec<u8>,
}

impl LogRecord {
    pub fn new(
        channel: impl Into<String>,
        schema: impl Into<String>,
        encoding: MessageEncoding,
        log_time: u64,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            channel: channel.into(),
            schema: schema.into(),
            encoding,
            log_time,
            payload,
        }
    }

    /// Instantiate the payload as an image, or `None` if it is not one.
    pub fn image(&self) -> Option<ImageMessage<'_>> {
        if !is_image_schema(&self.schema) {
            return None;
        }
        let format = self.encoding.wire_format()?;
        ImageMessage::decode(&self.payload, format)
            .inspect_err(|e| debug!("Skipping image on {}: {}", self.channel, e))
            .ok()
    }

    /// Instantiate the payload as camera calibration, or `None` if it is not one.
    pub fn camera_info(&self) -> Option<CameraInfoMessage> {
        if !is_camera_info_schema(&self.schema) {
            return None;
        }
        let format = self.encoding.wire_format()?;
        CameraInfoMessage::decode(&self.payload, format)
            .inspect_err(|e| debug!("Skipping camera info on {}: {}", self.channel, e))
            .ok()
    }
}

/// An opened log. Records are immutable and kept in container order.
pub trait LogContainer {
    /// The file this container was read from.
    fn source(&self) -> &Path;

    /// All records in container order.
    fn records(&self) -> &[LogRecord];

    fn record(&self, id: RecordId) -> Option<&LogRecord> {
        self.records().get(id.0)
    }

    /// Records on one channel, in container order.
    fn scan(&self, channel: &ChannelName) -> Vec<(RecordId, &LogRecord)> {
        self.records()
            .iter()
            .enumerate()
            .filter(|(_, record)| channel.matches(&record.channel))
            .map(|(i, record)| (RecordId(i), record))
            .collect()
    }
}
