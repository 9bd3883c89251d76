//! In-memory log container.

use super::{LogContainer, LogRecord, MessageEncoding};
use rgbdlog_data::{CameraInfoMessage, ImageMessage, ros1};
use std::path::{Path, PathBuf};

/// A container assembled from records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    source: PathBuf,
    records: Vec<LogRecord>,
}

impl MemoryLog {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            records: Vec::new(),
        }
    }

    pub fn with_records(source: impl Into<PathBuf>, records: Vec<LogRecord>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    pub fn push(&mut self, record: LogRecord) {
        self.records.push(record);
    }

    /// Append an image as a ROS1 `sensor_msgs/Image` record.
    pub fn push_image(&mut self, channel: &str, log_time: u64, image: &ImageMessage<'_>) {
        self.push(LogRecord::new(
            channel,
            "sensor_msgs/Image",
            MessageEncoding::Ros1,
            log_time,
            ros1::encode_image(image),
        ));
    }

    /// Append calibration as a ROS1 `sensor_msgs/CameraInfo` record.
    pub fn push_camera_info(&mut self, channel: &str, log_time: u64, info: &CameraInfoMessage) {
        self.push(LogRecord::new(
            channel,
            "sensor_msgs/CameraInfo",
            MessageEncoding::Ros1,
            log_time,
            ros1::encode_camera_info(info),
        ));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl LogContainer for MemoryLog {
    fn source(&self) -> &Path {
        &self.source
    }

    fn records(&self) -> &[LogRecord] {
        &self.records
    }
}
