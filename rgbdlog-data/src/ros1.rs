//! ROS1 payload encoding, for tools that write logs.

use crate::msg::{CameraInfoMessage, ImageMessage};
use crate::wire::WireWriter;

/// Serialise an image as a ROS1 `sensor_msgs/Image` payload.
pub fn encode_image(image: &ImageMessage<'_>) -> Vec<u8> {
    let mut w = WireWriter::with_capacity(64 + image.data.len());
    image.write_ros1(&mut w);
    w.finish()
}

/// Serialise calibration as a ROS1 `sensor_msgs/CameraInfo` payload.
pub fn encode_camera_info(info: &CameraInfoMessage) -> Vec<u8> {
    let mut w = WireWriter::with_capacity(384);
    info.write_ros1(&mut w);
    w.finish()
}
