//! Fixture builders for unit tests.

use crate::container::MemoryLog;
use rgbdlog_data::{CameraInfoMessage, CameraIntrinsics, Header, ImageMessage, Timestamp};

pub(crate) const WIDTH: u32 = 4;
pub(crate) const HEIGHT: u32 = 3;

pub(crate) const INTRINSICS: CameraIntrinsics = CameraIntrinsics {
    width: WIDTH,
    height: HEIGHT,
    fx: 3.5,
    fy: 3.25,
    cx: 1.5,
    cy: 1.0,
};

pub(crate) fn push_camera_info(log: &mut MemoryLog, channel: &str, intrinsics: &CameraIntrinsics) {
    let info = CameraInfoMessage::from_intrinsics(Header::default(), intrinsics);
    log.push_camera_info(channel, 0, &info);
}

/// Colour pixels where pixel `i` is `[seed, i, 255 - seed]`.
pub(crate) fn rgb_pixels(seed: u8) -> Vec<u8> {
    (0..(WIDTH * HEIGHT) as usize)
        .flat_map(|i| [seed, i as u8, 255 - seed])
        .collect()
}

pub(crate) fn push_rgb(log: &mut MemoryLog, channel: &str, seq: u32, stamp_ns: u64, seed: u8) {
    let data = rgb_pixels(seed);
    push_raw(log, channel, seq, stamp_ns, "rgb8", WIDTH * 3, &data);
}

/// A `32FC1` depth image with every pixel at `meters`.
pub(crate) fn push_depth(log: &mut MemoryLog, channel: &str, seq: u32, stamp_ns: u64, meters: f32) {
    let data: Vec<u8> = (0..WIDTH * HEIGHT)
        .flat_map(|_| meters.to_le_bytes())
        .collect();
    push_raw(log, channel, seq, stamp_ns, "32FC1", WIDTH * 4, &data);
}

pub(crate) fn push_raw(
    log: &mut MemoryLog,
    channel: &str,
    seq: u32,
    stamp_ns: u64,
    encoding: &str,
    step: u32,
    data: &[u8],
) {
    let image = ImageMessage {
        header: Header::new(seq, Timestamp::from_nanos(stamp_ns), "camera"),
        height: HEIGHT,
        width: WIDTH,
        encoding: encoding.to_string(),
        is_bigendian: false,
        step,
        data,
    };
    log.push_image(channel, stamp_ns, &image);
}

/// A log with calibration on `/info`, colour on `/rgb` and depth on `/depth`.
/// Colour frame `i` is stamped `i * 33ms`, depth frame `i` at `i * 33ms + 1ms`.
pub(crate) fn rgbd_log(colors: usize, depths: usize) -> MemoryLog {
    let mut log = MemoryLog::new("fixture.mcap");
    push_camera_info(&mut log, "/info", &INTRINSICS);
    for i in 0..colors.max(depths) {
        let stamp = i as u64 * 33_000_000;
        if i < colors {
            push_rgb(&mut log, "/rgb", i as u32, stamp, i as u8);
        }
        if i < depths {
            push_depth(&mut log, "/depth", i as u32, stamp + 1_000_000, 1.0 + i as f32 * 0.25);
        }
    }
    log
}
