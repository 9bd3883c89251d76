//! One-shot calibration lookup.

use crate::config::{ChannelName, LogConfig};
use crate::container::{LogContainer, McapLog};
use crate::error::ReaderError;
use rgbdlog_data::CameraIntrinsics;
use tracing::{debug, info, warn};

/// Largest width or height accepted from a calibration record.
pub const MAX_IMAGE_DIM: u32 = 8192;

/// Find the first camera-info record on `channel`, in container order.
///
/// Without calibration the working resolution is unknown, so a miss is an error
/// rather than a default. The resolution sizes every frame buffer and must be
/// non-zero and at most [`MAX_IMAGE_DIM`] on each side.
pub fn resolve_calibration(
    container: &dyn LogContainer,
    channel: &ChannelName,
) -> Result<CameraIntrinsics, ReaderError> {
    for (id, record) in container.scan(channel) {
        match record.camera_info() {
            Some(info) => {
                let intrinsics = info.intrinsics();
                info!(
                    "Calibration from record {}: {}x{} fx={:.3} fy={:.3} cx={:.3} cy={:.3}",
                    id.0,
                    intrinsics.width,
                    intrinsics.height,
                    intrinsics.fx,
                    intrinsics.fy,
                    intrinsics.cx,
                    intrinsics.cy
                );
                return check_resolution(intrinsics, channel);
            }
            None => debug!("Record {} on {} is not camera info", id.0, channel),
        }
    }

    warn!("Did not find camera info on {}", channel);
    Err(ReaderError::CalibrationNotFound {
        channel: channel.to_string(),
    })
}

fn check_resolution(
    intrinsics: CameraIntrinsics,
    channel: &ChannelName,
) -> Result<CameraIntrinsics, ReaderError> {
    let (width, height) = intrinsics.resolution();
    if width == 0 || height == 0 || width > MAX_IMAGE_DIM || height > MAX_IMAGE_DIM {
        warn!(
            "Camera info on {} declares {}x{}, limit is {}",
            channel, width, height, MAX_IMAGE_DIM
        );
        return Err(ReaderError::InvalidCalibration {
            channel: channel.to_string(),
            width,
            height,
        });
    }
    Ok(intrinsics)
}

/// Open the configured log and resolve its calibration, independently of any
/// reader, so buffer sizes can be fixed up front.
pub fn query_calibration(config: &LogConfig) -> Result<CameraIntrinsics, ReaderError> {
    config.validate()?;
    let log = McapLog::open(&config.path)?;
    resolve_calibration(&log, &config.channels().calibration)
}
