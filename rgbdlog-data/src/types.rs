//! Core calibration and time types shared by every stage of the reader.

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

/// Pinhole camera calibration resolved from a log.
///
/// Depth and colour are assumed to be registered, so a single set of
/// intrinsics describes both streams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Focal length along x, in pixels.
    pub fx: f64,
    /// Focal length along y, in pixels.
    pub fy: f64,
    /// Principal point x, in pixels.
    pub cx: f64,
    /// Principal point y, in pixels.
    pub cy: f64,
}

impl CameraIntrinsics {
    /// Create intrinsics from resolution and the four pinhole parameters.
    pub fn new(width: u32, height: u32, fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self {
            width,
            height,
            fx,
            fy,
            cx,
            cy,
        }
    }

    /// Get resolution (width, height).
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels in one image.
    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// The 3x3 intrinsic matrix K.
    pub fn matrix(&self) -> Mat3 {
        Mat3::from_cols(
            Vec3::new(self.fx as f32, 0.0, 0.0),
            Vec3::new(0.0, self.fy as f32, 0.0),
            Vec3::new(self.cx as f32, self.cy as f32, 1.0),
        )
    }

    /// Back-project pixel (u, v) at the given depth into camera space.
    pub fn unproject(&self, u: f32, v: f32, depth: f32) -> Vec3 {
        Vec3::new(
            (u - self.cx as f32) * depth / self.fx as f32,
            (v - self.cy as f32) * depth / self.fy as f32,
            depth,
        )
    }
}

/// Capture time stamp carried in a message header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub sec: u32,
    pub nsec: u32,
}

impl Timestamp {
    pub fn new(sec: u32, nsec: u32) -> Self {
        Self { sec, nsec }
    }

    /// Split a nanosecond count into seconds and nanoseconds.
    pub fn from_nanos(nanos: u64) -> Self {
        Self {
            sec: (nanos / 1_000_000_000) as u32,
            nsec: (nanos % 1_000_000_000) as u32,
        }
    }

    pub fn as_nanos(&self) -> u64 {
        self.sec as u64 * 1_000_000_000 + self.nsec as u64
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nsec as f64 * 1e-9
    }
}
