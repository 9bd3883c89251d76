//! `sensor_msgs/CameraInfo`

use super::{Header, MessageError};
use crate::types::CameraIntrinsics;
use crate::wire::{WireFormat, WireReader, WireWriter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionOfInterest {
    pub x_offset: u32,
    pub y_offset: u32,
    pub height: u32,
    pub width: u32,
    pub do_rectify: bool,
}

/// Camera calibration message.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraInfoMessage {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub distortion_model: String,
    pub d: Vec<f64>,
    /// Row-major 3x3 intrinsic matrix.
    pub k: [f64; 9],
    pub r: [f64; 9],
    pub p: [f64; 12],
    pub binning_x: u32,
    pub binning_y: u32,
    pub roi: RegionOfInterest,
}

impl CameraInfoMessage {
    pub fn decode(payload: &[u8], format: WireFormat) -> Result<Self, MessageError> {
        let mut r = WireReader::new(payload, format)?;
        let header = Header::read(&mut r, format)?;
        let height = r.u32()?;
        let width = r.u32()?;
        let distortion_model = r.string()?;
        let d = r.f64_seq()?;
        let k = r.f64_array::<9>()?;
        let rect = r.f64_array::<9>()?;
        let p = r.f64_array::<12>()?;
        let binning_x = r.u32()?;
        let binning_y = r.u32()?;
        let roi = RegionOfInterest {
            x_offset: r.u32()?,
            y_offset: r.u32()?,
            height: r.u32()?,
            width: r.u32()?,
            do_rectify: r.bool()?,
        };

        Ok(Self {
            header,
            height,
            width,
            distortion_model,
            d,
            k,
            r: rect,
            p,
            binning_x,
            binning_y,
            roi,
        })
    }

    /// Build an undistorted calibration message from intrinsics.
    pub fn from_intrinsics(header: Header, intrinsics: &CameraIntrinsics) -> Self {
        let CameraIntrinsics {
            width,
            height,
            fx,
            fy,
            cx,
            cy,
        } = *intrinsics;
        Self {
            header,
            height,
            width,
            distortion_model: "plumb_bob".to_string(),
            d: vec![0.0; 5],
            k: [fx, 0.0, cx, 0.0, fy, cy, 0.0, 0.0, 1.0],
            r: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            p: [fx, 0.0, cx, 0.0, 0.0, fy, cy, 0.0, 0.0, 0.0, 1.0, 0.0],
            binning_x: 0,
            binning_y: 0,
            roi: RegionOfInterest::default(),
        }
    }

    /// Resolution plus fx = K[0], fy = K[4], cx = K[2], cy = K[5].
    pub fn intrinsics(&self) -> CameraIntrinsics {
        CameraIntrinsics::new(
            self.width,
            self.height,
            self.k[0],
            self.k[4],
            self.k[2],
            self.k[5],
        )
    }

    pub(crate) fn write_ros1(&self, w: &mut WireWriter) {
        self.header.write_ros1(w);
        w.u32(self.height);
        w.u32(self.width);
        w.string(&self.distortion_model);
        w.u32(self.d.len() as u32);
        for v in self.d.iter().chain(&self.k).chain(&self.r).chain(&self.p) {
            w.f64(*v);
        }
        w.u32(self.binning_x);
        w.u32(self.binning_y);
        w.u32(self.roi.x_offset);
        w.u32(self.roi.y_offset);
        w.u32(self.roi.height);
        w.u32(self.roi.width);
        w.bool(self.roi.do_rectify);
    }
}
