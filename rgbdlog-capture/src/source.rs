//! Decoded frame storage and the streaming source trait.

use crate::error::ReaderError;

/// One decoded RGB-D frame.
///
/// A reader keeps a single instance and overwrites it in place on every
/// navigation call; clone it to keep a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Frame index the buffers hold, or `None` before the first successful decode.
    pub index: Option<usize>,
    /// Colour capture time in nanoseconds.
    pub timestamp: u64,
    pub width: u32,
    pub height: u32,
    /// Declared byte size of the depth record (stride times height).
    pub depth_size: usize,
    /// Declared byte size of the colour record (stride times height).
    pub image_size: usize,
    /// 16-bit depth, `width * height` samples, row-major.
    pub depth: Vec<u16>,
    /// Packed 3-channel colour, `width * height * 3` bytes, row-major.
    pub rgb: Vec<u8>,
}

impl DecodedFrame {
    /// Allocate zeroed buffers for the given resolution.
    ///
    /// Readers only call this with a resolution bounded by
    /// [`MAX_IMAGE_DIM`](crate::MAX_IMAGE_DIM); larger values can exhaust memory.
    pub fn new(width: u32, height: u32) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            index: None,
            timestamp: 0,
            width,
            height,
            depth_size: 0,
            image_size: 0,
            depth: vec![0; pixels],
            rgb: vec![0; pixels * 3],
        }
    }

    /// Get frame dimensions (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// The depth buffer viewed as native-endian bytes.
    pub fn depth_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.depth)
    }

    pub(crate) fn depth_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.depth)
    }

    pub fn depth_at(&self, x: u32, y: u32) -> u16 {
        self.depth[y as usize * self.width as usize + x as usize]
    }

    pub fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]]
    }

    /// Fraction of pixels with a non-zero depth sample.
    pub fn valid_depth_ratio(&self) -> f32 {
        if self.depth.is_empty() {
            return 0.0;
        }
        let valid = self.depth.iter().filter(|&&d| d != 0).count();
        valid as f32 / self.depth.len() as f32
    }
}

/// A source of decoded frames that hands out owned snapshots.
pub trait FrameSource {
    /// Decode the next frame. Returns `None` once every frame has been produced.
    fn next_frame(&mut self) -> Result<Option<DecodedFrame>, ReaderError>;

    /// Get the frame rate, if known.
    fn frame_rate(&self) -> Option<f32>;

    /// Get the resolution (width, height).
    fn resolution(&self) -> (u32, u32);

    /// Check if the source is still active.
    fn is_active(&self) -> bool;

    /// Stop producing frames.
    fn stop(&mut self);
}
