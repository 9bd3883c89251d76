//! Validation and decoding of one frame into the reader's buffers.

mod asset;
mod payload;

pub use asset::{AssetBackend, asset_file_name};
pub use payload::PayloadBackend;

use crate::config::BackendKind;
use crate::error::{DecodeError, Stream};
use crate::source::DecodedFrame;
use rgbdlog_data::{CameraIntrinsics, ImageMessage};
use tracing::debug;

/// The only depth encoding accepted: 32-bit float metres, one channel.
pub const DEPTH_ENCODING: &str = "32FC1";

/// Layout a backend must produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One native-endian `u16` per pixel.
    Depth16,
    /// Three bytes per pixel.
    Rgb8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Depth16 => 2,
            PixelFormat::Rgb8 => 3,
        }
    }

    pub fn stream(self) -> Stream {
        match self {
            PixelFormat::Depth16 => Stream::Depth,
            PixelFormat::Rgb8 => Stream::Color,
        }
    }
}

/// What a backend decodes from: the frame position and its validated record.
#[derive(Debug, Clone, Copy)]
pub struct DecodeSource<'a> {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub image: &'a ImageMessage<'a>,
}

/// Turns a record into pixels of a known layout.
pub trait DecodeBackend {
    /// Fill `out` (exactly `width * height * format.bytes_per_pixel()` bytes).
    fn decode(
        &self,
        source: &DecodeSource<'_>,
        format: PixelFormat,
        out: &mut [u8],
    ) -> Result<(), DecodeError>;
}

impl BackendKind {
    pub fn build(&self) -> Box<dyn DecodeBackend> {
        match self {
            BackendKind::Payload { depth_scale } => Box::new(PayloadBackend::new(*depth_scale)),
            BackendKind::Assets { dir } => Box::new(AssetBackend::new(dir.clone())),
        }
    }
}

/// Swap the first and third byte of every 3-byte pixel (RGB <-> BGR).
pub fn swap_red_blue(rgb: &mut [u8]) {
    for pixel in rgb.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }
}

/// Validates a colour/depth record pair against the fixed resolution and
/// decodes it into a [`DecodedFrame`].
pub struct FrameDecoder {
    width: u32,
    height: u32,
    flip_colors: bool,
    backend: Box<dyn DecodeBackend>,
}

impl FrameDecoder {
    pub fn new(
        intrinsics: &CameraIntrinsics,
        flip_colors: bool,
        backend: Box<dyn DecodeBackend>,
    ) -> Self {
        Self {
            width: intrinsics.width,
            height: intrinsics.height,
            flip_colors,
            backend,
        }
    }

    pub fn flip_colors(&self) -> bool {
        self.flip_colors
    }

    /// Byte length of one `width * height` image at `bytes_per_pixel`.
    fn byte_len(
        &self,
        index: usize,
        stream: Stream,
        bytes_per_pixel: usize,
    ) -> Result<usize, DecodeError> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(bytes_per_pixel))
            .ok_or_else(|| DecodeError::EncodingMismatch {
                frame: index,
                stream,
                reason: format!("{}x{} overflows the address space", self.width, self.height),
            })
    }

    /// Depth records must be `32FC1` and exactly `width * height * 4` bytes.
    pub fn check_depth(&self, index: usize, depth: &ImageMessage<'_>) -> Result<(), DecodeError> {
        let expected = self.byte_len(index, Stream::Depth, 4)?;
        let mismatch = |reason: String| DecodeError::EncodingMismatch {
            frame: index,
            stream: Stream::Depth,
            reason,
        };
        if depth.byte_size() != expected {
            return Err(mismatch(format!(
                "declared {} bytes, expected {} for {}x{} {}",
                depth.byte_size(),
                expected,
                self.width,
                self.height,
                DEPTH_ENCODING
            )));
        }
        if depth.encoding != DEPTH_ENCODING {
            return Err(mismatch(format!(
                "encoding '{}', expected '{}'",
                depth.encoding, DEPTH_ENCODING
            )));
        }
        check_payload(index, Stream::Depth, depth)
    }

    /// Colour records must be exactly `width * height * 3` bytes.
    pub fn check_color(&self, index: usize, color: &ImageMessage<'_>) -> Result<(), DecodeError> {
        let expected = self.byte_len(index, Stream::Color, 3)?;
        if color.byte_size() != expected {
            return Err(DecodeError::EncodingMismatch {
                frame: index,
                stream: Stream::Color,
                reason: format!(
                    "declared {} bytes, expected {} for uncompressed {}x{} colour",
                    color.byte_size(),
                    expected,
                    self.width,
                    self.height
                ),
            });
        }
        check_payload(index, Stream::Color, color)
    }

    /// Decode frame `index` into `frame`.
    ///
    /// Both records are validated before any buffer is written. If a backend
    /// fails part way, `frame.index` is cleared.
    pub fn decode_into(
        &self,
        index: usize,
        color: &ImageMessage<'_>,
        depth: &ImageMessage<'_>,
        frame: &mut DecodedFrame,
    ) -> Result<(), DecodeError> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(DecodeError::FrameResolution {
                width: self.width,
                height: self.height,
                actual_width: frame.width,
                actual_height: frame.height,
            });
        }
        self.check_depth(index, depth)?;
        self.check_color(index, color)?;

        debug!("Decoding frame {:06}", index);

        let result = self.decode_buffers(index, color, depth, frame);
        if result.is_err() {
            frame.index = None;
            return result;
        }

        if self.flip_colors {
            swap_red_blue(&mut frame.rgb);
        }
        frame.index = Some(index);
        frame.timestamp = color.header.stamp.as_nanos();
        frame.depth_size = depth.byte_size();
        frame.image_size = color.byte_size();
        Ok(())
    }

    fn decode_buffers(
        &self,
        index: usize,
        color: &ImageMessage<'_>,
        depth: &ImageMessage<'_>,
        frame: &mut DecodedFrame,
    ) -> Result<(), DecodeError> {
        self.backend.decode(
            &self.source(index, depth),
            PixelFormat::Depth16,
            frame.depth_bytes_mut(),
        )?;
        self.backend
            .decode(&self.source(index, color), PixelFormat::Rgb8, &mut frame.rgb)
    }

    fn source<'a>(&self, index: usize, image: &'a ImageMessage<'a>) -> DecodeSource<'a> {
        DecodeSource {
            index,
            width: self.width,
            height: self.height,
            image,
        }
    }
}

fn check_payload(
    index: usize,
    stream: Stream,
    image: &ImageMessage<'_>,
) -> Result<(), DecodeError> {
    if image.data.len() < image.byte_size() {
        return Err(DecodeError::EncodingMismatch {
            frame: index,
            stream,
            reason: format!(
                "payload holds {} bytes, declared {}",
                image.data.len(),
                image.byte_size()
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{HEIGHT, INTRINSICS, WIDTH, rgb_pixels};
    use rgbdlog_data::{Header, Timestamp};

    fn image<'a>(encoding: &str, step: u32, data: &'a [u8], stamp_ns: u64) -> ImageMessage<'a> {
        ImageMessage {
            header: Header::new(0, Timestamp::from_nanos(stamp_ns), "camera"),
            height: HEIGHT,
            width: WIDTH,
            encoding: encoding.to_string(),
            is_bigendian: false,
            step,
            data,
        }
    }

    fn depth_bytes(meters: f32) -> Vec<u8> {
        (0..WIDTH * HEIGHT).flat_map(|_| meters.to_le_bytes()).collect()
    }

    fn decoder(flip: bool) -> FrameDecoder {
        FrameDecoder::new(&INTRINSICS, flip, BackendKind::default().build())
    }

    #[test]
    fn test_decode_payload_frame() {
        let rgb = rgb_pixels(10);
        let depth = depth_bytes(1.5);
        let mut frame = DecodedFrame::new(WIDTH, HEIGHT);

        decoder(false)
            .decode_into(
                3,
                &image("rgb8", WIDTH * 3, &rgb, 42),
                &image(DEPTH_ENCODING, WIDTH * 4, &depth, 43),
                &mut frame,
            )
            .unwrap();

        assert_eq!(frame.index, Some(3));
        assert_eq!(frame.timestamp, 42);
        assert_eq!(frame.rgb, rgb);
        assert!(frame.depth.iter().all(|&d| d == 1500));
        assert_eq!(frame.depth_size, (WIDTH * HEIGHT * 4) as usize);
        assert_eq!(frame.image_size, (WIDTH * HEIGHT * 3) as usize);
    }

    #[test]
    fn test_decode_twice_is_stable() {
        let rgb = rgb_pixels(200);
        let depth_data = depth_bytes(0.75);
        let color = image("rgb8", WIDTH * 3, &rgb, 1);
        let depth = image(DEPTH_ENCODING, WIDTH * 4, &depth_data, 1);
        let decoder = decoder(false);

        let mut first = DecodedFrame::new(WIDTH, HEIGHT);
        decoder.decode_into(0, &color, &depth, &mut first).unwrap();
        let mut second = first.clone();
        decoder.decode_into(0, &color, &depth, &mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_flip_is_an_involution() {
        let rgb = rgb_pixels(7);
        let depth_data = depth_bytes(1.0);
        let color = image("rgb8", WIDTH * 3, &rgb, 1);
        let depth = image(DEPTH_ENCODING, WIDTH * 4, &depth_data, 1);

        let mut plain = DecodedFrame::new(WIDTH, HEIGHT);
        decoder(false).decode_into(0, &color, &depth, &mut plain).unwrap();
        let mut flipped = DecodedFrame::new(WIDTH, HEIGHT);
        decoder(true).decode_into(0, &color, &depth, &mut flipped).unwrap();

        assert_eq!(flipped.rgb_at(0, 0), [255 - 7, 0, 7]);
        swap_red_blue(&mut flipped.rgb);
        assert_eq!(flipped.rgb, plain.rgb);
    }

    #[test]
    fn test_depth_size_mismatch() {
        let rgb = rgb_pixels(1);
        let short = vec![0u8; (WIDTH * HEIGHT * 2) as usize];
        let mut frame = DecodedFrame::new(WIDTH, HEIGHT);

        let err = decoder(false)
            .decode_into(
                5,
                &image("rgb8", WIDTH * 3, &rgb, 0),
                &image(DEPTH_ENCODING, WIDTH * 2, &short, 0),
                &mut frame,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::EncodingMismatch {
                frame: 5,
                stream: Stream::Depth,
                ..
            }
        ));
    }

    #[test]
    fn test_depth_encoding_mismatch() {
        let rgb = rgb_pixels(1);
        let depth = depth_bytes(1.0);
        let mut frame = DecodedFrame::new(WIDTH, HEIGHT);

        let err = decoder(false)
            .decode_into(
                0,
                &image("rgb8", WIDTH * 3, &rgb, 0),
                &image("8UC4", WIDTH * 4, &depth, 0),
                &mut frame,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::EncodingMismatch {
                stream: Stream::Depth,
                ..
            }
        ));
    }

    #[test]
    fn test_color_mismatch_leaves_buffers_untouched() {
        let rgb = vec![9u8; (WIDTH * HEIGHT * 4) as usize];
        let depth = depth_bytes(2.0);
        let mut frame = DecodedFrame::new(WIDTH, HEIGHT);
        let before = frame.clone();

        let err = decoder(false)
            .decode_into(
                1,
                &image("rgba8", WIDTH * 4, &rgb, 0),
                &image(DEPTH_ENCODING, WIDTH * 4, &depth, 0),
                &mut frame,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::EncodingMismatch {
                frame: 1,
                stream: Stream::Color,
                ..
            }
        ));
        assert_eq!(frame, before);
    }

    #[test]
    fn test_short_payload_is_rejected() {
        let rgb = rgb_pixels(1);
        let depth = depth_bytes(1.0);
        let mut frame = DecodedFrame::new(WIDTH, HEIGHT);

        let err = decoder(false)
            .decode_into(
                0,
                &image("rgb8", WIDTH * 3, &rgb[..6], 0),
                &image(DEPTH_ENCODING, WIDTH * 4, &depth, 0),
                &mut frame,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::EncodingMismatch {
                stream: Stream::Color,
                ..
            }
        ));
    }

    #[test]
    fn test_oversized_resolution_fails_validation() {
        let huge = CameraIntrinsics::new(u32::MAX, u32::MAX, 1.0, 1.0, 0.0, 0.0);
        let decoder = FrameDecoder::new(&huge, false, BackendKind::default().build());
        let rgb = rgb_pixels(1);
        let depth = depth_bytes(1.0);

        assert!(matches!(
            decoder.check_color(0, &image("rgb8", WIDTH * 3, &rgb, 0)),
            Err(DecodeError::EncodingMismatch {
                stream: Stream::Color,
                ..
            })
        ));
        assert!(matches!(
            decoder.check_depth(0, &image(DEPTH_ENCODING, WIDTH * 4, &depth, 0)),
            Err(DecodeError::EncodingMismatch {
                stream: Stream::Depth,
                ..
            })
        ));
    }

    #[test]
    fn test_wrong_buffer_resolution() {
        let rgb = rgb_pixels(1);
        let depth = depth_bytes(1.0);
        let mut frame = DecodedFrame::new(WIDTH + 1, HEIGHT);

        let err = decoder(false)
            .decode_into(
                0,
                &image("rgb8", WIDTH * 3, &rgb, 0),
                &image(DEPTH_ENCODING, WIDTH * 4, &depth, 0),
                &mut frame,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::FrameResolution {
                width: WIDTH,
                actual_width,
                ..
            } if actual_width == WIDTH + 1
        ));
    }
}
