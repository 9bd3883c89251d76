//! Decodes pixels straight from the log record.

use super::{DecodeBackend, DecodeSource, PixelFormat};
use crate::error::DecodeError;

/// Reads `32FC1` depth and packed 8-bit colour from the record payload.
///
/// Depth in metres is scaled to 16-bit units. Non-finite or non-positive
/// samples become 0 and large values saturate at `u16::MAX`.
#[derive(Debug, Clone, Copy)]
pub struct PayloadBackend {
    depth_scale: f32,
}

impl PayloadBackend {
    pub fn new(depth_scale: f32) -> Self {
        Self { depth_scale }
    }

    fn depth_units(&self, meters: f32) -> u16 {
        if meters.is_finite() && meters > 0.0 {
            // `as` saturates
            (meters * self.depth_scale).round() as u16
        } else {
            0
        }
    }
}

impl Default for PayloadBackend {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

impl DecodeBackend for PayloadBackend {
    fn decode(
        &self,
        source: &DecodeSource<'_>,
        format: PixelFormat,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        let image = source.image;
        let stream = format.stream();
        if (image.width, image.height) != (source.width, source.height) {
            return Err(DecodeError::ResolutionMismatch {
                frame: source.index,
                stream,
                width: source.width,
                height: source.height,
                actual_width: image.width,
                actual_height: image.height,
            });
        }

        let width = source.width as usize;
        let expected = width * source.height as usize * format.bytes_per_pixel();
        if out.len() != expected {
            return Err(DecodeError::BufferSize {
                expected,
                actual: out.len(),
            });
        }

        let src_bpp = match format {
            PixelFormat::Depth16 => 4,
            PixelFormat::Rgb8 => 3,
        };
        let step = image.step as usize;
        if step < width * src_bpp {
            return Err(DecodeError::EncodingMismatch {
                frame: source.index,
                stream,
                reason: format!("row stride {} is shorter than {} pixels", step, width),
            });
        }
        let declared = step.saturating_mul(source.height as usize);
        if image.data.len() < declared {
            return Err(DecodeError::EncodingMismatch {
                frame: source.index,
                stream,
                reason: format!("payload holds {} bytes, declared {}", image.data.len(), declared),
            });
        }
        if expected == 0 {
            return Ok(());
        }

        let out_row_len = width * format.bytes_per_pixel();
        let rows = image.data.chunks(step).zip(out.chunks_exact_mut(out_row_len));
        match format {
            PixelFormat::Depth16 => {
                for (row, out_row) in rows {
                    let samples = row[..width * 4].chunks_exact(4);
                    for (src, dst) in samples.zip(out_row.chunks_exact_mut(2)) {
                        let raw = [src[0], src[1], src[2], src[3]];
                        let meters = if image.is_bigendian {
                            f32::from_be_bytes(raw)
                        } else {
                            f32::from_le_bytes(raw)
                        };
                        dst.copy_from_slice(&self.depth_units(meters).to_ne_bytes());
                    }
                }
            }
            PixelFormat::Rgb8 => {
                for (row, out_row) in rows {
                    out_row.copy_from_slice(&row[..out_row_len]);
                }
            }
        }
        Ok(())
    }
}
