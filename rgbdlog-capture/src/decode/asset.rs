//! Decodes pixels from companion image files stored next to a log.

use super::{DecodeBackend, DecodeSource, PixelFormat};
use crate::error::DecodeError;
use image::GenericImageView;
use std::path::{Path, PathBuf};

/// File name of the companion asset for frame `index`.
pub fn asset_file_name(index: usize, format: PixelFormat) -> String {
    match format {
        PixelFormat::Depth16 => format!("{index:06}_depth.png"),
        PixelFormat::Rgb8 => format!("{index:06}_rgb.png"),
    }
}

/// Loads `{index:06}_depth.png` (16-bit grey) and `{index:06}_rgb.png`
/// (8-bit colour) from a directory, keyed by frame index.
///
/// Colour comes out in BGR byte order, the layout OpenCV-based pipelines
/// read these files in. Enable `flip_colors` to get RGB.
#[derive(Debug, Clone)]
pub struct AssetBackend {
    dir: PathBuf,
}

impl AssetBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn asset_path(&self, index: usize, format: PixelFormat) -> PathBuf {
        self.dir.join(asset_file_name(index, format))
    }
}

impl DecodeBackend for AssetBackend {
    fn decode(
        &self,
        source: &DecodeSource<'_>,
        format: PixelFormat,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        let path = self.asset_path(source.index, format);
        let image = image::open(&path).map_err(|source_err| DecodeError::Asset {
            frame: source.index,
            path: path.clone(),
            source: source_err,
        })?;

        let (width, height) = image.dimensions();
        if (width, height) != (source.width, source.height) {
            return Err(DecodeError::ResolutionMismatch {
                frame: source.index,
                stream: format.stream(),
                width: source.width,
                height: source.height,
                actual_width: width,
                actual_height: height,
            });
        }

        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if out.len() != expected {
            return Err(DecodeError::BufferSize {
                expected,
                actual: out.len(),
            });
        }

        match format {
            PixelFormat::Depth16 => {
                let depth = image.into_luma16();
                out.copy_from_slice(bytemuck::cast_slice(depth.as_raw()));
            }
            PixelFormat::Rgb8 => {
                let rgb = image.into_rgb8();
                out.copy_from_slice(rgb.as_raw());
                super::swap_red_blue(out);
            }
        }
        Ok(())
    }
}
