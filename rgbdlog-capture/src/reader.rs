//! Frame-indexed navigation over an opened log.

use crate::align::{FrameIndex, ImageRef, StreamAligner};
use crate::calibration::resolve_calibration;
use crate::config::{ChannelSet, LogConfig, ReaderOptions};
use crate::container::{LogContainer, McapLog};
use crate::cursor::FrameCursor;
use crate::decode::FrameDecoder;
use crate::error::{DecodeError, ReaderError, Stream};
use crate::source::{DecodedFrame, FrameSource};
use rgbdlog_data::{CameraIntrinsics, ImageMessage};
use std::path::Path;
use tracing::{info, warn};

/// Reads aligned RGB-D frames from a log.
///
/// Calibration is resolved before anything else and fixes the working
/// resolution. Colour and depth records are paired once at construction;
/// navigation then decodes one frame at a time into buffers owned by the
/// reader and reused across calls.
pub struct RgbdLogReader {
    container: Box<dyn LogContainer>,
    intrinsics: CameraIntrinsics,
    index: FrameIndex,
    raw_color: usize,
    raw_depth: usize,
    cursor: FrameCursor,
    decoder: FrameDecoder,
    frame: DecodedFrame,
    active: bool,
}

impl RgbdLogReader {
    /// Open the log named by `config`.
    pub fn open(config: &LogConfig, options: ReaderOptions) -> Result<Self, ReaderError> {
        config.validate()?;
        let log = McapLog::open(&config.path)?;
        Self::from_container(Box::new(log), &config.channels(), options)
    }

    /// Build a reader over an already opened container.
    #[tracing::instrument(skip_all, fields(source = %container.source().display()))]
    pub fn from_container(
        container: Box<dyn LogContainer>,
        channels: &ChannelSet,
        options: ReaderOptions,
    ) -> Result<Self, ReaderError> {
        let intrinsics = resolve_calibration(container.as_ref(), &channels.calibration)?;

        let alignment =
            StreamAligner::new(options.alignment).align(container.as_ref(), channels);
        if alignment.calibration.is_some_and(|latest| latest != intrinsics) {
            warn!(
                "Calibration on {} changes during the log; using the first record",
                channels.calibration
            );
        }

        let decoder =
            FrameDecoder::new(&intrinsics, options.flip_colors, options.backend.build());
        let frame = DecodedFrame::new(intrinsics.width, intrinsics.height);
        let cursor = FrameCursor::new(alignment.index.len());

        info!(
            "Reader ready: {} frames at {}x{}",
            alignment.index.len(),
            intrinsics.width,
            intrinsics.height
        );

        Ok(Self {
            container,
            intrinsics,
            index: alignment.index,
            raw_color: alignment.raw_color,
            raw_depth: alignment.raw_depth,
            cursor,
            decoder,
            frame,
            active: true,
        })
    }

    /// Decode the frame at the current position and step past it.
    ///
    /// At the end of the log this fails without changing any state. A frame
    /// that fails to decode is still consumed, so the next call moves on.
    pub fn get_next(&mut self) -> Result<&DecodedFrame, ReaderError> {
        let index = self.cursor.advance()?;
        self.decode(index)
            .inspect_err(|e| warn!("Failed to decode frame {}: {}", index, e))?;
        Ok(&self.frame)
    }

    /// Decode the final frame and move past the end.
    pub fn get_back(&mut self) -> Result<&DecodedFrame, ReaderError> {
        let index = self.cursor.seek_end()?;
        self.decode(index)
            .inspect_err(|e| warn!("Failed to decode frame {}: {}", index, e))?;
        Ok(&self.frame)
    }

    /// Random access is not available; the position is left unchanged.
    pub fn fast_forward(&mut self, frame: usize) -> Result<(), ReaderError> {
        warn!(
            "Fast forward to frame {} is not supported, staying at {}",
            frame,
            self.cursor.position()
        );
        Err(ReaderError::Unsupported("fast_forward"))
    }

    pub fn num_frames(&self) -> usize {
        self.index.len()
    }

    /// True while a frame after the current position remains.
    ///
    /// This is one short of "a frame can still be read": at position
    /// `num_frames - 1` it is false although `get_next` still succeeds once.
    pub fn has_more(&self) -> bool {
        self.cursor.has_more()
    }

    pub fn rewind(&mut self) {
        self.cursor.rewind();
    }

    pub fn rewound(&self) -> bool {
        self.cursor.rewound()
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn file(&self) -> &Path {
        self.container.source()
    }

    /// The most recently decoded frame.
    pub fn frame(&self) -> &DecodedFrame {
        &self.frame
    }

    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    pub fn frame_index(&self) -> &FrameIndex {
        &self.index
    }

    /// Colour images found on the colour channel before pairing.
    pub fn raw_color_count(&self) -> usize {
        self.raw_color
    }

    /// Depth images found on the depth channel before pairing.
    pub fn raw_depth_count(&self) -> usize {
        self.raw_depth
    }

    pub fn flip_colors(&self) -> bool {
        self.decoder.flip_colors()
    }

    fn decode(&mut self, index: usize) -> Result<(), ReaderError> {
        let pair = self.index.get(index).ok_or(ReaderError::OutOfRange {
            position: index,
            frames: self.index.len(),
        })?;
        let color = load_image(self.container.as_ref(), index, &pair.color, Stream::Color)?;
        let depth = load_image(self.container.as_ref(), index, &pair.depth, Stream::Depth)?;
        self.decoder.decode_into(index, &color, &depth, &mut self.frame)?;
        Ok(())
    }
}

fn load_image<'a>(
    container: &'a dyn LogContainer,
    index: usize,
    image: &ImageRef,
    stream: Stream,
) -> Result<ImageMessage<'a>, DecodeError> {
    container
        .record(image.record)
        .and_then(|record| record.image())
        .ok_or(DecodeError::MissingRecord {
            frame: index,
            stream,
        })
}

impl FrameSource for RgbdLogReader {
    fn next_frame(&mut self) -> Result<Option<DecodedFrame>, ReaderError> {
        if !self.active || self.cursor.position() >= self.cursor.len() {
            return Ok(None);
        }
        self.get_next().map(|frame| Some(frame.clone()))
    }

    /// Estimated from the colour stamps of the first and last frame.
    fn frame_rate(&self) -> Option<f32> {
        let first = self.index.get(0)?.color.stamp.as_secs_f64();
        let last = self
            .index
            .get(self.index.len().checked_sub(1)?)?
            .color
            .stamp
            .as_secs_f64();
        let span = last - first;
        if span <= 0.0 {
            return None;
        }
        Some(((self.index.len() - 1) as f64 / span) as f32)
    }

    fn resolution(&self) -> (u32, u32) {
        self.intrinsics.resolution()
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn stop(&mut self) {
        self.active = false;
        info!("Playback stopped at frame {}", self.cursor.position());
    }
}
