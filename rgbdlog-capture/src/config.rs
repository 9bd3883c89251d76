//! Log location, channel names and playback options.

use crate::error::ReaderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a log lives and which channels carry colour, depth and calibration.
///
/// No channel defaults exist; every name must be supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub path: PathBuf,
    pub color_channel: String,
    pub depth_channel: String,
    pub calibration_channel: String,
}

impl LogConfig {
    pub fn new(
        path: impl Into<PathBuf>,
        color_channel: impl Into<String>,
        depth_channel: impl Into<String>,
        calibration_channel: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            color_channel: color_channel.into(),
            depth_channel: depth_channel.into(),
            calibration_channel: calibration_channel.into(),
        }
    }

    /// Load a config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ReaderError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReaderError> {
        for (what, name) in [
            ("color channel", &self.color_channel),
            ("depth channel", &self.depth_channel),
            ("calibration channel", &self.calibration_channel),
        ] {
            if name.trim_start_matches('/').is_empty() {
                return Err(ReaderError::InvalidConfig(format!("{what} is empty")));
            }
        }
        Ok(())
    }

    /// The normalised channel set.
    pub fn channels(&self) -> ChannelSet {
        ChannelSet::new(
            &self.color_channel,
            &self.depth_channel,
            &self.calibration_channel,
        )
    }
}

/// A channel name with one leading `/` removed, so `/cam/rgb` and `cam/rgb`
/// refer to the same channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelName(String);

impl ChannelName {
    pub fn new(name: &str) -> Self {
        Self(strip_root(name).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a raw channel name from a container refers to this channel.
    pub fn matches(&self, raw: &str) -> bool {
        strip_root(raw) == self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

fn strip_root(name: &str) -> &str {
    name.strip_prefix('/').unwrap_or(name)
}

/// The three logical channels a reader consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSet {
    pub color: ChannelName,
    pub depth: ChannelName,
    pub calibration: ChannelName,
}

impl ChannelSet {
    pub fn new(color: &str, depth: &str, calibration: &str) -> Self {
        Self {
            color: ChannelName::new(color),
            depth: ChannelName::new(depth),
            calibration: ChannelName::new(calibration),
        }
    }
}

/// How the colour and depth streams are paired into frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlignmentPolicy {
    /// Pair positionally and drop the tail of the longer stream.
    #[default]
    TruncateTail,
    /// Pair colour and depth images whose header stamps are mutually nearest.
    /// Colour images without such a partner are dropped.
    NearestTimestamp {
        /// Pairs further apart than this are dropped.
        max_offset_ns: Option<u64>,
    },
}

/// Where decoded pixels come from.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendKind {
    /// Decode the pixel bytes carried in the log records.
    Payload {
        /// Multiplier from metres to 16-bit depth units.
        depth_scale: f32,
    },
    /// Load companion `{index:06}_rgb.png` / `{index:06}_depth.png` files.
    Assets { dir: PathBuf },
}

impl Default for BackendKind {
    fn default() -> Self {
        BackendKind::Payload {
            depth_scale: 1000.0,
        }
    }
}

/// Reader construction options.
#[derive(Debug, Clone, Default)]
pub struct ReaderOptions {
    /// Swap red and blue in every decoded colour frame.
    pub flip_colors: bool,
    pub alignment: AlignmentPolicy,
    pub backend: BackendKind,
}

impl ReaderOptions {
    pub fn with_flip_colors(mut self, flip: bool) -> Self {
        self.flip_colors = flip;
        self
    }

    pub fn with_alignment(mut self, alignment: AlignmentPolicy) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }
}
