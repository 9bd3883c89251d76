//! Subcommand implementations.

use clap::{Args, ValueEnum};
use image::{ImageBuffer, Luma, RgbImage};
use rgbdlog_capture::{
    AlignmentPolicy, BackendKind, FrameSource, LogConfig, PixelFormat, ReaderError,
    ReaderOptions, RgbdLogReader, asset_file_name,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Reader(#[from] ReaderError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlignArg {
    /// Pair by position, dropping the tail of the longer stream
    Truncate,
    /// Pair by closest header stamp
    Nearest,
}

/// Which log to open and how to read it.
#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// JSON file holding `path` and the three channel names
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log file (overrides the config)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Colour image channel
    #[arg(long)]
    pub color: Option<String>,

    /// Depth image channel
    #[arg(long)]
    pub depth: Option<String>,

    /// Camera info channel
    #[arg(long)]
    pub calibration: Option<String>,

    /// Swap red and blue in decoded colour (assets load as BGR)
    #[arg(long)]
    pub flip_colors: bool,

    /// Stream alignment policy
    #[arg(long, value_enum, default_value = "truncate")]
    pub align: AlignArg,

    /// Largest colour/depth stamp offset for `--align nearest`
    #[arg(long)]
    pub max_offset_ms: Option<f64>,

    /// Load pixels from `{index:06}_rgb.png` / `{index:06}_depth.png` in this directory
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Depth units per metre when decoding record payloads
    #[arg(long, default_value_t = 1000.0)]
    pub depth_scale: f32,
}

impl LogArgs {
    /// Merge the optional config file with command line overrides.
    pub fn log_config(&self) -> Result<LogConfig, CliError> {
        let base = match &self.config {
            Some(path) => Some(LogConfig::from_json_file(path)?),
            None => None,
        };

        let pick = |flag: &Option<String>, from_config: Option<&String>, name: &str| {
            flag.clone()
                .or_else(|| from_config.cloned())
                .ok_or_else(|| CliError::Usage(format!("missing --{name} (or --config)")))
        };

        let path = self
            .file
            .clone()
            .or_else(|| base.as_ref().map(|c| c.path.clone()))
            .ok_or_else(|| CliError::Usage("missing --file (or --config)".to_string()))?;
        let color = pick(&self.color, base.as_ref().map(|c| &c.color_channel), "color")?;
        let depth = pick(&self.depth, base.as_ref().map(|c| &c.depth_channel), "depth")?;
        let calibration = pick(
            &self.calibration,
            base.as_ref().map(|c| &c.calibration_channel),
            "calibration",
        )?;

        let config = LogConfig::new(path, color, depth, calibration);
        config.validate()?;
        Ok(config)
    }

    pub fn reader_options(&self) -> ReaderOptions {
        let alignment = match self.align {
            AlignArg::Truncate => AlignmentPolicy::TruncateTail,
            AlignArg::Nearest => AlignmentPolicy::NearestTimestamp {
                max_offset_ns: self.max_offset_ms.map(|ms| (ms * 1e6).max(0.0) as u64),
            },
        };
        let backend = match &self.assets {
            Some(dir) => BackendKind::Assets { dir: dir.clone() },
            None => BackendKind::Payload {
                depth_scale: self.depth_scale,
            },
        };
        ReaderOptions::default()
            .with_flip_colors(self.flip_colors)
            .with_alignment(alignment)
            .with_backend(backend)
    }

    fn open(&self) -> Result<RgbdLogReader, CliError> {
        let config = self.log_config()?;
        Ok(RgbdLogReader::open(&config, self.reader_options())?)
    }
}

pub fn info(args: &LogArgs) -> Result<(), CliError> {
    let reader = args.open()?;
    let summary = serde_json::json!({
        "file": reader.file().display().to_string(),
        "frames": reader.num_frames(),
        "color_records": reader.raw_color_count(),
        "depth_records": reader.raw_depth_count(),
        "frame_rate": reader.frame_rate(),
        "intrinsics": reader.intrinsics(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

pub fn play(args: &LogArgs, skip_bad: bool) -> Result<(), CliError> {
    let mut reader = args.open()?;
    let summary = play_frames(&mut reader, skip_bad)?;
    info!(
        "Played {} of {} frames ({} failed)",
        summary.decoded,
        reader.num_frames(),
        summary.failed
    );
    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct PlaySummary {
    decoded: usize,
    failed: usize,
}

fn play_frames(reader: &mut RgbdLogReader, skip_bad: bool) -> Result<PlaySummary, CliError> {
    let mut summary = PlaySummary::default();
    while reader.position() < reader.num_frames() {
        let index = reader.position();
        match reader.get_next() {
            Ok(frame) => {
                info!(
                    "Frame {:06} t={:.3}s valid depth {:.1}%",
                    index,
                    frame.timestamp as f64 * 1e-9,
                    frame.valid_depth_ratio() * 100.0
                );
                summary.decoded += 1;
            }
            Err(e) if skip_bad => {
                warn!("Skipping frame {}: {}", index, e);
                summary.failed += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(summary)
}

pub fn dump(args: &LogArgs, out: &Path) -> Result<(), CliError> {
    let mut reader = args.open()?;
    std::fs::create_dir_all(out)?;
    let written = dump_frames(&mut reader, out)?;
    info!("Wrote {} frames to {}", written, out.display());
    Ok(())
}

fn dump_frames(reader: &mut RgbdLogReader, out: &Path) -> Result<usize, CliError> {
    let (width, height) = reader.intrinsics().resolution();
    let mut written = 0;
    while reader.position() < reader.num_frames() {
        let index = reader.position();
        let frame = reader.get_next()?;

        let rgb = RgbImage::from_raw(width, height, frame.rgb.clone()).ok_or_else(|| {
            CliError::Usage(format!("frame {index} colour buffer has the wrong size"))
        })?;
        rgb.save(out.join(asset_file_name(index, PixelFormat::Rgb8)))?;

        let depth =
            ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(width, height, frame.depth.clone())
                .ok_or_else(|| {
                    CliError::Usage(format!("frame {index} depth buffer has the wrong size"))
                })?;
        depth.save(out.join(asset_file_name(index, PixelFormat::Depth16)))?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgbdlog_capture::{ChannelSet, MemoryLog};
    use rgbdlog_data::{CameraInfoMessage, CameraIntrinsics, Header, ImageMessage, Timestamp};

    fn log_args() -> LogArgs {
        LogArgs {
            config: None,
            file: None,
            color: None,
            depth: None,
            calibration: None,
            flip_colors: false,
            align: AlignArg::Truncate,
            max_offset_ms: None,
            assets: None,
            depth_scale: 1000.0,
        }
    }

    fn push_image(
        log: &mut MemoryLog,
        channel: &str,
        i: u32,
        encoding: &str,
        step: u32,
        data: &[u8],
    ) {
        let image = ImageMessage {
            header: Header::new(i, Timestamp::from_nanos(u64::from(i) * 40_000_000), "camera"),
            height: 2,
            width: 2,
            encoding: encoding.to_string(),
            is_bigendian: false,
            step,
            data,
        };
        log.push_image(channel, u64::from(i), &image);
    }

    fn reader(frames: u32, bad: Option<u32>) -> RgbdLogReader {
        let mut log = MemoryLog::new("cli.mcap");
        let intrinsics = CameraIntrinsics::new(2, 2, 2.0, 2.0, 1.0, 1.0);
        let info = CameraInfoMessage::from_intrinsics(Header::default(), &intrinsics);
        log.push_camera_info("/info", 0, &info);
        for i in 0..frames {
            if bad == Some(i) {
                push_image(&mut log, "/rgb", i, "mono8", 2, &[0; 4]);
            } else {
                push_image(&mut log, "/rgb", i, "rgb8", 6, &[i as u8; 12]);
            }
            let depth: Vec<u8> = (0..4).flat_map(|_| 2.0f32.to_le_bytes()).collect();
            push_image(&mut log, "/depth", i, "32FC1", 8, &depth);
        }
        let channels = ChannelSet::new("/rgb", "/depth", "/info");
        RgbdLogReader::from_container(Box::new(log), &channels, ReaderOptions::default()).unwrap()
    }

    #[test]
    fn test_flags_without_config() {
        let mut args = log_args();
        args.file = Some(PathBuf::from("run.mcap"));
        args.color = Some("/rgb".into());
        args.depth = Some("/depth".into());
        assert!(matches!(args.log_config(), Err(CliError::Usage(_))));

        args.calibration = Some("/info".into());
        let config = args.log_config().unwrap();
        assert_eq!(config, LogConfig::new("run.mcap", "/rgb", "/depth", "/info"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let base = LogConfig::new("a.mcap", "/rgb", "/depth", "/info");
        let json = serde_json::to_string(&base).unwrap();
        std::io::Write::write_all(&mut file, json.as_bytes()).unwrap();

        let mut args = log_args();
        args.config = Some(file.path().to_path_buf());
        args.depth = Some("/aligned_depth".into());
        let config = args.log_config().unwrap();
        assert_eq!(config.path, PathBuf::from("a.mcap"));
        assert_eq!(config.depth_channel, "/aligned_depth");
        assert_eq!(config.color_channel, "/rgb");
    }

    #[test]
    fn test_reader_options_from_flags() {
        let mut args = log_args();
        args.align = AlignArg::Nearest;
        args.max_offset_ms = Some(2.5);
        args.flip_colors = true;
        let options = args.reader_options();
        assert!(options.flip_colors);
        assert_eq!(
            options.alignment,
            AlignmentPolicy::NearestTimestamp {
                max_offset_ns: Some(2_500_000)
            }
        );
        assert_eq!(options.backend, BackendKind::Payload { depth_scale: 1000.0 });
    }

    #[test]
    fn test_play_skips_bad_frames() {
        let mut strict = reader(3, Some(1));
        assert!(play_frames(&mut strict, false).is_err());
        assert_eq!(strict.position(), 2);

        let mut lenient = reader(3, Some(1));
        let summary = play_frames(&mut lenient, true).unwrap();
        assert_eq!(summary, PlaySummary { decoded: 2, failed: 1 });
    }

    #[test]
    fn test_dump_writes_png_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = reader(2, None);
        assert_eq!(dump_frames(&mut reader, dir.path()).unwrap(), 2);

        let rgb = image::open(dir.path().join("000001_rgb.png")).unwrap().into_rgb8();
        assert_eq!(rgb.get_pixel(1, 1).0, [1, 1, 1]);
        let depth = image::open(dir.path().join("000000_depth.png")).unwrap().into_luma16();
        assert_eq!(depth.get_pixel(0, 0).0, [2000]);
    }
}
