//! Builds the frame index by pairing the colour and depth streams.

use crate::config::{AlignmentPolicy, ChannelName, ChannelSet};
use crate::container::{LogContainer, RecordId};
use rgbdlog_data::{CameraIntrinsics, ImageMessage, Timestamp};
use tracing::info;

/// Reference to one image record plus the metadata needed to validate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub record: RecordId,
    pub encoding: String,
    pub width: u32,
    pub height: u32,
    pub step: u32,
    pub stamp: Timestamp,
}

impl ImageRef {
    fn new(record: RecordId, image: &ImageMessage<'_>) -> Self {
        Self {
            record,
            encoding: image.encoding.clone(),
            width: image.width,
            height: image.height,
            step: image.step,
            stamp: image.header.stamp,
        }
    }

    /// Declared byte size: row stride times height.
    pub fn byte_size(&self) -> usize {
        self.step as usize * self.height as usize
    }
}

/// One decodable frame: a colour record and the depth record paired with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePair {
    pub color: ImageRef,
    pub depth: ImageRef,
}

/// Ordered frame pairs, built once per reader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameIndex {
    frames: Vec<FramePair>,
}

impl FrameIndex {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FramePair> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FramePair> {
        self.frames.iter()
    }
}

/// Result of aligning a container.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub index: FrameIndex,
    /// Colour images found before pairing.
    pub raw_color: usize,
    /// Depth images found before pairing.
    pub raw_depth: usize,
    /// The last camera info on the calibration channel, if any.
    pub calibration: Option<CameraIntrinsics>,
}

/// Scans a container for the two image streams and pairs them.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamAligner {
    policy: AlignmentPolicy,
}

impl StreamAligner {
    pub fn new(policy: AlignmentPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AlignmentPolicy {
        self.policy
    }

    #[tracing::instrument(skip_all, fields(source = %container.source().display()))]
    pub fn align(&self, container: &dyn LogContainer, channels: &ChannelSet) -> Alignment {
        let colors = collect_images(container, &channels.color);
        let depths = collect_images(container, &channels.depth);
        let calibration = latest_calibration(container, &channels.calibration);

        let (raw_color, raw_depth) = (colors.len(), depths.len());
        info!("Color records: {}, depth records: {}", raw_color, raw_depth);

        let frames = match self.policy {
            AlignmentPolicy::TruncateTail => truncate_tail(colors, depths),
            AlignmentPolicy::NearestTimestamp { max_offset_ns } => {
                pair_nearest(colors, depths, max_offset_ns)
            }
        };

        if frames.len() != raw_color || frames.len() != raw_depth {
            info!(
                "After removing unpaired records: {} frames ({} color, {} depth dropped)",
                frames.len(),
                raw_color - frames.len(),
                raw_depth - frames.len()
            );
        }

        Alignment {
            index: FrameIndex { frames },
            raw_color,
            raw_depth,
            calibration,
        }
    }
}

fn collect_images(container: &dyn LogContainer, channel: &ChannelName) -> Vec<ImageRef> {
    container
        .scan(channel)
        .into_iter()
        .filter_map(|(id, record)| record.image().map(|image| ImageRef::new(id, &image)))
        .collect()
}

fn latest_calibration(
    container: &dyn LogContainer,
    channel: &ChannelName,
) -> Option<CameraIntrinsics> {
    container
        .scan(channel)
        .into_iter()
        .rev()
        .find_map(|(_, record)| record.camera_info())
        .map(|info| info.intrinsics())
}

/// Drop trailing records from the longer stream, then pair by position.
fn truncate_tail(mut colors: Vec<ImageRef>, mut depths: Vec<ImageRef>) -> Vec<FramePair> {
    let len = colors.len().min(depths.len());
    colors.truncate(len);
    depths.truncate(len);
    colors
        .into_iter()
        .zip(depths)
        .map(|(color, depth)| FramePair { color, depth })
        .collect()
}

/// Pair records whose header stamps are mutually nearest: the depth record
/// closest to a colour record must have that colour record as its own closest.
/// Each record is used at most once and pairs never cross. Both streams are
/// expected in stamp order.
fn pair_nearest(
    colors: Vec<ImageRef>,
    depths: Vec<ImageRef>,
    max_offset_ns: Option<u64>,
) -> Vec<FramePair> {
    let color_stamps: Vec<u64> = colors.iter().map(|c| c.stamp.as_nanos()).collect();
    let depth_stamps: Vec<u64> = depths.iter().map(|d| d.stamp.as_nanos()).collect();

    let mut frames = Vec::with_capacity(colors.len().min(depths.len()));
    for (i, color) in colors.into_iter().enumerate() {
        let Some(j) = nearest(&depth_stamps, color_stamps[i]) else {
            break;
        };
        if nearest(&color_stamps, depth_stamps[j]) != Some(i) {
            continue;
        }
        let offset = color_stamps[i].abs_diff(depth_stamps[j]);
        if max_offset_ns.is_some_and(|max| offset > max) {
            continue;
        }
        frames.push(FramePair {
            color,
            depth: depths[j].clone(),
        });
    }
    frames
}

/// Index of the stamp closest to `target` in a sorted slice. Ties go to the
/// earlier stamp.
fn nearest(stamps: &[u64], target: u64) -> Option<usize> {
    let after = stamps.partition_point(|&s| s < target);
    let before = after.checked_sub(1);
    match (before, stamps.get(after)) {
        (Some(b), Some(&a)) if target - stamps[b] <= a - target => Some(b),
        (_, Some(_)) => Some(after),
        (before, None) => before,
    }
}
