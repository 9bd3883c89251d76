//! MCAP-backed log container.

use super::{LogContainer, LogRecord, MessageEncoding, is_log_file};
use crate::error::ContainerError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An MCAP file read fully into memory at open.
///
/// Chunks are decompressed once; afterwards every record is available by
/// position without touching the file again.
#[derive(Debug)]
pub struct McapLog {
    path: PathBuf,
    records: Vec<LogRecord>,
}

impl McapLog {
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self, ContainerError> {
        if !is_log_file(path) {
            debug!("No .mcap extension, parsing as MCAP anyway");
        }

        let bytes = std::fs::read(path).map_err(|source| ContainerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read {} bytes", bytes.len());

        let mut records = Vec::new();
        for message in mcap::MessageStream::new(&bytes)? {
            let message = message?;
            let schema = message
                .channel
                .schema
                .as_ref()
                .map(|schema| schema.name.clone())
                .unwrap_or_default();
            records.push(LogRecord {
                channel: message.channel.topic.clone(),
                schema,
                encoding: MessageEncoding::from_name(&message.channel.message_encoding),
                log_time: message.log_time,
                payload: message.data.into_owned(),
            });
        }

        info!("Opened log with {} records", records.len());
        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }
}

impl LogContainer for McapLog {
    fn source(&self) -> &Path {
        &self.path
    }

    fn records(&self) -> &[LogRecord] {
        &self.records
    }
}
