// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::time::Duration;

use crate::config::TableConfig;
use crate::error::ChunkTableError;
use crate::fs::FileSource;
use crate::row::ChunkRow;

/// Reads one bounded window of a file.
///
/// Read failures are reported and produce no row; they never fail the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkReader {
    window_size: usize,
    read_timeout: Option<Duration>,
}

impl Default for ChunkReader {
    fn default() -> Self {
        Self::new(&TableConfig::default())
    }
}

impl ChunkReader {
    pub fn new(config: &TableConfig) -> Self {
        Self {
            window_size: config.window_size,
            read_timeout: config.read_timeout(),
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Read `[offset, offset + min(window, len - offset))` of `path`.
    ///
    /// Only the window itself is read. Returns `None` when the read fails or
    /// `offset` is at or past the end of the file.
    pub async fn read_window(
        &self,
        files: &dyn FileSource,
        path: &Path,
        offset: u64,
    ) -> Option<ChunkRow> {
        let path_str = path.display().to_string();

        // No file is longer than the largest seekable offset
        if i64::try_from(offset).is_err() {
            return None;
        }

        let bytes = match self.read(files, path, offset).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let error = e.to_string();
                diagnostics::log_error!("Cannot read file {path}: {error}", path: &path_str, error: error);
                return None;
            }
        };

        if bytes.is_empty() {
            return None;
        }

        let length = bytes.len();
        diagnostics::log_debug!("Read {length} bytes of {path} at {offset}",
            length: length, path: &path_str, offset: offset);

        Some(ChunkRow {
            path: path_str,
            offset,
            bytes,
            size: length as u64,
        })
    }

    async fn read(
        &self,
        files: &dyn FileSource,
        path: &Path,
        offset: u64,
    ) -> Result<Vec<u8>, ChunkTableError> {
        let read = files.read_range(path, offset, self.window_size);
        match self.read_timeout {
            None => Ok(read.await?),
            Some(limit) => match tokio::time::timeout(limit, read).await {
                Ok(result) => Ok(result?),
                Err(_) => Err(ChunkTableError::ReadTimeout {
                    path: path.display().to_string(),
                    millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                }),
            },
        }
    }
}
