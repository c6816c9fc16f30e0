// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Filesystem access used by the chunk table.
//!
//! `FileSource` is the seam between the table and the filesystem: reading a
//! byte range of a file and expanding a glob. `HostFileSource` goes straight
//! to the host filesystem. Expansion never canonicalises: symlinks are
//! reported at their link path and relative components are kept as written.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use wax::Glob;

use crate::error::{ChunkTableError, Result};
use crate::pattern::GlobPattern;

#[async_trait]
pub trait FileSource: Send + Sync {
    /// Read at most `len` bytes of `path` starting at `offset`.
    ///
    /// Returns fewer bytes (possibly none) when the file ends first.
    async fn read_range(&self, path: &Path, offset: u64, len: usize) -> std::io::Result<Vec<u8>>;

    /// Expand a glob into the paths (files and directories) it matches
    async fn expand_pattern(&self, pattern: &GlobPattern) -> Result<Vec<PathBuf>>;
}

/// `FileSource` over the host filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFileSource;

#[async_trait]
impl FileSource for HostFileSource {
    async fn read_range(&self, path: &Path, offset: u64, len: usize) -> std::io::Result<Vec<u8>> {
        let mut file = tokio::fs::File::open(path).await?;
        if offset > 0 {
            _ = file.seek(SeekFrom::Start(offset)).await?;
        }

        let mut buf = Vec::with_capacity(len.min(64 * 1024));
        _ = file.take(len as u64).read_to_end(&mut buf).await?;
        Ok(buf)
    }

    async fn expand_pattern(&self, pattern: &GlobPattern) -> Result<Vec<PathBuf>> {
        if pattern.literal {
            let path = PathBuf::from(&pattern.literal_path);
            return Ok(match tokio::fs::symlink_metadata(&path).await {
                Ok(_) => vec![path],
                Err(_) => Vec::new(),
            });
        }

        let owned = pattern.clone();
        tokio::task::spawn_blocking(move || walk_glob(&owned))
            .await
            .map_err(|e| ChunkTableError::pattern(&pattern.like, e))?
    }
}

/// Walk the filesystem below the glob's literal prefix.
///
/// Only paths that satisfy the LIKE pattern itself are kept. Entries that
/// fail to read (permissions, races with deletion) are skipped; an invalid
/// expression is an error for the whole pattern.
fn walk_glob(pattern: &GlobPattern) -> Result<Vec<PathBuf>> {
    let expr = pattern.expr.as_str();
    let glob = Glob::new(expr).map_err(|e| ChunkTableError::pattern(&pattern.like, e))?;
    let (prefix, glob) = glob.partition();

    let relative = prefix.as_os_str().is_empty();
    let root = if relative {
        PathBuf::from(".")
    } else {
        prefix
    };

    let mut paths = Vec::new();
    for entry in glob.walk(root) {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                let path = if relative {
                    path.strip_prefix(".").unwrap_or(path)
                } else {
                    path
                };
                if pattern.matches(path) {
                    paths.push(path.to_path_buf());
                }
            }
            Err(e) => {
                let error = e.to_string();
                diagnostics::log_debug!("Skipping unreadable entry while expanding {expr}: {error}", expr: expr, error: error);
            }
        }
    }

    Ok(paths)
}
