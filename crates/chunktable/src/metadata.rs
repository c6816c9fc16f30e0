// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Process and file metadata lookups backing the ownership check.
//!
//! Lookups return row vectors rather than options so the caller can insist
//! on exactly one match, the way a table join would be checked.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Owning user identity, compared for equality only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uid(pub u32);

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Information about the process hosting the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfInfo {
    pub pid: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,
    pub uid: Uid,
}

/// Ownership of one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRecord {
    pub uid: Uid,
}

#[async_trait]
pub trait ProcessTable: Send + Sync {
    /// Rows describing the current process (normally exactly one)
    async fn self_info(&self) -> Result<Vec<SelfInfo>>;

    /// Process rows with the given pid
    async fn processes_by_pid(&self, pid: u32) -> Result<Vec<ProcessRecord>>;
}

#[async_trait]
pub trait FileTable: Send + Sync {
    /// File rows whose path equals `path` exactly
    async fn files_by_path(&self, path: &Path) -> Result<Vec<FileRecord>>;
}

/// Metadata read from the running host.
///
/// Process ownership comes from `/proc/<pid>/status` (real uid). File
/// ownership comes from `stat`, following symlinks so the owner checked is
/// the owner of the bytes that will be read.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostMetadata;

#[async_trait]
impl ProcessTable for HostMetadata {
    async fn self_info(&self) -> Result<Vec<SelfInfo>> {
        Ok(vec![SelfInfo {
            pid: std::process::id(),
        }])
    }

    async fn processes_by_pid(&self, pid: u32) -> Result<Vec<ProcessRecord>> {
        let status = match tokio::fs::read_to_string(format!("/proc/{}/status", pid)).await {
            Ok(status) => status,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(parse_status_uid(&status)
            .map(|uid| ProcessRecord { pid, uid })
            .into_iter()
            .collect())
    }
}

#[async_trait]
impl FileTable for HostMetadata {
    async fn files_by_path(&self, path: &Path) -> Result<Vec<FileRecord>> {
        match tokio::fs::metadata(path).await {
            Ok(md) => Ok(vec![FileRecord {
                uid: file_owner(&md),
            }]),
            Err(e) => {
                let path = path.display().to_string();
                let error = e.to_string();
                diagnostics::log_debug!("No file metadata for {path}: {error}", path: path, error: error);
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(unix)]
fn file_owner(md: &std::fs::Metadata) -> Uid {
    use std::os::unix::fs::MetadataExt;
    Uid(md.uid())
}

#[cfg(not(unix))]
fn file_owner(_md: &std::fs::Metadata) -> Uid {
    Uid(0)
}

/// Real uid from the `Uid:` line of a `/proc/<pid>/status` file
fn parse_status_uid(status: &str) -> Option<Uid> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Uid:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|real| real.parse().ok())
        .map(Uid)
}
