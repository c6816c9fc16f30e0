// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Test fixtures: in-memory process and file metadata.
//!
//! Lets tests model files owned by other users and broken identity lookups
//! without root privileges. Files on disk that have no explicit owner are
//! reported as owned by the caller.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::TableConfig;
use crate::error::Result;
use crate::fs::HostFileSource;
use crate::metadata::{FileRecord, FileTable, ProcessRecord, ProcessTable, SelfInfo, Uid};
use crate::table::ChunkTable;

pub const TEST_PID: u32 = 4242;
pub const TEST_UID: Uid = Uid(1000);
pub const OTHER_UID: Uid = Uid(0);

#[derive(Debug, Clone)]
pub struct FakeMetadata {
    pub caller: Uid,
    /// Number of rows the self-info lookup returns
    pub self_rows: usize,
    /// Number of rows the process lookup returns for our pid
    pub process_rows: usize,
    pub owners: HashMap<PathBuf, Uid>,
}

impl Default for FakeMetadata {
    fn default() -> Self {
        Self {
            caller: TEST_UID,
            self_rows: 1,
            process_rows: 1,
            owners: HashMap::new(),
        }
    }
}

impl FakeMetadata {
    /// Record `path` as owned by `uid`
    pub fn with_owner<P: Into<PathBuf>>(mut self, path: P, uid: Uid) -> Self {
        _ = self.owners.insert(path.into(), uid);
        self
    }

    /// Chunk table over the host filesystem using this metadata
    pub fn chunk_table(self, config: &TableConfig) -> Result<ChunkTable> {
        let metadata = Arc::new(self);
        ChunkTable::new(
            config,
            Arc::new(HostFileSource),
            metadata.clone(),
            metadata,
        )
    }
}

#[async_trait]
impl ProcessTable for FakeMetadata {
    async fn self_info(&self) -> Result<Vec<SelfInfo>> {
        Ok(vec![SelfInfo { pid: TEST_PID }; self.self_rows])
    }

    async fn processes_by_pid(&self, pid: u32) -> Result<Vec<ProcessRecord>> {
        if pid != TEST_PID {
            return Ok(Vec::new());
        }
        Ok(vec![
            ProcessRecord {
                pid,
                uid: self.caller,
            };
            self.process_rows
        ])
    }
}

#[async_trait]
impl FileTable for FakeMetadata {
    async fn files_by_path(&self, path: &Path) -> Result<Vec<FileRecord>> {
        if tokio::fs::metadata(path).await.is_err() {
            return Ok(Vec::new());
        }
        let uid = self.owners.get(path).copied().unwrap_or(self.caller);
        Ok(vec![FileRecord { uid }])
    }
}
