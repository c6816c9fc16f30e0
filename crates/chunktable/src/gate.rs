// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Ownership gate: a file's contents are only disclosed to a caller whose
//! process runs as the file's owner.

use std::path::Path;

use crate::error::Result;
use crate::metadata::{FileTable, ProcessTable, Uid};

/// Why caller identity could not be established
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityFailure {
    /// The self-info lookup did not return exactly one row
    SelfInfo { rows: usize },
    /// The process lookup for our own pid did not return exactly one row
    Process { pid: u32, rows: usize },
}

impl std::fmt::Display for IdentityFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityFailure::SelfInfo { rows } => {
                write!(f, "expected one self-info row, found {}", rows)
            }
            IdentityFailure::Process { pid, rows } => {
                write!(f, "expected one process row for pid {}, found {}", pid, rows)
            }
        }
    }
}

/// Outcome of the gate for one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allowed,
    /// No file metadata; the path may not exist
    NotFound,
    Denied { owner: Uid },
}

/// Resolve the uid of the calling process.
///
/// The outer `Result` carries lookup errors; the inner one carries a row
/// count mismatch, which callers treat as "return no rows".
pub async fn caller_uid(
    processes: &dyn ProcessTable,
) -> Result<std::result::Result<Uid, IdentityFailure>> {
    let me = processes.self_info().await?;
    let [me] = me.as_slice() else {
        return Ok(Err(IdentityFailure::SelfInfo { rows: me.len() }));
    };

    let records = processes.processes_by_pid(me.pid).await?;
    let [record] = records.as_slice() else {
        return Ok(Err(IdentityFailure::Process {
            pid: me.pid,
            rows: records.len(),
        }));
    };

    Ok(Ok(record.uid))
}

/// Decide whether `caller` may read `path`
pub async fn authorize(files: &dyn FileTable, path: &Path, caller: Uid) -> Result<Access> {
    let records = files.files_by_path(path).await?;
    let Some(record) = records.first() else {
        return Ok(Access::NotFound);
    };

    if record.uid != caller {
        return Ok(Access::Denied { owner: record.uid });
    }
    Ok(Access::Allowed)
}
