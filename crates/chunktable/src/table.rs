// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The chunk table: permission-gated, offset-windowed file reads.
//!
//! One invocation of [`ChunkTable::generate_rows`] runs these steps in order:
//!
//! 1. Resolve the caller's uid. Anything other than exactly one row from
//!    each identity lookup ends the query with no rows.
//! 2. Resolve paths and offset from the constraints.
//! 3. For each path: skip if there is no file metadata, skip (and log) if
//!    the owner differs from the caller, otherwise read one window.
//! 4. Return the accumulated rows.
//!
//! Callers cannot tell a denied path from a missing one: neither produces a
//! row and no column carries the reason.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use arrow_schema::SchemaRef;
use async_trait::async_trait;

use crate::config::TableConfig;
use crate::constraint::ConstraintSet;
use crate::error::Result;
use crate::fs::{FileSource, HostFileSource};
use crate::gate::{Access, authorize, caller_uid};
use crate::metadata::{FileTable, HostMetadata, ProcessTable};
use crate::reader::ChunkReader;
use crate::registry::TableGenerator;
use crate::resolver::resolve;
use crate::row::{CHUNK_COLUMNS, ChunkRow, rows_to_batch};
use crate::schema::ColumnSchema;

pub struct ChunkTable {
    schema: ColumnSchema,
    arrow_schema: SchemaRef,
    reader: ChunkReader,
    files: Arc<dyn FileSource>,
    processes: Arc<dyn ProcessTable>,
    file_table: Arc<dyn FileTable>,
}

impl std::fmt::Debug for ChunkTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkTable")
            .field("schema", &self.schema)
            .field("reader", &self.reader)
            .finish()
    }
}

impl ChunkTable {
    /// Chunk table over the host filesystem and host process metadata
    pub fn host(config: &TableConfig) -> Result<Self> {
        Self::new(
            config,
            Arc::new(HostFileSource),
            Arc::new(HostMetadata),
            Arc::new(HostMetadata),
        )
    }

    pub fn new(
        config: &TableConfig,
        files: Arc<dyn FileSource>,
        processes: Arc<dyn ProcessTable>,
        file_table: Arc<dyn FileTable>,
    ) -> Result<Self> {
        config.validate()?;
        let schema = ColumnSchema::try_new(&config.name, CHUNK_COLUMNS.to_vec())?;
        let arrow_schema = schema.arrow_schema();
        Ok(Self {
            schema,
            arrow_schema,
            reader: ChunkReader::new(config),
            files,
            processes,
            file_table,
        })
    }

    /// Produce the rows the caller is allowed to see
    pub async fn generate_rows(&self, constraints: &ConstraintSet) -> Result<Vec<ChunkRow>> {
        let caller = match caller_uid(self.processes.as_ref()).await {
            Ok(Ok(uid)) => uid,
            Ok(Err(failure)) => {
                let reason = failure.to_string();
                diagnostics::log_error!("Cannot resolve caller identity: {reason}", reason: reason);
                return Ok(Vec::new());
            }
            Err(e) => {
                let error = e.to_string();
                diagnostics::log_error!("Caller identity lookup failed: {error}", error: error);
                return Ok(Vec::new());
            }
        };

        let resolved = resolve(constraints, self.files.as_ref()).await?;
        let path_count = resolved.paths.len();
        let offset = resolved.offset;
        diagnostics::log_debug!("Resolved {path_count} paths at offset {offset}", path_count: path_count, offset: offset);

        let mut rows = Vec::new();
        for path in &resolved.paths {
            let path_str = path.display().to_string();
            let access = match authorize(self.file_table.as_ref(), path, caller).await {
                Ok(access) => access,
                Err(e) => {
                    let error = e.to_string();
                    diagnostics::log_error!("File metadata lookup failed for {path}: {error}", path: &path_str, error: error);
                    continue;
                }
            };

            match access {
                Access::NotFound => {
                    diagnostics::log_debug!("No file metadata for {path}, skipping", path: &path_str);
                }
                Access::Denied { owner } => {
                    let owner = owner.0;
                    let caller = caller.0;
                    diagnostics::log_info!("Not allowed to read {path}: owner {owner} is not caller {caller}",
                        path: &path_str, owner: owner, caller: caller);
                }
                Access::Allowed => {
                    if let Some(row) = self
                        .reader
                        .read_window(self.files.as_ref(), path, offset)
                        .await
                    {
                        rows.push(row);
                    }
                }
            }
        }

        Ok(rows)
    }
}

#[async_trait]
impl TableGenerator for ChunkTable {
    fn columns(&self) -> &ColumnSchema {
        &self.schema
    }

    fn schema(&self) -> SchemaRef {
        self.arrow_schema.clone()
    }

    async fn generate(&self, constraints: &ConstraintSet) -> Result<RecordBatch> {
        let rows = self.generate_rows(constraints).await?;
        rows_to_batch(self.arrow_schema.clone(), &rows)
    }
}
