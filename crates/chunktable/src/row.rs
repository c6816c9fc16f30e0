// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use arrow_array::{ArrayRef, BinaryArray, Int64Array, StringArray};
use arrow_schema::SchemaRef;

use crate::error::Result;
use crate::schema::{ColumnDef, ColumnOptions, ColumnType};

/// Columns of the chunk table, in output order
pub const CHUNK_COLUMNS: [ColumnDef; 4] = [
    ColumnDef::new("path", ColumnType::Text, ColumnOptions::Required),
    ColumnDef::new("offset", ColumnType::Integer, ColumnOptions::Additional),
    ColumnDef::new("bytes", ColumnType::Blob, ColumnOptions::Default),
    ColumnDef::new("size", ColumnType::Integer, ColumnOptions::Default),
];

/// One windowed read of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRow {
    pub path: String,
    pub offset: u64,
    pub bytes: Vec<u8>,
    /// Bytes actually returned; shorter than the window at end of file
    pub size: u64,
}

/// Convert rows to a single batch matching `CHUNK_COLUMNS`
pub fn rows_to_batch(schema: SchemaRef, rows: &[ChunkRow]) -> Result<RecordBatch> {
    let paths = StringArray::from_iter_values(rows.iter().map(|r| r.path.as_str()));
    let offsets = Int64Array::from_iter_values(rows.iter().map(|r| clamp_i64(r.offset)));
    let bytes = BinaryArray::from_iter_values(rows.iter().map(|r| r.bytes.as_slice()));
    let sizes = Int64Array::from_iter_values(rows.iter().map(|r| clamp_i64(r.size)));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(paths),
        Arc::new(offsets),
        Arc::new(bytes),
        Arc::new(sizes),
    ];
    Ok(RecordBatch::try_new(schema, columns)?)
}

fn clamp_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}
