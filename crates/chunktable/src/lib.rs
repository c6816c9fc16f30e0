// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! chunktable - permission-gated, chunked file contents as a SQL table
//!
//! The `challenge` table exposes one bounded window of a file per row. A
//! query names files through its `path` constraint (equality or `LIKE`
//! pattern) and picks where the window starts with `offset`. Rows are only
//! produced for files owned by the user the querying process runs as.
//!
//! ```sql
//! SELECT path, size FROM challenge WHERE path LIKE '/tmp/%.txt' AND "offset" = 1024
//! ```
//!
//! Set CHUNKQ_LOG to control logging (see the `diagnostics` crate).

/// Column schema and Arrow conversion
pub mod schema;

/// Per-query constraint sets
pub mod constraint;

/// LIKE to glob translation
pub mod pattern;

/// Filesystem access and glob expansion
pub mod fs;

/// Process and file ownership metadata
pub mod metadata;

pub mod config;
pub mod error;
pub mod gate;
pub mod reader;
pub mod resolver;
pub mod row;
pub mod table;

// Registration and DataFusion integration
pub mod provider;
pub mod registry;

// Fixtures shared by unit, integration and CLI tests
pub mod testing;

pub use config::TableConfig;
pub use constraint::{ConstraintSet, ConstraintValue, Operator};
pub use error::{ChunkTableError, Result};
pub use metadata::{FileTable, HostMetadata, ProcessTable, Uid};
pub use provider::ConstraintTableProvider;
pub use registry::{TableDescriptor, TableGenerator, TableKind, TableRegistry};
pub use row::ChunkRow;
pub use table::ChunkTable;

/// Version the chunk table reports when registered
pub const TABLE_VERSION: &str = "0.0.1";

/// Register the chunk table described by `config` with `registry`
pub fn register_chunk_table(registry: &mut TableRegistry, config: &TableConfig) -> Result<()> {
    let table = ChunkTable::host(config)?;
    registry.register(TableDescriptor::table(
        config.name.clone(),
        TABLE_VERSION,
        std::sync::Arc::new(table),
    ))
}
