// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Host-owned table registry.
//!
//! Tables are registered by explicit calls at startup, in the order the host
//! chooses. The registry then attaches every table to a DataFusion session.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use arrow_schema::SchemaRef;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;

use crate::constraint::ConstraintSet;
use crate::error::{ChunkTableError, Result};
use crate::provider::ConstraintTableProvider;
use crate::schema::ColumnSchema;

/// Something that computes rows for a constraint set
#[async_trait]
pub trait TableGenerator: Send + Sync + std::fmt::Debug {
    fn columns(&self) -> &ColumnSchema;

    /// Arrow schema of `generate` output
    fn schema(&self) -> SchemaRef;

    async fn generate(&self, constraints: &ConstraintSet) -> Result<RecordBatch>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Table,
}

impl TableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TableKind::Table => "table",
        }
    }
}

/// A table and how it should be presented to the engine
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    pub name: String,
    pub kind: TableKind,
    pub version: &'static str,
    pub generator: Arc<dyn TableGenerator>,
}

impl TableDescriptor {
    pub fn table<S: Into<String>>(
        name: S,
        version: &'static str,
        generator: Arc<dyn TableGenerator>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: TableKind::Table,
            version,
            generator,
        }
    }

    pub fn columns(&self) -> &ColumnSchema {
        self.generator.columns()
    }
}

#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: Vec<TableDescriptor>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: TableDescriptor) -> Result<()> {
        if self.get(&descriptor.name).is_some() {
            return Err(ChunkTableError::DuplicateTable {
                name: descriptor.name,
            });
        }
        let name = descriptor.name.clone();
        let kind = descriptor.kind.as_str();
        diagnostics::log_debug!("Registered {kind} {name}", kind: kind, name: &name);
        self.tables.push(descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn require(&self, name: &str) -> Result<&TableDescriptor> {
        self.get(name).ok_or_else(|| ChunkTableError::UnknownTable {
            name: name.to_string(),
        })
    }

    /// Registered tables in registration order
    pub fn list(&self) -> &[TableDescriptor] {
        &self.tables
    }

    /// Register every table as a DataFusion table provider
    pub fn attach(&self, ctx: &SessionContext) -> Result<()> {
        for descriptor in &self.tables {
            let provider = ConstraintTableProvider::new(descriptor.name.clone(), descriptor.generator.clone());
            _ = ctx.register_table(descriptor.name.as_str(), Arc::new(provider))?;
        }
        Ok(())
    }
}
