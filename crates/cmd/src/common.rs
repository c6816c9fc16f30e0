// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::{Context, Result};
use chunktable::{TableConfig, TableRegistry, register_chunk_table};
use clap::ValueEnum;
use datafusion::prelude::SessionContext;

/// How query results are written
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Bordered text table (default)
    #[default]
    Table,
    Csv,
    /// JSON array of row objects
    Json,
    /// Number of rows only
    Count,
}

/// Tables available to a CLI invocation
#[derive(Debug)]
pub struct QueryContext {
    registry: TableRegistry,
}

impl QueryContext {
    /// Register the host chunk table, configured from `config_path` or defaults
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => TableConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => TableConfig::default(),
        };
        let name = config.name.clone();
        let window = config.window_size;
        diagnostics::log_debug!("Using table {name} with window {window}", name: &name, window: window);

        let mut registry = TableRegistry::new();
        register_chunk_table(&mut registry, &config)?;
        Ok(Self { registry })
    }

    pub fn from_registry(registry: TableRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    /// Fresh DataFusion session with every registered table attached
    pub fn session_context(&self) -> Result<SessionContext> {
        let ctx = SessionContext::new();
        self.registry
            .attach(&ctx)
            .context("Failed to register tables with session")?;
        Ok(ctx)
    }
}
