// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ChunkTableError, Result};

/// Name the chunk table registers under unless configured otherwise
pub const DEFAULT_TABLE_NAME: &str = "challenge";

/// Maximum bytes returned per row unless configured otherwise
pub const DEFAULT_WINDOW_SIZE: usize = 1024;

/// Upper bound on one window read unless configured otherwise
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10_000;

/// Chunk table configuration, typically loaded from YAML:
///
/// ```yaml
/// name: challenge
/// window_size: 1024
/// read_timeout_ms: 5000   # null disables the timeout
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Upper bound on a single window read; unbounded when null
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: Option<u64>,
}

fn default_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_read_timeout_ms() -> Option<u64> {
    Some(DEFAULT_READ_TIMEOUT_MS)
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            window_size: default_window_size(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl TableConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: TableConfig = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ChunkTableError::config("table name must not be empty"));
        }
        if self.window_size == 0 {
            return Err(ChunkTableError::config("window_size must be greater than zero"));
        }
        if self.read_timeout_ms == Some(0) {
            return Err(ChunkTableError::config("read_timeout_ms must be greater than zero"));
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}
