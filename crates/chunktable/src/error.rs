// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

// Error types for the chunk table and its registry

pub type Result<T> = std::result::Result<T, ChunkTableError>;

/// Failures that abort a whole query or startup.
///
/// Per-path problems (unreadable file, denied ownership, empty pattern
/// expansion) are never represented here: they are logged and the path is
/// skipped.
#[derive(Debug, thiserror::Error)]
pub enum ChunkTableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    #[error("Config parse error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Invalid offset constraint '{value}': expected a non-negative integer")]
    InvalidOffset { value: String },

    #[error("Table '{table}' requires a constraint on column '{column}'")]
    MissingRequiredConstraint { table: String, column: String },

    #[error("Invalid schema for table '{table}': {message}")]
    InvalidSchema { table: String, message: String },

    #[error("Table '{name}' is already registered")]
    DuplicateTable { name: String },

    #[error("Unknown table: {name}")]
    UnknownTable { name: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("Read of {path} timed out after {millis}ms")]
    ReadTimeout { path: String, millis: u64 },
}

impl ChunkTableError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        ChunkTableError::Config {
            message: message.into(),
        }
    }

    pub fn pattern<P: Into<String>, M: ToString>(pattern: P, message: M) -> Self {
        ChunkTableError::Pattern {
            pattern: pattern.into(),
            message: message.to_string(),
        }
    }
}

impl From<ChunkTableError> for datafusion::error::DataFusionError {
    fn from(err: ChunkTableError) -> Self {
        match err {
            ChunkTableError::DataFusion(inner) => inner,
            ChunkTableError::MissingRequiredConstraint { .. } => {
                datafusion::error::DataFusionError::Plan(err.to_string())
            }
            other => datafusion::error::DataFusionError::External(Box::new(other)),
        }
    }
}
