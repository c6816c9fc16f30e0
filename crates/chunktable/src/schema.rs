// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Column schema for virtual tables.
//!
//! A table describes its shape as an ordered list of columns, each with a
//! semantic type and a usage option. The option tells the query adapter how
//! the column participates in a query:
//!
//! - `Required`: every query must constrain it (exactly one per table)
//! - `Additional`: an optional input constraint with a default when absent
//! - `Default`: an ordinary output column
//! - `Hidden`: never part of the projection handed to the engine

use std::collections::HashSet;
use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef};

use crate::error::{ChunkTableError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Blob,
}

impl ColumnType {
    pub fn data_type(self) -> DataType {
        match self {
            ColumnType::Text => DataType::Utf8,
            ColumnType::Integer => DataType::Int64,
            ColumnType::Blob => DataType::Binary,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Blob => "BLOB",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOptions {
    Required,
    Additional,
    Default,
    Hidden,
}

impl ColumnOptions {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnOptions::Required => "REQUIRED",
            ColumnOptions::Additional => "ADDITIONAL",
            ColumnOptions::Default => "DEFAULT",
            ColumnOptions::Hidden => "HIDDEN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub options: ColumnOptions,
}

impl ColumnDef {
    pub const fn new(name: &'static str, column_type: ColumnType, options: ColumnOptions) -> Self {
        Self {
            name,
            column_type,
            options,
        }
    }
}

/// Immutable, validated column list for one table
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    columns: Arc<[ColumnDef]>,
    required: usize,
}

impl ColumnSchema {
    /// Validate and wrap a column list.
    ///
    /// Rejects duplicate column names and any count of `Required` columns
    /// other than one.
    pub fn try_new(table: &str, columns: Vec<ColumnDef>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name) {
                return Err(ChunkTableError::InvalidSchema {
                    table: table.to_string(),
                    message: format!("duplicate column '{}'", column.name),
                });
            }
        }

        let required_at: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.options == ColumnOptions::Required)
            .map(|(i, _)| i)
            .collect();
        let [required] = required_at[..] else {
            return Err(ChunkTableError::InvalidSchema {
                table: table.to_string(),
                message: format!(
                    "expected exactly one REQUIRED column, found {}",
                    required_at.len()
                ),
            });
        };

        Ok(Self {
            columns: columns.into(),
            required,
        })
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The single column every query must constrain
    pub fn required_column(&self) -> &ColumnDef {
        &self.columns[self.required]
    }

    /// Arrow schema of the columns visible to the query engine
    pub fn arrow_schema(&self) -> SchemaRef {
        let fields: Vec<Field> = self
            .columns
            .iter()
            .filter(|c| c.options != ColumnOptions::Hidden)
            .map(|c| Field::new(c.name, c.column_type.data_type(), true))
            .collect();
        Arc::new(Schema::new(fields))
    }
}
