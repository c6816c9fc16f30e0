// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::Result;
use chunktable::TableDescriptor;

use crate::common::QueryContext;

/// Print the column schema of `table`, or of every table when `None`
pub fn schema_command<W: Write>(ctx: &QueryContext, table: Option<&str>, out: &mut W) -> Result<()> {
    let registry = ctx.registry();
    let tables: Vec<&TableDescriptor> = match table {
        Some(name) => vec![registry.require(name)?],
        None => registry.list().iter().collect(),
    };

    for (index, descriptor) in tables.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{}", descriptor.name)?;

        let columns = descriptor.columns().columns();
        let width = columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
        for column in columns {
            writeln!(
                out,
                "  {:<width$}  {:<7}  {}",
                column.name,
                column.column_type.as_str(),
                column.options.as_str(),
                width = width
            )?;
        }
    }
    Ok(())
}
