// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::Result;

use crate::common::QueryContext;

/// List registered tables in registration order, one per line
pub fn tables_command<W: Write>(ctx: &QueryContext, out: &mut W) -> Result<()> {
    let tables = ctx.registry().list();
    let width = tables.iter().map(|t| t.name.len()).max().unwrap_or(0);

    for table in tables {
        writeln!(
            out,
            "{:<width$}  {:<5}  {}",
            table.name,
            table.kind.as_str(),
            table.version,
            width = width
        )?;
    }
    Ok(())
}
