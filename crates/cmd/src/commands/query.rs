// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Context, Result, anyhow};
use arrow::record_batch::RecordBatch;
use arrow_csv::WriterBuilder;
use futures::StreamExt;

use crate::common::{OutputFormat, QueryContext};

/// Execute `sql` against the registered tables and write the results to `out`
pub async fn query_command<W: Write>(
    ctx: &QueryContext,
    sql: &str,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    diagnostics::log_debug!("Executing SQL query: {sql}", sql: sql);

    let session = ctx.session_context()?;
    let df = session
        .sql(sql)
        .await
        .map_err(|e| anyhow!("Failed to plan SQL query: {}", e))?;
    let mut stream = df
        .execute_stream()
        .await
        .map_err(|e| anyhow!("Failed to execute query: {}", e))?;

    match format {
        OutputFormat::Table => {
            let mut batches: Vec<RecordBatch> = Vec::new();
            while let Some(batch) = stream.next().await {
                batches.push(batch.map_err(|e| anyhow!("Error in query stream: {}", e))?);
            }

            if batches.iter().all(|b| b.num_rows() == 0) {
                writeln!(out, "No results found.")?;
                return Ok(());
            }

            let formatted = arrow::util::pretty::pretty_format_batches(&batches)
                .context("Failed to format results as table")?;
            writeln!(out, "{}", formatted)?;
        }
        OutputFormat::Csv => {
            let mut csv_writer = WriterBuilder::new().with_header(true).build(&mut *out);
            while let Some(batch) = stream.next().await {
                let batch = batch.map_err(|e| anyhow!("Error in query stream: {}", e))?;
                csv_writer.write(&batch).context("Failed to write CSV")?;
            }
        }
        OutputFormat::Json => {
            let mut json_writer = arrow_json::ArrayWriter::new(&mut *out);
            while let Some(batch) = stream.next().await {
                let batch = batch.map_err(|e| anyhow!("Error in query stream: {}", e))?;
                json_writer.write(&batch).context("Failed to write JSON")?;
            }
            json_writer.finish().context("Failed to write JSON")?;
            drop(json_writer);
            writeln!(out)?;
        }
        OutputFormat::Count => {
            let mut total_rows = 0;
            while let Some(batch) = stream.next().await {
                let batch = batch.map_err(|e| anyhow!("Error in query stream: {}", e))?;
                total_rows += batch.num_rows();
            }
            writeln!(out, "{}", total_rows)?;
        }
    }

    Ok(())
}
