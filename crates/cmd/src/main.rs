// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cmd::commands::{query_command, schema_command, tables_command};
use cmd::common::{OutputFormat, QueryContext};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "chunkq")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Table configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Log debug diagnostics to stderr, overriding CHUNKQ_LOG
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a SQL query against the registered tables
    Query {
        /// SQL statement, e.g. SELECT size FROM challenge WHERE path = '/tmp/a.txt'
        sql: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// List registered tables
    Tables,
    /// Show column schemas
    Schema {
        /// Only this table
        table: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        diagnostics::init_at(diagnostics::emit::Level::Debug);
    } else {
        diagnostics::init();
    }

    let ctx = QueryContext::new(cli.config.as_deref())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::Query { sql, format } => query_command(&ctx, sql, *format, &mut out).await?,
        Commands::Tables => tables_command(&ctx, &mut out)?,
        Commands::Schema { table } => schema_command(&ctx, table.as_deref(), &mut out)?,
    }

    out.flush()?;
    Ok(())
}
