//! CLI argument definitions.

use crate::config::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Inspect a SQLite database: list its tables and dump one target table.
#[derive(Debug, Default, Parser)]
#[command(name = "dbpeek", version)]
#[command(about = "List the tables of a SQLite database and dump one of them", long_about = None)]
pub struct Cli {
    /// Path to the SQLite database file.
    pub path: Option<PathBuf>,

    /// Table to count and dump [default: Agent].
    #[arg(long)]
    pub table: Option<String>,

    /// Output format [default: text].
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Exit with status 1 when the database cannot be opened or read.
    #[arg(long)]
    pub strict: bool,

    /// TOML config file [default: <config dir>/dbpeek/config.toml].
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log more to stderr (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
