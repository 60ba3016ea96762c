//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and global options.
//! Individual command definitions are in the `commands` module.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Command;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Analysis input (queries and scanned functions as JSON); stdin when omitted
    #[arg(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// Configuration file; defaults to ./.table_deps.json when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Stop resolving after this many milliseconds and report partial results
    #[arg(long, global = true)]
    pub budget_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}
