//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - `execute.rs` building the result from a [`Context`]
//! - `output.rs` rendering the result as a table

mod analyze;
mod classify;
mod cycles;
mod functions;
mod tables;

pub use analyze::AnalyzeCmd;
pub use classify::ClassifyCmd;
pub use cycles::CyclesCmd;
pub use functions::FunctionsCmd;
pub use tables::TablesCmd;

use std::error::Error;
use std::time::Duration;

use clap::{Args, Subcommand};
use thiserror::Error;
use tracing::debug;

use crate::config::ConfigFile;
use crate::engine::{CancellationToken, Engine, Resolution};
use crate::input::InputSource;
use crate::output::{OutputFormat, Outputable};
use crate::types::Function;

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>>;
}

/// Execute and format in one step.
pub trait CommandRunner {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>>;
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{count} recoverable errors exceed max_errors = {limit}")]
    TooManyErrors { count: usize, limit: usize },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Filtering options shared by the listing commands.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Treat the pattern as a regular expression
    #[arg(short, long, default_value_t = false)]
    pub regex: bool,

    /// Maximum number of results to return (1-1000)
    #[arg(short, long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub limit: u32,
}

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: ConfigFile,
    pub source: InputSource,
    pub cancel: CancellationToken,
}

impl Context {
    pub fn new(config: ConfigFile, source: InputSource) -> Self {
        Self {
            config,
            source,
            cancel: CancellationToken::new(),
        }
    }

    /// Cancel resolution once `budget` has elapsed.
    pub fn with_budget(self, budget: Option<Duration>) -> Self {
        if let Some(budget) = budget {
            self.cancel.cancel_after(budget);
        }
        self
    }

    pub fn engine(&self) -> Engine {
        Engine::new(self.config.engine_options())
    }

    /// Load input, run the engine, and enforce the error budget.
    pub fn resolve(&self) -> Result<Resolution, Box<dyn Error>> {
        let input = self.source.load()?;
        let functions: Vec<Function> = input
            .functions
            .into_iter()
            .filter(|f| self.config.includes_package(&f.package))
            .collect();
        debug!(kept = functions.len(), "applied package filters");
        let resolution = self.engine().resolve_with(&input.queries, &functions, &self.cancel)?;

        if let Some(limit) = self.config.max_errors {
            let count = resolution.diagnostics.error_count();
            if count > limit {
                return Err(CommandError::TooManyErrors { count, limit }.into());
            }
        }
        Ok(resolution)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize table dependencies and report diagnostics
    Analyze(AnalyzeCmd),

    /// Show which tables each function reads or writes
    Functions(FunctionsCmd),

    /// Show which functions touch each table (impact analysis)
    Tables(TablesCmd),

    /// List call cycles found while resolving
    Cycles(CyclesCmd),

    /// Classify a single query without any input file
    Classify(ClassifyCmd),

    /// Catch-all for unknown commands
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Analyze(cmd) => cmd.run(ctx, format),
            Command::Functions(cmd) => cmd.run(ctx, format),
            Command::Tables(cmd) => cmd.run(ctx, format),
            Command::Cycles(cmd) => cmd.run(ctx, format),
            Command::Classify(cmd) => cmd.run(ctx, format),
            Command::Unknown(args) => {
                Err(format!("Unknown command: {}", args.first().cloned().unwrap_or_default()).into())
            }
        }
    }
}
