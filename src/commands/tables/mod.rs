mod execute;
mod execute_tests;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, CommonArgs, Context, Execute};
use crate::output::{OutputFormat, Outputable};
use crate::types::Operation;

/// Show which functions touch each table (impact analysis)
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  table_deps tables --input deps.json                        # Every table and its accessors
  table_deps tables users --input deps.json                  # Tables whose name contains 'users'
  table_deps tables -r '^(users|posts)$' --input deps.json   # Regex match on table names
  table_deps tables --operation delete --input deps.json     # Only functions that delete rows
")]
pub struct TablesCmd {
    /// Table name pattern (substring match by default, regex with --regex)
    pub pattern: Option<String>,

    /// Only keep functions performing this operation
    #[arg(long, value_enum)]
    pub operation: Option<Operation>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommandRunner for TablesCmd {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}
