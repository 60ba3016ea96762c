mod cli_tests;
mod execute;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, CommonArgs, Context, Execute};
use crate::output::{OutputFormat, Outputable};

/// Show which tables each function reads or writes
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  table_deps functions --input deps.json                  # Every function with table access
  table_deps functions PostHandler --input deps.json      # Names containing 'PostHandler'
  table_deps functions -r '^service\\.' --input deps.json # Regex match on the package prefix
  table_deps functions --include-empty --input deps.json  # Include functions touching no table
")]
pub struct FunctionsCmd {
    /// Function name pattern (substring match by default, regex with --regex)
    pub pattern: Option<String>,

    /// Also list functions that reach no table
    #[arg(long, default_value_t = false)]
    pub include_empty: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommandRunner for FunctionsCmd {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}
