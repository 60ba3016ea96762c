mod execute;
mod execute_tests;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, Context, Execute};
use crate::output::{OutputFormat, Outputable};

/// Summarize table dependencies and report diagnostics
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  table_deps analyze --input deps.json            # Summary plus diagnostics
  table_deps analyze --input deps.json -o json    # Everything, including both views
  table_deps analyze --summary-only -o json < deps.json
")]
pub struct AnalyzeCmd {
    /// Leave the function and table views out of JSON/toon output
    #[arg(long, default_value_t = false)]
    pub summary_only: bool,
}

impl CommandRunner for AnalyzeCmd {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}
