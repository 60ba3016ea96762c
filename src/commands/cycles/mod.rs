mod execute;
mod output;
mod output_tests;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, Context, Execute};
use crate::output::{OutputFormat, Outputable};

/// List call cycles found while resolving
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  table_deps cycles --input deps.json                        # Every cycle
  table_deps cycles --max-length 2 --input deps.json         # Mutual recursion only
  table_deps cycles --involving PostService --input deps.json
")]
pub struct CyclesCmd {
    /// Maximum cycle length to report
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Only show cycles with a function whose name contains this text
    #[arg(long)]
    pub involving: Option<String>,
}

impl CommandRunner for CyclesCmd {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}
