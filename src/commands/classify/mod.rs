mod cli_tests;
mod execute;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, Context, Execute};
use crate::output::{OutputFormat, Outputable};

/// Classify a single query without any input file
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  table_deps classify GetUser 'SELECT * FROM users WHERE id = $1'
  table_deps classify ListPosts 'SELECT * FROM posts' --cmd :many
  table_deps classify ArchiveUser 'UPDATE users SET archived = true WHERE id = $1' -o json
")]
pub struct ClassifyCmd {
    /// Query name as written in the query file
    pub name: String,

    /// Query text
    pub sql: String,

    /// Command marker (:one, :many, :exec, ...)
    #[arg(long, default_value = ":one")]
    pub cmd: String,
}

impl CommandRunner for ClassifyCmd {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}
