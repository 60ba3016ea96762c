use std::error::Error;

use serde::Serialize;

use super::FunctionsCmd;
use crate::commands::{CommandError, Context, Execute};
use crate::types::FunctionViewEntry;
use crate::utils::NameMatcher;

/// Function view entries matching a pattern
#[derive(Debug, Serialize)]
pub struct FunctionsResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Matches before the limit was applied
    pub total_items: usize,
    pub entries: Vec<FunctionViewEntry>,
}

impl Execute for FunctionsCmd {
    type Output = FunctionsResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let matcher =
            NameMatcher::new(self.pattern.as_deref(), self.common.regex).map_err(CommandError::from)?;
        let resolution = ctx.resolve()?;

        let matched: Vec<FunctionViewEntry> = resolution
            .function_view
            .into_values()
            .filter(|entry| self.include_empty || entry.touches_tables())
            .filter(|entry| matcher.matches(&entry.function))
            .collect();
        let total_items = matched.len();
        let entries = matched.into_iter().take(self.common.limit as usize).collect();

        Ok(FunctionsResult {
            pattern: self.pattern,
            total_items,
            entries,
        })
    }
}
