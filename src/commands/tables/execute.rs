use std::error::Error;

use serde::Serialize;

use super::TablesCmd;
use crate::commands::{CommandError, Context, Execute};
use crate::types::{Operation, TableViewEntry};
use crate::utils::NameMatcher;

/// Table view entries matching a pattern
#[derive(Debug, Serialize)]
pub struct TablesResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
    /// Matches before the limit was applied
    pub total_items: usize,
    pub entries: Vec<TableViewEntry>,
}

/// Keep only accessors performing `operation`, and its total.
fn restrict(mut entry: TableViewEntry, operation: Operation) -> Option<TableViewEntry> {
    entry.accessed_by.retain(|_, ops| ops.contains(&operation));
    if entry.accessed_by.is_empty() {
        return None;
    }
    entry.operation_totals.retain(|op, _| *op == operation);
    Some(entry)
}

impl Execute for TablesCmd {
    type Output = TablesResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let matcher =
            NameMatcher::new(self.pattern.as_deref(), self.common.regex).map_err(CommandError::from)?;
        let resolution = ctx.resolve()?;

        let matched: Vec<TableViewEntry> = resolution
            .table_view
            .into_values()
            .filter(|entry| matcher.matches(&entry.table))
            .filter_map(|entry| match self.operation {
                Some(operation) => restrict(entry, operation),
                None => Some(entry),
            })
            .collect();
        let total_items = matched.len();
        let entries = matched.into_iter().take(self.common.limit as usize).collect();

        Ok(TablesResult {
            pattern: self.pattern,
            operation: self.operation,
            total_items,
            entries,
        })
    }
}
