use std::error::Error;

use serde::Serialize;

use super::AnalyzeCmd;
use crate::commands::{Context, Execute};
use crate::types::{Diagnostics, FunctionView, Summary, TableView};

/// Result of a full analysis run
#[derive(Debug, Serialize)]
pub struct AnalyzeResult {
    pub summary: Summary,
    pub diagnostics: Diagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_view: Option<FunctionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_view: Option<TableView>,
}

impl Execute for AnalyzeCmd {
    type Output = AnalyzeResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let resolution = ctx.resolve()?;
        let (function_view, table_view) = if self.summary_only {
            (None, None)
        } else {
            (Some(resolution.function_view), Some(resolution.table_view))
        };

        Ok(AnalyzeResult {
            summary: resolution.summary,
            diagnostics: resolution.diagnostics,
            function_view,
            table_view,
        })
    }
}
