//! Output formatting for analyze command results.

use std::collections::BTreeMap;
use std::fmt::Display;

use super::execute::AnalyzeResult;
use crate::output::{function_view_csv, table_view_csv, Outputable};
use crate::types::AdvisoryKind;

fn counts<K: Display>(counts: &BTreeMap<K, usize>) -> String {
    if counts.is_empty() {
        return "none".to_string();
    }
    counts
        .iter()
        .map(|(key, count)| format!("{} {}", key, count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn advisory_label(kind: AdvisoryKind) -> &'static str {
    match kind {
        AdvisoryKind::HighTableAccess => "high_table_access",
        AdvisoryKind::HighFunctionAccess => "high_function_access",
        AdvisoryKind::MixedOperations => "mixed_operations",
    }
}

impl Outputable for AnalyzeResult {
    fn to_table(&self) -> String {
        let summary = &self.summary;
        let diagnostics = &self.diagnostics;
        let mut lines = Vec::new();

        lines.push("Table Dependencies".to_string());
        lines.push(String::new());
        lines.push(format!(
            "Functions: {} ({} with table access)",
            summary.functions, summary.functions_with_access
        ));
        lines.push(format!("Methods: {}", summary.methods));
        lines.push(format!("Tables: {}", summary.tables));
        lines.push(format!("Operations: {}", counts(&summary.operation_totals)));
        lines.push(format!("Packages: {}", counts(&summary.packages)));

        if !diagnostics.classification_errors.is_empty() {
            lines.push(String::new());
            lines.push(format!("Skipped queries ({}):", diagnostics.classification_errors.len()));
            for skipped in &diagnostics.classification_errors {
                lines.push(format!("  {}: {}", skipped.query, skipped.error));
            }
        }

        if !diagnostics.unresolved_methods.is_empty() {
            lines.push(String::new());
            lines.push(format!("Unresolved calls ({}):", diagnostics.unresolved_methods.len()));
            for warning in &diagnostics.unresolved_methods {
                lines.push(format!(
                    "  {}:{} calls ({}).{}",
                    warning.function, warning.line, warning.receiver_type, warning.method
                ));
            }
        }

        if !diagnostics.cycles.is_empty() {
            lines.push(String::new());
            lines.push(format!("Cycles ({}):", diagnostics.cycles.len()));
            for cycle in &diagnostics.cycles {
                lines.push(format!("  {}", cycle.functions.join(" → ")));
            }
        }

        if !diagnostics.advisories.is_empty() {
            lines.push(String::new());
            lines.push(format!("Advisories ({}):", diagnostics.advisories.len()));
            for advisory in &diagnostics.advisories {
                lines.push(format!("  [{}] {}", advisory_label(advisory.kind), advisory.message));
            }
        }

        if let Some(notice) = &diagnostics.cancelled {
            lines.push(String::new());
            lines.push(format!(
                "Cancelled after resolving {} of {} functions.",
                notice.resolved_functions, notice.total_functions
            ));
        }

        if diagnostics.is_clean() && diagnostics.advisories.is_empty() {
            lines.push(String::new());
            lines.push("No problems found.".to_string());
        }

        lines.join("\n")
    }

    /// Both views as CSV sections; the summary counts when views were left out.
    fn to_csv(&self) -> String {
        let (Some(functions), Some(tables)) = (&self.function_view, &self.table_view) else {
            let summary = &self.summary;
            let diagnostics = &self.diagnostics;
            return [
                "metric,value".to_string(),
                format!("functions,{}", summary.functions),
                format!("functions_with_access,{}", summary.functions_with_access),
                format!("methods,{}", summary.methods),
                format!("tables,{}", summary.tables),
                format!("skipped_queries,{}", diagnostics.classification_errors.len()),
                format!("unresolved_calls,{}", diagnostics.unresolved_methods.len()),
                format!("cycles,{}", diagnostics.cycles.len()),
            ]
            .join("\n");
        };

        let mut lines = vec!["# Function View".to_string()];
        lines.extend(function_view_csv(functions.values()));
        lines.push(String::new());
        lines.push("# Table View".to_string());
        lines.extend(table_view_csv(tables.values()));
        lines.join("\n")
    }
}
