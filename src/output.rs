//! Output formatting for command results.
//!
//! Supports multiple output formats: table (human-readable), JSON, toon,
//! and CSV for spreadsheets.

use std::collections::BTreeSet;

use clap::ValueEnum;
use serde::Serialize;

use crate::types::{FunctionViewEntry, Operation, TableViewEntry};

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Token-efficient toon format
    Toon,
    /// Comma-separated rows, one per function-table pair
    Csv,
}

/// Trait for types that can be formatted for output
pub trait Outputable: Serialize {
    /// Format as a human-readable table
    fn to_table(&self) -> String;

    /// Format as CSV with a header row
    fn to_csv(&self) -> String;

    /// Format according to the specified output format
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => self.to_table(),
            OutputFormat::Json => serde_json::to_string_pretty(self).unwrap_or_default(),
            OutputFormat::Toon => {
                let json_value = serde_json::to_value(self).unwrap_or_default();
                toon::encode(&json_value, None)
            }
            OutputFormat::Csv => self.to_csv(),
        }
    }
}

/// "INSERT, SELECT"
pub fn join_operations<'a>(operations: impl IntoIterator<Item = &'a Operation>) -> String {
    operations
        .into_iter()
        .map(Operation::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// "GetPost, GetUser"
pub fn join_names(names: &BTreeSet<String>) -> String {
    names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

// =============================================================================
// CSV
// =============================================================================

/// Quote a field when it holds a comma, quote or line break.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn csv_row(fields: &[&str]) -> String {
    fields.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",")
}

/// Multi-valued cells use `;` so they never need quoting for the separator.
pub fn csv_list<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values.into_iter().collect::<Vec<_>>().join(";")
}

/// One row per function and table it reaches; functions without table
/// access get a single row with the table columns empty.
pub fn function_view_csv<'a>(entries: impl IntoIterator<Item = &'a FunctionViewEntry>) -> Vec<String> {
    let mut rows = vec!["function,package,file,start_line,end_line,table,operations,via_methods".to_string()];
    for entry in entries {
        let start = entry.start_line.to_string();
        let end = entry.end_line.to_string();
        let row = |table: &str, operations: &str, via: &str| {
            csv_row(&[
                entry.function.as_str(),
                entry.package.as_str(),
                entry.file.as_str(),
                start.as_str(),
                end.as_str(),
                table,
                operations,
                via,
            ])
        };

        if entry.table_access.is_empty() {
            rows.push(row("", "", ""));
        }
        for (table, access) in &entry.table_access {
            let operations = csv_list(access.operations.iter().map(Operation::as_str));
            let via = csv_list(access.via_methods.iter().map(String::as_str));
            rows.push(row(table, &operations, &via));
        }
    }
    rows
}

/// One row per table and function that touches it.
pub fn table_view_csv<'a>(entries: impl IntoIterator<Item = &'a TableViewEntry>) -> Vec<String> {
    let mut rows = vec!["table,function,operations".to_string()];
    for entry in entries {
        for (function, operations) in &entry.accessed_by {
            let operations = csv_list(operations.iter().map(Operation::as_str));
            rows.push(csv_row(&[entry.table.as_str(), function.as_str(), operations.as_str()]));
        }
    }
    rows
}
