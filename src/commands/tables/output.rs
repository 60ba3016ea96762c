//! Output formatting for tables command results.

use super::execute::TablesResult;
use crate::output::{join_operations, table_view_csv, Outputable};

impl Outputable for TablesResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        let mut header = match &self.pattern {
            Some(pattern) => format!("Tables matching '{}'", pattern),
            None => "Tables".to_string(),
        };
        if let Some(operation) = self.operation {
            header.push_str(&format!(" with {}", operation));
        }

        if self.entries.is_empty() {
            lines.push(format!("{}: none found.", header));
            return lines.join("\n");
        }

        if self.entries.len() < self.total_items {
            lines.push(format!("{} ({} of {}):", header, self.entries.len(), self.total_items));
        } else {
            lines.push(format!("{} ({}):", header, self.total_items));
        }

        for entry in &self.entries {
            let totals = entry
                .operation_totals
                .iter()
                .map(|(operation, count)| format!("{} {}", operation, count))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(String::new());
            lines.push(format!(
                "{} ({} function(s); {})",
                entry.table,
                entry.accessed_by.len(),
                totals
            ));
            for (function, operations) in &entry.accessed_by {
                lines.push(format!("  {}: {}", function, join_operations(operations)));
            }
        }

        lines.join("\n")
    }

    fn to_csv(&self) -> String {
        table_view_csv(&self.entries).join("\n")
    }
}
