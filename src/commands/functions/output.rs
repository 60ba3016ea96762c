//! Output formatting for functions command results.

use super::execute::FunctionsResult;
use crate::output::{function_view_csv, join_names, join_operations, Outputable};
use crate::types::format_location;

impl Outputable for FunctionsResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        let header = match &self.pattern {
            Some(pattern) => format!("Functions matching '{}'", pattern),
            None => "Functions".to_string(),
        };

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
            lines.push(String::new());
            match format_location(&entry.file, entry.start_line, entry.end_line) {
                Some(location) => lines.push(format!("{} ({})", entry.function, location)),
                None => lines.push(entry.function.clone()),
            }
            if entry.table_access.is_empty() {
                lines.push("  (no table access)".to_string());
            }
            for (table, access) in &entry.table_access {
                lines.push(format!(
                    "  {}: {} via {}",
                    table,
                    join_operations(&access.operations),
                    join_names(&access.via_methods)
                ));
            }
        }

        lines.join("\n")
    }

    fn to_csv(&self) -> String {
        function_view_csv(&self.entries).join("\n")
    }
}
