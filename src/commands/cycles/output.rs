//! Output formatting for cycles command results.

use super::execute::CyclesResult;
use crate::output::{csv_list, csv_row, Outputable};

impl Outputable for CyclesResult {
    fn to_table(&self) -> String {
        if self.cycles.is_empty() {
            return "No call cycles found.\n".to_string();
        }

        let mut output = String::new();
        output.push_str("Call Cycles\n\n");
        output.push_str(&format!("Found {} cycle(s):\n\n", self.total_cycles));

        for (idx, cycle) in self.cycles.iter().enumerate() {
            output.push_str(&format!("Cycle {} (length {}):\n", idx + 1, cycle.length));

            for (i, function) in cycle.functions.iter().enumerate() {
                if i == 0 {
                    output.push_str("  ");
                } else {
                    output.push_str("\n    → ");
                }
                output.push_str(function);
            }

            // Close the loop back to the first function
            if let Some(first) = cycle.functions.first() {
                output.push_str("\n    → ");
                output.push_str(first);
            }

            output.push_str("\n\n");
        }

        output.push_str(&format!(
            "Total: {} function(s) involved in cycles\n",
            self.functions_in_cycles
        ));

        output
    }

    /// One row per cycle, functions in call order.
    fn to_csv(&self) -> String {
        let mut rows = vec!["cycle,length,functions".to_string()];
        for (idx, cycle) in self.cycles.iter().enumerate() {
            let number = (idx + 1).to_string();
            let length = cycle.length.to_string();
            let functions = csv_list(cycle.functions.iter().map(String::as_str));
            rows.push(csv_row(&[number.as_str(), length.as_str(), functions.as_str()]));
        }
        rows.join("\n")
    }
}
