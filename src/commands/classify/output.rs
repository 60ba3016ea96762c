//! Output formatting for classify command results.

use super::execute::ClassifyResult;
use crate::output::{csv_list, csv_row, join_operations, Outputable};
use crate::types::Operation;

impl Outputable for ClassifyResult {
    fn to_table(&self) -> String {
        let method = &self.method;
        let mut lines = vec![
            format!("Query: {} ({})", method.query_name, self.cardinality.marker()),
            format!("Method: {}", method.method_name),
            format!("Operation: {}", method.operation),
            String::new(),
        ];

        if method.table_operations.is_empty() {
            lines.push("Tables: none".to_string());
        } else {
            lines.push(format!("Tables ({}):", method.table_operations.len()));
            for table_op in &method.table_operations {
                lines.push(format!("  {}: {}", table_op.table, join_operations(&table_op.operations)));
            }
        }

        lines.join("\n")
    }

    fn to_csv(&self) -> String {
        let method = &self.method;
        let cardinality = self.cardinality.marker();
        let mut rows = vec!["method,query,cardinality,operation,table,operations".to_string()];
        for table_op in &method.table_operations {
            let operations = csv_list(table_op.operations.iter().map(Operation::as_str));
            rows.push(csv_row(&[
                method.method_name.as_str(),
                method.query_name.as_str(),
                cardinality.as_str(),
                method.operation.as_str(),
                table_op.table.as_str(),
                operations.as_str(),
            ]));
        }
        rows.join("\n")
    }
}
