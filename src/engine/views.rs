//! Projection of resolved reachability into the function and table views,
//! plus the consistency checks and advisories computed over them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::graph::{DependencyGraph, FunctionId};
use super::resolver::MethodSet;
use crate::types::{
    Advisory, AdvisoryKind, FunctionView, FunctionViewEntry, Operation, Summary, TableAccess,
    TableView, TableViewEntry,
};

/// Thresholds above which an access pattern is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryThresholds {
    pub max_tables_per_function: usize,
    pub max_functions_per_table: usize,
    pub max_operations_per_table: usize,
}

impl Default for AdvisoryThresholds {
    fn default() -> Self {
        Self {
            max_tables_per_function: 5,
            max_functions_per_table: 10,
            max_operations_per_table: 2,
        }
    }
}

/// One entry per resolved function, including ones that touch no table.
pub fn function_view(graph: &DependencyGraph, reachable: &BTreeMap<FunctionId, MethodSet>) -> FunctionView {
    reachable
        .iter()
        .map(|(&id, methods)| {
            let node = graph.function(id);
            let mut table_access: BTreeMap<String, TableAccess> = BTreeMap::new();
            for &method_id in methods.iter() {
                let method = graph.method(method_id);
                for table_op in &method.table_operations {
                    let access = table_access.entry(table_op.table.clone()).or_default();
                    access.operations.extend(table_op.operations.iter().copied());
                    access.via_methods.insert(method.method_name.clone());
                }
            }
            let entry = FunctionViewEntry {
                function: node.qualified_name.clone(),
                package: node.package.clone(),
                file: node.file.clone(),
                start_line: node.start_line,
                end_line: node.end_line,
                table_access,
            };
            (node.qualified_name.clone(), entry)
        })
        .collect()
}

/// Exact inverse of the function view.
pub fn table_view(functions: &FunctionView) -> TableView {
    let mut tables: TableView = BTreeMap::new();
    for (name, entry) in functions {
        for (table, access) in &entry.table_access {
            let table_entry = tables.entry(table.clone()).or_insert_with(|| TableViewEntry {
                table: table.clone(),
                ..TableViewEntry::default()
            });
            table_entry
                .accessed_by
                .entry(name.clone())
                .or_default()
                .extend(access.operations.iter().copied());
        }
    }
    for entry in tables.values_mut() {
        entry.operation_totals = operation_totals(&entry.accessed_by);
    }
    tables
}

fn operation_totals(accessed_by: &BTreeMap<String, BTreeSet<Operation>>) -> BTreeMap<Operation, usize> {
    let mut totals = BTreeMap::new();
    for operation in accessed_by.values().flatten() {
        *totals.entry(*operation).or_insert(0) += 1;
    }
    totals
}

/// Check the views against the graph and against each other.
pub fn validate(
    graph: &DependencyGraph,
    functions: &FunctionView,
    tables: &TableView,
) -> Result<(), ValidationError> {
    for (name, entry) in functions {
        let function_id = graph
            .function_id(name)
            .ok_or_else(|| ValidationError::UnknownFunction { function: name.clone() })?;
        let reachable = graph.reachable_methods(function_id);

        for (table, access) in &entry.table_access {
            let mut backed: BTreeSet<Operation> = BTreeSet::new();
            for method_name in &access.via_methods {
                let method_id = graph.method_id(method_name).ok_or_else(|| ValidationError::UnknownMethod {
                    function: name.clone(),
                    method: method_name.clone(),
                })?;
                if !reachable.contains(&method_id) {
                    return Err(ValidationError::UnreachableMethod {
                        function: name.clone(),
                        method: method_name.clone(),
                    });
                }
                if let Some(ops) = graph.method(method_id).operations_on(table) {
                    backed.extend(ops.iter().copied());
                }
            }
            if let Some(operation) = access.operations.difference(&backed).next() {
                return Err(ValidationError::UnbackedOperation {
                    function: name.clone(),
                    table: table.clone(),
                    operation: *operation,
                });
            }

            let inverse = tables.get(table).and_then(|t| t.accessed_by.get(name));
            if inverse != Some(&access.operations) {
                return Err(ValidationError::ViewMismatch {
                    function: name.clone(),
                    table: table.clone(),
                });
            }
        }
    }

    for (table, entry) in tables {
        for function in entry.accessed_by.keys() {
            let present = functions
                .get(function)
                .is_some_and(|f| f.table_access.contains_key(table));
            if !present {
                return Err(ValidationError::ViewMismatch {
                    function: function.clone(),
                    table: table.clone(),
                });
            }
        }
        let expected = operation_totals(&entry.accessed_by);
        for operation in expected.keys().chain(entry.operation_totals.keys()) {
            let want = expected.get(operation).copied().unwrap_or(0);
            let got = entry.operation_totals.get(operation).copied().unwrap_or(0);
            if want != got {
                return Err(ValidationError::TotalMismatch {
                    table: table.clone(),
                    operation: *operation,
                    expected: want,
                    actual: got,
                });
            }
        }
    }
    Ok(())
}

/// Informational findings, ordered by kind then subject.
pub fn advisories(functions: &FunctionView, tables: &TableView, limits: &AdvisoryThresholds) -> Vec<Advisory> {
    let mut found = Vec::new();

    for (name, entry) in functions {
        let count = entry.table_access.len();
        if count > limits.max_tables_per_function {
            found.push(Advisory {
                kind: AdvisoryKind::HighTableAccess,
                function: Some(name.clone()),
                table: None,
                count,
                message: format!("{} accesses {} tables; consider splitting it", name, count),
            });
        }
    }

    for (table, entry) in tables {
        let count = entry.accessed_by.len();
        if count > limits.max_functions_per_table {
            found.push(Advisory {
                kind: AdvisoryKind::HighFunctionAccess,
                function: None,
                table: Some(table.clone()),
                count,
                message: format!("table {} is accessed by {} functions; consider a dedicated repository", table, count),
            });
        }
    }

    for (name, entry) in functions {
        for (table, access) in &entry.table_access {
            let count = access.operations.len();
            if count > limits.max_operations_per_table {
                found.push(Advisory {
                    kind: AdvisoryKind::MixedOperations,
                    function: Some(name.clone()),
                    table: Some(table.clone()),
                    count,
                    message: format!("{} performs {} kinds of operation on {}", name, count, table),
                });
            }
        }
    }

    found
}

pub fn summarize(functions: &FunctionView, tables: &TableView, methods: usize) -> Summary {
    let mut summary = Summary {
        functions: functions.len(),
        functions_with_access: functions.values().filter(|f| f.touches_tables()).count(),
        methods,
        tables: tables.len(),
        ..Summary::default()
    };
    for entry in tables.values() {
        for (operation, count) in &entry.operation_totals {
            *summary.operation_totals.entry(*operation).or_insert(0) += count;
        }
    }
    for entry in functions.values() {
        *summary.packages.entry(entry.package.clone()).or_insert(0) += 1;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access(ops: &[Operation], via: &[&str]) -> TableAccess {
        TableAccess {
            operations: ops.iter().copied().collect(),
            via_methods: via.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn entry(name: &str, package: &str, tables: Vec<(&str, TableAccess)>) -> (String, FunctionViewEntry) {
        (
            name.to_string(),
            FunctionViewEntry {
                function: name.to_string(),
                package: package.to_string(),
                file: String::new(),
                start_line: 0,
                end_line: 0,
                table_access: tables.into_iter().map(|(t, a)| (t.to_string(), a)).collect(),
            },
        )
    }

    fn sample() -> FunctionView {
        BTreeMap::from([
            entry(
                "handler.Create",
                "handler",
                vec![
                    ("posts", access(&[Operation::Insert, Operation::Select], &["CreatePost", "GetPost"])),
                    ("users", access(&[Operation::Select], &["GetUser"])),
                ],
            ),
            entry("service.GetUser", "service", vec![("users", access(&[Operation::Select], &["GetUser"]))]),
            entry("util.Noop", "util", vec![]),
        ])
    }

    #[test]
    fn test_table_view_inverts_function_view() {
        let tables = table_view(&sample());
        assert_eq!(tables.keys().collect::<Vec<_>>(), vec!["posts", "users"]);
        let users = &tables["users"];
        assert_eq!(users.accessed_by.keys().collect::<Vec<_>>(), vec!["handler.Create", "service.GetUser"]);
        assert_eq!(users.operation_totals[&Operation::Select], 2);
        let posts = &tables["posts"];
        assert_eq!(posts.operation_totals[&Operation::Insert], 1);
        assert_eq!(posts.operation_totals[&Operation::Select], 1);
    }

    #[test]
    fn test_advisories_respect_thresholds() {
        let functions = sample();
        let tables = table_view(&functions);
        let limits = AdvisoryThresholds {
            max_tables_per_function: 1,
            max_functions_per_table: 1,
            max_operations_per_table: 1,
        };
        let found = advisories(&functions, &tables, &limits);
        let kinds: Vec<AdvisoryKind> = found.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AdvisoryKind::HighTableAccess,
                AdvisoryKind::HighFunctionAccess,
                AdvisoryKind::MixedOperations
            ]
        );
        assert_eq!(found[1].table.as_deref(), Some("users"));
        assert!(advisories(&functions, &tables, &AdvisoryThresholds::default()).is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let functions = sample();
        let tables = table_view(&functions);
        let summary = summarize(&functions, &tables, 3);
        assert_eq!(summary.functions, 3);
        assert_eq!(summary.functions_with_access, 2);
        assert_eq!(summary.tables, 2);
        assert_eq!(summary.operation_totals[&Operation::Select], 3);
        assert_eq!(summary.packages["util"], 1);
    }
}
