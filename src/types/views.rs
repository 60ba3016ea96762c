//! The two projections produced by a resolution run.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::Operation;

/// How one function reaches one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableAccess {
    pub operations: BTreeSet<Operation>,
    pub via_methods: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionViewEntry {
    pub function: String,
    pub package: String,
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
    pub table_access: BTreeMap<String, TableAccess>,
}

impl FunctionViewEntry {
    pub fn touches_tables(&self) -> bool {
        !self.table_access.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableViewEntry {
    pub table: String,
    pub accessed_by: BTreeMap<String, BTreeSet<Operation>>,
    /// Number of distinct (function, operation) pairs per operation.
    pub operation_totals: BTreeMap<Operation, usize>,
}

/// Function name -> entry.
pub type FunctionView = BTreeMap<String, FunctionViewEntry>;

/// Table name -> entry.
pub type TableView = BTreeMap<String, TableViewEntry>;

/// Counts over one resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub functions: usize,
    pub functions_with_access: usize,
    pub methods: usize,
    pub tables: usize,
    pub operation_totals: BTreeMap<Operation, usize>,
    pub packages: BTreeMap<String, usize>,
}
