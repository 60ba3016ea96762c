//! Query records and the data-access methods derived from them.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Kind of storage operation a statement performs.
///
/// Variants are declared alphabetically so ordered collections of operations
/// sort the same way their names do.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Delete,
    Insert,
    Select,
    Update,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Delete => "DELETE",
            Operation::Insert => "INSERT",
            Operation::Select => "SELECT",
            Operation::Update => "UPDATE",
        }
    }

    /// Map a leading statement keyword (any case) to its operation.
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("select") {
            Some(Operation::Select)
        } else if word.eq_ignore_ascii_case("insert") {
            Some(Operation::Insert)
        } else if word.eq_ignore_ascii_case("update") {
            Some(Operation::Update)
        } else if word.eq_ignore_ascii_case("delete") {
            Some(Operation::Delete)
        } else {
            None
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// sqlc command marker attached to a query (`:one`, `:many`, `:exec`, ...).
///
/// Unknown markers are kept verbatim and treated as single-row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cardinality {
    One,
    Many,
    #[default]
    Exec,
    Other(String),
}

impl Cardinality {
    /// True when the generated method returns multiple rows.
    pub fn is_many(&self) -> bool {
        matches!(self, Cardinality::Many)
    }

    pub fn marker(&self) -> String {
        match self {
            Cardinality::One => ":one".to_string(),
            Cardinality::Many => ":many".to_string(),
            Cardinality::Exec => ":exec".to_string(),
            Cardinality::Other(raw) => raw.clone(),
        }
    }
}

impl From<&str> for Cardinality {
    fn from(raw: &str) -> Self {
        let trimmed = raw.trim();
        let bare = trimmed.strip_prefix(':').unwrap_or(trimmed);
        match bare.to_ascii_lowercase().as_str() {
            "one" => Cardinality::One,
            "many" => Cardinality::Many,
            "exec" | "" => Cardinality::Exec,
            _ => Cardinality::Other(trimmed.to_string()),
        }
    }
}

impl From<String> for Cardinality {
    fn from(raw: String) -> Self {
        Cardinality::from(raw.as_str())
    }
}

impl Serialize for Cardinality {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.marker())
    }
}

impl<'de> Deserialize<'de> for Cardinality {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Cardinality::from(raw))
    }
}

/// A named query as written in the sqlc query files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub name: String,
    pub text: String,
    #[serde(default, rename = "cmd")]
    pub cardinality: Cardinality,
}

impl Query {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            cardinality: Cardinality::default(),
        }
    }

    pub fn with_cardinality(mut self, cardinality: impl Into<Cardinality>) -> Self {
        self.cardinality = cardinality.into();
        self
    }
}

/// Operations one statement performs on one table.
///
/// Built only by the query classifier, which hands over names that are
/// already unquoted and case-folded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOperation {
    pub table: String,
    pub operations: BTreeSet<Operation>,
}

/// The generated method a query turns into, with everything it touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataAccessMethod {
    pub method_name: String,
    pub query_name: String,
    pub operation: Operation,
    /// Sorted by table name, one entry per table.
    pub table_operations: Vec<TableOperation>,
}

impl DataAccessMethod {
    pub fn new(
        method_name: impl Into<String>,
        query_name: impl Into<String>,
        operation: Operation,
        tables: BTreeMap<String, BTreeSet<Operation>>,
    ) -> Self {
        let table_operations = tables
            .into_iter()
            .map(|(table, operations)| TableOperation { table, operations })
            .collect();
        Self {
            method_name: method_name.into(),
            query_name: query_name.into(),
            operation,
            table_operations,
        }
    }

    /// Operations this method performs on `table`, if it touches it at all.
    pub fn operations_on(&self, table: &str) -> Option<&BTreeSet<Operation>> {
        self.table_operations
            .iter()
            .find(|t| t.table == table)
            .map(|t| &t.operations)
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.table_operations.iter().map(|t| t.table.as_str())
    }
}
