//! Query classification: raw query text to operation kind and table set.

mod lexer;
pub mod naming;
mod statement;

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::ClassificationError;
use crate::types::{DataAccessMethod, Operation, Query, QueryDiagnostic};

use statement::StatementScanner;

/// SQL dialect handed to the tokenizer. Decides identifier quoting,
/// string escapes and comment syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Backtick-quoted identifiers, backslash escapes, `#` comments
    #[serde(rename = "mysql")]
    MySql,
    /// Double-quoted identifiers, `E'...'` and dollar-quoted strings
    #[default]
    #[serde(rename = "postgresql", alias = "postgres")]
    PostgreSql,
    /// Accepts both quoting styles
    Standard,
}

/// How tables read through FROM / JOIN / USING are tagged in UPDATE and DELETE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuxiliaryTables {
    /// They carry the statement's own operation.
    #[default]
    Governing,
    /// They are tagged SELECT.
    Read,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlOptions {
    pub dialect: Dialect,
    #[serde(rename = "case_sensitive_tables")]
    pub case_sensitive: bool,
    pub auxiliary_tables: AuxiliaryTables,
}

/// Turns queries into data-access methods. Holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct QueryClassifier {
    options: SqlOptions,
}

impl QueryClassifier {
    pub fn new(options: SqlOptions) -> Self {
        Self { options }
    }

    pub fn classify(&self, query: &Query) -> Result<DataAccessMethod, ClassificationError> {
        if query.text.trim().is_empty() {
            return Err(ClassificationError::EmptyQuery);
        }

        let tokens = lexer::tokenize(&query.text, self.options.dialect)?;
        let scanner = StatementScanner::new(&tokens, self.options.case_sensitive);
        let governing = scanner.governing()?;
        let extraction = scanner.extract(&governing)?;

        let operation = governing.operation;
        let auxiliary = match (self.options.auxiliary_tables, operation) {
            (AuxiliaryTables::Read, Operation::Update | Operation::Delete) => Operation::Select,
            _ => operation,
        };

        let mut tables: BTreeMap<String, BTreeSet<Operation>> = BTreeMap::new();
        for table in extraction.targets {
            tables.entry(table).or_default().insert(operation);
        }
        for table in extraction.sources {
            tables.entry(table).or_default().insert(auxiliary);
        }
        for (table, operations) in extraction.nested {
            tables.entry(table).or_default().extend(operations);
        }

        let method_name = naming::method_name(&query.name, &query.cardinality);
        debug!(query = %query.name, method = %method_name, %operation, tables = tables.len(), "classified query");
        Ok(DataAccessMethod::new(method_name, &query.name, operation, tables))
    }

    /// Classify a batch in parallel. Results are folded back in input order,
    /// so the first query generating a method name keeps it.
    pub fn classify_all(&self, queries: &[Query]) -> (BTreeMap<String, DataAccessMethod>, Vec<QueryDiagnostic>) {
        let results: Vec<Result<DataAccessMethod, ClassificationError>> =
            queries.par_iter().map(|q| self.classify(q)).collect();

        let mut methods: BTreeMap<String, DataAccessMethod> = BTreeMap::new();
        let mut skipped = Vec::new();
        for (query, result) in queries.iter().zip(results) {
            let outcome = result.and_then(|method| match methods.get(&method.method_name) {
                Some(first) => Err(ClassificationError::DuplicateMethod {
                    method: method.method_name.clone(),
                    first_query: first.query_name.clone(),
                }),
                None => Ok(method),
            });
            match outcome {
                Ok(method) => {
                    methods.insert(method.method_name.clone(), method);
                }
                Err(error) => {
                    debug!(query = %query.name, %error, "skipping query");
                    skipped.push(QueryDiagnostic {
                        query: query.name.clone(),
                        error,
                    });
                }
            }
        }

        info!(methods = methods.len(), skipped = skipped.len(), "classified queries");
        (methods, skipped)
    }
}
