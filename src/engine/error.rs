//! Error types for the resolution engine.

use serde::Serialize;
use thiserror::Error;

use crate::types::Operation;

/// Why a query could not become a data-access method. The query is skipped;
/// the rest of the batch continues.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassificationError {
    #[error("query text is empty")]
    EmptyQuery,

    #[error("query text could not be tokenized: {message}")]
    Unreadable { message: String },

    #[error("unrecognized statement keyword '{keyword}'")]
    UnknownOperation { keyword: String },

    #[error("auxiliary subqueries are not followed by a statement")]
    DanglingWith,

    #[error("no target table found for {operation} statement")]
    MissingTargetTable { operation: Operation },

    #[error("method '{method}' is already generated by query '{first_query}'")]
    DuplicateMethod { method: String, first_query: String },
}

/// Internal inconsistency found while assembling the views. Fatal to the
/// run that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("view entry for '{function}' has no function in the graph")]
    UnknownFunction { function: String },

    #[error("function '{function}' lists method '{method}' which is not in the graph")]
    UnknownMethod { function: String, method: String },

    #[error("function '{function}' lists method '{method}' which it cannot reach")]
    UnreachableMethod { function: String, method: String },

    #[error("function '{function}' claims {operation} on '{table}' without a backing method")]
    UnbackedOperation {
        function: String,
        table: String,
        operation: Operation,
    },

    #[error("views disagree about '{function}' on '{table}'")]
    ViewMismatch { function: String, table: String },

    #[error("total for {operation} on '{table}' is {actual}, expected {expected}")]
    TotalMismatch {
        table: String,
        operation: Operation,
        expected: usize,
        actual: usize,
    },
}
