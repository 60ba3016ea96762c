//! Recoverable problems collected while resolving.

use serde::Serialize;

use crate::engine::ClassificationError;

/// A query that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryDiagnostic {
    pub query: String,
    pub error: ClassificationError,
}

/// An accepted data-access call whose method no query generates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UnresolvedMethodWarning {
    pub function: String,
    pub method: String,
    pub receiver_type: String,
    pub line: u32,
}

/// A call cycle, rotated so the smallest function name comes first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CycleWarning {
    pub functions: Vec<String>,
}

impl CycleWarning {
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn involves(&self, function: &str) -> bool {
        self.functions.iter().any(|f| f == function)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    HighTableAccess,
    HighFunctionAccess,
    MixedOperations,
}

/// Informational finding about access patterns; never blocks a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub count: usize,
    pub message: String,
}

/// Present when a run was cancelled before every function resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancellationNotice {
    pub resolved_functions: usize,
    pub total_functions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub classification_errors: Vec<QueryDiagnostic>,
    pub unresolved_methods: Vec<UnresolvedMethodWarning>,
    pub cycles: Vec<CycleWarning>,
    pub advisories: Vec<Advisory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled: Option<CancellationNotice>,
}

impl Diagnostics {
    /// Skipped queries plus unresolved calls; what an error budget counts.
    pub fn error_count(&self) -> usize {
        self.classification_errors.len() + self.unresolved_methods.len()
    }

    pub fn is_clean(&self) -> bool {
        self.error_count() == 0 && self.cycles.is_empty() && self.cancelled.is_none()
    }
}
