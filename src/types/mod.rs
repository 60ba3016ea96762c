//! Shared types for queries, scanned functions, views and diagnostics.

mod diagnostics;
mod function;
mod query;
mod views;

pub use diagnostics::{
    Advisory, AdvisoryKind, CancellationNotice, CycleWarning, Diagnostics, QueryDiagnostic,
    UnresolvedMethodWarning,
};
pub use function::{format_location, CallSite, Function};
pub use query::{Cardinality, DataAccessMethod, Operation, Query, TableOperation};
pub use views::{FunctionView, FunctionViewEntry, Summary, TableAccess, TableView, TableViewEntry};
