//! Dependency resolution engine.
//!
//! Data flows strictly left to right: queries and scanned functions are
//! classified independently (in parallel), merged into a graph, resolved
//! transitively, and projected into two views.
//!
//! ```ignore
//! let resolution = table_deps::engine::resolve(&queries, &functions)?;
//! for (table, entry) in &resolution.table_view {
//!     println!("{table}: {} functions", entry.accessed_by.len());
//! }
//! ```

pub mod call_site;
mod cancel;
mod error;
pub mod graph;
pub mod resolver;
pub mod sql;
pub mod views;

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use call_site::{CallSiteOptions, CallSitePolicy, HeuristicPolicy, MarkerMatch};
pub use cancel::{Cancellable, CancellationToken};
pub use error::{ClassificationError, ValidationError};
pub use sql::{AuxiliaryTables, Dialect, QueryClassifier, SqlOptions};
pub use views::AdvisoryThresholds;

use crate::types::{
    CancellationNotice, CycleWarning, Diagnostics, Function, FunctionView, Query, Summary, TableView,
};
use graph::{build_graph, ScannedFunction};
use resolver::{ReachabilityMemo, TransitiveResolver};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub sql: SqlOptions,
    pub call_sites: CallSiteOptions,
    pub advisories: AdvisoryThresholds,
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub summary: Summary,
    pub diagnostics: Diagnostics,
    pub function_view: FunctionView,
    pub table_view: TableView,
}

/// Configured entry point. Holds options only; every run builds and drops
/// its own graph and memo.
#[derive(Debug, Clone)]
pub struct Engine {
    classifier: QueryClassifier,
    policy: Arc<dyn CallSitePolicy>,
    advisories: AdvisoryThresholds,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            classifier: QueryClassifier::new(options.sql),
            policy: Arc::new(HeuristicPolicy::new(&options.call_sites)),
            advisories: options.advisories,
        }
    }

    /// Replace the call-site heuristic.
    pub fn with_policy(mut self, policy: impl CallSitePolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn resolve(&self, queries: &[Query], functions: &[Function]) -> Result<Resolution, ValidationError> {
        self.resolve_with(queries, functions, &CancellationToken::new())
    }

    /// Run the full pipeline. `cancel` is checked between top-level function
    /// resolutions; a cancelled run returns what finished, with a notice.
    pub fn resolve_with(
        &self,
        queries: &[Query],
        functions: &[Function],
        cancel: &dyn Cancellable,
    ) -> Result<Resolution, ValidationError> {
        info!(queries = queries.len(), functions = functions.len(), "resolving table dependencies");

        let (methods, classification_errors) = self.classifier.classify_all(queries);
        let policy = self.policy.as_ref();
        let scanned: Vec<ScannedFunction<'_>> = functions
            .par_iter()
            .map(|function| ScannedFunction {
                function,
                data_access: call_site::classify_call_sites(policy, function),
            })
            .collect();

        let (graph, unresolved_methods) = build_graph(methods, &scanned);

        let memo = ReachabilityMemo::new();
        let outcome = TransitiveResolver::new(&graph, &memo).resolve_all(cancel);

        let function_view = views::function_view(&graph, &outcome.reachable);
        let table_view = views::table_view(&function_view);
        views::validate(&graph, &function_view, &table_view)?;

        let cycles = outcome
            .cycles
            .iter()
            .map(|members| CycleWarning {
                functions: members
                    .iter()
                    .map(|id| graph.function(*id).qualified_name.clone())
                    .collect(),
            })
            .collect();
        let cancelled = outcome.cancelled.then(|| CancellationNotice {
            resolved_functions: outcome.reachable.len(),
            total_functions: graph.function_count(),
        });

        let diagnostics = Diagnostics {
            classification_errors,
            unresolved_methods,
            cycles,
            advisories: views::advisories(&function_view, &table_view, &self.advisories),
            cancelled,
        };
        let summary = views::summarize(&function_view, &table_view, graph.method_count());
        info!(
            functions = summary.functions,
            tables = summary.tables,
            cycles = diagnostics.cycles.len(),
            "resolution finished"
        );

        Ok(Resolution {
            summary,
            diagnostics,
            function_view,
            table_view,
        })
    }
}

/// Resolve with default options and no cancellation.
pub fn resolve(queries: &[Query], functions: &[Function]) -> Result<Resolution, ValidationError> {
    Engine::default().resolve(queries, functions)
}
