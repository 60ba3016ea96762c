//! Call-site classification: which calls in a function body invoke a
//! generated data-access method.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dedup::deduplicate_retain;
use crate::types::{CallSite, Function};

/// Transaction, statement and cursor control on database handles. Never a
/// generated method even when called on a query container.
pub const PERSISTENCE_PRIMITIVES: &[&str] = &[
    "Begin",
    "BeginTx",
    "Close",
    "ColumnTypes",
    "Columns",
    "Commit",
    "Conn",
    "Driver",
    "Err",
    "Exec",
    "ExecContext",
    "Next",
    "Ping",
    "PingContext",
    "Prepare",
    "PrepareContext",
    "Query",
    "QueryContext",
    "QueryRow",
    "QueryRowContext",
    "Rollback",
    "Scan",
    "SetConnMaxLifetime",
    "SetMaxIdleConns",
    "SetMaxOpenConns",
    "Stats",
    "WithTx",
];

/// The three predicates the classifier applies, in order.
pub trait CallSitePolicy: Send + Sync + fmt::Debug {
    fn is_persistence_primitive(&self, callee: &str) -> bool;

    fn is_query_container(&self, receiver_type: &str) -> bool;

    fn is_exported(&self, callee: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerMatch {
    /// Receiver type name contains the marker anywhere.
    #[default]
    Contains,
    /// Receiver type name ends with the marker.
    Suffix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallSiteOptions {
    pub container_marker: String,
    pub marker_match: MarkerMatch,
    pub extra_primitives: Vec<String>,
    pub exported_only: bool,
}

impl Default for CallSiteOptions {
    fn default() -> Self {
        Self {
            container_marker: "queries".to_string(),
            marker_match: MarkerMatch::Contains,
            extra_primitives: Vec::new(),
            exported_only: true,
        }
    }
}

/// Name-based policy: denylist, receiver type marker, exported names.
#[derive(Debug, Clone)]
pub struct HeuristicPolicy {
    primitives: HashSet<String>,
    marker: String,
    marker_match: MarkerMatch,
    exported_only: bool,
}

impl HeuristicPolicy {
    pub fn new(options: &CallSiteOptions) -> Self {
        let primitives = PERSISTENCE_PRIMITIVES
            .iter()
            .map(|p| p.to_string())
            .chain(options.extra_primitives.iter().cloned())
            .collect();
        Self {
            primitives,
            marker: options.container_marker.to_lowercase(),
            marker_match: options.marker_match,
            exported_only: options.exported_only,
        }
    }
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self::new(&CallSiteOptions::default())
    }
}

impl CallSitePolicy for HeuristicPolicy {
    fn is_persistence_primitive(&self, callee: &str) -> bool {
        self.primitives.contains(callee)
    }

    fn is_query_container(&self, receiver_type: &str) -> bool {
        let name = receiver_type.trim_start_matches(['*', '&']).to_lowercase();
        match self.marker_match {
            MarkerMatch::Contains => name.contains(&self.marker),
            MarkerMatch::Suffix => name.ends_with(&self.marker),
        }
    }

    fn is_exported(&self, callee: &str) -> bool {
        !self.exported_only || callee.chars().next().is_some_and(char::is_uppercase)
    }
}

/// Outcome of applying the policy to one call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Primitive,
    ForeignReceiver,
    Unexported,
    Accepted,
}

pub fn judge(policy: &dyn CallSitePolicy, site: &CallSite) -> Verdict {
    if policy.is_persistence_primitive(&site.callee) {
        Verdict::Primitive
    } else if !policy.is_query_container(&site.receiver_type) {
        Verdict::ForeignReceiver
    } else if !policy.is_exported(&site.callee) {
        Verdict::Unexported
    } else {
        Verdict::Accepted
    }
}

/// An accepted call: the method it names and where it happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataAccessCall {
    pub method: String,
    pub receiver_type: String,
    pub line: u32,
}

/// Accepted data-access calls of one function, in source order, with
/// repeated `(method, line)` pairs collapsed.
pub fn classify_call_sites(policy: &dyn CallSitePolicy, function: &Function) -> Vec<DataAccessCall> {
    let mut calls: Vec<DataAccessCall> = function
        .call_sites
        .iter()
        .filter(|site| {
            let verdict = judge(policy, site);
            if verdict != Verdict::Accepted && site.target.is_none() {
                tracing::trace!(
                    function = %function.qualified_name,
                    callee = %site.callee,
                    ?verdict,
                    "call site rejected"
                );
            }
            verdict == Verdict::Accepted
        })
        .map(|site| DataAccessCall {
            method: site.callee.clone(),
            receiver_type: site.receiver_type.clone(),
            line: site.line,
        })
        .collect();

    calls.sort_by_key(|c| c.line);
    deduplicate_retain(&mut calls, |c| (c.method.clone(), c.line));
    calls
}
