//! Dependency graph over functions and data-access methods.
//!
//! Nodes are addressed by index. Function ids follow sorted qualified names
//! and method ids follow sorted method names, so iterating ids in order is
//! deterministic.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use tracing::{debug, info, warn};

use super::call_site::DataAccessCall;
use crate::types::{DataAccessMethod, Function, UnresolvedMethodWarning};

pub type FunctionId = usize;
pub type MethodId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeRef {
    Function(FunctionId),
    Method(MethodId),
}

/// Outgoing edge, carrying the line of the call that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallEdge {
    pub target: NodeRef,
    pub line: u32,
}

/// Location metadata of a function node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionNode {
    pub qualified_name: String,
    pub package: String,
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// Read-only once built.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    functions: Vec<FunctionNode>,
    function_ids: HashMap<String, FunctionId>,
    methods: Vec<DataAccessMethod>,
    method_ids: HashMap<String, MethodId>,
    edges: Vec<Vec<CallEdge>>,
}

impl DependencyGraph {
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    pub fn function(&self, id: FunctionId) -> &FunctionNode {
        &self.functions[id]
    }

    pub fn method(&self, id: MethodId) -> &DataAccessMethod {
        &self.methods[id]
    }

    pub fn function_id(&self, qualified_name: &str) -> Option<FunctionId> {
        self.function_ids.get(qualified_name).copied()
    }

    pub fn method_id(&self, method_name: &str) -> Option<MethodId> {
        self.method_ids.get(method_name).copied()
    }

    /// Outgoing edges, sorted by target, one per target.
    pub fn edges(&self, id: FunctionId) -> &[CallEdge] {
        &self.edges[id]
    }

    pub fn function_ids(&self) -> std::ops::Range<FunctionId> {
        0..self.functions.len()
    }

    /// Methods reachable from `from`, found by a plain breadth-first walk
    /// that does not consult the resolver memo.
    pub fn reachable_methods(&self, from: FunctionId) -> BTreeSet<MethodId> {
        let mut found = BTreeSet::new();
        let mut visited = vec![false; self.functions.len()];
        let mut queue = VecDeque::from([from]);
        visited[from] = true;
        while let Some(current) = queue.pop_front() {
            for edge in &self.edges[current] {
                match edge.target {
                    NodeRef::Method(method) => {
                        found.insert(method);
                    }
                    NodeRef::Function(next) => {
                        if !visited[next] {
                            visited[next] = true;
                            queue.push_back(next);
                        }
                    }
                }
            }
        }
        found
    }
}

/// A scanned function with its accepted data-access calls.
#[derive(Debug, Clone)]
pub struct ScannedFunction<'a> {
    pub function: &'a Function,
    pub data_access: Vec<DataAccessCall>,
}

struct MergedFunction<'a> {
    node: FunctionNode,
    records: Vec<&'a ScannedFunction<'a>>,
}

/// Merge classified methods and scanned functions into one graph.
///
/// Duplicate function records merge into one node: the first location wins
/// and call sites concatenate.
pub fn build_graph(
    methods: BTreeMap<String, DataAccessMethod>,
    scanned: &[ScannedFunction<'_>],
) -> (DependencyGraph, Vec<UnresolvedMethodWarning>) {
    let mut merged: BTreeMap<&str, MergedFunction<'_>> = BTreeMap::new();
    for record in scanned {
        let f = record.function;
        merged
            .entry(f.qualified_name.as_str())
            .or_insert_with(|| MergedFunction {
                node: FunctionNode {
                    qualified_name: f.qualified_name.clone(),
                    package: f.package.clone(),
                    file: f.file.clone(),
                    start_line: f.start_line,
                    end_line: f.end_line,
                },
                records: Vec::new(),
            })
            .records
            .push(record);
    }

    let mut graph = DependencyGraph::default();
    for (index, (name, method)) in methods.into_iter().enumerate() {
        graph.method_ids.insert(name, index);
        graph.methods.push(method);
    }
    for (index, name) in merged.keys().enumerate() {
        graph.function_ids.insert(name.to_string(), index);
    }

    let mut unresolved = Vec::new();
    for (id, entry) in merged.into_values().enumerate() {
        let mut edges: Vec<CallEdge> = Vec::new();
        for record in &entry.records {
            for call in &record.data_access {
                match graph.method_ids.get(&call.method) {
                    Some(&method) => edges.push(CallEdge {
                        target: NodeRef::Method(method),
                        line: call.line,
                    }),
                    None => {
                        warn!(function = %entry.node.qualified_name, method = %call.method, line = call.line, "no query generates called method");
                        unresolved.push(UnresolvedMethodWarning {
                            function: entry.node.qualified_name.clone(),
                            method: call.method.clone(),
                            receiver_type: call.receiver_type.clone(),
                            line: call.line,
                        });
                    }
                }
            }
            for site in &record.function.call_sites {
                let Some(target) = site.target.as_deref() else {
                    continue;
                };
                match graph.function_ids.get(target) {
                    Some(&callee) => edges.push(CallEdge {
                        target: NodeRef::Function(callee),
                        line: site.line,
                    }),
                    None => {
                        debug!(function = %entry.node.qualified_name, call_target = target, "call target outside analyzed functions");
                    }
                }
            }
        }

        edges.sort_by_key(|e| (e.target, e.line));
        edges.dedup_by_key(|e| e.target);
        debug_assert_eq!(id, graph.edges.len());
        graph.edges.push(edges);
        graph.functions.push(entry.node);
    }

    unresolved.sort();
    unresolved.dedup();
    info!(
        functions = graph.function_count(),
        methods = graph.method_count(),
        edges = graph.edge_count(),
        unresolved = unresolved.len(),
        "built dependency graph"
    );
    (graph, unresolved)
}
