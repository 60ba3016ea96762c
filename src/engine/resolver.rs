//! Transitive resolution: every function's reachable data-access methods.
//!
//! Roots are resolved in parallel. Each traversal is an iterative
//! Tarjan-style depth-first search over an explicit frame stack, and
//! members of one strongly connected group share a single reachable set.
//! Cycles come from a separate sequential walk in id order, so the report
//! does not depend on thread scheduling.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::cancel::Cancellable;
use super::graph::{DependencyGraph, FunctionId, MethodId, NodeRef};
use crate::dedup::DeduplicationFilter;

pub type MethodSet = Arc<BTreeSet<MethodId>>;

/// Function -> reachable-methods store shared by the parallel traversals.
///
/// Only complete sets are stored. Two traversals may finish the same
/// function; the writer re-checks under the write lock so the first set
/// stored is the one everybody sees.
#[derive(Debug, Default)]
pub struct ReachabilityMemo {
    inner: RwLock<HashMap<FunctionId, MethodSet>>,
}

impl ReachabilityMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: FunctionId) -> Option<MethodSet> {
        self.inner.read().get(&id).cloned()
    }

    /// Store `set` unless another writer got there first; returns the stored set.
    pub fn insert(&self, id: FunctionId, set: MethodSet) -> MethodSet {
        let mut guard = self.inner.write();
        guard.entry(id).or_insert(set).clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What a full resolution pass produced.
#[derive(Debug, Default)]
pub struct ResolverOutcome {
    /// Only functions that finished resolving; all of them unless cancelled.
    pub reachable: BTreeMap<FunctionId, MethodSet>,
    /// Each cycle rotated so its smallest function id comes first.
    pub cycles: Vec<Vec<FunctionId>>,
    pub cancelled: bool,
}

struct Frame {
    node: FunctionId,
    next_edge: usize,
}

/// Per-traversal bookkeeping. Discarded when the traversal returns.
#[derive(Default)]
struct Traversal {
    counter: usize,
    index: HashMap<FunctionId, usize>,
    lowlink: HashMap<FunctionId, usize>,
    group_stack: Vec<FunctionId>,
    on_group_stack: HashSet<FunctionId>,
    path: Vec<Frame>,
    partial: HashMap<FunctionId, BTreeSet<MethodId>>,
}

impl Traversal {
    fn push(&mut self, node: FunctionId) {
        self.index.insert(node, self.counter);
        self.lowlink.insert(node, self.counter);
        self.counter += 1;
        self.group_stack.push(node);
        self.on_group_stack.insert(node);
        self.path.push(Frame { node, next_edge: 0 });
        self.partial.insert(node, BTreeSet::new());
    }

    fn lower(&mut self, node: FunctionId, value: usize) {
        if let Some(low) = self.lowlink.get_mut(&node) {
            *low = (*low).min(value);
        }
    }
}

/// Collects cycles, dropping rotations of ones already seen.
#[derive(Default)]
struct CycleLog {
    seen: DeduplicationFilter<Vec<FunctionId>>,
    cycles: Vec<Vec<FunctionId>>,
}

impl CycleLog {
    fn record(&mut self, members: Vec<FunctionId>) {
        let start = members
            .iter()
            .enumerate()
            .min_by_key(|(_, id)| **id)
            .map(|(position, _)| position)
            .unwrap_or(0);
        let mut canonical = members;
        canonical.rotate_left(start);
        if self.seen.should_process(canonical.clone()) {
            self.cycles.push(canonical);
        }
    }
}

pub struct TransitiveResolver<'g> {
    graph: &'g DependencyGraph,
    memo: &'g ReachabilityMemo,
}

impl<'g> TransitiveResolver<'g> {
    pub fn new(graph: &'g DependencyGraph, memo: &'g ReachabilityMemo) -> Self {
        Self { graph, memo }
    }

    /// Resolve every function, checking `cancel` before each root. Roots
    /// already started run to completion, so every function reported is
    /// fully resolved.
    pub fn resolve_all(&self, cancel: &dyn Cancellable) -> ResolverOutcome {
        let stopped = AtomicBool::new(false);
        self.graph.function_ids().into_par_iter().for_each(|id| {
            if stopped.load(Ordering::Relaxed) || cancel.is_cancelled() {
                stopped.store(true, Ordering::Relaxed);
                return;
            }
            if self.memo.get(id).is_none() {
                self.traverse(id);
            }
        });
        let cancelled = stopped.into_inner();

        let reachable: BTreeMap<FunctionId, MethodSet> = self
            .graph
            .function_ids()
            .filter_map(|id| self.memo.get(id).map(|set| (id, set)))
            .collect();
        if cancelled {
            warn!(
                resolved = reachable.len(),
                total = self.graph.function_count(),
                "resolution cancelled"
            );
        }

        let mut cycles = self.find_cycles();
        if cancelled {
            cycles.retain(|members| members.iter().all(|id| reachable.contains_key(id)));
        }
        cycles.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

        ResolverOutcome {
            reachable,
            cycles,
            cancelled,
        }
    }

    /// Reachable methods of one function, resolving it on demand.
    #[cfg(test)]
    pub fn reachable(&self, id: FunctionId) -> MethodSet {
        if let Some(set) = self.memo.get(id) {
            return set;
        }
        self.traverse(id);
        self.memo.get(id).unwrap_or_default()
    }

    /// Depth-first walk over function edges in id order; every back edge
    /// onto the current path closes one cycle.
    fn find_cycles(&self) -> Vec<Vec<FunctionId>> {
        let mut log = CycleLog::default();
        let mut visited: HashSet<FunctionId> = HashSet::new();

        for root in self.graph.function_ids() {
            if !visited.insert(root) {
                continue;
            }
            let mut path = vec![Frame { node: root, next_edge: 0 }];
            let mut position: HashMap<FunctionId, usize> = HashMap::from([(root, 0)]);

            while let Some(frame) = path.last_mut() {
                let node = frame.node;
                let edges = self.graph.edges(node);
                if frame.next_edge == edges.len() {
                    path.pop();
                    position.remove(&node);
                    continue;
                }
                let edge = edges[frame.next_edge];
                frame.next_edge += 1;

                let NodeRef::Function(callee) = edge.target else {
                    continue;
                };
                if let Some(&at) = position.get(&callee) {
                    let members: Vec<FunctionId> = path[at..].iter().map(|f| f.node).collect();
                    debug!(length = members.len(), "back edge closes a cycle");
                    log.record(members);
                } else if visited.insert(callee) {
                    position.insert(callee, path.len());
                    path.push(Frame {
                        node: callee,
                        next_edge: 0,
                    });
                }
            }
        }
        log.cycles
    }

    fn traverse(&self, root: FunctionId) {
        let mut t = Traversal::default();
        t.push(root);

        while let Some(frame) = t.path.last_mut() {
            let node = frame.node;
            let edges = self.graph.edges(node);

            if frame.next_edge < edges.len() {
                let edge = edges[frame.next_edge];
                frame.next_edge += 1;

                match edge.target {
                    NodeRef::Method(method) => {
                        t.partial.entry(node).or_default().insert(method);
                    }
                    NodeRef::Function(callee) => {
                        if let Some(done) = self.memo.get(callee) {
                            t.partial.entry(node).or_default().extend(done.iter().copied());
                        } else if !t.index.contains_key(&callee) {
                            t.push(callee);
                        } else if t.on_group_stack.contains(&callee) {
                            let callee_index = t.index[&callee];
                            t.lower(node, callee_index);
                        }
                    }
                }
                continue;
            }

            // every edge of `node` handled
            t.path.pop();
            let node_low = t.lowlink[&node];
            if let Some(parent) = t.path.last() {
                let parent = parent.node;
                t.lower(parent, node_low);
            }

            if node_low != t.index[&node] {
                continue;
            }

            let mut members = Vec::new();
            while let Some(member) = t.group_stack.pop() {
                t.on_group_stack.remove(&member);
                members.push(member);
                if member == node {
                    break;
                }
            }
            let mut union = BTreeSet::new();
            for member in &members {
                if let Some(set) = t.partial.remove(member) {
                    union.extend(set);
                }
            }
            let shared = Arc::new(union);
            let mut stored = Arc::clone(&shared);
            for member in members {
                stored = self.memo.insert(member, Arc::clone(&shared));
            }

            if let Some(parent) = t.path.last() {
                let parent = parent.node;
                t.partial.entry(parent).or_default().extend(stored.iter().copied());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cancel::CancellationToken;
    use crate::engine::call_site::{classify_call_sites, HeuristicPolicy};
    use crate::engine::graph::{build_graph, ScannedFunction};
    use crate::types::{CallSite, DataAccessMethod, Function, Operation};
    use std::sync::atomic::AtomicUsize;

    const Q: &str = "*db.Queries";

    fn graph_of(functions: &[Function], methods: &[&str]) -> DependencyGraph {
        let methods = methods
            .iter()
            .map(|m| {
                let tables = BTreeMap::from([(m.to_lowercase(), BTreeSet::from([Operation::Select]))]);
                (m.to_string(), DataAccessMethod::new(*m, *m, Operation::Select, tables))
            })
            .collect();
        let policy = HeuristicPolicy::default();
        let scanned: Vec<ScannedFunction<'_>> = functions
            .iter()
            .map(|function| ScannedFunction {
                function,
                data_access: classify_call_sites(&policy, function),
            })
            .collect();
        build_graph(methods, &scanned).0
    }

    fn call(target: &str, line: u32) -> CallSite {
        CallSite::to_function(target.rsplit('.').next().unwrap_or(target), "", target, line)
    }

    fn names(graph: &DependencyGraph, set: &MethodSet) -> Vec<String> {
        set.iter().map(|m| graph.method(*m).method_name.clone()).collect()
    }

    #[test]
    fn test_transitive_chain() {
        let functions = vec![
            Function::new("handler.Get").with_call(call("service.Get", 3)),
            Function::new("service.Get").with_call(CallSite::method("GetUser", Q, 8)),
        ];
        let graph = graph_of(&functions, &["GetUser"]);
        let memo = ReachabilityMemo::new();
        let outcome = TransitiveResolver::new(&graph, &memo).resolve_all(&CancellationToken::new());

        let handler = graph.function_id("handler.Get").unwrap();
        assert_eq!(names(&graph, &outcome.reachable[&handler]), vec!["GetUser"]);
        assert!(outcome.cycles.is_empty());
        assert!(!outcome.cancelled);
    }

    #[test]
    fn test_leaf_resolves_to_empty_set() {
        let functions = vec![Function::new("util.Noop")];
        let graph = graph_of(&functions, &[]);
        let memo = ReachabilityMemo::new();
        let resolver = TransitiveResolver::new(&graph, &memo);
        assert!(resolver.reachable(0).is_empty());
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_two_node_cycle_shares_methods() {
        let functions = vec![
            Function::new("a.A").with_call(call("a.B", 1)).with_call(CallSite::method("GetUser", Q, 2)),
            Function::new("a.B").with_call(call("a.A", 5)).with_call(CallSite::method("GetPost", Q, 6)),
        ];
        let graph = graph_of(&functions, &["GetPost", "GetUser"]);
        let memo = ReachabilityMemo::new();
        let outcome = TransitiveResolver::new(&graph, &memo).resolve_all(&CancellationToken::new());

        assert_eq!(names(&graph, &outcome.reachable[&0]), vec!["GetPost", "GetUser"]);
        assert_eq!(names(&graph, &outcome.reachable[&1]), vec!["GetPost", "GetUser"]);
        assert_eq!(outcome.cycles, vec![vec![0, 1]]);
    }

    #[test]
    fn test_three_node_cycle_reported_once() {
        let functions = vec![
            Function::new("c.X").with_call(call("c.Y", 1)),
            Function::new("c.Y").with_call(call("c.Z", 2)),
            Function::new("c.Z").with_call(call("c.X", 3)).with_call(CallSite::method("CreateUser", Q, 4)),
            Function::new("c.Entry").with_call(call("c.Y", 9)),
        ];
        let graph = graph_of(&functions, &["CreateUser"]);
        let memo = ReachabilityMemo::new();
        let outcome = TransitiveResolver::new(&graph, &memo).resolve_all(&CancellationToken::new());

        assert_eq!(outcome.cycles.len(), 1);
        let cycle: Vec<&str> = outcome.cycles[0]
            .iter()
            .map(|id| graph.function(*id).qualified_name.as_str())
            .collect();
        assert_eq!(cycle, vec!["c.X", "c.Y", "c.Z"]);
        for id in graph.function_ids() {
            assert_eq!(names(&graph, &outcome.reachable[&id]), vec!["CreateUser"]);
        }
    }

    #[test]
    fn test_self_call_is_a_cycle() {
        let functions = vec![Function::new("r.Walk").with_call(call("r.Walk", 4))];
        let graph = graph_of(&functions, &[]);
        let memo = ReachabilityMemo::new();
        let outcome = TransitiveResolver::new(&graph, &memo).resolve_all(&CancellationToken::new());
        assert_eq!(outcome.cycles, vec![vec![0]]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let depth = 50_000;
        let mut functions: Vec<Function> = (0..depth)
            .map(|i| Function::new(format!("chain.F{:06}", i)).with_call(call(&format!("chain.F{:06}", i + 1), 1)))
            .collect();
        functions.push(Function::new(format!("chain.F{:06}", depth)).with_call(CallSite::method("GetUser", Q, 1)));
        let graph = graph_of(&functions, &["GetUser"]);
        let memo = ReachabilityMemo::new();
        let outcome = TransitiveResolver::new(&graph, &memo).resolve_all(&CancellationToken::new());
        assert_eq!(outcome.reachable.len(), depth + 1);
        assert!(outcome.reachable.values().all(|set| set.len() == 1));
    }

    #[test]
    fn test_cancelled_before_start_returns_partial() {
        let functions = vec![Function::new("a.A"), Function::new("a.B")];
        let graph = graph_of(&functions, &[]);
        let memo = ReachabilityMemo::new();
        let token = CancellationToken::new();
        token.cancel();
        let outcome = TransitiveResolver::new(&graph, &memo).resolve_all(&token);
        assert!(outcome.cancelled);
        assert!(outcome.reachable.is_empty());
    }

    /// Reports cancellation once it has been asked `limit` times.
    struct TripAfter {
        limit: usize,
        checks: AtomicUsize,
    }

    impl TripAfter {
        fn new(limit: usize) -> Self {
            Self {
                limit,
                checks: AtomicUsize::new(0),
            }
        }
    }

    impl Cancellable for TripAfter {
        fn is_cancelled(&self) -> bool {
            self.checks.fetch_add(1, Ordering::SeqCst) >= self.limit
        }

        fn cancel(&self) {
            self.checks.store(self.limit, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_cancelled_mid_run_keeps_finished_roots() {
        let functions: Vec<Function> = (0..6)
            .map(|i| Function::new(format!("svc.F{}", i)).with_call(CallSite::method("GetUser", Q, 1)))
            .collect();
        let graph = graph_of(&functions, &["GetUser"]);
        let memo = ReachabilityMemo::new();
        let outcome = TransitiveResolver::new(&graph, &memo).resolve_all(&TripAfter::new(2));

        assert!(outcome.cancelled);
        assert_eq!(outcome.reachable.len(), 2);
        for set in outcome.reachable.values() {
            assert_eq!(names(&graph, set), vec!["GetUser"]);
        }
    }

    #[test]
    fn test_cancelled_mid_run_sets_are_complete() {
        let functions = vec![
            Function::new("h.A").with_call(call("s.B", 1)),
            Function::new("s.B").with_call(call("s.C", 2)).with_call(CallSite::method("GetPost", Q, 3)),
            Function::new("s.C").with_call(call("s.B", 4)).with_call(CallSite::method("GetUser", Q, 5)),
            Function::new("h.D").with_call(call("s.C", 6)),
            Function::new("h.E"),
        ];
        let graph = graph_of(&functions, &["GetPost", "GetUser"]);
        let memo = ReachabilityMemo::new();
        let outcome = TransitiveResolver::new(&graph, &memo).resolve_all(&TripAfter::new(1));

        assert!(outcome.cancelled);
        assert!(!outcome.reachable.is_empty());
        assert!(outcome.reachable.len() < graph.function_count());
        for (id, set) in &outcome.reachable {
            assert_eq!(**set, graph.reachable_methods(*id), "{}", graph.function(*id).qualified_name);
        }
        for cycle in &outcome.cycles {
            assert!(cycle.iter().all(|id| outcome.reachable.contains_key(id)));
        }
    }

    #[test]
    fn test_parallel_runs_agree() {
        let functions = vec![
            Function::new("a.A").with_call(call("a.B", 1)).with_call(CallSite::method("GetUser", Q, 2)),
            Function::new("a.B").with_call(call("a.A", 3)).with_call(call("c.X", 4)),
            Function::new("c.X").with_call(call("c.Y", 5)),
            Function::new("c.Y").with_call(call("c.X", 6)).with_call(CallSite::method("GetPost", Q, 7)),
        ];
        let graph = graph_of(&functions, &["GetPost", "GetUser"]);
        let first = TransitiveResolver::new(&graph, &ReachabilityMemo::new()).resolve_all(&CancellationToken::new());

        for _ in 0..20 {
            let memo = ReachabilityMemo::new();
            let again = TransitiveResolver::new(&graph, &memo).resolve_all(&CancellationToken::new());
            assert_eq!(again.reachable, first.reachable);
            assert_eq!(again.cycles, first.cycles);
        }
        assert_eq!(first.cycles, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_memo_keeps_first_insert() {
        let memo = ReachabilityMemo::new();
        let first = memo.insert(3, Arc::new(BTreeSet::from([1])));
        let second = memo.insert(3, Arc::new(BTreeSet::from([2])));
        assert_eq!(first, second);
        assert_eq!(memo.get(3).unwrap().iter().copied().collect::<Vec<_>>(), vec![1]);
    }
}
