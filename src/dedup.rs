//! Deduplication helpers shared by the classifiers and the resolver.
//!
//! - `deduplicate_retain`: drop repeats from an already ordered vector
//! - `DeduplicationFilter`: reject repeats while collecting

use std::collections::HashSet;
use std::hash::Hash;

/// Keep the first item for every key, preserving order.
///
/// ```ignore
/// calls.sort_by_key(|c| c.line);
/// deduplicate_retain(&mut calls, |c| (c.method.clone(), c.line));
/// ```
pub fn deduplicate_retain<T, F, K>(items: &mut Vec<T>, key_fn: F)
where
    F: Fn(&T) -> K,
    K: Eq + Hash,
{
    let mut seen: HashSet<K> = HashSet::new();
    items.retain(|item| seen.insert(key_fn(item)));
}

/// Remembers keys it has accepted.
///
/// ```ignore
/// let mut filter = DeduplicationFilter::new();
/// if filter.should_process(canonical_cycle.clone()) {
///     cycles.push(canonical_cycle);
/// }
/// ```
#[derive(Debug)]
pub struct DeduplicationFilter<K: Eq + Hash> {
    processed: HashSet<K>,
}

impl<K: Eq + Hash> DeduplicationFilter<K> {
    pub fn new() -> Self {
        Self {
            processed: HashSet::new(),
        }
    }

    /// True the first time `key` is seen.
    pub fn should_process(&mut self, key: K) -> bool {
        self.processed.insert(key)
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

impl<K: Eq + Hash> Default for DeduplicationFilter<K> {
    fn default() -> Self {
        Self::new()
    }
}
