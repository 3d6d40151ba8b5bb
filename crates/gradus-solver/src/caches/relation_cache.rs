//! Memoized outcomes of closed relations.
//!
//! Only relations without free variables or placeholders are stored, so an
//! entry is valid for any constraint store and any context. The cache is
//! concurrent: one `Arc<RelationCache>` can back checkers running on several
//! threads against the same environment.

use crate::diagnostics::Failure;
use crate::relation::Relation;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// A stored outcome.
///
/// A failure's trace is stored relative to the cached relation: it starts
/// with the relation itself (or is empty when the relation was decided
/// without structural expansion).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CachedOutcome {
    Success,
    Failure(Failure),
}

impl CachedOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CachedOutcome::Success)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelationCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct RelationCache {
    entries: DashMap<Relation, CachedOutcome>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RelationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `relation`, counting the hit or miss.
    pub fn get(&self, relation: &Relation) -> Option<CachedOutcome> {
        match self.entries.get(relation) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value().clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `outcome` unless an outcome is already present.
    ///
    /// Outcomes of closed relations are deterministic, so a concurrent
    /// writer always stores the same value.
    pub fn insert(&self, relation: Relation, outcome: CachedOutcome) {
        trace!(relation = %relation, success = outcome.is_success(), "RelationCache::insert");
        self.entries.entry(relation).or_insert(outcome);
    }

    /// Membership test without touching the statistics.
    pub fn contains(&self, relation: &Relation) -> bool {
        self.entries.contains_key(relation)
    }

    /// The stored outcome without touching the statistics.
    pub fn peek(&self, relation: &Relation) -> Option<CachedOutcome> {
        self.entries.get(relation).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Required whenever the environment changes.
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> RelationCacheStats {
        RelationCacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Every cached relation, in arbitrary order.
    pub fn relations(&self) -> Vec<Relation> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/relation_cache_tests.rs"]
mod tests;
