//! Memoized interfaces of closed nominal types.

use crate::interface::Interface;
use crate::types::Type;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct InterfaceCache {
    entries: DashMap<Type, Arc<Interface>>,
    hits: AtomicU64,
}

impl InterfaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ty: &Type) -> Option<Arc<Interface>> {
        let found = self.entries.get(ty).map(|entry| Arc::clone(entry.value()));
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Store `interface` for `ty`, returning the shared copy that ended up
    /// in the cache.
    pub fn insert(&self, ty: Type, interface: Arc<Interface>) -> Arc<Interface> {
        Arc::clone(self.entries.entry(ty).or_insert(interface).value())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Invalidate wholesale.
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
    }
}
