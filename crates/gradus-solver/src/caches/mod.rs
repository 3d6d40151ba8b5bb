//! Shared caches and query tracing.

pub mod interface_cache;
pub(crate) mod query_trace;
pub mod relation_cache;

pub use interface_cache::InterfaceCache;
pub use relation_cache::{CachedOutcome, RelationCache, RelationCacheStats};
