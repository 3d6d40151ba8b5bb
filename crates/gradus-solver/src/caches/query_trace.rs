//! Structured query tracing for solver entry points.
//!
//! Events use target `gradus::query_json` and are intended to be consumed
//! with a JSON `tracing-subscriber` layer filtered on that target.
//!
//! Environment:
//! - `GRADUS_QUERY_RUN_ID`: optional run identifier attached to every event.

use crate::relation::Relation;
use crate::types::Type;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Level, trace};

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);
static QUERY_RUN_ID: OnceLock<String> = OnceLock::new();

#[inline]
pub(crate) fn enabled() -> bool {
    tracing::enabled!(target: "gradus::query_json", Level::TRACE)
}

#[inline]
pub(crate) fn next_query_id() -> u64 {
    NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed)
}

#[inline]
fn run_id() -> &'static str {
    QUERY_RUN_ID
        .get_or_init(|| {
            std::env::var("GRADUS_QUERY_RUN_ID").unwrap_or_else(|_| "default".to_string())
        })
        .as_str()
}

#[inline]
pub(crate) fn relation_start(query_id: u64, op: &'static str, relation: &Relation) {
    trace!(
        target: "gradus::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op,
        sub_type = %relation.sub_type,
        super_type = %relation.super_type
    );
}

#[inline]
pub(crate) fn relation_end(query_id: u64, op: &'static str, result: bool, cache_hit: bool) {
    trace!(
        target: "gradus::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op,
        result,
        cache_hit
    );
}

#[inline]
pub(crate) fn unary_start(query_id: u64, op: &'static str, input: &Type) {
    trace!(
        target: "gradus::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op,
        input_type = %input
    );
}

#[inline]
pub(crate) fn unary_end(query_id: u64, op: &'static str, methods: usize, cache_hit: bool) {
    trace!(
        target: "gradus::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op,
        methods,
        cache_hit
    );
}
