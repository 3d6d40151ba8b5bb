//! Centralized limits and thresholds for the gradus type checker.
//!
//! This module provides shared constants for recursion depths, operation
//! counts and stack growth used by the solver and the validator.
//!
//! # Solver recursion limits
//!
//! The solver turns these constants into named presets via
//! `gradus_solver::recursion::RecursionProfile`; call sites should use a
//! profile instead of reaching for the raw numbers.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting of relation checks inside one top-level `check` call.
///
/// Every union branch, method parameter and return type adds one level.
/// Cyclic class hierarchies are stopped much earlier by the trace, so only
/// pathological, non-cyclic signature sets reach this limit.
///
/// # Example
///
/// ```text
/// class Deep0 def foo: -> Deep1 end
/// class Deep1 def foo: -> Deep2 end
/// ...
/// class Deep300 def foo: -> Integer end
/// ```
pub const MAX_RELATION_DEPTH: u32 = 256;

/// Maximum number of relation steps in one top-level `check` call.
pub const MAX_RELATION_ITERATIONS: u32 = 200_000;

/// Maximum depth of an ancestor chain (superclasses plus mixins).
pub const MAX_ANCESTOR_DEPTH: u32 = 128;

/// Maximum nesting of union/intersection members while resolving an
/// interface.
pub const MAX_INTERFACE_RESOLUTION_DEPTH: u32 = 64;

// =============================================================================
// Stack Growth
// =============================================================================

/// Remaining stack below which a recursive relation step grows the stack.
pub const STACK_RED_ZONE: usize = 64 * 1024;

/// Size of each stack segment allocated when the red zone is reached.
pub const STACK_GROWTH: usize = 1024 * 1024;

// =============================================================================
// Capacity Hints
// =============================================================================

/// Expected number of entries on a relation trace; used to pre-size stacks.
pub const TRACE_CAPACITY_HINT: usize = 16;
