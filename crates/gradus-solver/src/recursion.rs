//! Recursion guard for cycle detection, depth limiting and iteration
//! bounding in recursive relation checks and ancestor walks.
//!
//! # Design
//!
//! `RecursionGuard` keeps the keys currently being visited both as an
//! ordered stack and as a lookup table. The stack is what the subtype
//! checker reports as a failure trace; the table answers "is this relation
//! already assumed?" in constant time and tells at which stack position the
//! assumption was made.
//!
//! It combines three safety mechanisms:
//! 1. **Cycle detection** via the visiting table
//! 2. **Depth limiting** to prevent stack overflow
//! 3. **Iteration bounding** to prevent runaway expansion
//!
//! # Profiles
//!
//! [`RecursionProfile`] provides named presets so call sites never carry raw
//! numbers:
//!
//! ```ignore
//! let guard = RecursionGuard::<Atom>::with_profile(RecursionProfile::AncestorWalk);
//! ```
//!
//! # Safety
//!
//! - **Debug leak detection**: In debug builds, dropping a guard with active
//!   entries panics, catching forgotten `leave()` calls.
//! - **Debug order detection**: In debug builds, leaving a key that is not on
//!   top of the stack panics.
//! - **Overflow protection**: Iteration counting uses saturating arithmetic.

use gradus_common::limits;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// Named recursion limit presets.
///
/// Each profile encodes a `(max_depth, max_iterations)` pair appropriate for
/// one kind of recursive computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecursionProfile {
    /// Subtype checking: nested relations inside one `check` call.
    ///
    /// depth = 256, iterations = 200,000
    SubtypeCheck,

    /// Union and intersection nesting while resolving an interface.
    ///
    /// depth = 64, iterations = 200,000
    InterfaceResolution,

    /// Linearizing superclasses and mixins.
    ///
    /// depth = 128, iterations = 200,000
    AncestorWalk,

    /// Custom limits for one-off or test scenarios.
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    /// Maximum recursion depth for this profile.
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::SubtypeCheck => limits::MAX_RELATION_DEPTH,
            Self::InterfaceResolution => limits::MAX_INTERFACE_RESOLUTION_DEPTH,
            Self::AncestorWalk => limits::MAX_ANCESTOR_DEPTH,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    /// Maximum iteration count for this profile.
    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::SubtypeCheck | Self::InterfaceResolution | Self::AncestorWalk => {
                limits::MAX_RELATION_ITERATIONS
            }
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

// ---------------------------------------------------------------------------
// RecursionResult
// ---------------------------------------------------------------------------

/// Result of attempting to enter a recursive computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    /// Proceed with the computation.
    Entered,
    /// This key is already being visited; the payload is its stack position.
    Cycle(usize),
    /// Maximum recursion depth exceeded.
    DepthExceeded,
    /// Maximum iteration count exceeded.
    IterationExceeded,
}

// ---------------------------------------------------------------------------
// RecursionGuard
// ---------------------------------------------------------------------------

/// Tracks recursion state for cycle detection, depth limiting and iteration
/// bounding.
///
/// # Usage
///
/// ```ignore
/// match guard.enter(key.clone()) {
///     RecursionResult::Entered => {
///         let result = do_work();
///         guard.leave(&key);
///         result
///     }
///     RecursionResult::Cycle(position) => assume_success(position),
///     RecursionResult::DepthExceeded
///     | RecursionResult::IterationExceeded => handle_exceeded(),
/// }
/// ```
pub struct RecursionGuard<K: Hash + Eq + Clone> {
    stack: Vec<K>,
    visiting: FxHashMap<K, usize>,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Clone> RecursionGuard<K> {
    /// Create a guard with explicit limits.
    ///
    /// Prefer [`with_profile`](Self::with_profile) for standard use cases.
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            stack: Vec::with_capacity(limits::TRACE_CAPACITY_HINT),
            visiting: FxHashMap::default(),
            iterations: 0,
            max_depth,
            max_iterations,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    // -----------------------------------------------------------------------
    // Core enter / leave API
    // -----------------------------------------------------------------------

    /// Try to enter a recursive computation for `key`.
    ///
    /// On [`RecursionResult::Entered`] the caller **must** call
    /// [`leave`](Self::leave) with the same key when done.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if let Some(&position) = self.visiting.get(&key) {
            return RecursionResult::Cycle(position);
        }
        if self.stack.len() as u32 >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }

        self.visiting.insert(key.clone(), self.stack.len());
        self.stack.push(key);
        RecursionResult::Entered
    }

    /// Leave the computation for `key`, which must be on top of the stack.
    pub fn leave(&mut self, key: &K) {
        let top = self.stack.pop();
        debug_assert!(
            top.as_ref() == Some(key),
            "RecursionGuard::leave() called with a key that is not on top of the stack. \
             This indicates a double-leave or a leave without a matching enter()."
        );
        self.visiting.remove(key);
    }

    // -----------------------------------------------------------------------
    // Query API
    // -----------------------------------------------------------------------

    /// Active keys, outermost first.
    #[inline]
    pub fn stack(&self) -> &[K] {
        &self.stack
    }

    /// Sticky: stays set after the offending entry is left.
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Clone> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.stack.is_empty() {
            panic!(
                "RecursionGuard dropped with {} active entries still on the stack. \
                 This indicates leaked enter() calls without matching leave() calls.",
                self.stack.len(),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// DepthCounter - depth-only guard (no cycle detection)
// ---------------------------------------------------------------------------

/// A lightweight depth counter for stack overflow protection.
///
/// Unlike [`RecursionGuard`], `DepthCounter` does not track which keys are
/// being visited. The subtype checker uses it for the overall nesting of
/// relation steps, where the same relation may legitimately be revisited
/// under different constraints.
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        Self {
            depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    /// Only the profile's `max_depth` is used.
    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    /// Try to enter a deeper level.
    ///
    /// Returns `false` without incrementing when the limit is reached; do
    /// **not** call `leave()` in that case.
    #[inline]
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    #[inline]
    pub fn leave(&mut self) {
        debug_assert!(
            self.depth > 0,
            "DepthCounter::leave() called at depth 0. \
             This indicates a leave without a matching enter()."
        );
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl Drop for DepthCounter {
    fn drop(&mut self) {
        if !std::thread::panicking() && self.depth > 0 {
            panic!(
                "DepthCounter dropped with depth {}. \
                 This indicates leaked enter() calls without matching leave() calls.",
                self.depth,
            );
        }
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
