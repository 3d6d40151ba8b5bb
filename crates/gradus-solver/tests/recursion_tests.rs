use super::*;

// ===================================================================
// RecursionProfile tests
// ===================================================================

#[test]
fn profile_subtype_check_limits() {
    let p = RecursionProfile::SubtypeCheck;
    assert_eq!(p.max_depth(), limits::MAX_RELATION_DEPTH);
    assert_eq!(p.max_iterations(), limits::MAX_RELATION_ITERATIONS);
}

#[test]
fn profile_ancestor_walk_limits() {
    let p = RecursionProfile::AncestorWalk;
    assert_eq!(p.max_depth(), limits::MAX_ANCESTOR_DEPTH);
}

#[test]
fn profile_custom_limits() {
    let p = RecursionProfile::Custom {
        max_depth: 7,
        max_iterations: 42,
    };
    assert_eq!(p.max_depth(), 7);
    assert_eq!(p.max_iterations(), 42);
}

#[test]
fn with_profile_constructor() {
    let mut guard = RecursionGuard::with_profile(RecursionProfile::Custom {
        max_depth: 1,
        max_iterations: 10,
    });
    assert!(guard.stack().is_empty());
    assert!(!guard.is_exceeded());

    assert_eq!(guard.enter(1u32), RecursionResult::Entered);
    assert_eq!(guard.enter(2u32), RecursionResult::DepthExceeded);
    guard.leave(&1);
}

// ===================================================================
// Core enter/leave tests
// ===================================================================

#[test]
fn basic_enter_leave() {
    let mut guard = RecursionGuard::new(10, 100);
    assert_eq!(guard.enter(1u32), RecursionResult::Entered);
    assert_eq!(guard.stack(), &[1]);

    guard.leave(&1);
    assert!(guard.stack().is_empty());
}

#[test]
fn leave_does_not_refund_iterations() {
    let mut guard = RecursionGuard::new(10, 2);
    assert_eq!(guard.enter(1u32), RecursionResult::Entered);
    assert_eq!(guard.enter(2u32), RecursionResult::Entered);
    guard.leave(&2);
    guard.leave(&1);
    assert_eq!(guard.enter(3u32), RecursionResult::IterationExceeded);
}

#[test]
fn reenter_after_leave() {
    let mut guard = RecursionGuard::new(10, 100);
    assert_eq!(guard.enter(1u32), RecursionResult::Entered);
    guard.leave(&1);

    assert_eq!(guard.enter(1u32), RecursionResult::Entered);
    assert_eq!(guard.stack().len(), 1);
    guard.leave(&1);
}

// ===================================================================
// Cycle detection tests
// ===================================================================

#[test]
fn cycle_reports_stack_position() {
    let mut guard = RecursionGuard::new(10, 100);
    assert_eq!(guard.enter("a"), RecursionResult::Entered);
    assert_eq!(guard.enter("b"), RecursionResult::Entered);
    assert_eq!(guard.enter("a"), RecursionResult::Cycle(0));
    assert_eq!(guard.enter("b"), RecursionResult::Cycle(1));

    // Cycle does not push, and is not a limit violation.
    assert_eq!(guard.stack(), &["a", "b"]);
    assert!(!guard.is_exceeded());

    guard.leave(&"b");
    guard.leave(&"a");
}

// ===================================================================
// Limit tests
// ===================================================================

#[test]
fn depth_exceeded_is_sticky() {
    let mut guard = RecursionGuard::new(2, 100);
    assert_eq!(guard.enter(1u32), RecursionResult::Entered);
    assert_eq!(guard.enter(2u32), RecursionResult::Entered);
    assert_eq!(guard.enter(3u32), RecursionResult::DepthExceeded);
    assert!(guard.is_exceeded());

    guard.leave(&2);
    guard.leave(&1);
    assert!(guard.is_exceeded());
}

#[test]
fn iteration_limit() {
    let mut guard = RecursionGuard::new(10, 3);
    for key in 0..3u32 {
        assert_eq!(guard.enter(key), RecursionResult::Entered);
        guard.leave(&key);
    }
    assert_eq!(guard.enter(4), RecursionResult::IterationExceeded);
    assert!(guard.is_exceeded());
}

// ===================================================================
// DepthCounter tests
// ===================================================================

#[test]
fn depth_counter_limit() {
    let mut counter = DepthCounter::new(2);
    assert!(counter.enter());
    assert!(counter.enter());
    assert!(!counter.enter());
    assert!(counter.is_exceeded());
    counter.leave();
    counter.leave();
    // Sticky after unwinding.
    assert!(counter.is_exceeded());
}

#[test]
fn depth_counter_from_profile() {
    let mut counter = DepthCounter::with_profile(RecursionProfile::Custom {
        max_depth: 1,
        max_iterations: 1,
    });
    assert!(counter.enter());
    assert!(!counter.enter());
    counter.leave();
}
