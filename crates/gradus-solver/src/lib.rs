//! Structural Subtype Solver
//!
//! This crate decides whether one signature type may be used where another
//! is expected. It uses:
//!
//! - **Interfaces**: every type resolves to a method table built from its
//!   ancestor chain
//! - **Cycle Detection**: coinductive semantics for recursive class and
//!   generic relationships
//! - **Constraints**: lower and upper bounds on type variables, solved into
//!   a substitution after checking
//!
//! Key properties:
//! - Closed relations and interfaces are memoized in concurrent caches
//!   shareable across checkers
//! - `untyped` is compatible in both directions
//! - Failures carry the trace of structural expansions that led to them

pub mod caches;
pub mod constraints;
pub mod def;
pub mod diagnostics;
mod format;
pub mod inheritance;
pub mod instantiate;
pub mod interface;
pub mod recursion;
pub mod relation;
pub mod relation_queries;
mod subtype;
mod subtype_rules;
pub mod types;
pub mod visitor;

pub use caches::{CachedOutcome, InterfaceCache, RelationCache, RelationCacheStats};
pub use constraints::Constraints;
pub use def::{AncestorRef, DefKind, Definition, SignatureEnv, TypeAlias, well_known};
pub use diagnostics::{ConstraintError, EnvError, Failure, ResolveError, SubtypeError};
pub use inheritance::{Ancestor, AncestorBuilder, AncestorSide};
pub use instantiate::{Substitution, fresh_var};
pub use interface::{Interface, InterfaceResolver};
pub use recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
pub use relation::{Relation, Trace};
pub use relation_queries::{RelationPolicy, are_types_equivalent, is_subtype_of};
pub use subtype::{CheckContext, CheckResult, SubtypeChecker};
pub use types::{
    Block, LiteralValue, Method, MethodType, NominalKind, NominalType, Params, Type, TypeParam,
    TypeSet, Variance,
};
pub use visitor::{free_variables, has_placeholder, method_type_free_variables};

// Test modules are loaded by their source files via #[path = "../tests/..."].
// Shared signature fixtures live here so every test module can reach them.
#[cfg(test)]
#[path = "../tests/fixtures.rs"]
pub(crate) mod fixtures;
