//! gradus: structural subtyping for gradually typed Ruby signatures.
//!
//! The work is split across three crates, re-exported here:
//!
//! - [`common`]: interned names, limits and diagnostic categories
//! - [`solver`]: the type model, signature environment, interface resolver,
//!   relation checker and constraint store
//! - [`checker`]: the declaration validator built on the relation checker

pub use gradus_checker as checker;
pub use gradus_common as common;
pub use gradus_solver as solver;

pub use gradus_checker::{SignatureDiagnostic, Validator};
pub use gradus_solver::{
    CheckContext, CheckResult, Constraints, Definition, Relation, RelationPolicy, SignatureEnv,
    SubtypeChecker, Type,
};

// Tracing subscriber setup for embedding tools and debugging sessions
pub mod tracing_config;

/// Validate every declaration of `env` under `policy` and return the
/// diagnostics found.
pub fn validate_env(env: &SignatureEnv, policy: RelationPolicy) -> Vec<SignatureDiagnostic> {
    let mut checker = SubtypeChecker::with_policy(env, policy);
    let mut validator = Validator::new(&mut checker);
    validator.validate();
    validator.into_errors()
}
