//! Relation policy and one-shot relation queries.
//!
//! [`RelationPolicy`] is the checker's configuration: recursion budgets and
//! which caches are enabled. It is plain data (serde-enabled) so embedding
//! tools can load it from their own configuration files.

use crate::constraints::Constraints;
use crate::def::SignatureEnv;
use crate::diagnostics::ResolveError;
use crate::recursion::RecursionProfile;
use crate::relation::Relation;
use crate::subtype::{CheckContext, SubtypeChecker};
use crate::types::Type;
use gradus_common::limits;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationPolicy {
    /// Maximum nesting of relation steps in one `check` call.
    pub max_depth: u32,
    /// Maximum number of structural expansions in one `check` call.
    pub max_iterations: u32,
    /// Memoize outcomes of closed relations.
    pub cache_relations: bool,
    /// Memoize interfaces of closed nominal types.
    pub cache_interfaces: bool,
}

impl Default for RelationPolicy {
    fn default() -> Self {
        Self {
            max_depth: limits::MAX_RELATION_DEPTH,
            max_iterations: limits::MAX_RELATION_ITERATIONS,
            cache_relations: true,
            cache_interfaces: true,
        }
    }
}

impl RelationPolicy {
    pub fn from_profile(profile: RecursionProfile) -> Self {
        Self {
            max_depth: profile.max_depth(),
            max_iterations: profile.max_iterations(),
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_relation_cache(mut self, enabled: bool) -> Self {
        self.cache_relations = enabled;
        self
    }

    pub fn with_interface_cache(mut self, enabled: bool) -> Self {
        self.cache_interfaces = enabled;
        self
    }

    pub fn profile(&self) -> RecursionProfile {
        RecursionProfile::Custom {
            max_depth: self.max_depth,
            max_iterations: self.max_iterations,
        }
    }
}

/// `sub_type <: super_type` with a fresh checker, no context and an empty
/// constraint domain.
pub fn is_subtype_of(
    env: &SignatureEnv,
    sub_type: &Type,
    super_type: &Type,
) -> Result<bool, ResolveError> {
    let mut checker = SubtypeChecker::new(env);
    let relation = Relation::new(sub_type.clone(), super_type.clone());
    let result = checker.check(&relation, &CheckContext::empty(), Constraints::empty())?;
    Ok(result.is_success())
}

/// Mutual subtyping under `context`.
pub fn are_types_equivalent(
    checker: &mut SubtypeChecker<'_>,
    left: &Type,
    right: &Type,
    context: &CheckContext,
) -> Result<bool, ResolveError> {
    let forward = Relation::new(left.clone(), right.clone());
    if !checker
        .check(&forward, context, Constraints::empty())?
        .is_success()
    {
        return Ok(false);
    }
    let backward = forward.flip();
    Ok(checker
        .check(&backward, context, Constraints::empty())?
        .is_success())
}

#[cfg(test)]
#[path = "../tests/relation_queries_tests.rs"]
mod tests;
