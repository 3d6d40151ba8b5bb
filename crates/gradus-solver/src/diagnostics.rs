//! Failure reasons and hard errors produced by the solver.
//!
//! Two families are kept apart:
//! - [`SubtypeError`] / [`Failure`]: a relation does not hold. These are
//!   ordinary results, returned inside [`crate::CheckResult`].
//! - [`ResolveError`], [`ConstraintError`], [`EnvError`]: the input itself is
//!   malformed (unknown names, wrong arity, cyclic ancestry). These abort the
//!   query and are returned as `Err`.

use crate::relation::{Relation, Trace};
use crate::types::Type;
use gradus_common::Atom;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why a relation failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubtypeError {
    /// The super type's interface has a method the sub type lacks, or the
    /// method's block types are incompatible.
    MethodMissing { name: Atom },
    /// No rule decides the relation (free variable outside the constraint
    /// domain, unresolved placeholder).
    UnknownPair { relation: Relation },
    /// Positional or keyword parameter shapes cannot be matched.
    ParameterArity { name: Atom },
    /// One side accepts a block the other cannot supply or accept.
    BlockMismatch { name: Atom },
    /// Literal, tuple or record shapes differ.
    Incompatible { relation: Relation },
    /// Every branch of a union super type (or intersection sub type) failed.
    NoBranch { failures: Vec<Failure> },
    /// The recursion budget ran out.
    RecursionLimit { relation: Relation },
}

impl fmt::Display for SubtypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubtypeError::MethodMissing { name } => write!(f, "method `{name}` is missing"),
            SubtypeError::UnknownPair { relation } => {
                write!(f, "cannot decide `{relation}`")
            }
            SubtypeError::ParameterArity { name } => {
                write!(f, "parameters of `{name}` are incompatible")
            }
            SubtypeError::BlockMismatch { name } => {
                write!(f, "block of `{name}` is incompatible")
            }
            SubtypeError::Incompatible { relation } => {
                write!(f, "`{}` is not `{}`", relation.sub_type, relation.super_type)
            }
            SubtypeError::NoBranch { failures } => {
                write!(f, "no branch matches ({} tried)", failures.len())
            }
            SubtypeError::RecursionLimit { relation } => {
                write!(f, "recursion limit reached while checking `{relation}`")
            }
        }
    }
}

/// A failed relation: the reason plus the trace at the point of failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub error: SubtypeError,
    pub trace: Trace,
}

impl Failure {
    pub fn new(error: SubtypeError, trace: Trace) -> Self {
        Failure { error, trace }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Malformed input discovered while resolving a type.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolveError {
    #[error("unknown type name `{name}`")]
    NoSuchType { name: Atom },
    #[error("`{name}` expects {expected} type argument(s) but got {actual}")]
    InvalidTypeApplication {
        name: Atom,
        expected: usize,
        actual: usize,
    },
    #[error("cannot resolve `{placeholder}` without a context")]
    UnresolvedPlaceholder { placeholder: Type },
    #[error("ancestors of `{name}` form a cycle")]
    CyclicAncestry { name: Atom },
    #[error("ancestor chain of `{name}` is too deep")]
    AncestorDepthExceeded { name: Atom },
    #[error("`{ty}` is nested too deeply to resolve")]
    ResolutionTooDeep { ty: Type },
}

/// Failure to turn constraints into a substitution.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintError {
    #[error("no type satisfies `{lower} <: '{var} <: {upper}`")]
    Unsatisfiable { var: Atom, lower: Type, upper: Type },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Failure to build a signature environment.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("`{name}` is declared twice")]
    DuplicateDeclaration { name: Atom },
}

/// Internal outcome of a relation step: either the relation failed, or
/// resolution hit malformed input and the whole query aborts.
#[derive(Clone, Debug)]
pub(crate) enum CheckError {
    Failed(Failure),
    Resolve(ResolveError),
}

impl From<ResolveError> for CheckError {
    fn from(err: ResolveError) -> Self {
        CheckError::Resolve(err)
    }
}

pub(crate) type RelationResult = Result<(), CheckError>;
