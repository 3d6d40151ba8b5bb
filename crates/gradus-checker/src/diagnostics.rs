//! Diagnostics reported by the signature validator.

use gradus_common::{Atom, DiagnosticCategory};
use gradus_solver::{Relation, ResolveError, Type, TypeParam};
use serde::Serialize;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignatureDiagnostic {
    /// A type argument does not satisfy its parameter's upper bound.
    #[error(
        "type argument `{type_arg}` of `{type_name}` does not satisfy the upper bound of `'{}`",
        .type_param.name
    )]
    UnsatisfiableTypeApplication {
        type_name: Atom,
        type_arg: Type,
        type_param: TypeParam,
    },

    /// An instance variable is redeclared with a type incompatible with the
    /// ancestor's declaration.
    #[error("instance variable `{name}` has type `{var_type}`, incompatible with `{parent_type}`")]
    InstanceVariableTypeError {
        name: Atom,
        var_type: Type,
        parent_type: Type,
    },

    /// The mixing-in class does not satisfy a module's self-type constraint.
    #[error("`{name}` cannot mix in `{ancestor}`: `{relation}` does not hold")]
    ModuleSelfTypeError {
        name: Atom,
        ancestor: Type,
        relation: Relation,
    },

    #[error("`{name}` expects {expected} type argument(s) but got {actual}")]
    InvalidTypeApplication {
        name: Atom,
        expected: usize,
        actual: usize,
    },

    #[error("cannot find type `{name}`")]
    UnknownTypeName { name: Atom },

    /// Any other malformed input found while validating `declaration`.
    #[error("`{declaration}` is malformed: {error}")]
    InvalidDeclaration {
        declaration: Atom,
        error: ResolveError,
    },
}

impl SignatureDiagnostic {
    /// Convert a resolver error caught while validating `declaration`.
    pub fn from_resolve_error(declaration: &Atom, error: ResolveError) -> Self {
        match error {
            ResolveError::NoSuchType { name } => SignatureDiagnostic::UnknownTypeName { name },
            ResolveError::InvalidTypeApplication {
                name,
                expected,
                actual,
            } => SignatureDiagnostic::InvalidTypeApplication {
                name,
                expected,
                actual,
            },
            error => SignatureDiagnostic::InvalidDeclaration {
                declaration: declaration.clone(),
                error,
            },
        }
    }

    pub fn category(&self) -> DiagnosticCategory {
        DiagnosticCategory::Error
    }

    /// Short machine-readable name, matching the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            SignatureDiagnostic::UnsatisfiableTypeApplication { .. } => {
                "unsatisfiable_type_application"
            }
            SignatureDiagnostic::InstanceVariableTypeError { .. } => {
                "instance_variable_type_error"
            }
            SignatureDiagnostic::ModuleSelfTypeError { .. } => "module_self_type_error",
            SignatureDiagnostic::InvalidTypeApplication { .. } => "invalid_type_application",
            SignatureDiagnostic::UnknownTypeName { .. } => "unknown_type_name",
            SignatureDiagnostic::InvalidDeclaration { .. } => "invalid_declaration",
        }
    }
}
