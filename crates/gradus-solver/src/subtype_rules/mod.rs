//! Relation rules, split by the shape of the relation.
//!
//! Each submodule adds an `impl SubtypeChecker` block; dispatch between them
//! lives in `crate::subtype`.

mod generics;
mod methods;
mod shapes;
mod unions;
