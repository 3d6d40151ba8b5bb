//! Subtype relations and failure traces.

use crate::types::Type;
use crate::visitor;
use gradus_common::limits::TRACE_CAPACITY_HINT;
use serde::Serialize;
use std::fmt;

/// A candidate judgement `sub_type <: super_type`.
///
/// Relations are value types: they double as trace entries and as keys of the
/// relation cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Relation {
    pub sub_type: Type,
    pub super_type: Type,
}

impl Relation {
    pub fn new(sub_type: Type, super_type: Type) -> Self {
        Relation {
            sub_type,
            super_type,
        }
    }

    /// `super_type <: sub_type`.
    pub fn flip(&self) -> Relation {
        Relation::new(self.super_type.clone(), self.sub_type.clone())
    }

    /// Neither side mentions a free type variable or a placeholder, so the
    /// outcome does not depend on constraints or on the ambient context.
    pub fn is_closed(&self) -> bool {
        self.sub_type.is_closed()
            && self.super_type.is_closed()
            && !visitor::has_placeholder(&self.sub_type)
            && !visitor::has_placeholder(&self.super_type)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <: {}", self.sub_type, self.super_type)
    }
}

/// The chain of structurally expanded relations leading to a failure,
/// outermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Trace {
    relations: Vec<Relation>,
}

impl Trace {
    pub fn new() -> Self {
        Trace {
            relations: Vec::with_capacity(TRACE_CAPACITY_HINT),
        }
    }

    pub fn from_relations(relations: Vec<Relation>) -> Self {
        Trace { relations }
    }

    /// Number of entries.
    pub fn size(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Relation> {
        self.relations.iter()
    }

    pub fn first(&self) -> Option<&Relation> {
        self.relations.first()
    }

    pub fn last(&self) -> Option<&Relation> {
        self.relations.last()
    }

    /// Entries from `start` on, used to store a failure independently of the
    /// relations that were in progress around it.
    pub(crate) fn suffix(&self, start: usize) -> Trace {
        Trace::from_relations(self.relations.get(start..).unwrap_or_default().to_vec())
    }

    /// `prefix` followed by this trace.
    pub(crate) fn rebase(&self, prefix: &[Relation]) -> Trace {
        let mut relations = Vec::with_capacity(prefix.len() + self.relations.len());
        relations.extend_from_slice(prefix);
        relations.extend_from_slice(&self.relations);
        Trace::from_relations(relations)
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Relation;
    type IntoIter = std::slice::Iter<'a, Relation>;

    fn into_iter(self) -> Self::IntoIter {
        self.relations.iter()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, relation) in self.relations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:indent$}{relation}", "", indent = i * 2)?;
        }
        Ok(())
    }
}
