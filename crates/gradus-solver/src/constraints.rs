//! Bounds collected for type variables during a check.
//!
//! A [`Constraints`] store knows which variables it may constrain (its
//! domain) and records lower and upper bounds for them. Bounds are
//! append-only with set semantics: a failed union branch leaves whatever it
//! recorded in place, and recording the same bound twice is a no-op.
//!
//! After checking, [`Constraints::subst`] solves each variable to a single
//! type.

use crate::diagnostics::ConstraintError;
use crate::instantiate::Substitution;
use crate::relation::Relation;
use crate::subtype::{CheckContext, SubtypeChecker};
use crate::types::Type;
use gradus_common::Atom;
use indexmap::IndexMap;
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Bounds {
    lower: Vec<Type>,
    upper: Vec<Type>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Constraints {
    vars: IndexMap<Atom, Bounds>,
}

impl Constraints {
    /// A store with an empty domain: every variable comparison is undecided.
    pub fn empty() -> Self {
        Constraints::default()
    }

    pub fn new<A: Into<Atom>>(domain: impl IntoIterator<Item = A>) -> Self {
        let mut constraints = Constraints::empty();
        constraints.extend_domain(domain.into_iter().map(Into::into));
        constraints
    }

    /// Whether `var` may be constrained by this store.
    pub fn domain(&self, var: &str) -> bool {
        self.vars.contains_key(var)
    }

    /// Domain variables in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = &Atom> {
        self.vars.keys()
    }

    /// Record `ty <: var`. Returns whether the bound is new; variables
    /// outside the domain are ignored.
    pub fn add_lower_bound(&mut self, var: &str, ty: Type) -> bool {
        let Some(bounds) = self.vars.get_mut(var) else {
            return false;
        };
        if bounds.lower.contains(&ty) {
            return false;
        }
        debug!(var, bound = %ty, "add lower bound");
        bounds.lower.push(ty);
        true
    }

    /// Record `var <: ty`. Returns whether the bound is new; variables
    /// outside the domain are ignored.
    pub fn add_upper_bound(&mut self, var: &str, ty: Type) -> bool {
        let Some(bounds) = self.vars.get_mut(var) else {
            return false;
        };
        if bounds.upper.contains(&ty) {
            return false;
        }
        debug!(var, bound = %ty, "add upper bound");
        bounds.upper.push(ty);
        true
    }

    pub fn lower_bound(&self, var: &str) -> &[Type] {
        self.vars
            .get(var)
            .map(|bounds| bounds.lower.as_slice())
            .unwrap_or_default()
    }

    pub fn upper_bound(&self, var: &str) -> &[Type] {
        self.vars
            .get(var)
            .map(|bounds| bounds.upper.as_slice())
            .unwrap_or_default()
    }

    /// At least one bound has been recorded for `var`.
    pub fn has_constraint(&self, var: &str) -> bool {
        self.vars
            .get(var)
            .is_some_and(|bounds| !bounds.lower.is_empty() || !bounds.upper.is_empty())
    }

    /// Add variables to the domain. Existing bounds are kept.
    pub(crate) fn extend_domain(&mut self, vars: impl IntoIterator<Item = Atom>) {
        for var in vars {
            self.vars.entry(var).or_default();
        }
    }

    /// Remove variables that were added for a single comparison, together
    /// with their bounds.
    pub(crate) fn retract_domain(&mut self, vars: &[Atom]) {
        for var in vars {
            self.vars.shift_remove(var);
        }
    }

    /// Solve every domain variable.
    ///
    /// A variable with lower bounds becomes their least upper bound; one with
    /// only upper bounds becomes their greatest lower bound; an unconstrained
    /// variable becomes `untyped`. When both kinds of bound exist, the lower
    /// solution must be a subtype of the upper one.
    pub fn subst(&self, checker: &mut SubtypeChecker<'_>) -> Result<Substitution, ConstraintError> {
        let mut subst = Substitution::empty();
        for (var, bounds) in &self.vars {
            let lower = least_upper_bound(checker, &bounds.lower)?;
            let upper = greatest_lower_bound(checker, &bounds.upper)?;
            if let (Some(lower), Some(upper)) = (&lower, &upper) {
                if !is_subtype(checker, lower, upper)? {
                    return Err(ConstraintError::Unsatisfiable {
                        var: var.clone(),
                        lower: lower.clone(),
                        upper: upper.clone(),
                    });
                }
            }
            let solution = lower.or(upper).unwrap_or(Type::Any);
            debug!(var = %var, solution = %solution, "solved");
            subst.insert(var.clone(), solution);
        }
        Ok(subst)
    }
}

fn is_subtype(
    checker: &mut SubtypeChecker<'_>,
    sub_type: &Type,
    super_type: &Type,
) -> Result<bool, ConstraintError> {
    let relation = Relation::new(sub_type.clone(), super_type.clone());
    let result = checker.check(&relation, &CheckContext::empty(), Constraints::empty())?;
    Ok(result.is_success())
}

/// Drop every bound that is a subtype of another bound and join the rest.
///
/// Of two mutually-subtyped bounds only the later one is kept. A pair whose
/// relation cannot be decided keeps both.
fn least_upper_bound(
    checker: &mut SubtypeChecker<'_>,
    bounds: &[Type],
) -> Result<Option<Type>, ConstraintError> {
    let kept = reduce(checker, bounds, |checker, candidate, other| {
        is_subtype(checker, candidate, other)
    })?;
    Ok((!kept.is_empty()).then(|| Type::union(kept)))
}

/// Drop every bound that is a supertype of another bound and meet the rest.
fn greatest_lower_bound(
    checker: &mut SubtypeChecker<'_>,
    bounds: &[Type],
) -> Result<Option<Type>, ConstraintError> {
    let kept = reduce(checker, bounds, |checker, candidate, other| {
        is_subtype(checker, other, candidate)
    })?;
    Ok((!kept.is_empty()).then(|| Type::intersection(kept)))
}

/// Keep each bound unless `subsumed(bound, other)` holds for another bound
/// that has not been dropped yet.
fn reduce(
    checker: &mut SubtypeChecker<'_>,
    bounds: &[Type],
    mut subsumed: impl FnMut(&mut SubtypeChecker<'_>, &Type, &Type) -> Result<bool, ConstraintError>,
) -> Result<Vec<Type>, ConstraintError> {
    let mut dropped = vec![false; bounds.len()];
    for (i, candidate) in bounds.iter().enumerate() {
        for (j, other) in bounds.iter().enumerate() {
            if i == j || dropped[j] {
                continue;
            }
            if subsumed(checker, candidate, other)? {
                dropped[i] = true;
                break;
            }
        }
    }
    Ok(bounds
        .iter()
        .zip(dropped)
        .filter_map(|(ty, dropped)| (!dropped).then(|| ty.clone()))
        .collect())
}

#[cfg(test)]
#[path = "../tests/constraints_tests.rs"]
mod tests;
