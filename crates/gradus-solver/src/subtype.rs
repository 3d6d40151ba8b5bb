//! Subtype relation checker.
//!
//! `SubtypeChecker::check` decides `sub <: super` by trying rules in a fixed
//! order:
//!
//! 1. Trivial: `super` is `untyped` or `void`, `sub` is `untyped` or `bot`,
//!    or both sides are equal.
//! 2. Variables: a variable in the constraint domain records a bound and
//!    succeeds; a variable with a pushed upper bound is replaced by it;
//!    anything else is undecided. Type alias applications are then expanded
//!    one step and checked again.
//! 3. Unions and intersections are decomposed (`subtype_rules::unions`).
//! 4. Same generic declaration on both sides: arguments are compared by
//!    declared variance (`subtype_rules::generics`).
//! 5. Literal, tuple and record shapes (`subtype_rules::shapes`).
//! 6. Structural: both sides are resolved to interfaces and compared method
//!    by method (`subtype_rules::methods`).
//!
//! # Coinduction
//!
//! Only structural expansions (rules 4 and 6, and proc comparison) are pushed
//! on the trace. Meeting a relation that is already on the trace succeeds:
//! it is being proven further up. A success that leaned on such an
//! assumption is provisional until the relation that owns the assumption
//! completes, and provisional successes are never cached.

use crate::caches::query_trace;
use crate::caches::{CachedOutcome, RelationCache};
use crate::constraints::Constraints;
use crate::def::{SignatureEnv, well_known};
use crate::diagnostics::{CheckError, Failure, RelationResult, ResolveError, SubtypeError};
use crate::instantiate::Substitution;
use crate::interface::{Interface, InterfaceResolver};
use crate::recursion::{DepthCounter, RecursionGuard, RecursionResult};
use crate::relation::{Relation, Trace};
use crate::relation_queries::RelationPolicy;
use crate::types::{LiteralValue, Type};
use gradus_common::Atom;
use gradus_common::limits::{STACK_GROWTH, STACK_RED_ZONE};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Replacements for `self`, `instance` and `class` in the checked relation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckContext {
    pub self_type: Option<Type>,
    pub instance_type: Option<Type>,
    pub class_type: Option<Type>,
}

impl CheckContext {
    pub fn empty() -> Self {
        CheckContext::default()
    }

    pub fn new(
        self_type: Option<Type>,
        instance_type: Option<Type>,
        class_type: Option<Type>,
    ) -> Self {
        CheckContext {
            self_type,
            instance_type,
            class_type,
        }
    }

    pub fn with_self(mut self, ty: Type) -> Self {
        self.self_type = Some(ty);
        self
    }

    pub fn with_instance(mut self, ty: Type) -> Self {
        self.instance_type = Some(ty);
        self
    }

    pub fn with_class(mut self, ty: Type) -> Self {
        self.class_type = Some(ty);
        self
    }

    pub fn substitution(&self) -> Substitution {
        Substitution::empty()
            .with_self(self.self_type.clone())
            .with_instance(self.instance_type.clone())
            .with_class(self.class_type.clone())
    }
}

/// Outcome of [`SubtypeChecker::check`].
#[derive(Clone, Debug, PartialEq)]
pub enum CheckResult {
    /// The relation holds; carries the constraints with every recorded bound.
    Success(Constraints),
    Failure(Failure),
}

impl CheckResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CheckResult::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn constraints(&self) -> Option<&Constraints> {
        match self {
            CheckResult::Success(constraints) => Some(constraints),
            CheckResult::Failure(_) => None,
        }
    }

    pub fn into_constraints(self) -> Option<Constraints> {
        match self {
            CheckResult::Success(constraints) => Some(constraints),
            CheckResult::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            CheckResult::Success(_) => None,
            CheckResult::Failure(failure) => Some(failure),
        }
    }

    pub fn error(&self) -> Option<&SubtypeError> {
        self.failure().map(|failure| &failure.error)
    }

    pub fn trace(&self) -> Option<&Trace> {
        self.failure().map(|failure| &failure.trace)
    }
}

/// State of one top-level `check` call.
struct Session {
    trace: RecursionGuard<Relation>,
    nesting: DepthCounter,
    /// Lowest trace position whose in-progress assumption the current
    /// result depends on.
    cycle_floor: Option<usize>,
}

impl Session {
    fn new(policy: &RelationPolicy) -> Self {
        Session {
            trace: RecursionGuard::with_profile(policy.profile()),
            nesting: DepthCounter::with_profile(policy.profile()),
            cycle_floor: None,
        }
    }

    fn exceeded(&self) -> bool {
        self.trace.is_exceeded() || self.nesting.is_exceeded()
    }
}

fn lowest(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

pub struct SubtypeChecker<'a> {
    env: &'a SignatureEnv,
    resolver: InterfaceResolver<'a>,
    cache: Arc<RelationCache>,
    policy: RelationPolicy,
    variable_bounds: Vec<FxHashMap<Atom, Type>>,
    session: Session,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(env: &'a SignatureEnv) -> Self {
        SubtypeChecker::with_policy(env, RelationPolicy::default())
    }

    pub fn with_policy(env: &'a SignatureEnv, policy: RelationPolicy) -> Self {
        let mut resolver = InterfaceResolver::new(env);
        resolver.set_caching(policy.cache_interfaces);
        SubtypeChecker {
            env,
            resolver,
            cache: Arc::new(RelationCache::new()),
            policy,
            variable_bounds: Vec::new(),
            session: Session::new(&policy),
        }
    }

    /// Share `cache` with other checkers over the same environment.
    pub fn with_cache(mut self, cache: Arc<RelationCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn env(&self) -> &'a SignatureEnv {
        self.env
    }

    pub fn cache(&self) -> &Arc<RelationCache> {
        &self.cache
    }

    pub fn resolver(&self) -> &InterfaceResolver<'a> {
        &self.resolver
    }

    pub fn policy(&self) -> &RelationPolicy {
        &self.policy
    }

    /// Resolve `ty` into its interface.
    pub fn resolve(&self, ty: &Type) -> Result<Arc<Interface>, ResolveError> {
        self.resolver.resolve(ty)
    }

    /// Run `f` with `bounds` as upper bounds of the named type variables.
    ///
    /// A variable outside the constraint domain that has a bound is checked
    /// through that bound. Scopes nest; the innermost bound wins.
    pub fn with_variable_bounds<T>(
        &mut self,
        bounds: FxHashMap<Atom, Type>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.variable_bounds.push(bounds);
        let result = f(self);
        self.variable_bounds.pop();
        result
    }

    fn variable_bound(&self, var: &Atom) -> Option<&Type> {
        self.variable_bounds
            .iter()
            .rev()
            .find_map(|scope| scope.get(var))
    }

    /// Decide `relation` under `context`, recording variable bounds in
    /// `constraints`.
    ///
    /// Returns `Err` only for malformed input (unknown names, wrong type
    /// argument counts, cyclic ancestry); a relation that does not hold is
    /// an `Ok(CheckResult::Failure(..))`.
    pub fn check(
        &mut self,
        relation: &Relation,
        context: &CheckContext,
        constraints: Constraints,
    ) -> Result<CheckResult, ResolveError> {
        let subst = context.substitution();
        let relation = if subst.is_empty() {
            relation.clone()
        } else {
            Relation::new(
                relation.sub_type.subst(&subst),
                relation.super_type.subst(&subst),
            )
        };

        let query_id = query_trace::enabled().then(query_trace::next_query_id);
        if let Some(query_id) = query_id {
            query_trace::relation_start(query_id, "check", &relation);
        }
        let hits_before = self.cache.stats().hits;

        let mut constraints = constraints;
        let outer = std::mem::replace(&mut self.session, Session::new(&self.policy));
        let result =
            self.check_relation(&relation.sub_type, &relation.super_type, &mut constraints);
        self.session = outer;

        if let Some(query_id) = query_id {
            let cache_hit = self.cache.stats().hits > hits_before;
            query_trace::relation_end(query_id, "check", result.is_ok(), cache_hit);
        }
        debug!(relation = %relation, success = result.is_ok(), "check");

        match result {
            Ok(()) => Ok(CheckResult::Success(constraints)),
            Err(CheckError::Failed(failure)) => Ok(CheckResult::Failure(failure)),
            Err(CheckError::Resolve(err)) => Err(err),
        }
    }

    /// A failure carrying the current trace.
    pub(crate) fn fail(&self, error: SubtypeError) -> CheckError {
        let trace = Trace::from_relations(self.session.trace.stack().to_vec());
        CheckError::Failed(Failure::new(error, trace))
    }

    pub(crate) fn check_relation(
        &mut self,
        sub_type: &Type,
        super_type: &Type,
        constraints: &mut Constraints,
    ) -> RelationResult {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            if !self.session.nesting.enter() {
                let relation = Relation::new(sub_type.clone(), super_type.clone());
                return Err(self.fail(SubtypeError::RecursionLimit { relation }));
            }
            let result = self.check_step(sub_type, super_type, constraints);
            self.session.nesting.leave();
            result
        })
    }

    fn check_step(
        &mut self,
        sub_type: &Type,
        super_type: &Type,
        constraints: &mut Constraints,
    ) -> RelationResult {
        if matches!(super_type, Type::Any | Type::Void)
            || matches!(sub_type, Type::Any | Type::Bot)
            || sub_type == super_type
        {
            return Ok(());
        }

        if sub_type.is_var() || super_type.is_var() {
            return self.check_variable(sub_type, super_type, constraints);
        }

        if sub_type.as_alias().is_some() || super_type.as_alias().is_some() {
            let sub_type = self.unalias(sub_type)?;
            let super_type = self.unalias(super_type)?;
            return self.check_relation(&sub_type, &super_type, constraints);
        }

        let relation = Relation::new(sub_type.clone(), super_type.clone());
        let cacheable = self.policy.cache_relations && relation.is_closed();
        if cacheable {
            if let Some(outcome) = self.cache.get(&relation) {
                trace!(relation = %relation, success = outcome.is_success(), "relation cache hit");
                return match outcome {
                    CachedOutcome::Success => Ok(()),
                    CachedOutcome::Failure(failure) => Err(CheckError::Failed(Failure::new(
                        failure.error,
                        failure.trace.rebase(self.session.trace.stack()),
                    ))),
                };
            }
        }

        let entry = self.session.trace.stack().len();
        let outer_floor = self.session.cycle_floor.take();
        let result = self.dispatch(&relation, constraints);
        // Assumptions taken on this relation itself are discharged here.
        let pending = self
            .session
            .cycle_floor
            .take()
            .filter(|&position| position < entry);
        self.session.cycle_floor = lowest(outer_floor, pending);

        if cacheable && !self.session.exceeded() {
            match &result {
                Ok(()) if pending.is_none() => {
                    self.cache.insert(relation, CachedOutcome::Success);
                }
                Err(CheckError::Failed(failure)) => {
                    let stored = Failure::new(failure.error.clone(), failure.trace.suffix(entry));
                    self.cache.insert(relation, CachedOutcome::Failure(stored));
                }
                _ => {}
            }
        }
        result
    }

    fn unalias(&self, ty: &Type) -> Result<Type, ResolveError> {
        match ty.as_alias() {
            Some(nominal) => self.env.expand_alias(nominal),
            None => Ok(ty.clone()),
        }
    }

    fn check_variable(
        &mut self,
        sub_type: &Type,
        super_type: &Type,
        constraints: &mut Constraints,
    ) -> RelationResult {
        if let Type::Var(var) = sub_type {
            if constraints.domain(var) {
                constraints.add_upper_bound(var, super_type.clone());
                return Ok(());
            }
        }
        if let Type::Var(var) = super_type {
            if constraints.domain(var) {
                constraints.add_lower_bound(var, sub_type.clone());
                return Ok(());
            }
        }
        if let Type::Var(var) = sub_type {
            if let Some(bound) = self.variable_bound(var).cloned() {
                return self.check_relation(&bound, super_type, constraints);
            }
        }
        let relation = Relation::new(sub_type.clone(), super_type.clone());
        Err(self.fail(SubtypeError::UnknownPair { relation }))
    }

    fn dispatch(&mut self, relation: &Relation, constraints: &mut Constraints) -> RelationResult {
        let sub_type = &relation.sub_type;
        let super_type = &relation.super_type;
        match (sub_type, super_type) {
            (Type::Union(members), _) => self.check_all_sub_members(members, super_type, constraints),
            (_, Type::Intersection(members)) => {
                self.check_all_super_members(sub_type, members, constraints)
            }
            (_, Type::Union(members)) => {
                self.check_any_super_member(sub_type, members, constraints)
            }
            (Type::Intersection(members), _) => {
                self.check_any_sub_member(members, super_type, constraints)
            }
            (Type::Name(sub_nominal), Type::Name(super_nominal))
                if sub_nominal.same_declaration(super_nominal) && !sub_nominal.args.is_empty() =>
            {
                self.expand(relation, |checker| {
                    checker.check_type_args(sub_nominal, super_nominal, constraints)
                })
            }
            (_, Type::Literal(_) | Type::Tuple(_) | Type::Record(_)) => {
                self.check_shape(relation, constraints)
            }
            (Type::Literal(LiteralValue::Bool(_)), Type::Bool) => Ok(()),
            (_, Type::Bool) => self.check_bool(relation, constraints),
            (_, Type::Nil) => self.check_nil(relation),
            (Type::Proc(sub_proc), Type::Proc(super_proc)) => self.expand(relation, |checker| {
                checker.check_overload(&Atom::new(well_known::CALL), sub_proc, super_proc, constraints)
            }),
            _ if sub_type.is_placeholder() || super_type.is_placeholder() => {
                Err(self.fail(SubtypeError::UnknownPair {
                    relation: relation.clone(),
                }))
            }
            _ => self.expand(relation, |checker| {
                checker.check_interfaces(relation, constraints)
            }),
        }
    }

    /// Push `relation` on the trace and run `f`, or succeed coinductively
    /// when the relation is already being checked.
    pub(crate) fn expand(
        &mut self,
        relation: &Relation,
        f: impl FnOnce(&mut Self) -> RelationResult,
    ) -> RelationResult {
        match self.session.trace.enter(relation.clone()) {
            RecursionResult::Entered => {
                let result = f(self);
                self.session.trace.leave(relation);
                result
            }
            RecursionResult::Cycle(position) => {
                trace!(relation = %relation, position, "assumed by trace");
                self.session.cycle_floor = lowest(self.session.cycle_floor, Some(position));
                Ok(())
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                Err(self.fail(SubtypeError::RecursionLimit {
                    relation: relation.clone(),
                }))
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
