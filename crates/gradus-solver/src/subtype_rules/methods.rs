//! Structural comparison: interfaces, methods, overloads, parameters and
//! blocks.
//!
//! `S <: T` holds structurally when every method of `T` exists on `S` and
//! every overload of `T` is absorbed by some overload of `S`. An overload
//! absorbs another when it accepts every call the other accepts and returns
//! something the other's callers can use:
//!
//! ```text
//! super: (Integer, ?String) -> Object
//! sub:   (Numeric, *untyped) -> String      ok
//! sub:   (Integer, String) -> String        ParameterArity
//! ```

use crate::constraints::Constraints;
use crate::diagnostics::{CheckError, Failure, RelationResult, SubtypeError};
use crate::instantiate::fresh_var;
use crate::relation::Relation;
use crate::subtype::SubtypeChecker;
use crate::types::{Block, Method, MethodType, Params, Type};
use gradus_common::Atom;
use std::borrow::Cow;
use tracing::trace;

impl<'a> SubtypeChecker<'a> {
    /// Compare the interfaces of both sides of `relation`.
    ///
    /// Presence of every super method is checked before any method type is
    /// compared, so a missing method is reported even when an earlier method
    /// would also fail.
    pub(crate) fn check_interfaces(
        &mut self,
        relation: &Relation,
        constraints: &mut Constraints,
    ) -> RelationResult {
        let sub_interface = self.resolve(&relation.sub_type)?;
        let super_interface = self.resolve(&relation.super_type)?;

        if let Some(name) = super_interface
            .method_names()
            .find(|name| !sub_interface.contains(name))
        {
            return Err(self.fail(SubtypeError::MethodMissing { name: name.clone() }));
        }

        for (name, super_method) in &super_interface.methods {
            let Some(sub_method) = sub_interface.method(name) else {
                continue;
            };
            self.check_method(name, sub_method, super_method, constraints)?;
        }
        Ok(())
    }

    /// Every super overload must be absorbed by some sub overload.
    ///
    /// When none absorbs it, the failure of the first sub overload tried is
    /// reported.
    pub(crate) fn check_method(
        &mut self,
        name: &Atom,
        sub_method: &Method,
        super_method: &Method,
        constraints: &mut Constraints,
    ) -> RelationResult {
        for super_overload in &super_method.overloads {
            let mut first_failure: Option<Failure> = None;
            let mut absorbed = false;
            for sub_overload in &sub_method.overloads {
                match self.check_overload(name, sub_overload, super_overload, constraints) {
                    Ok(()) => {
                        absorbed = true;
                        break;
                    }
                    Err(CheckError::Failed(failure)) => {
                        first_failure.get_or_insert(failure);
                    }
                    Err(err) => return Err(err),
                }
            }
            if !absorbed {
                trace!(method = %name, "no overload absorbs super overload");
                return Err(match first_failure {
                    Some(failure) => CheckError::Failed(failure),
                    None => self.fail(SubtypeError::MethodMissing { name: name.clone() }),
                });
            }
        }
        Ok(())
    }

    /// Compare one overload pair, instantiating generic method types.
    ///
    /// Type parameters of the super overload become fresh variables that
    /// this comparison may constrain. The comparison only holds if every
    /// such variable still has a solution between its bounds; afterwards
    /// they are dropped from the domain, bounds included. Type parameters of
    /// the sub overload become fresh variables nothing may constrain.
    pub(crate) fn check_overload(
        &mut self,
        name: &Atom,
        sub_overload: &MethodType,
        super_overload: &MethodType,
        constraints: &mut Constraints,
    ) -> RelationResult {
        let (super_overload, super_vars) = instantiate_fresh(super_overload);
        let (sub_overload, _) = instantiate_fresh(sub_overload);

        constraints.extend_domain(super_vars.iter().cloned());
        let result = self
            .compare_method_types(name, &sub_overload, &super_overload, constraints)
            .and_then(|()| self.check_fresh_bounds(name, &super_vars, constraints));
        constraints.retract_domain(&super_vars);
        result
    }

    /// Every lower bound of each variable must be a subtype of every upper
    /// bound, i.e. the join of the lower bounds fits under the meet of the
    /// upper ones.
    fn check_fresh_bounds(
        &mut self,
        name: &Atom,
        vars: &[Atom],
        constraints: &mut Constraints,
    ) -> RelationResult {
        for var in vars {
            let lower = constraints.lower_bound(var).to_vec();
            let upper = constraints.upper_bound(var).to_vec();
            for lower_bound in &lower {
                for upper_bound in &upper {
                    match self.check_relation(lower_bound, upper_bound, constraints) {
                        Ok(()) => {}
                        Err(CheckError::Failed(_)) => {
                            trace!(
                                method = %name,
                                var = %var,
                                lower = %lower_bound,
                                upper = %upper_bound,
                                "method type parameter has no solution"
                            );
                            return Err(
                                self.fail(SubtypeError::MethodMissing { name: name.clone() })
                            );
                        }
                        Err(err) => return Err(err),
                    }
                }
            }
        }
        Ok(())
    }

    /// Parameters, then block, then return type.
    fn compare_method_types(
        &mut self,
        name: &Atom,
        sub_type: &MethodType,
        super_type: &MethodType,
        constraints: &mut Constraints,
    ) -> RelationResult {
        let Some(pairs) = match_params(&sub_type.params, &super_type.params) else {
            return Err(self.fail(SubtypeError::ParameterArity { name: name.clone() }));
        };
        for (super_param, sub_param) in pairs {
            self.check_relation(super_param, sub_param, constraints)?;
        }

        self.check_block(
            name,
            sub_type.block.as_ref(),
            super_type.block.as_ref(),
            constraints,
        )?;

        self.check_relation(&sub_type.return_type, &super_type.return_type, constraints)
    }

    /// Blocks compare with the sides flipped: the block a caller of the
    /// super method supplies must fit the block the sub method expects.
    fn check_block(
        &mut self,
        name: &Atom,
        sub_block: Option<&Block>,
        super_block: Option<&Block>,
        constraints: &mut Constraints,
    ) -> RelationResult {
        match (sub_block, super_block) {
            (None, None) => Ok(()),
            (Some(sub_block), None) if sub_block.optional => Ok(()),
            (Some(_), None) | (None, Some(_)) => {
                Err(self.fail(SubtypeError::BlockMismatch { name: name.clone() }))
            }
            (Some(sub_block), Some(super_block)) => {
                if super_block.optional && !sub_block.optional {
                    return Err(self.fail(SubtypeError::BlockMismatch { name: name.clone() }));
                }
                match self.compare_method_types(
                    name,
                    &super_block.method_type,
                    &sub_block.method_type,
                    constraints,
                ) {
                    Err(CheckError::Failed(_)) => {
                        Err(self.fail(SubtypeError::MethodMissing { name: name.clone() }))
                    }
                    other => other,
                }
            }
        }
    }
}

/// Replace the type parameters of `method_type` with fresh variables.
fn instantiate_fresh(method_type: &MethodType) -> (Cow<'_, MethodType>, Vec<Atom>) {
    if !method_type.is_generic() {
        return (Cow::Borrowed(method_type), Vec::new());
    }
    let vars: Vec<Atom> = method_type.type_params.iter().map(fresh_var).collect();
    let args: Vec<Type> = vars.iter().cloned().map(Type::Var).collect();
    (Cow::Owned(method_type.instantiate(&args)), vars)
}

/// Pair each parameter of the super method with the sub parameter that
/// receives the same argument, as `(super, sub)`.
///
/// Returns `None` when some call accepted by the super method would be
/// rejected by the sub method's arity alone.
fn match_params<'p>(sub: &'p Params, sup: &'p Params) -> Option<Vec<(&'p Type, &'p Type)>> {
    let mut pairs = Vec::new();

    if sub.required.len() > sup.required.len() {
        return None;
    }
    let sub_positional = sub.required.len() + sub.optional.len();
    for (index, super_param) in sup.required.iter().chain(&sup.optional).enumerate() {
        let sub_param = if index < sub.required.len() {
            &sub.required[index]
        } else if index < sub_positional {
            &sub.optional[index - sub.required.len()]
        } else {
            sub.rest.as_ref()?
        };
        pairs.push((super_param, sub_param));
    }
    if let Some(super_rest) = &sup.rest {
        let sub_rest = sub.rest.as_ref()?;
        pairs.push((super_rest, sub_rest));
        let super_positional = sup.required.len() + sup.optional.len();
        for sub_optional in sub.optional.iter().skip(super_positional.saturating_sub(sub.required.len())) {
            pairs.push((super_rest, sub_optional));
        }
    }

    if !sub
        .required_keywords
        .keys()
        .all(|keyword| sup.required_keywords.contains_key(keyword))
    {
        return None;
    }
    for (keyword, super_param) in sup.required_keywords.iter().chain(&sup.optional_keywords) {
        let sub_param = sub
            .required_keywords
            .get(keyword)
            .or_else(|| sub.optional_keywords.get(keyword))
            .or(sub.rest_keywords.as_ref())?;
        pairs.push((super_param, sub_param));
    }
    if let Some(super_rest) = &sup.rest_keywords {
        let sub_rest = sub.rest_keywords.as_ref()?;
        pairs.push((super_rest, sub_rest));
        for (keyword, sub_optional) in &sub.optional_keywords {
            if !sup.optional_keywords.contains_key(keyword) {
                pairs.push((super_rest, sub_optional));
            }
        }
    }

    Some(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(method_type: MethodType) -> Params {
        method_type.params
    }

    #[test]
    fn test_match_params_maps_optional_onto_rest() {
        let sub = params(MethodType::new(Type::Nil).with_required(Type::var("a")).with_rest(Type::var("r")));
        let sup = params(
            MethodType::new(Type::Nil)
                .with_required(Type::var("x"))
                .with_optional(Type::var("y")),
        );
        let pairs = match_params(&sub, &sup).expect("sub accepts every call");
        assert_eq!(
            pairs,
            vec![
                (&Type::var("x"), &Type::var("a")),
                (&Type::var("y"), &Type::var("r")),
            ]
        );
    }

    #[test]
    fn test_match_params_rejects_extra_required() {
        let sub = params(
            MethodType::new(Type::Nil)
                .with_required(Type::var("a"))
                .with_required(Type::var("b")),
        );
        let sup = params(MethodType::new(Type::Nil).with_required(Type::var("x")));
        assert!(match_params(&sub, &sup).is_none());
    }

    #[test]
    fn test_match_params_requires_rest_for_super_rest() {
        let sub = params(MethodType::new(Type::Nil).with_optional(Type::var("a")));
        let sup = params(MethodType::new(Type::Nil).with_rest(Type::var("r")));
        assert!(match_params(&sub, &sup).is_none());

        let sub = params(
            MethodType::new(Type::Nil)
                .with_optional(Type::var("a"))
                .with_rest(Type::var("s")),
        );
        let pairs = match_params(&sub, &sup).expect("rest absorbs rest");
        assert_eq!(
            pairs,
            vec![
                (&Type::var("r"), &Type::var("s")),
                (&Type::var("r"), &Type::var("a")),
            ]
        );
    }

    #[test]
    fn test_match_params_keywords() {
        let sup = params(
            MethodType::new(Type::Nil)
                .with_required_keyword("name", Type::var("n"))
                .with_optional_keyword("size", Type::var("s")),
        );

        let sub = params(
            MethodType::new(Type::Nil)
                .with_optional_keyword("name", Type::var("a"))
                .with_rest_keywords(Type::var("k")),
        );
        let pairs = match_params(&sub, &sup).expect("keywords absorbed");
        assert_eq!(
            pairs,
            vec![
                (&Type::var("n"), &Type::var("a")),
                (&Type::var("s"), &Type::var("k")),
            ]
        );

        // A required keyword the super method never passes.
        let sub = params(
            MethodType::new(Type::Nil)
                .with_required_keyword("name", Type::var("a"))
                .with_required_keyword("size", Type::var("b")),
        );
        assert!(match_params(&sub, &sup).is_none());
    }
}
