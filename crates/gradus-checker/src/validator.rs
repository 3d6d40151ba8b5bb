//! Declaration validation.
//!
//! The validator walks every declaration of a signature environment and
//! reports problems the environment builder cannot see on its own:
//!
//! - type arguments that violate a parameter's upper bound, including the
//!   arguments of type alias applications and the bodies of aliases,
//! - instance variables redeclared with a type incompatible with the
//!   nearest ancestor's declaration,
//! - mixins whose module self-type the mixing-in class does not satisfy.
//!
//! Every problem is recorded; nothing stops at the first one. A resolver
//! error (unknown name, wrong arity, cyclic ancestry) aborts only the
//! declaration it was found in.

use crate::diagnostics::SignatureDiagnostic;
use gradus_common::Atom;
use gradus_solver::instantiate::Substitution;
use gradus_solver::visitor::{for_each_method_type_child, walk_nominal_types};
use gradus_solver::{
    AncestorRef, AncestorSide, CheckContext, Constraints, Definition, Method, NominalKind,
    NominalType, Relation, ResolveError, SignatureEnv, SubtypeChecker, Type, TypeAlias, TypeParam,
};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

pub struct Validator<'c, 'a> {
    checker: &'c mut SubtypeChecker<'a>,
    errors: Vec<SignatureDiagnostic>,
}

impl<'c, 'a> Validator<'c, 'a> {
    pub fn new(checker: &'c mut SubtypeChecker<'a>) -> Self {
        Validator {
            checker,
            errors: Vec::new(),
        }
    }

    pub fn env(&self) -> &'a SignatureEnv {
        self.checker.env()
    }

    /// Validate the whole environment, replacing earlier diagnostics.
    pub fn validate(&mut self) {
        self.errors.clear();
        let env = self.env();

        for def in env.class_decls() {
            self.validate_class(def);
        }
        for def in env.interface_decls() {
            self.validate_interface(def);
        }
        for (name, ty) in env.constants() {
            debug!(name = %name, "validating constant");
            self.validate_named_type(name, ty);
        }
        for (name, ty) in env.globals() {
            debug!(name = %name, "validating global");
            self.validate_named_type(name, ty);
        }
        for alias in env.alias_decls() {
            self.validate_alias(alias);
        }
    }

    /// Check the type applications inside a single type.
    pub fn validate_type(&mut self, ty: &Type) {
        let name = Atom::from(ty.to_string());
        self.validate_named_type(&name, ty);
    }

    fn validate_named_type(&mut self, name: &Atom, ty: &Type) {
        let mut pass = Pass {
            checker: &mut *self.checker,
            errors: &mut self.errors,
        };
        if let Err(err) = pass.type_applications(ty) {
            self.record(name, err);
        }
    }

    fn validate_class(&mut self, def: &Definition) {
        debug!(name = %def.name, kind = ?def.kind, "validating declaration");
        let bounds = upper_bounds(&def.type_params);
        let errors = &mut self.errors;
        let mut result = self
            .checker
            .with_variable_bounds(bounds, |checker| Pass { checker, errors }.instance_side(def));
        if result.is_ok() {
            // Class type parameters are not in scope on the singleton side.
            result = Pass {
                checker: &mut *self.checker,
                errors: &mut self.errors,
            }
            .singleton_side(def);
        }
        if let Err(err) = result {
            self.record(&def.name, err);
        }
    }

    /// The body is checked with the alias's own parameter bounds in scope.
    fn validate_alias(&mut self, alias: &TypeAlias) {
        debug!(name = %alias.name, "validating alias");
        let bounds = upper_bounds(&alias.type_params);
        let errors = &mut self.errors;
        let result = self.checker.with_variable_bounds(bounds, |checker| {
            Pass { checker, errors }.type_applications(&alias.body)
        });
        if let Err(err) = result {
            self.record(&alias.name, err);
        }
    }

    fn validate_interface(&mut self, def: &Definition) {
        debug!(name = %def.name, "validating interface");
        let bounds = upper_bounds(&def.type_params);
        let errors = &mut self.errors;
        let result = self.checker.with_variable_bounds(bounds, |checker| {
            let mut pass = Pass { checker, errors };
            for ancestor in &def.includes {
                pass.ancestor_args(ancestor)?;
            }
            pass.methods(def.instance_methods.values())
        });
        if let Err(err) = result {
            self.record(&def.name, err);
        }
    }

    fn record(&mut self, declaration: &Atom, err: ResolveError) {
        debug!(declaration = %declaration, error = %err, "declaration aborted");
        self.errors
            .push(SignatureDiagnostic::from_resolve_error(declaration, err));
    }

    pub fn has_error(&self) -> bool {
        !self.no_error()
    }

    pub fn no_error(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[SignatureDiagnostic] {
        &self.errors
    }

    pub fn each_error(&self) -> impl Iterator<Item = &SignatureDiagnostic> {
        self.errors.iter()
    }

    pub fn into_errors(self) -> Vec<SignatureDiagnostic> {
        self.errors
    }

    /// The diagnostic list as a JSON array.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.errors)
    }
}

/// Declared upper bounds keyed by parameter name.
fn upper_bounds(params: &[TypeParam]) -> FxHashMap<Atom, Type> {
    params
        .iter()
        .filter_map(|param| {
            param
                .upper_bound
                .as_ref()
                .map(|bound| (param.name.clone(), bound.clone()))
        })
        .collect()
}

/// `self`, `instance` and `class` left as themselves.
fn placeholder_context() -> CheckContext {
    CheckContext::new(Some(Type::SelfType), Some(Type::Instance), Some(Type::Class))
}

/// The type an ancestor edge denotes: an interface type for interface
/// declarations, an instance type otherwise.
fn ancestor_type(env: &SignatureEnv, ancestor: &AncestorRef) -> Type {
    if env.interface_decl(&ancestor.name).is_some() {
        ancestor.to_interface_type()
    } else {
        ancestor.to_type()
    }
}

/// One declaration's worth of checks against a borrowed checker.
struct Pass<'p, 'a> {
    checker: &'p mut SubtypeChecker<'a>,
    errors: &'p mut Vec<SignatureDiagnostic>,
}

impl<'a> Pass<'_, 'a> {
    fn env(&self) -> &'a SignatureEnv {
        self.checker.env()
    }

    fn holds(&mut self, relation: &Relation, context: &CheckContext) -> Result<bool, ResolveError> {
        Ok(self
            .checker
            .check(relation, context, Constraints::empty())?
            .is_success())
    }

    fn instance_side(&mut self, def: &Definition) -> Result<(), ResolveError> {
        let env = self.env();
        let self_type = def.self_type();
        let args = self_type
            .as_nominal()
            .map(|nominal| nominal.args.clone())
            .unwrap_or_default();
        let ancestors = self
            .checker
            .resolver()
            .ancestors()
            .instance_ancestors(&def.name, &args)?;
        let parents = ancestors
            .iter()
            .skip_while(|ancestor| ancestor.name != def.name)
            .skip(1);

        for (name, var_type) in &def.instance_variables {
            let parent = parents.clone().find_map(|ancestor| {
                let parent_def = env.class_decl(&ancestor.name)?;
                let ty = parent_def.instance_variables.get(name)?;
                let subst = Substitution::build(&parent_def.type_param_names(), &ancestor.args);
                Some(ty.subst(&subst))
            });
            if let Some(parent_type) = parent {
                self.instance_variable(name, var_type, parent_type, &CheckContext::empty())?;
            }
        }

        let mut subject: Vec<Type> = def
            .self_types
            .iter()
            .map(|ancestor| ancestor_type(env, ancestor))
            .collect();
        subject.push(self_type);
        let subject = Type::intersection(subject);
        for included in &def.includes {
            self.module_self_types(&def.name, &subject, included)?;
        }

        for ancestor in def
            .super_class
            .iter()
            .chain(&def.includes)
            .chain(&def.prepends)
            .chain(&def.self_types)
        {
            self.ancestor_args(ancestor)?;
        }
        for ty in def.instance_variables.values() {
            self.type_applications(ty)?;
        }
        self.methods(def.instance_methods.values())
    }

    fn singleton_side(&mut self, def: &Definition) -> Result<(), ResolveError> {
        let env = self.env();
        let ancestors = self
            .checker
            .resolver()
            .ancestors()
            .singleton_ancestors(&def.name)?;
        let parents = ancestors
            .iter()
            .filter(|ancestor| ancestor.side == AncestorSide::Singleton)
            .skip(1);

        for (name, var_type) in &def.class_instance_variables {
            let parent = parents.clone().find_map(|ancestor| {
                env.class_decl(&ancestor.name)?
                    .class_instance_variables
                    .get(name)
                    .cloned()
            });
            if let Some(parent_type) = parent {
                self.instance_variable(name, var_type, parent_type, &placeholder_context())?;
            }
        }

        let subject = Type::class(def.name.clone());
        for extended in &def.extends {
            self.module_self_types(&def.name, &subject, extended)?;
        }

        for ancestor in &def.extends {
            self.ancestor_args(ancestor)?;
        }
        for ty in def.class_instance_variables.values() {
            self.type_applications(ty)?;
        }
        self.methods(def.singleton_methods.values())
    }

    /// The redeclared type must be equivalent to the ancestor's.
    fn instance_variable(
        &mut self,
        name: &Atom,
        var_type: &Type,
        parent_type: Type,
        context: &CheckContext,
    ) -> Result<(), ResolveError> {
        let relation = Relation::new(var_type.clone(), parent_type);
        let compatible = self.holds(&relation, context)? && self.holds(&relation.flip(), context)?;
        trace!(name = %name, relation = %relation, compatible, "instance variable");
        if !compatible {
            self.errors
                .push(SignatureDiagnostic::InstanceVariableTypeError {
                    name: name.clone(),
                    var_type: relation.sub_type,
                    parent_type: relation.super_type,
                });
        }
        Ok(())
    }

    /// `subject` must satisfy every self-type constraint of the mixed-in
    /// module, with the mixin's arguments applied.
    fn module_self_types(
        &mut self,
        name: &Atom,
        subject: &Type,
        mixin: &AncestorRef,
    ) -> Result<(), ResolveError> {
        let env = self.env();
        let module = env
            .class_decl(&mixin.name)
            .ok_or_else(|| ResolveError::NoSuchType {
                name: mixin.name.clone(),
            })?;
        if module.type_params.len() != mixin.args.len() {
            return Err(ResolveError::InvalidTypeApplication {
                name: mixin.name.clone(),
                expected: module.type_params.len(),
                actual: mixin.args.len(),
            });
        }
        let subst = Substitution::build(&module.type_param_names(), &mixin.args);
        for self_type in &module.self_types {
            let constraint = ancestor_type(env, self_type).subst(&subst);
            let relation = Relation::new(subject.clone(), constraint);
            if !self.holds(&relation, &placeholder_context())? {
                debug!(name = %name, relation = %relation, "module self type not satisfied");
                self.errors.push(SignatureDiagnostic::ModuleSelfTypeError {
                    name: name.clone(),
                    ancestor: mixin.to_type(),
                    relation,
                });
            }
        }
        Ok(())
    }

    fn ancestor_args(&mut self, ancestor: &AncestorRef) -> Result<(), ResolveError> {
        let ty = ancestor_type(self.env(), ancestor);
        self.type_applications(&ty)
    }

    fn methods<'m>(&mut self, methods: impl Iterator<Item = &'m Method>) -> Result<(), ResolveError> {
        for method in methods {
            for overload in &method.overloads {
                let mut types = Vec::new();
                for_each_method_type_child(overload, |ty| types.push(ty.clone()));
                for ty in &types {
                    self.type_applications(ty)?;
                }
            }
        }
        Ok(())
    }

    /// Check every nominal type reachable from `ty` against its declaration's
    /// type parameters.
    fn type_applications(&mut self, ty: &Type) -> Result<(), ResolveError> {
        let mut nominals: Vec<NominalType> = Vec::new();
        walk_nominal_types(ty, &mut |nominal| nominals.push(nominal.clone()));

        for nominal in nominals {
            // `singleton(C)` takes no type arguments.
            if matches!(nominal.kind, NominalKind::Class { .. }) {
                continue;
            }
            let params = self.checker.resolver().type_params(&nominal)?;
            if params.len() != nominal.args.len() {
                return Err(ResolveError::InvalidTypeApplication {
                    name: nominal.name.clone(),
                    expected: params.len(),
                    actual: nominal.args.len(),
                });
            }
            let names: Vec<Atom> = params.iter().map(|param| param.name.clone()).collect();
            let subst = Substitution::build(&names, &nominal.args);
            for (param, arg) in params.iter().zip(&nominal.args) {
                let Some(bound) = &param.upper_bound else {
                    continue;
                };
                let relation = Relation::new(arg.clone(), bound.subst(&subst));
                if !self.holds(&relation, &CheckContext::empty())? {
                    trace!(name = %nominal.name, relation = %relation, "upper bound violated");
                    self.errors
                        .push(SignatureDiagnostic::UnsatisfiableTypeApplication {
                            type_name: nominal.name.clone(),
                            type_arg: arg.clone(),
                            type_param: param.clone(),
                        });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/pass_tests.rs"]
mod tests;
