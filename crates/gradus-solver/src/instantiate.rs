//! Substitution of type variables and `self`/`instance`/`class` placeholders.

use crate::types::{Block, Method, MethodType, NominalType, Type};
use gradus_common::Atom;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Maps type variables to types, plus optional replacements for the three
/// placeholders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Substitution {
    vars: FxHashMap<Atom, Type>,
    self_type: Option<Type>,
    instance_type: Option<Type>,
    class_type: Option<Type>,
}

impl Substitution {
    pub fn empty() -> Self {
        Substitution::default()
    }

    /// Pair `params` with `args` positionally. Extra entries on either side
    /// are ignored; arity is validated by the caller.
    pub fn build(params: &[Atom], args: &[Type]) -> Self {
        let mut subst = Substitution::empty();
        for (param, arg) in params.iter().zip(args) {
            subst.insert(param.clone(), arg.clone());
        }
        subst
    }

    pub fn insert(&mut self, var: Atom, ty: Type) {
        self.vars.insert(var, ty);
    }

    pub fn get(&self, var: &Atom) -> Option<&Type> {
        self.vars.get(var)
    }

    pub fn with_self(mut self, ty: Option<Type>) -> Self {
        self.self_type = ty;
        self
    }

    pub fn with_instance(mut self, ty: Option<Type>) -> Self {
        self.instance_type = ty;
        self
    }

    pub fn with_class(mut self, ty: Option<Type>) -> Self {
        self.class_type = ty;
        self
    }

    pub fn self_type(&self) -> Option<&Type> {
        self.self_type.as_ref()
    }

    pub fn instance_type(&self) -> Option<&Type> {
        self.instance_type.as_ref()
    }

    pub fn class_type(&self) -> Option<&Type> {
        self.class_type.as_ref()
    }

    /// Variable entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&Atom, &Type)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
            && self.self_type.is_none()
            && self.instance_type.is_none()
            && self.class_type.is_none()
    }

    fn without_vars(&self, shadowed: &[Atom]) -> Substitution {
        let mut reduced = self.clone();
        for name in shadowed {
            reduced.vars.remove(name);
        }
        reduced
    }

    pub fn apply(&self, ty: &Type) -> Type {
        ty.subst(self)
    }
}

impl Type {
    /// Replace variables and placeholders according to `subst`.
    ///
    /// Unions and intersections are rebuilt through the smart constructors,
    /// so a substituted member that is itself a union is flattened.
    pub fn subst(&self, subst: &Substitution) -> Type {
        match self {
            Type::Any | Type::Bot | Type::Void | Type::Nil | Type::Bool | Type::Literal(_) => {
                self.clone()
            }
            Type::Var(name) => subst.get(name).cloned().unwrap_or_else(|| self.clone()),
            Type::SelfType => subst.self_type.clone().unwrap_or(Type::SelfType),
            Type::Instance => subst.instance_type.clone().unwrap_or(Type::Instance),
            Type::Class => subst.class_type.clone().unwrap_or(Type::Class),
            Type::Name(nominal) => Type::Name(NominalType {
                kind: nominal.kind,
                name: nominal.name.clone(),
                args: nominal.args.iter().map(|arg| arg.subst(subst)).collect(),
            }),
            Type::Union(members) => Type::union(members.iter().map(|m| m.subst(subst))),
            Type::Intersection(members) => {
                Type::intersection(members.iter().map(|m| m.subst(subst)))
            }
            Type::Tuple(elements) => Type::Tuple(elements.iter().map(|e| e.subst(subst)).collect()),
            Type::Record(fields) => Type::Record(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.subst(subst)))
                    .collect(),
            ),
            Type::Proc(method_type) => Type::Proc(Box::new(method_type.subst(subst))),
        }
    }
}

impl MethodType {
    /// Substitute everything except variables bound by this method's own
    /// type parameters.
    pub fn subst(&self, subst: &Substitution) -> MethodType {
        if self.type_params.iter().any(|p| subst.get(p).is_some()) {
            let reduced = subst.without_vars(&self.type_params);
            return self.subst_unshadowed(&reduced);
        }
        self.subst_unshadowed(subst)
    }

    fn subst_unshadowed(&self, subst: &Substitution) -> MethodType {
        MethodType {
            type_params: self.type_params.clone(),
            params: self.params.map_types(|ty| ty.subst(subst)),
            block: self.block.as_ref().map(|block| Block {
                method_type: Box::new(block.method_type.subst(subst)),
                optional: block.optional,
            }),
            return_type: self.return_type.subst(subst),
        }
    }

    /// Drop the type parameters, replacing each with the matching type in
    /// `args`.
    pub fn instantiate(&self, args: &[Type]) -> MethodType {
        let subst = Substitution::build(&self.type_params, args);
        let mut instantiated = self.subst_unshadowed(&subst);
        instantiated.type_params.clear();
        instantiated
    }
}

impl Method {
    pub fn subst(&self, subst: &Substitution) -> Method {
        Method {
            overloads: self.overloads.iter().map(|mt| mt.subst(subst)).collect(),
            overloading: self.overloading,
        }
    }
}

static FRESH_VAR_COUNTER: AtomicU32 = AtomicU32::new(1);

/// A variable name derived from `base` that no signature can spell.
pub fn fresh_var(base: &Atom) -> Atom {
    let id = FRESH_VAR_COUNTER.fetch_add(1, Ordering::Relaxed);
    Atom::from(format!("{base}#{id}"))
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
