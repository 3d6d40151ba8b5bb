//! Structural view of a type: its method table.
//!
//! The resolver turns any type into an [`Interface`], the mapping from method
//! name to overloads that rule 6 of the checker compares. Resolution is pure:
//! the same type against the same environment always yields an equal
//! interface, which is what makes memoizing closed nominal types sound.

use crate::caches::InterfaceCache;
use crate::caches::query_trace;
use crate::def::{SignatureEnv, well_known};
use crate::diagnostics::ResolveError;
use crate::inheritance::{Ancestor, AncestorBuilder, AncestorSide, check_arity, erased_instance_type};
use crate::instantiate::Substitution;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::{
    LiteralValue, Method, MethodType, NominalKind, NominalType, Type, TypeParam, TypeSet,
};
use gradus_common::Atom;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::trace;

/// Method table of a resolved type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Interface {
    pub type_params: Vec<TypeParam>,
    pub methods: IndexMap<Atom, Method>,
}

impl Interface {
    pub fn empty() -> Self {
        Interface::default()
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &Atom> {
        self.methods.keys()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

pub struct InterfaceResolver<'a> {
    env: &'a SignatureEnv,
    ancestors: AncestorBuilder<'a>,
    cache: Arc<InterfaceCache>,
    caching: bool,
}

impl<'a> InterfaceResolver<'a> {
    pub fn new(env: &'a SignatureEnv) -> Self {
        InterfaceResolver::with_cache(env, Arc::new(InterfaceCache::new()))
    }

    pub fn with_cache(env: &'a SignatureEnv, cache: Arc<InterfaceCache>) -> Self {
        InterfaceResolver {
            env,
            ancestors: AncestorBuilder::new(env),
            cache,
            caching: true,
        }
    }

    /// Enable or disable memoization of closed nominal types.
    pub fn set_caching(&mut self, caching: bool) {
        self.caching = caching;
    }

    pub fn env(&self) -> &'a SignatureEnv {
        self.env
    }

    pub fn cache(&self) -> &Arc<InterfaceCache> {
        &self.cache
    }

    pub fn ancestors(&self) -> &AncestorBuilder<'a> {
        &self.ancestors
    }

    /// Declared type parameters of the declaration `nominal` refers to.
    pub fn type_params(&self, nominal: &NominalType) -> Result<&'a [TypeParam], ResolveError> {
        let params = match nominal.kind {
            NominalKind::Interface => self
                .env
                .interface_decl(&nominal.name)
                .map(|def| def.type_params.as_slice()),
            NominalKind::Instance | NominalKind::Class { .. } => self
                .env
                .class_decl(&nominal.name)
                .map(|def| def.type_params.as_slice()),
            NominalKind::Alias => self
                .env
                .alias_decl(&nominal.name)
                .map(|alias| alias.type_params.as_slice()),
        };
        params.ok_or_else(|| ResolveError::NoSuchType {
            name: nominal.name.clone(),
        })
    }

    /// Resolve `ty` into its interface.
    ///
    /// `self`, `instance` and `class` cannot be resolved on their own; callers
    /// substitute them from a context first.
    pub fn resolve(&self, ty: &Type) -> Result<Arc<Interface>, ResolveError> {
        let query_id = query_trace::enabled().then(query_trace::next_query_id);
        if let Some(query_id) = query_id {
            query_trace::unary_start(query_id, "resolve_interface", ty);
        }
        let mut depth = DepthCounter::with_profile(RecursionProfile::InterfaceResolution);
        let result = self.resolve_at(ty, &mut depth);
        if let (Some(query_id), Ok(interface)) = (query_id, &result) {
            query_trace::unary_end(query_id, "resolve_interface", interface.len(), false);
        }
        result
    }

    fn resolve_at(
        &self,
        ty: &Type,
        depth: &mut DepthCounter,
    ) -> Result<Arc<Interface>, ResolveError> {
        if !depth.enter() {
            return Err(ResolveError::ResolutionTooDeep { ty: ty.clone() });
        }
        let result = self.resolve_entered(ty, depth);
        depth.leave();
        result
    }

    fn resolve_entered(
        &self,
        ty: &Type,
        depth: &mut DepthCounter,
    ) -> Result<Arc<Interface>, ResolveError> {
        match ty {
            Type::SelfType | Type::Instance | Type::Class => {
                Err(ResolveError::UnresolvedPlaceholder {
                    placeholder: ty.clone(),
                })
            }
            Type::Any | Type::Bot | Type::Void | Type::Var(_) => Ok(Arc::new(Interface::empty())),
            Type::Name(nominal) if nominal.kind == NominalKind::Alias => {
                self.resolve_at(&self.env.expand_alias(nominal)?, depth)
            }
            Type::Name(nominal) => self.resolve_nominal(ty, nominal),
            Type::Nil => self.carrier(well_known::NIL_CLASS, Vec::new()),
            Type::Bool => {
                let bool_type = Type::union([
                    Type::instance(well_known::TRUE_CLASS),
                    Type::instance(well_known::FALSE_CLASS),
                ]);
                if self.env.class_decl(well_known::TRUE_CLASS).is_some()
                    && self.env.class_decl(well_known::FALSE_CLASS).is_some()
                {
                    self.resolve_at(&bool_type, depth)
                } else {
                    Ok(Arc::new(Interface::empty()))
                }
            }
            Type::Literal(value) => {
                let carrier = match value {
                    LiteralValue::Integer(_) => well_known::INTEGER,
                    LiteralValue::String(_) => well_known::STRING,
                    LiteralValue::Symbol(_) => well_known::SYMBOL,
                    LiteralValue::Bool(true) => well_known::TRUE_CLASS,
                    LiteralValue::Bool(false) => well_known::FALSE_CLASS,
                };
                self.carrier(carrier, Vec::new())
            }
            Type::Tuple(elements) => {
                self.carrier(well_known::ARRAY, vec![Type::union(elements.iter().cloned())])
            }
            Type::Record(fields) => self.carrier(
                well_known::HASH,
                vec![
                    Type::instance(well_known::SYMBOL),
                    Type::union(fields.values().cloned()),
                ],
            ),
            Type::Proc(method_type) => {
                let mut interface = (*self.carrier(well_known::PROC, Vec::new())?).clone();
                interface.methods.insert(
                    Atom::new(well_known::CALL),
                    Method::single((**method_type).clone()),
                );
                Ok(Arc::new(interface))
            }
            Type::Union(members) => {
                let interfaces = self.resolve_members(members, depth)?;
                Ok(Arc::new(union_interface(&interfaces)))
            }
            Type::Intersection(members) => {
                let interfaces = self.resolve_members(members, depth)?;
                Ok(Arc::new(intersection_interface(&interfaces)))
            }
        }
    }

    fn resolve_members(
        &self,
        members: &TypeSet,
        depth: &mut DepthCounter,
    ) -> Result<Vec<Arc<Interface>>, ResolveError> {
        members
            .iter()
            .map(|member| self.resolve_at(member, depth))
            .collect()
    }

    /// Interface of a builtin carrier class, or an empty interface when the
    /// environment does not declare it.
    fn carrier(&self, name: &str, mut args: Vec<Type>) -> Result<Arc<Interface>, ResolveError> {
        let Some(def) = self.env.class_decl(name) else {
            return Ok(Arc::new(Interface::empty()));
        };
        if def.type_params.len() != args.len() {
            args = vec![Type::Any; def.type_params.len()];
        }
        let ty = Type::instance_with(def.name.clone(), args);
        match &ty {
            Type::Name(nominal) => self.resolve_nominal(&ty, nominal),
            _ => Ok(Arc::new(Interface::empty())),
        }
    }

    fn resolve_nominal(
        &self,
        ty: &Type,
        nominal: &NominalType,
    ) -> Result<Arc<Interface>, ResolveError> {
        let cacheable = self.caching && ty.is_closed() && !ty.has_placeholder();
        if cacheable {
            if let Some(hit) = self.cache.get(ty) {
                return Ok(hit);
            }
        }
        let interface = match nominal.kind {
            NominalKind::Instance => self.instance_interface(ty, nominal)?,
            NominalKind::Class { constructor } => {
                self.singleton_interface(ty, nominal, constructor)?
            }
            NominalKind::Interface => self.named_interface(ty, nominal)?,
            NominalKind::Alias => {
                return self.resolve(&self.env.expand_alias(nominal)?);
            }
        };
        trace!(
            ty = %ty,
            methods = interface.len(),
            cached = cacheable,
            "InterfaceResolver::resolve_nominal"
        );
        let interface = Arc::new(interface);
        if cacheable {
            return Ok(self.cache.insert(ty.clone(), interface));
        }
        Ok(interface)
    }

    fn instance_interface(
        &self,
        ty: &Type,
        nominal: &NominalType,
    ) -> Result<Interface, ResolveError> {
        let def = self
            .env
            .class_decl(&nominal.name)
            .ok_or_else(|| ResolveError::NoSuchType {
                name: nominal.name.clone(),
            })?;
        check_arity(def, &nominal.args)?;
        let ancestors = self
            .ancestors
            .instance_ancestors(&nominal.name, &nominal.args)?;
        let placeholders = Substitution::empty()
            .with_self(Some(ty.clone()))
            .with_instance(Some(ty.clone()))
            .with_class(Some(Type::class(nominal.name.clone())));
        Ok(Interface {
            type_params: def.type_params.clone(),
            methods: self.collect_methods(&ancestors, &placeholders),
        })
    }

    fn singleton_interface(
        &self,
        ty: &Type,
        nominal: &NominalType,
        constructor: Option<bool>,
    ) -> Result<Interface, ResolveError> {
        let def = self
            .env
            .class_decl(&nominal.name)
            .ok_or_else(|| ResolveError::NoSuchType {
                name: nominal.name.clone(),
            })?;
        let instance_type = erased_instance_type(def);
        let ancestors = self.ancestors.singleton_ancestors(&nominal.name)?;
        let placeholders = Substitution::empty()
            .with_self(Some(ty.clone()))
            .with_instance(Some(instance_type.clone()))
            .with_class(Some(Type::class(nominal.name.clone())));
        let mut methods = self.collect_methods(&ancestors, &placeholders);

        match constructor {
            Some(true) => {
                let instance_interface = self.resolve(&instance_type)?;
                if let Some(initialize) = instance_interface.method(well_known::INITIALIZE) {
                    let overloads = initialize
                        .overloads
                        .iter()
                        .map(|overload| MethodType {
                            return_type: instance_type.clone(),
                            ..overload.clone()
                        })
                        .collect();
                    methods.insert(Atom::new(well_known::NEW), Method::new(overloads));
                }
            }
            Some(false) => {
                methods.shift_remove(well_known::NEW);
            }
            None => {}
        }

        Ok(Interface {
            type_params: Vec::new(),
            methods,
        })
    }

    fn named_interface(
        &self,
        ty: &Type,
        nominal: &NominalType,
    ) -> Result<Interface, ResolveError> {
        let def = self
            .env
            .interface_decl(&nominal.name)
            .ok_or_else(|| ResolveError::NoSuchType {
                name: nominal.name.clone(),
            })?;
        check_arity(def, &nominal.args)?;
        let ancestors = self
            .ancestors
            .interface_ancestors(&nominal.name, &nominal.args)?;
        let placeholders = Substitution::empty().with_self(Some(ty.clone()));
        Ok(Interface {
            type_params: def.type_params.clone(),
            methods: self.collect_methods(&ancestors, &placeholders),
        })
    }

    /// Merge method tables from least to most specific ancestor.
    ///
    /// A more specific definition replaces an inherited one in place, keeping
    /// the name's original position; an overloading definition is prepended
    /// to the inherited overloads.
    fn collect_methods(
        &self,
        ancestors: &[Ancestor],
        placeholders: &Substitution,
    ) -> IndexMap<Atom, Method> {
        let mut methods: IndexMap<Atom, Method> = IndexMap::new();
        for ancestor in ancestors.iter().rev() {
            let Some(def) = self.env.find(&ancestor.name) else {
                continue;
            };
            let table = match ancestor.side {
                AncestorSide::Instance => &def.instance_methods,
                AncestorSide::Singleton => &def.singleton_methods,
            };
            if table.is_empty() {
                continue;
            }
            let mut subst = placeholders.clone();
            if ancestor.side == AncestorSide::Instance {
                for (param, arg) in def.type_params.iter().zip(&ancestor.args) {
                    subst.insert(param.name.clone(), arg.clone());
                }
            }
            for (name, method) in table {
                let method = method.subst(&subst);
                match methods.get_mut(name) {
                    Some(existing) if method.overloading => {
                        let mut overloads = method.overloads;
                        for inherited in existing.overloads.drain(..) {
                            if !overloads.contains(&inherited) {
                                overloads.push(inherited);
                            }
                        }
                        existing.overloads = overloads;
                    }
                    Some(existing) => existing.overloads = method.overloads,
                    None => {
                        methods.insert(name.clone(), Method::new(method.overloads));
                    }
                }
            }
        }
        methods
    }
}

/// Methods callable on every member: names present in all of them, with the
/// overloads of every member.
fn union_interface(interfaces: &[Arc<Interface>]) -> Interface {
    let Some((first, rest)) = interfaces.split_first() else {
        return Interface::empty();
    };
    let mut methods = IndexMap::new();
    for name in first.method_names() {
        if !rest.iter().all(|other| other.contains(name)) {
            continue;
        }
        let mut overloads: Vec<MethodType> = Vec::new();
        for interface in interfaces {
            if let Some(method) = interface.method(name) {
                for overload in &method.overloads {
                    if !overloads.contains(overload) {
                        overloads.push(overload.clone());
                    }
                }
            }
        }
        methods.insert(name.clone(), Method::new(overloads));
    }
    Interface {
        type_params: Vec::new(),
        methods,
    }
}

/// Methods callable on any member.
///
/// A name defined by a single member keeps that member's overloads. A name
/// defined by several members keeps only the overloads they all share, which
/// may leave it with none.
fn intersection_interface(interfaces: &[Arc<Interface>]) -> Interface {
    let mut methods: IndexMap<Atom, Method> = IndexMap::new();
    for interface in interfaces {
        for name in interface.method_names() {
            if methods.contains_key(name) {
                continue;
            }
            let defining: Vec<&Method> = interfaces
                .iter()
                .filter_map(|other| other.method(name))
                .collect();
            let overloads = match defining.split_first() {
                Some((only, [])) => only.overloads.clone(),
                Some((first, others)) => first
                    .overloads
                    .iter()
                    .filter(|overload| {
                        others
                            .iter()
                            .all(|other| other.overloads.contains(*overload))
                    })
                    .cloned()
                    .collect(),
                None => Vec::new(),
            };
            methods.insert(name.clone(), Method::new(overloads));
        }
    }
    Interface {
        type_params: Vec::new(),
        methods,
    }
}

#[cfg(test)]
#[path = "../tests/interface_tests.rs"]
mod tests;
