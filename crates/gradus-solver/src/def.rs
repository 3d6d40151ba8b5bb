//! Declarations and the signature environment.
//!
//! A [`SignatureEnv`] is the solver's view of a loaded set of signatures:
//! classes, modules and interfaces keyed by absolute name, type aliases, plus
//! constant and global variable types. It is built once, then shared read-only by every
//! checker and resolver that borrows it.

use crate::diagnostics::{EnvError, ResolveError};
use crate::instantiate::Substitution;
use crate::types::{Method, MethodType, NominalType, Type, TypeParam};
use gradus_common::Atom;
use indexmap::IndexMap;
use tracing::trace;

/// Absolute names the solver itself refers to.
pub mod well_known {
    pub const BASIC_OBJECT: &str = "::BasicObject";
    pub const OBJECT: &str = "::Object";
    pub const MODULE: &str = "::Module";
    pub const CLASS: &str = "::Class";
    pub const STRING: &str = "::String";
    pub const INTEGER: &str = "::Integer";
    pub const SYMBOL: &str = "::Symbol";
    pub const ARRAY: &str = "::Array";
    pub const HASH: &str = "::Hash";
    pub const NIL_CLASS: &str = "::NilClass";
    pub const TRUE_CLASS: &str = "::TrueClass";
    pub const FALSE_CLASS: &str = "::FalseClass";
    pub const PROC: &str = "::Proc";

    pub const INITIALIZE: &str = "initialize";
    pub const NEW: &str = "new";
    pub const CALL: &str = "call";
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DefKind {
    Class,
    Module,
    Interface,
}

/// `super_class`, `include`, `extend`, `prepend` and self-type edges.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AncestorRef {
    pub name: Atom,
    pub args: Vec<Type>,
}

impl AncestorRef {
    pub fn new(name: impl Into<Atom>, args: Vec<Type>) -> Self {
        AncestorRef {
            name: name.into(),
            args,
        }
    }

    /// The instance type this edge denotes.
    pub fn to_type(&self) -> Type {
        Type::instance_with(self.name.clone(), self.args.clone())
    }

    /// Interface edges denote interface types.
    pub fn to_interface_type(&self) -> Type {
        Type::interface(self.name.clone(), self.args.clone())
    }
}

/// A class, module or interface declaration.
#[derive(Clone, Debug)]
pub struct Definition {
    pub kind: DefKind,
    pub name: Atom,
    pub type_params: Vec<TypeParam>,
    pub super_class: Option<AncestorRef>,
    pub includes: Vec<AncestorRef>,
    pub extends: Vec<AncestorRef>,
    pub prepends: Vec<AncestorRef>,
    /// Module self-type constraints (`module M : Foo`).
    pub self_types: Vec<AncestorRef>,
    pub instance_methods: IndexMap<Atom, Method>,
    pub singleton_methods: IndexMap<Atom, Method>,
    pub instance_variables: IndexMap<Atom, Type>,
    pub class_instance_variables: IndexMap<Atom, Type>,
}

impl Definition {
    fn empty(kind: DefKind, name: Atom) -> Self {
        Definition {
            kind,
            name,
            type_params: Vec::new(),
            super_class: None,
            includes: Vec::new(),
            extends: Vec::new(),
            prepends: Vec::new(),
            self_types: Vec::new(),
            instance_methods: IndexMap::new(),
            singleton_methods: IndexMap::new(),
            instance_variables: IndexMap::new(),
            class_instance_variables: IndexMap::new(),
        }
    }

    pub fn class(name: impl Into<Atom>) -> Self {
        Definition::empty(DefKind::Class, name.into())
    }

    pub fn module(name: impl Into<Atom>) -> Self {
        Definition::empty(DefKind::Module, name.into())
    }

    pub fn interface(name: impl Into<Atom>) -> Self {
        Definition::empty(DefKind::Interface, name.into())
    }

    pub fn with_type_param(mut self, param: TypeParam) -> Self {
        self.type_params.push(param);
        self
    }

    /// Invariant parameters without bounds.
    pub fn with_type_params<A: Into<Atom>>(mut self, names: impl IntoIterator<Item = A>) -> Self {
        self.type_params
            .extend(names.into_iter().map(|name| TypeParam::new(name)));
        self
    }

    pub fn with_super_class(mut self, name: impl Into<Atom>, args: Vec<Type>) -> Self {
        self.super_class = Some(AncestorRef::new(name, args));
        self
    }

    pub fn with_include(mut self, name: impl Into<Atom>, args: Vec<Type>) -> Self {
        self.includes.push(AncestorRef::new(name, args));
        self
    }

    pub fn with_extend(mut self, name: impl Into<Atom>, args: Vec<Type>) -> Self {
        self.extends.push(AncestorRef::new(name, args));
        self
    }

    pub fn with_prepend(mut self, name: impl Into<Atom>, args: Vec<Type>) -> Self {
        self.prepends.push(AncestorRef::new(name, args));
        self
    }

    pub fn with_self_type(mut self, name: impl Into<Atom>, args: Vec<Type>) -> Self {
        self.self_types.push(AncestorRef::new(name, args));
        self
    }

    pub fn with_method(mut self, name: impl Into<Atom>, overloads: Vec<MethodType>) -> Self {
        self.instance_methods
            .insert(name.into(), Method::new(overloads));
        self
    }

    /// An instance method declared with `| ...`.
    pub fn with_overloading_method(
        mut self,
        name: impl Into<Atom>,
        overloads: Vec<MethodType>,
    ) -> Self {
        self.instance_methods
            .insert(name.into(), Method::overloading(overloads));
        self
    }

    pub fn with_singleton_method(
        mut self,
        name: impl Into<Atom>,
        overloads: Vec<MethodType>,
    ) -> Self {
        self.singleton_methods
            .insert(name.into(), Method::new(overloads));
        self
    }

    pub fn with_ivar(mut self, name: impl Into<Atom>, ty: Type) -> Self {
        self.instance_variables.insert(name.into(), ty);
        self
    }

    pub fn with_class_ivar(mut self, name: impl Into<Atom>, ty: Type) -> Self {
        self.class_instance_variables.insert(name.into(), ty);
        self
    }

    pub fn is_class(&self) -> bool {
        self.kind == DefKind::Class
    }

    pub fn is_module(&self) -> bool {
        self.kind == DefKind::Module
    }

    pub fn is_interface(&self) -> bool {
        self.kind == DefKind::Interface
    }

    pub fn type_param_names(&self) -> Vec<Atom> {
        self.type_params.iter().map(|p| p.name.clone()).collect()
    }

    /// The instance type with every type parameter as a variable:
    /// `C['a, 'b]`.
    pub fn self_type(&self) -> Type {
        let args = self
            .type_params
            .iter()
            .map(|p| Type::Var(p.name.clone()))
            .collect();
        match self.kind {
            DefKind::Interface => Type::interface(self.name.clone(), args),
            DefKind::Class | DefKind::Module => Type::instance_with(self.name.clone(), args),
        }
    }
}

/// `type name[params] = body`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeAlias {
    pub name: Atom,
    pub type_params: Vec<TypeParam>,
    pub body: Type,
}

impl TypeAlias {
    pub fn new(name: impl Into<Atom>, body: Type) -> Self {
        TypeAlias {
            name: name.into(),
            type_params: Vec::new(),
            body,
        }
    }

    pub fn with_type_param(mut self, param: TypeParam) -> Self {
        self.type_params.push(param);
        self
    }

    pub fn with_type_params<A: Into<Atom>>(mut self, names: impl IntoIterator<Item = A>) -> Self {
        self.type_params
            .extend(names.into_iter().map(|name| TypeParam::new(name)));
        self
    }

    /// The body with `args` in place of the parameters.
    pub fn apply(&self, args: &[Type]) -> Result<Type, ResolveError> {
        if self.type_params.len() != args.len() {
            return Err(ResolveError::InvalidTypeApplication {
                name: self.name.clone(),
                expected: self.type_params.len(),
                actual: args.len(),
            });
        }
        let names: Vec<Atom> = self.type_params.iter().map(|param| param.name.clone()).collect();
        Ok(self.body.subst(&Substitution::build(&names, args)))
    }
}

/// Loaded signatures.
#[derive(Clone, Debug, Default)]
pub struct SignatureEnv {
    definitions: IndexMap<Atom, Definition>,
    aliases: IndexMap<Atom, TypeAlias>,
    constants: IndexMap<Atom, Type>,
    globals: IndexMap<Atom, Type>,
}

impl SignatureEnv {
    pub fn new() -> Self {
        SignatureEnv::default()
    }

    /// Insert a declaration. Names must be unique across classes, modules
    /// and interfaces.
    pub fn add(&mut self, definition: Definition) -> Result<(), EnvError> {
        if self.definitions.contains_key(&definition.name) {
            return Err(EnvError::DuplicateDeclaration {
                name: definition.name,
            });
        }
        trace!(
            name = %definition.name,
            kind = ?definition.kind,
            type_params = definition.type_params.len(),
            "SignatureEnv::add"
        );
        self.definitions
            .insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, definition: Definition) -> Result<Self, EnvError> {
        self.add(definition)?;
        Ok(self)
    }

    pub fn add_alias(&mut self, alias: TypeAlias) -> Result<(), EnvError> {
        if self.aliases.contains_key(&alias.name) {
            return Err(EnvError::DuplicateDeclaration { name: alias.name });
        }
        trace!(name = %alias.name, body = %alias.body, "SignatureEnv::add_alias");
        self.aliases.insert(alias.name.clone(), alias);
        Ok(())
    }

    pub fn add_constant(&mut self, name: impl Into<Atom>, ty: Type) -> Result<(), EnvError> {
        let name = name.into();
        if self.constants.contains_key(&name) {
            return Err(EnvError::DuplicateDeclaration { name });
        }
        self.constants.insert(name, ty);
        Ok(())
    }

    pub fn add_global(&mut self, name: impl Into<Atom>, ty: Type) -> Result<(), EnvError> {
        let name = name.into();
        if self.globals.contains_key(&name) {
            return Err(EnvError::DuplicateDeclaration { name });
        }
        self.globals.insert(name, ty);
        Ok(())
    }

    /// Any declaration named `name`.
    pub fn find(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    /// A class or module named `name`.
    pub fn class_decl(&self, name: &str) -> Option<&Definition> {
        self.find(name).filter(|def| !def.is_interface())
    }

    pub fn interface_decl(&self, name: &str) -> Option<&Definition> {
        self.find(name).filter(|def| def.is_interface())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Classes and modules in insertion order.
    pub fn class_decls(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.values().filter(|def| !def.is_interface())
    }

    pub fn interface_decls(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.values().filter(|def| def.is_interface())
    }

    pub fn alias_decl(&self, name: &str) -> Option<&TypeAlias> {
        self.aliases.get(name)
    }

    /// Type aliases in insertion order.
    pub fn alias_decls(&self) -> impl Iterator<Item = &TypeAlias> {
        self.aliases.values()
    }

    /// One step of alias expansion: the body of the alias `nominal` names,
    /// applied to its arguments.
    pub fn expand_alias(&self, nominal: &NominalType) -> Result<Type, ResolveError> {
        self.alias_decl(&nominal.name)
            .ok_or_else(|| ResolveError::NoSuchType {
                name: nominal.name.clone(),
            })?
            .apply(&nominal.args)
    }

    pub fn constants(&self) -> impl Iterator<Item = (&Atom, &Type)> {
        self.constants.iter()
    }

    pub fn constant(&self, name: &str) -> Option<&Type> {
        self.constants.get(name)
    }

    pub fn globals(&self) -> impl Iterator<Item = (&Atom, &Type)> {
        self.globals.iter()
    }

    pub fn global(&self, name: &str) -> Option<&Type> {
        self.globals.get(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
