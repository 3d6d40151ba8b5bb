//! Ancestor linearization.
//!
//! Ancestors are listed most specific first, the order method lookup walks
//! them. On the instance side that is:
//!
//! ```text
//! prepended modules (last prepended first)
//! the class itself
//! included modules (last included first)
//! the superclass, linearized the same way
//! ```
//!
//! A class without an explicit superclass inherits from `::Object`. The
//! singleton side lists the class's singleton, its extended modules, the
//! superclass's singleton chain, and finally the instance ancestors of
//! `::Class` (or `::Module` for modules) applied to the class's instance
//! type.
//!
//! Type arguments are substituted through every edge, so an ancestor of
//! `::Array[::Integer]` reached through `include Enumerable['a]` is recorded
//! as `Enumerable[::Integer]`.

use crate::def::{AncestorRef, DefKind, Definition, SignatureEnv, well_known};
use crate::diagnostics::ResolveError;
use crate::instantiate::Substitution;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::{NominalKind, Type};
use gradus_common::Atom;
use tracing::trace;

/// Which method table of an ancestor contributes methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AncestorSide {
    /// `instance_methods` of the ancestor.
    Instance,
    /// `singleton_methods` of the ancestor.
    Singleton,
}

/// One entry of a linearized ancestor list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ancestor {
    pub name: Atom,
    pub args: Vec<Type>,
    pub side: AncestorSide,
}

/// The instance type of a class with every parameter left as `untyped`.
///
/// Used where a singleton receiver needs an instance type but the class's
/// type arguments are unknown.
pub fn erased_instance_type(def: &Definition) -> Type {
    Type::instance_with(def.name.clone(), vec![Type::Any; def.type_params.len()])
}

/// The superclass edge of `def`, including the implicit `::Object`.
pub fn superclass_of(env: &SignatureEnv, def: &Definition) -> Option<AncestorRef> {
    if def.kind != DefKind::Class {
        return None;
    }
    if let Some(explicit) = &def.super_class {
        return Some(explicit.clone());
    }
    let name = def.name.as_str();
    if name == well_known::BASIC_OBJECT || name == well_known::OBJECT {
        return None;
    }
    env.class_decl(well_known::OBJECT)
        .map(|_| AncestorRef::new(well_known::OBJECT, Vec::new()))
}

/// Computes ancestor lists against one environment.
pub struct AncestorBuilder<'a> {
    env: &'a SignatureEnv,
}

impl<'a> AncestorBuilder<'a> {
    pub fn new(env: &'a SignatureEnv) -> Self {
        AncestorBuilder { env }
    }

    /// Ancestors of the declaration a nominal type refers to. Type aliases
    /// have none of their own.
    pub fn ancestors(
        &self,
        kind: NominalKind,
        name: &Atom,
        args: &[Type],
    ) -> Result<Vec<Ancestor>, ResolveError> {
        match kind {
            NominalKind::Instance => self.instance_ancestors(name, args),
            NominalKind::Class { .. } => self.singleton_ancestors(name),
            NominalKind::Interface => self.interface_ancestors(name, args),
            NominalKind::Alias => Ok(Vec::new()),
        }
    }

    pub fn instance_ancestors(
        &self,
        name: &Atom,
        args: &[Type],
    ) -> Result<Vec<Ancestor>, ResolveError> {
        let mut walk = Walk::new(self.env);
        let result = walk.instance(name, args);
        walk.finish(name, result)
    }

    pub fn singleton_ancestors(&self, name: &Atom) -> Result<Vec<Ancestor>, ResolveError> {
        let mut walk = Walk::new(self.env);
        let result = walk.singleton(name);
        walk.finish(name, result)
    }

    pub fn interface_ancestors(
        &self,
        name: &Atom,
        args: &[Type],
    ) -> Result<Vec<Ancestor>, ResolveError> {
        let mut walk = Walk::new(self.env);
        let result = walk.interface(name, args);
        walk.finish(name, result)
    }
}

struct Walk<'a> {
    env: &'a SignatureEnv,
    guard: RecursionGuard<(Atom, AncestorSide)>,
    out: Vec<Ancestor>,
}

impl<'a> Walk<'a> {
    fn new(env: &'a SignatureEnv) -> Self {
        Walk {
            env,
            guard: RecursionGuard::with_profile(RecursionProfile::AncestorWalk),
            out: Vec::new(),
        }
    }

    fn finish(
        self,
        name: &Atom,
        result: Result<(), ResolveError>,
    ) -> Result<Vec<Ancestor>, ResolveError> {
        result?;
        trace!(name = %name, count = self.out.len(), "ancestors");
        Ok(self.out)
    }

    fn class_decl(&self, name: &Atom) -> Result<&'a Definition, ResolveError> {
        self.env
            .class_decl(name)
            .ok_or_else(|| ResolveError::NoSuchType { name: name.clone() })
    }

    fn interface_decl(&self, name: &Atom) -> Result<&'a Definition, ResolveError> {
        self.env
            .interface_decl(name)
            .ok_or_else(|| ResolveError::NoSuchType { name: name.clone() })
    }

    fn contains(&self, name: &Atom, side: AncestorSide) -> bool {
        self.out
            .iter()
            .any(|ancestor| ancestor.side == side && &ancestor.name == name)
    }

    /// Run `f` with `(name, side)` on the guard stack.
    fn guarded(
        &mut self,
        name: &Atom,
        side: AncestorSide,
        f: impl FnOnce(&mut Self) -> Result<(), ResolveError>,
    ) -> Result<(), ResolveError> {
        let key = (name.clone(), side);
        match self.guard.enter(key.clone()) {
            RecursionResult::Entered => {
                let result = f(self);
                self.guard.leave(&key);
                result
            }
            RecursionResult::Cycle(_) => Err(ResolveError::CyclicAncestry { name: name.clone() }),
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                Err(ResolveError::AncestorDepthExceeded { name: name.clone() })
            }
        }
    }

    fn instance(&mut self, name: &Atom, args: &[Type]) -> Result<(), ResolveError> {
        let def = self.class_decl(name)?;
        check_arity(def, args)?;
        self.guarded(name, AncestorSide::Instance, |walk| {
            if walk.contains(name, AncestorSide::Instance) {
                return Ok(());
            }
            let subst = Substitution::build(&def.type_param_names(), args);
            for prepended in def.prepends.iter().rev() {
                walk.edge(prepended, &subst)?;
            }
            walk.out.push(Ancestor {
                name: name.clone(),
                args: args.to_vec(),
                side: AncestorSide::Instance,
            });
            for included in def.includes.iter().rev() {
                walk.edge(included, &subst)?;
            }
            if let Some(superclass) = superclass_of(walk.env, def) {
                walk.edge(&superclass, &subst)?;
            }
            Ok(())
        })
    }

    fn edge(&mut self, edge: &AncestorRef, subst: &Substitution) -> Result<(), ResolveError> {
        let args: Vec<Type> = edge.args.iter().map(|arg| arg.subst(subst)).collect();
        self.instance(&edge.name, &args)
    }

    fn singleton(&mut self, name: &Atom) -> Result<(), ResolveError> {
        let def = self.class_decl(name)?;
        self.singleton_chain(name)?;

        let meta_name = match def.kind {
            DefKind::Class if self.env.class_decl(well_known::CLASS).is_some() => {
                Some(well_known::CLASS)
            }
            _ if self.env.class_decl(well_known::MODULE).is_some() => Some(well_known::MODULE),
            _ => None,
        };
        if let Some(meta_name) = meta_name {
            let meta_name = Atom::new(meta_name);
            let meta = self.class_decl(&meta_name)?;
            // `Class['instance]` is applied to this class's instance type.
            let meta_args: Vec<Type> = meta
                .type_params
                .iter()
                .enumerate()
                .map(|(i, _)| {
                    if i == 0 {
                        erased_instance_type(def)
                    } else {
                        Type::Any
                    }
                })
                .collect();
            self.instance(&meta_name, &meta_args)?;
        }
        Ok(())
    }

    fn singleton_chain(&mut self, name: &Atom) -> Result<(), ResolveError> {
        let def = self.class_decl(name)?;
        self.guarded(name, AncestorSide::Singleton, |walk| {
            if walk.contains(name, AncestorSide::Singleton) {
                return Ok(());
            }
            walk.out.push(Ancestor {
                name: name.clone(),
                args: Vec::new(),
                side: AncestorSide::Singleton,
            });
            let subst = Substitution::empty();
            for extended in def.extends.iter().rev() {
                walk.edge(extended, &subst)?;
            }
            if let Some(superclass) = superclass_of(walk.env, def) {
                walk.singleton_chain(&superclass.name)?;
            }
            Ok(())
        })
    }

    fn interface(&mut self, name: &Atom, args: &[Type]) -> Result<(), ResolveError> {
        let def = self.interface_decl(name)?;
        check_arity(def, args)?;
        self.guarded(name, AncestorSide::Instance, |walk| {
            if walk.contains(name, AncestorSide::Instance) {
                return Ok(());
            }
            walk.out.push(Ancestor {
                name: name.clone(),
                args: args.to_vec(),
                side: AncestorSide::Instance,
            });
            let subst = Substitution::build(&def.type_param_names(), args);
            for included in def.includes.iter().rev() {
                let args: Vec<Type> = included.args.iter().map(|arg| arg.subst(&subst)).collect();
                walk.interface(&included.name, &args)?;
            }
            Ok(())
        })
    }
}

pub(crate) fn check_arity(def: &Definition, args: &[Type]) -> Result<(), ResolveError> {
    if def.type_params.len() != args.len() {
        return Err(ResolveError::InvalidTypeApplication {
            name: def.name.clone(),
            expected: def.type_params.len(),
            actual: args.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/inheritance_tests.rs"]
mod tests;
