//! Read-only traversals over types.
//!
//! The checker needs three questions answered about a type before it may
//! cache a relation or expand it: which variables occur free, whether a
//! `self`/`instance`/`class` placeholder is still present, and which nominal
//! references it mentions (the validator walks those).

use crate::types::{MethodType, NominalType, Type};
use gradus_common::Atom;
use indexmap::IndexSet;
use smallvec::SmallVec;

/// Call `f` on every direct child type of `ty`.
///
/// Types inside a nested method type (proc parameters, block, return) are
/// children too; callers that care about binders handle `Proc` themselves.
pub fn for_each_child(ty: &Type, mut f: impl FnMut(&Type)) {
    match ty {
        Type::Any
        | Type::Bot
        | Type::Void
        | Type::Nil
        | Type::Bool
        | Type::Var(_)
        | Type::SelfType
        | Type::Instance
        | Type::Class
        | Type::Literal(_) => {}
        Type::Name(nominal) => nominal.args.iter().for_each(f),
        Type::Union(members) | Type::Intersection(members) => members.iter().for_each(f),
        Type::Tuple(elements) => elements.iter().for_each(f),
        Type::Record(fields) => fields.values().for_each(f),
        Type::Proc(method_type) => for_each_method_type_child(method_type, f),
    }
}

/// Call `f` on every type directly mentioned by a method type.
pub fn for_each_method_type_child(method_type: &MethodType, mut f: impl FnMut(&Type)) {
    method_type_children(method_type, &mut f);
}

// Not generic, so nested blocks do not instantiate a new closure type per level.
fn method_type_children(method_type: &MethodType, f: &mut dyn FnMut(&Type)) {
    for param in method_type.params.types() {
        f(param);
    }
    if let Some(block) = &method_type.block {
        method_type_children(&block.method_type, f);
    }
    f(&method_type.return_type);
}

struct FreeVars<'a> {
    bound: SmallVec<[&'a Atom; 4]>,
    found: IndexSet<Atom>,
}

impl<'a> FreeVars<'a> {
    fn visit(&mut self, ty: &'a Type) {
        match ty {
            Type::Var(name) => {
                if !self.bound.contains(&name) {
                    self.found.insert(name.clone());
                }
            }
            Type::Proc(method_type) => self.visit_method_type(method_type),
            _ => for_each_child_ref(ty, |child| self.visit(child)),
        }
    }

    fn visit_method_type(&mut self, method_type: &'a MethodType) {
        let mark = self.bound.len();
        self.bound.extend(method_type.type_params.iter());
        for param in method_type.params.types() {
            self.visit(param);
        }
        if let Some(block) = &method_type.block {
            self.visit_method_type(&block.method_type);
        }
        self.visit(&method_type.return_type);
        self.bound.truncate(mark);
    }
}

// Same as `for_each_child` but keeps the borrow lifetime of `ty`.
fn for_each_child_ref<'a>(ty: &'a Type, mut f: impl FnMut(&'a Type)) {
    match ty {
        Type::Name(nominal) => nominal.args.iter().for_each(&mut f),
        Type::Union(members) | Type::Intersection(members) => members.iter().for_each(&mut f),
        Type::Tuple(elements) => elements.iter().for_each(&mut f),
        Type::Record(fields) => fields.values().for_each(&mut f),
        _ => {}
    }
}

/// Variables occurring free in `ty`, in first-occurrence order.
///
/// Variables bound by a nested method type's own type parameters are not
/// free.
pub fn free_variables(ty: &Type) -> IndexSet<Atom> {
    let mut collector = FreeVars {
        bound: SmallVec::new(),
        found: IndexSet::new(),
    };
    collector.visit(ty);
    collector.found
}

/// Free variables of a method type (its own type parameters excluded).
pub fn method_type_free_variables(method_type: &MethodType) -> IndexSet<Atom> {
    let mut collector = FreeVars {
        bound: SmallVec::new(),
        found: IndexSet::new(),
    };
    collector.visit_method_type(method_type);
    collector.found
}

/// Whether `ty` contains a `self`, `instance` or `class` placeholder.
pub fn has_placeholder(ty: &Type) -> bool {
    if ty.is_placeholder() {
        return true;
    }
    let mut found = false;
    for_each_child(ty, |child| found = found || has_placeholder(child));
    found
}

/// Call `f` on every nominal type reachable from `ty`, outermost first.
pub fn walk_nominal_types(ty: &Type, f: &mut impl FnMut(&NominalType)) {
    if let Type::Name(nominal) = ty {
        f(nominal);
    }
    for_each_child(ty, |child| walk_nominal_types(child, f));
}

impl Type {
    pub fn free_variables(&self) -> IndexSet<Atom> {
        free_variables(self)
    }

    /// No free type variables.
    pub fn is_closed(&self) -> bool {
        free_variables(self).is_empty()
    }

    pub fn has_placeholder(&self) -> bool {
        has_placeholder(self)
    }
}
