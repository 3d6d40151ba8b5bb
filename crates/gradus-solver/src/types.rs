//! Type representation for the relation checker.
//!
//! Types are plain immutable trees. Names are [`Atom`]s, so cloning a type is
//! cheap enough for the checker to build relations, traces and cache keys by
//! value. Union and intersection members live in a [`TypeSet`], which keeps
//! the order members were written in but compares and hashes as a set.

use bitflags::bitflags;
use gradus_common::Atom;
use rustc_hash::FxHasher;
use serde::Serialize;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

bitflags! {
    /// Variance of a type parameter.
    ///
    /// Both flags set means invariant; no flags means the parameter does not
    /// appear in its declaration at all (bivariant).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Variance: u8 {
        const COVARIANT = 1 << 0;
        const CONTRAVARIANT = 1 << 1;
        const INVARIANT = Self::COVARIANT.bits() | Self::CONTRAVARIANT.bits();
    }
}

impl Variance {
    #[inline]
    pub fn is_covariant(self) -> bool {
        self.contains(Variance::COVARIANT)
    }

    #[inline]
    pub fn is_contravariant(self) -> bool {
        self.contains(Variance::CONTRAVARIANT)
    }

    #[inline]
    pub fn is_invariant(self) -> bool {
        self.contains(Variance::INVARIANT)
    }
}

impl Serialize for Variance {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let label = if self.is_invariant() {
            "invariant"
        } else if self.is_covariant() {
            "covariant"
        } else if self.is_contravariant() {
            "contravariant"
        } else {
            "bivariant"
        };
        serializer.serialize_str(label)
    }
}

/// A declared type parameter of a class, module or interface.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeParam {
    pub name: Atom,
    pub variance: Variance,
    pub upper_bound: Option<Type>,
}

impl TypeParam {
    /// An invariant parameter without an upper bound.
    pub fn new(name: impl Into<Atom>) -> Self {
        TypeParam {
            name: name.into(),
            variance: Variance::INVARIANT,
            upper_bound: None,
        }
    }

    pub fn covariant(name: impl Into<Atom>) -> Self {
        TypeParam {
            variance: Variance::COVARIANT,
            ..TypeParam::new(name)
        }
    }

    pub fn contravariant(name: impl Into<Atom>) -> Self {
        TypeParam {
            variance: Variance::CONTRAVARIANT,
            ..TypeParam::new(name)
        }
    }

    pub fn with_upper_bound(mut self, bound: Type) -> Self {
        self.upper_bound = Some(bound);
        self
    }
}

/// Value of a literal type such as `1`, `"foo"`, `:sym` or `true`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    Integer(i64),
    String(Atom),
    Symbol(Atom),
    Bool(bool),
}

/// What a nominal type name refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NominalKind {
    /// An instance of a class or module.
    Instance,
    /// The singleton class object, `singleton(C)`.
    ///
    /// `constructor` controls `new`: `Some(true)` derives it from
    /// `initialize`, `Some(false)` removes it, `None` keeps whatever the
    /// ancestors define.
    Class { constructor: Option<bool> },
    /// A named interface (`_Each[T]`).
    Interface,
    /// A type alias application (`list[T]`). Expanded before it is compared
    /// or resolved.
    Alias,
}

/// A reference to a declared class, module or interface.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct NominalType {
    pub kind: NominalKind,
    pub name: Atom,
    pub args: Vec<Type>,
}

impl NominalType {
    /// Whether two nominal types refer to the same declaration on the same
    /// side. Constructor flags on singleton types are ignored.
    pub fn same_declaration(&self, other: &NominalType) -> bool {
        self.name == other.name
            && matches!(
                (self.kind, other.kind),
                (NominalKind::Instance, NominalKind::Instance)
                    | (NominalKind::Interface, NominalKind::Interface)
                    | (NominalKind::Class { .. }, NominalKind::Class { .. })
            )
    }
}

/// Members of a union or intersection.
///
/// Iteration follows insertion order; equality and hashing ignore it.
/// Members are unique.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct TypeSet(Vec<Type>);

impl TypeSet {
    pub fn new() -> Self {
        TypeSet(Vec::new())
    }

    /// Insert `ty` unless an equal member is already present.
    pub fn insert(&mut self, ty: Type) -> bool {
        if self.0.contains(&ty) {
            return false;
        }
        self.0.push(ty);
        true
    }

    pub fn as_slice(&self) -> &[Type] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Type> {
        self.0
    }
}

impl Deref for TypeSet {
    type Target = [Type];

    fn deref(&self) -> &[Type] {
        &self.0
    }
}

impl PartialEq for TypeSet {
    fn eq(&self, other: &TypeSet) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|ty| other.0.contains(ty))
    }
}

impl Eq for TypeSet {}

impl Hash for TypeSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent: combine per-member hashes commutatively.
        let combined = self.0.iter().fold(0u64, |acc, ty| {
            let mut hasher = FxHasher::default();
            ty.hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        });
        self.0.len().hash(state);
        combined.hash(state);
    }
}

impl<'a> IntoIterator for &'a TypeSet {
    type Item = &'a Type;
    type IntoIter = std::slice::Iter<'a, Type>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Type {
    /// The gradual type: compatible in both directions.
    Any,
    /// The bottom type.
    Bot,
    /// The return-only top type.
    Void,
    Nil,
    Bool,
    /// A type variable, `'a`.
    Var(Atom),
    /// `self` placeholder.
    #[serde(rename = "self")]
    SelfType,
    /// `instance` placeholder.
    Instance,
    /// `class` placeholder.
    Class,
    Name(NominalType),
    Union(TypeSet),
    Intersection(TypeSet),
    Literal(LiteralValue),
    Tuple(Vec<Type>),
    Record(BTreeMap<Atom, Type>),
    Proc(Box<MethodType>),
}

impl Type {
    pub fn var(name: impl Into<Atom>) -> Type {
        Type::Var(name.into())
    }

    /// `C` with no type arguments.
    pub fn instance(name: impl Into<Atom>) -> Type {
        Type::instance_with(name, Vec::new())
    }

    /// `C[args]`.
    pub fn instance_with(name: impl Into<Atom>, args: Vec<Type>) -> Type {
        Type::Name(NominalType {
            kind: NominalKind::Instance,
            name: name.into(),
            args,
        })
    }

    /// `singleton(C)` without constructor adjustments.
    pub fn class(name: impl Into<Atom>) -> Type {
        Type::class_with_constructor(name, None)
    }

    pub fn class_with_constructor(name: impl Into<Atom>, constructor: Option<bool>) -> Type {
        Type::Name(NominalType {
            kind: NominalKind::Class { constructor },
            name: name.into(),
            args: Vec::new(),
        })
    }

    /// `_I[args]`.
    pub fn interface(name: impl Into<Atom>, args: Vec<Type>) -> Type {
        Type::Name(NominalType {
            kind: NominalKind::Interface,
            name: name.into(),
            args,
        })
    }

    /// `alias[args]`.
    pub fn alias(name: impl Into<Atom>, args: Vec<Type>) -> Type {
        Type::Name(NominalType {
            kind: NominalKind::Alias,
            name: name.into(),
            args,
        })
    }

    pub fn integer(value: i64) -> Type {
        Type::Literal(LiteralValue::Integer(value))
    }

    pub fn string(value: impl Into<Atom>) -> Type {
        Type::Literal(LiteralValue::String(value.into()))
    }

    pub fn symbol(value: impl Into<Atom>) -> Type {
        Type::Literal(LiteralValue::Symbol(value.into()))
    }

    pub fn tuple(types: Vec<Type>) -> Type {
        Type::Tuple(types)
    }

    pub fn record<K: Into<Atom>>(fields: impl IntoIterator<Item = (K, Type)>) -> Type {
        Type::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn proc(method_type: MethodType) -> Type {
        Type::Proc(Box::new(method_type))
    }

    /// Build a union, flattening nested unions and dropping duplicates.
    ///
    /// A single member is returned as is; no members is `Bot`.
    pub fn union(types: impl IntoIterator<Item = Type>) -> Type {
        let mut set = TypeSet::new();
        for ty in types {
            match ty {
                Type::Union(members) => {
                    for member in members.into_vec() {
                        set.insert(member);
                    }
                }
                other => {
                    set.insert(other);
                }
            }
        }
        match set.len() {
            0 => Type::Bot,
            1 => set.into_vec().pop().unwrap_or(Type::Bot),
            _ => Type::Union(set),
        }
    }

    /// Build an intersection, flattening nested intersections and dropping
    /// duplicates.
    ///
    /// A single member is returned as is; no members is `Any`.
    pub fn intersection(types: impl IntoIterator<Item = Type>) -> Type {
        let mut set = TypeSet::new();
        for ty in types {
            match ty {
                Type::Intersection(members) => {
                    for member in members.into_vec() {
                        set.insert(member);
                    }
                }
                other => {
                    set.insert(other);
                }
            }
        }
        match set.len() {
            0 => Type::Any,
            1 => set.into_vec().pop().unwrap_or(Type::Any),
            _ => Type::Intersection(set),
        }
    }

    #[inline]
    pub fn is_var(&self) -> bool {
        matches!(self, Type::Var(_))
    }

    #[inline]
    pub fn as_var(&self) -> Option<&Atom> {
        match self {
            Type::Var(name) => Some(name),
            _ => None,
        }
    }

    #[inline]
    pub fn as_nominal(&self) -> Option<&NominalType> {
        match self {
            Type::Name(nominal) => Some(nominal),
            _ => None,
        }
    }

    /// `self`, `instance` or `class`.
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Type::SelfType | Type::Instance | Type::Class)
    }

    #[inline]
    pub fn as_alias(&self) -> Option<&NominalType> {
        match self {
            Type::Name(nominal) if nominal.kind == NominalKind::Alias => Some(nominal),
            _ => None,
        }
    }

    /// Literal, tuple and record types are compared by shape before any
    /// structural expansion.
    #[inline]
    pub fn is_shape(&self) -> bool {
        matches!(self, Type::Literal(_) | Type::Tuple(_) | Type::Record(_))
    }
}

/// Positional and keyword parameters of a method type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Params {
    pub required: Vec<Type>,
    pub optional: Vec<Type>,
    pub rest: Option<Type>,
    pub required_keywords: BTreeMap<Atom, Type>,
    pub optional_keywords: BTreeMap<Atom, Type>,
    pub rest_keywords: Option<Type>,
}

impl Params {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
            && self.optional.is_empty()
            && self.rest.is_none()
            && self.required_keywords.is_empty()
            && self.optional_keywords.is_empty()
            && self.rest_keywords.is_none()
    }

    /// Every parameter type in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .chain(self.rest.iter())
            .chain(self.required_keywords.values())
            .chain(self.optional_keywords.values())
            .chain(self.rest_keywords.iter())
    }

    pub fn map_types(&self, mut f: impl FnMut(&Type) -> Type) -> Params {
        Params {
            required: self.required.iter().map(&mut f).collect(),
            optional: self.optional.iter().map(&mut f).collect(),
            rest: self.rest.as_ref().map(&mut f),
            required_keywords: self
                .required_keywords
                .iter()
                .map(|(k, v)| (k.clone(), f(v)))
                .collect(),
            optional_keywords: self
                .optional_keywords
                .iter()
                .map(|(k, v)| (k.clone(), f(v)))
                .collect(),
            rest_keywords: self.rest_keywords.as_ref().map(&mut f),
        }
    }
}

/// The block a method accepts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Block {
    pub method_type: Box<MethodType>,
    pub optional: bool,
}

/// One overload: `[X] (params) { block } -> return_type`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MethodType {
    pub type_params: Vec<Atom>,
    pub params: Params,
    pub block: Option<Block>,
    pub return_type: Type,
}

impl MethodType {
    /// `() -> return_type`.
    pub fn new(return_type: Type) -> Self {
        MethodType {
            type_params: Vec::new(),
            params: Params::default(),
            block: None,
            return_type,
        }
    }

    pub fn with_type_params<A: Into<Atom>>(mut self, names: impl IntoIterator<Item = A>) -> Self {
        self.type_params = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_required(mut self, ty: Type) -> Self {
        self.params.required.push(ty);
        self
    }

    pub fn with_optional(mut self, ty: Type) -> Self {
        self.params.optional.push(ty);
        self
    }

    pub fn with_rest(mut self, ty: Type) -> Self {
        self.params.rest = Some(ty);
        self
    }

    pub fn with_required_keyword(mut self, name: impl Into<Atom>, ty: Type) -> Self {
        self.params.required_keywords.insert(name.into(), ty);
        self
    }

    pub fn with_optional_keyword(mut self, name: impl Into<Atom>, ty: Type) -> Self {
        self.params.optional_keywords.insert(name.into(), ty);
        self
    }

    pub fn with_rest_keywords(mut self, ty: Type) -> Self {
        self.params.rest_keywords = Some(ty);
        self
    }

    pub fn with_block(mut self, block: MethodType, optional: bool) -> Self {
        self.block = Some(Block {
            method_type: Box::new(block),
            optional,
        });
        self
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// A method member: one or more overloads.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Method {
    pub overloads: Vec<MethodType>,
    /// `| ...`: the overloads extend the inherited definition instead of
    /// replacing it.
    pub overloading: bool,
}

impl Method {
    pub fn new(overloads: Vec<MethodType>) -> Self {
        Method {
            overloads,
            overloading: false,
        }
    }

    pub fn overloading(overloads: Vec<MethodType>) -> Self {
        Method {
            overloads,
            overloading: true,
        }
    }

    pub fn single(method_type: MethodType) -> Self {
        Method::new(vec![method_type])
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
