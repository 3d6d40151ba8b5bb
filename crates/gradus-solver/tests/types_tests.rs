use super::*;

#[test]
fn test_union_flattens_and_dedups() {
    let a = Type::instance("::A");
    let b = Type::instance("::B");
    let c = Type::instance("::C");

    let nested = Type::union([a.clone(), Type::union([b.clone(), c.clone()]), a.clone()]);
    let Type::Union(members) = &nested else {
        panic!("expected a union, got {nested:?}");
    };
    assert_eq!(members.as_slice(), &[a.clone(), b.clone(), c.clone()]);
}

#[test]
fn test_degenerate_unions_and_intersections() {
    let a = Type::instance("::A");
    assert_eq!(Type::union([a.clone()]), a);
    assert_eq!(Type::union([a.clone(), a.clone()]), a);
    assert_eq!(Type::union(Vec::new()), Type::Bot);
    assert_eq!(Type::intersection(Vec::new()), Type::Any);
}

#[test]
fn test_member_order_does_not_affect_equality_or_hash() {
    use std::collections::hash_map::DefaultHasher;

    let a = Type::instance("::A");
    let b = Type::instance("::B");
    let ab = Type::union([a.clone(), b.clone()]);
    let ba = Type::union([b, a]);
    assert_eq!(ab, ba);

    let hash = |ty: &Type| {
        let mut hasher = DefaultHasher::new();
        ty.hash(&mut hasher);
        hasher.finish()
    };
    assert_eq!(hash(&ab), hash(&ba));
    assert_ne!(ab, Type::intersection([Type::instance("::A"), Type::instance("::B")]));
}

#[test]
fn test_variance_flags() {
    assert!(Variance::INVARIANT.is_covariant());
    assert!(Variance::INVARIANT.is_contravariant());
    assert!(!Variance::COVARIANT.is_invariant());
    assert!(!Variance::empty().is_covariant());
    assert_eq!(TypeParam::new("a").variance, Variance::INVARIANT);
    assert_eq!(TypeParam::contravariant("a").variance, Variance::CONTRAVARIANT);
}

#[test]
fn test_same_declaration_ignores_constructor() {
    let plain = Type::class("::A");
    let constructor = Type::class_with_constructor("::A", Some(true));
    let instance = Type::instance("::A");

    let (Some(plain), Some(constructor), Some(instance)) =
        (plain.as_nominal(), constructor.as_nominal(), instance.as_nominal())
    else {
        panic!("nominal types");
    };
    assert!(plain.same_declaration(constructor));
    assert!(!plain.same_declaration(instance));
}

#[test]
fn test_method_type_builder() {
    let method = MethodType::new(Type::var("a"))
        .with_type_params(["a"])
        .with_required(Type::var("a"))
        .with_optional_keyword("limit", Type::instance("::Integer"))
        .with_block(MethodType::new(Type::Nil), true);

    assert!(method.is_generic());
    assert_eq!(method.params.required, vec![Type::var("a")]);
    assert_eq!(method.params.types().count(), 2);
    assert!(method.block.as_ref().is_some_and(|block| block.optional));
    assert!(!method.params.is_empty());
    assert!(Params::default().is_empty());
}

#[test]
fn test_nested_block_children_are_visited() {
    let innermost = MethodType::new(Type::SelfType).with_required(Type::instance("::C"));
    let block = MethodType::new(Type::instance("::B")).with_block(innermost, false);
    let method_type = MethodType::new(Type::Nil)
        .with_required(Type::instance("::A"))
        .with_block(block, true);

    let mut children = Vec::new();
    crate::visitor::for_each_method_type_child(&method_type, |child| {
        children.push(child.to_string())
    });
    assert_eq!(children, vec!["::A", "::C", "self", "::B", "nil"]);

    let proc = Type::proc(method_type);
    let mut names = Vec::new();
    crate::visitor::walk_nominal_types(&proc, &mut |nominal| names.push(nominal.name.clone()));
    assert_eq!(names, vec!["::A", "::C", "::B"]);
    assert!(proc.has_placeholder());
}
