use super::*;

#[test]
fn test_subst_replaces_vars_and_placeholders() {
    let mut subst = Substitution::empty().with_self(Some(Type::instance("::A")));
    subst.insert(Atom::new("a"), Type::instance("::Integer"));

    let ty = Type::instance_with("::Array", vec![Type::var("a")]);
    assert_eq!(
        ty.subst(&subst),
        Type::instance_with("::Array", vec![Type::instance("::Integer")])
    );
    assert_eq!(Type::SelfType.subst(&subst), Type::instance("::A"));
    // No replacement for `instance`.
    assert_eq!(Type::Instance.subst(&subst), Type::Instance);
}

#[test]
fn test_subst_flattens_unions() {
    let mut subst = Substitution::empty();
    subst.insert(
        Atom::new("a"),
        Type::union([Type::instance("::A"), Type::instance("::B")]),
    );
    let ty = Type::union([Type::var("a"), Type::instance("::C")]);

    assert_eq!(
        ty.subst(&subst),
        Type::union([
            Type::instance("::A"),
            Type::instance("::B"),
            Type::instance("::C"),
        ])
    );
}

#[test]
fn test_method_type_params_shadow_substitution() {
    let subst = Substitution::build(&[Atom::new("a")], &[Type::instance("::String")]);
    let method = MethodType::new(Type::var("a"))
        .with_type_params(["a"])
        .with_required(Type::var("b"));

    assert_eq!(method.subst(&subst), method);
}

#[test]
fn test_instantiate_drops_type_params() {
    let method = MethodType::new(Type::var("b"))
        .with_type_params(["a", "b"])
        .with_required(Type::var("a"));
    let instantiated = method.instantiate(&[Type::instance("::Integer"), Type::Nil]);

    assert!(!instantiated.is_generic());
    assert_eq!(instantiated.params.required, vec![Type::instance("::Integer")]);
    assert_eq!(instantiated.return_type, Type::Nil);
}

#[test]
fn test_fresh_vars_are_distinct() {
    let base = Atom::new("a");
    let first = fresh_var(&base);
    let second = fresh_var(&base);

    assert_ne!(first, second);
    assert!(first.starts_with("a#"));
}
