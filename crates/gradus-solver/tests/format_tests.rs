use super::*;

#[test]
fn test_format_basic_types() {
    assert_eq!(Type::Any.to_string(), "untyped");
    assert_eq!(Type::var("a").to_string(), "'a");
    assert_eq!(Type::SelfType.to_string(), "self");
    assert_eq!(Type::instance("::String").to_string(), "::String");
    assert_eq!(Type::class("::String").to_string(), "singleton(::String)");
    assert_eq!(
        Type::instance_with("::Hash", vec![Type::instance("::Symbol"), Type::var("v")]).to_string(),
        "::Hash[::Symbol, 'v]"
    );
}

#[test]
fn test_format_composites() {
    let union = Type::union([Type::instance("::String"), Type::Nil]);
    assert_eq!(union.to_string(), "(::String | nil)");
    assert_eq!(
        Type::tuple(vec![Type::integer(1), Type::string("x")]).to_string(),
        "[1, \"x\"]"
    );
    assert_eq!(
        Type::record([("id", Type::instance("::Integer"))]).to_string(),
        "{ id: ::Integer }"
    );
    assert_eq!(Type::symbol("ok").to_string(), ":ok");
}

#[test]
fn test_format_method_type() {
    let method = MethodType::new(Type::var("b"))
        .with_type_params(["a", "b"])
        .with_required(Type::var("a"))
        .with_optional(Type::instance("::Integer"))
        .with_rest(Type::Any)
        .with_required_keyword("key", Type::Bool)
        .with_block(MethodType::new(Type::Void).with_required(Type::var("a")), true);

    assert_eq!(
        method.to_string(),
        "['a, 'b] ('a, ?::Integer, *untyped, key: bool) ?{ ('a) -> void } -> 'b"
    );
    assert_eq!(
        Type::proc(MethodType::new(Type::Nil)).to_string(),
        "^() -> nil"
    );
}
