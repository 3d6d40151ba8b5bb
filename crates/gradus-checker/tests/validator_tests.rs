use gradus_checker::{SignatureDiagnostic, Validator};
use gradus_solver::{
    Definition, MethodType, Relation, SignatureEnv, SubtypeChecker, Type, TypeAlias, TypeParam,
    well_known,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn integer() -> Type {
    Type::instance(well_known::INTEGER)
}

fn string() -> Type {
    Type::instance(well_known::STRING)
}

fn env_with(definitions: Vec<Definition>) -> SignatureEnv {
    let builtins = vec![
        Definition::class(well_known::BASIC_OBJECT),
        Definition::class(well_known::OBJECT)
            .with_super_class(well_known::BASIC_OBJECT, Vec::new())
            .with_method("class", vec![MethodType::new(Type::Class)]),
        Definition::class(well_known::CLASS)
            .with_type_params(["instance"])
            .with_method(
                "new",
                vec![MethodType::new(Type::var("instance")).with_rest(Type::Any)],
            ),
        Definition::class(well_known::MODULE),
        Definition::class(well_known::STRING)
            .with_method("to_str", vec![MethodType::new(string())]),
        Definition::class(well_known::INTEGER)
            .with_method("to_int", vec![MethodType::new(integer())]),
        Definition::class(well_known::ARRAY)
            .with_type_params(["a"])
            .with_method(
                "first",
                vec![MethodType::new(Type::var("a"))],
            ),
    ];
    let mut env = SignatureEnv::new();
    for definition in builtins.into_iter().chain(definitions) {
        env.add(definition).expect("fixture names are unique");
    }
    env
}

/// `::Box['a <: ::Integer]`.
fn bounded_box() -> Definition {
    Definition::class("::Box")
        .with_type_param(TypeParam::covariant("a").with_upper_bound(integer()))
}

fn boxed(arg: Type) -> Type {
    Type::instance_with("::Box", vec![arg])
}

fn validate(env: &SignatureEnv) -> Vec<SignatureDiagnostic> {
    init_tracing();
    let mut checker = SubtypeChecker::new(env);
    let mut validator = Validator::new(&mut checker);
    validator.validate();
    validator.into_errors()
}

#[test]
fn test_builtin_environment_is_valid() {
    let env = env_with(Vec::new());
    let mut checker = SubtypeChecker::new(&env);
    let mut validator = Validator::new(&mut checker);
    validator.validate();
    assert!(validator.no_error(), "{:?}", validator.errors());
    assert!(!validator.has_error());
}

#[test]
fn test_type_argument_outside_upper_bound() {
    let env = env_with(vec![
        bounded_box(),
        Definition::class("::User")
            .with_method("good", vec![MethodType::new(boxed(integer()))])
            .with_method("bad", vec![MethodType::new(boxed(string()))]),
    ]);

    let errors = validate(&env);
    assert_eq!(
        errors,
        vec![SignatureDiagnostic::UnsatisfiableTypeApplication {
            type_name: "::Box".into(),
            type_arg: string(),
            type_param: TypeParam::covariant("a").with_upper_bound(integer()),
        }]
    );
}

#[test]
fn test_nested_type_arguments_are_checked() {
    let env = env_with(vec![
        bounded_box(),
        Definition::class("::User").with_method(
            "boxes",
            vec![
                MethodType::new(Type::Nil)
                    .with_required(Type::instance_with(well_known::ARRAY, vec![boxed(string())])),
            ],
        ),
    ]);

    let errors = validate(&env);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SignatureDiagnostic::UnsatisfiableTypeApplication { type_name, .. } if type_name == "::Box"
    ));
}

#[test]
fn test_class_type_param_bound_satisfies_argument_bound() {
    let env = env_with(vec![
        bounded_box(),
        Definition::class("::Holder")
            .with_type_param(TypeParam::new("b").with_upper_bound(integer()))
            .with_method("content", vec![MethodType::new(boxed(Type::var("b")))]),
    ]);

    assert!(validate(&env).is_empty());
}

#[test]
fn test_unbounded_type_param_does_not_satisfy_argument_bound() {
    let env = env_with(vec![
        bounded_box(),
        Definition::class("::Holder")
            .with_type_params(["b"])
            .with_method("content", vec![MethodType::new(boxed(Type::var("b")))]),
    ]);

    let errors = validate(&env);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SignatureDiagnostic::UnsatisfiableTypeApplication { type_arg, .. } if *type_arg == Type::var("b")
    ));
}

#[test]
fn test_interface_type_param_bounds_are_in_scope() {
    let env = env_with(vec![
        bounded_box(),
        Definition::interface("::_Source")
            .with_type_param(TypeParam::new("a").with_upper_bound(integer()))
            .with_method("read", vec![MethodType::new(boxed(Type::var("a")))]),
    ]);

    assert!(validate(&env).is_empty());
}

#[test]
fn test_instance_variable_redeclared_with_incompatible_type() {
    let env = env_with(vec![
        Definition::class("::Parent").with_ivar("@name", string()),
        Definition::class("::Good")
            .with_super_class("::Parent", Vec::new())
            .with_ivar("@name", string()),
        Definition::class("::Bad")
            .with_super_class("::Parent", Vec::new())
            .with_ivar("@name", integer()),
    ]);

    let errors = validate(&env);
    assert_eq!(
        errors,
        vec![SignatureDiagnostic::InstanceVariableTypeError {
            name: "@name".into(),
            var_type: integer(),
            parent_type: string(),
        }]
    );
}

#[test]
fn test_instance_variable_must_be_equivalent_not_just_a_subtype() {
    let env = env_with(vec![
        Definition::class("::Parent").with_ivar("@value", Type::instance(well_known::OBJECT)),
        Definition::class("::Child")
            .with_super_class("::Parent", Vec::new())
            .with_ivar("@value", string()),
    ]);

    let errors = validate(&env);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SignatureDiagnostic::InstanceVariableTypeError { name, .. } if name == "@value"
    ));
}

#[test]
fn test_instance_variable_parent_type_uses_superclass_arguments() {
    let env = env_with(vec![
        Definition::class("::Base")
            .with_type_params(["a"])
            .with_ivar("@value", Type::var("a")),
        Definition::class("::IntBase")
            .with_super_class("::Base", vec![integer()])
            .with_ivar("@value", integer()),
        Definition::class("::StrBase")
            .with_super_class("::Base", vec![string()])
            .with_ivar("@value", integer()),
    ]);

    let errors = validate(&env);
    assert_eq!(
        errors,
        vec![SignatureDiagnostic::InstanceVariableTypeError {
            name: "@value".into(),
            var_type: integer(),
            parent_type: string(),
        }]
    );
}

#[test]
fn test_class_instance_variable_checked_on_singleton_side() {
    let env = env_with(vec![
        Definition::class("::Parent").with_class_ivar("@count", integer()),
        Definition::class("::Child")
            .with_super_class("::Parent", Vec::new())
            .with_class_ivar("@count", string()),
    ]);

    let errors = validate(&env);
    assert_eq!(
        errors,
        vec![SignatureDiagnostic::InstanceVariableTypeError {
            name: "@count".into(),
            var_type: string(),
            parent_type: integer(),
        }]
    );
}

fn named_interface() -> Definition {
    Definition::interface("::_Named").with_method("name", vec![MethodType::new(string())])
}

#[test]
fn test_included_module_self_type() {
    let env = env_with(vec![
        named_interface(),
        Definition::module("::Greeter").with_self_type("::_Named", Vec::new()),
        Definition::class("::Person")
            .with_include("::Greeter", Vec::new())
            .with_method("name", vec![MethodType::new(string())]),
        Definition::class("::Rock").with_include("::Greeter", Vec::new()),
    ]);

    let errors = validate(&env);
    assert_eq!(
        errors,
        vec![SignatureDiagnostic::ModuleSelfTypeError {
            name: "::Rock".into(),
            ancestor: Type::instance("::Greeter"),
            relation: Relation::new(
                Type::instance("::Rock"),
                Type::interface("::_Named", Vec::new())
            ),
        }]
    );
}

#[test]
fn test_module_self_type_satisfied_through_own_self_types() {
    let env = env_with(vec![
        named_interface(),
        Definition::module("::Greeter").with_self_type("::_Named", Vec::new()),
        Definition::module("::Polite")
            .with_self_type("::_Named", Vec::new())
            .with_include("::Greeter", Vec::new()),
    ]);

    assert!(validate(&env).is_empty());
}

#[test]
fn test_module_self_type_receives_mixin_arguments() {
    let env = env_with(vec![
        Definition::module("::Indexed")
            .with_type_params(["e"])
            .with_self_type(well_known::ARRAY, vec![Type::var("e")]),
        Definition::class("::Numbers")
            .with_super_class(well_known::ARRAY, vec![integer()])
            .with_include("::Indexed", vec![integer()]),
        Definition::class("::Words")
            .with_super_class(well_known::ARRAY, vec![string()])
            .with_include("::Indexed", vec![integer()]),
    ]);

    let errors = validate(&env);
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        SignatureDiagnostic::ModuleSelfTypeError { name, relation, .. } => {
            assert_eq!(name, "::Words");
            assert_eq!(
                relation.super_type,
                Type::instance_with(well_known::ARRAY, vec![integer()])
            );
        }
        other => panic!("expected ModuleSelfTypeError, got {other:?}"),
    }
}

#[test]
fn test_extended_module_self_type_checked_on_singleton_side() {
    let env = env_with(vec![
        Definition::interface("::_Builder").with_method("build", vec![MethodType::new(Type::Any)]),
        Definition::module("::Factory").with_self_type("::_Builder", Vec::new()),
        Definition::class("::Widget")
            .with_extend("::Factory", Vec::new())
            .with_singleton_method("build", vec![MethodType::new(Type::Any)]),
        Definition::class("::Gadget").with_extend("::Factory", Vec::new()),
    ]);

    let errors = validate(&env);
    assert_eq!(
        errors,
        vec![SignatureDiagnostic::ModuleSelfTypeError {
            name: "::Gadget".into(),
            ancestor: Type::instance("::Factory"),
            relation: Relation::new(
                Type::class("::Gadget"),
                Type::interface("::_Builder", Vec::new())
            ),
        }]
    );
}

#[test]
fn test_unknown_type_aborts_only_its_declaration() {
    let env = env_with(vec![
        Definition::class("::Broken")
            .with_method("missing", vec![MethodType::new(Type::instance("::Missing"))]),
        Definition::class("::Parent").with_ivar("@name", string()),
        Definition::class("::Bad")
            .with_super_class("::Parent", Vec::new())
            .with_ivar("@name", integer()),
    ]);

    let errors = validate(&env);
    assert_eq!(errors.len(), 2);
    assert_eq!(
        errors[0],
        SignatureDiagnostic::UnknownTypeName {
            name: "::Missing".into()
        }
    );
    assert!(matches!(
        errors[1],
        SignatureDiagnostic::InstanceVariableTypeError { .. }
    ));
}

#[test]
fn test_wrong_type_argument_count() {
    let env = env_with(vec![Definition::class("::User").with_method(
        "items",
        vec![MethodType::new(Type::instance(well_known::ARRAY))],
    )]);

    let errors = validate(&env);
    assert_eq!(
        errors,
        vec![SignatureDiagnostic::InvalidTypeApplication {
            name: well_known::ARRAY.into(),
            expected: 1,
            actual: 0,
        }]
    );
}

#[test]
fn test_unknown_superclass_is_reported() {
    let env = env_with(vec![
        Definition::class("::Orphan").with_super_class("::Nowhere", Vec::new()),
    ]);

    let errors = validate(&env);
    assert_eq!(
        errors,
        vec![SignatureDiagnostic::UnknownTypeName {
            name: "::Nowhere".into()
        }]
    );
}

#[test]
fn test_cyclic_ancestry_is_reported_as_invalid_declaration() {
    let env = env_with(vec![
        Definition::class("::A").with_super_class("::B", Vec::new()),
        Definition::class("::B").with_super_class("::A", Vec::new()),
    ]);

    let errors = validate(&env);
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|error| matches!(
        error,
        SignatureDiagnostic::InvalidDeclaration { .. }
    )));
}

#[test]
fn test_constants_and_globals_are_validated() {
    let mut env = env_with(vec![bounded_box()]);
    env.add_constant("::LIMIT", boxed(string())).unwrap();
    env.add_constant("::MAX", boxed(integer())).unwrap();
    env.add_global("$box", boxed(string())).unwrap();

    let errors = validate(&env);
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|error| matches!(
        error,
        SignatureDiagnostic::UnsatisfiableTypeApplication { .. }
    )));
}

#[test]
fn test_alias_bodies_are_validated_with_their_own_bounds() {
    let mut env = env_with(vec![bounded_box()]);
    env.add_alias(TypeAlias::new("::strings", boxed(string())))
        .unwrap();
    env.add_alias(
        TypeAlias::new("::boxed", boxed(Type::var("x")))
            .with_type_param(TypeParam::new("x").with_upper_bound(integer())),
    )
    .unwrap();
    env.add_alias(TypeAlias::new("::loose", boxed(Type::var("x"))).with_type_params(["x"]))
        .unwrap();

    let errors = validate(&env);
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert!(matches!(
        &errors[0],
        SignatureDiagnostic::UnsatisfiableTypeApplication { type_arg, .. } if *type_arg == string()
    ));
    assert!(matches!(
        &errors[1],
        SignatureDiagnostic::UnsatisfiableTypeApplication { type_arg, .. } if *type_arg == Type::var("x")
    ));
}

#[test]
fn test_alias_applications_are_checked_against_alias_params() {
    let mut env = env_with(vec![bounded_box()]);
    env.add_alias(
        TypeAlias::new("::boxed", boxed(Type::var("x")))
            .with_type_param(TypeParam::new("x").with_upper_bound(integer())),
    )
    .unwrap();
    let mut checker = SubtypeChecker::new(&env);
    let mut validator = Validator::new(&mut checker);

    validator.validate_type(&Type::alias("::boxed", vec![integer()]));
    assert!(validator.no_error(), "{:?}", validator.errors());

    validator.validate_type(&Type::alias("::boxed", vec![string()]));
    validator.validate_type(&Type::alias("::boxed", Vec::new()));
    validator.validate_type(&Type::alias("::missing", Vec::new()));

    let errors = validator.errors();
    assert_eq!(errors.len(), 3);
    assert!(matches!(
        &errors[0],
        SignatureDiagnostic::UnsatisfiableTypeApplication { type_name, .. } if type_name == "::boxed"
    ));
    assert_eq!(
        errors[1],
        SignatureDiagnostic::InvalidTypeApplication {
            name: "::boxed".into(),
            expected: 1,
            actual: 0,
        }
    );
    assert_eq!(
        errors[2],
        SignatureDiagnostic::UnknownTypeName {
            name: "::missing".into()
        }
    );
}

#[test]
fn test_validate_type_accumulates() {
    let env = env_with(vec![bounded_box()]);
    let mut checker = SubtypeChecker::new(&env);
    let mut validator = Validator::new(&mut checker);

    validator.validate_type(&boxed(integer()));
    assert!(validator.no_error());

    validator.validate_type(&boxed(string()));
    validator.validate_type(&Type::union([boxed(string()), Type::Nil]));
    assert_eq!(validator.each_error().count(), 2);
}

#[test]
fn test_validate_replaces_previous_diagnostics() {
    let env = env_with(vec![
        bounded_box(),
        Definition::class("::User").with_method("bad", vec![MethodType::new(boxed(string()))]),
    ]);
    let mut checker = SubtypeChecker::new(&env);
    let mut validator = Validator::new(&mut checker);

    validator.validate();
    validator.validate();
    assert_eq!(validator.errors().len(), 1);
}

#[test]
fn test_diagnostics_render_as_json() {
    let env = env_with(vec![
        bounded_box(),
        Definition::class("::User").with_method("bad", vec![MethodType::new(boxed(string()))]),
    ]);
    let mut checker = SubtypeChecker::new(&env);
    let mut validator = Validator::new(&mut checker);
    validator.validate();

    let json = validator.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let diagnostics = value.as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["kind"], "unsatisfiable_type_application");
    assert_eq!(diagnostics[0]["type_name"], "::Box");
}
