use super::*;
use crate::fixtures::{builtin_env, integer, object, string};

#[test]
fn test_policy_defaults_and_builders() {
    let policy = RelationPolicy::default();
    assert_eq!(policy.max_depth, limits::MAX_RELATION_DEPTH);
    assert!(policy.cache_relations);
    assert!(policy.cache_interfaces);

    let policy = policy
        .with_max_depth(8)
        .with_max_iterations(99)
        .with_relation_cache(false);
    assert_eq!(
        policy.profile(),
        RecursionProfile::Custom {
            max_depth: 8,
            max_iterations: 99
        }
    );
    assert!(!policy.cache_relations);

    let from_profile = RelationPolicy::from_profile(RecursionProfile::AncestorWalk);
    assert_eq!(from_profile.max_depth, limits::MAX_ANCESTOR_DEPTH);
}

#[test]
fn test_is_subtype_of() {
    let env = builtin_env();

    assert_eq!(is_subtype_of(&env, &integer(), &object()), Ok(true));
    assert_eq!(is_subtype_of(&env, &object(), &integer()), Ok(false));
    assert!(is_subtype_of(&env, &Type::instance("::Nope"), &object()).is_err());
}

#[test]
fn test_equivalence_is_mutual_subtyping() {
    let env = builtin_env();
    let mut checker = SubtypeChecker::new(&env);
    let context = CheckContext::empty();

    let ab = Type::union([integer(), string()]);
    let ba = Type::union([string(), integer()]);
    assert_eq!(are_types_equivalent(&mut checker, &ab, &ba, &context), Ok(true));
    assert_eq!(
        are_types_equivalent(&mut checker, &integer(), &object(), &context),
        Ok(false)
    );
}

#[test]
fn test_disabled_relation_cache() {
    let env = builtin_env();
    let policy = RelationPolicy::default().with_relation_cache(false);
    let mut checker = SubtypeChecker::with_policy(&env, policy);
    let relation = Relation::new(integer(), object());

    let result = checker
        .check(&relation, &CheckContext::empty(), Constraints::empty())
        .expect("resolves");
    assert!(result.is_success());
    assert!(checker.cache().is_empty());
}
