//! Relation checker benchmarks.
//!
//! Measures structural checks over a generic class hierarchy with and
//! without the shared relation cache.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gradus::solver::{MethodType, TypeParam, well_known};
use gradus::{
    CheckContext, Constraints, Definition, Relation, RelationPolicy, SignatureEnv,
    SubtypeChecker, Type,
};

/// `::Node0 .. ::Node{depth}`, each a covariant container of the next, with
/// a structurally identical `::Mirror{i}` per level.
fn hierarchy(depth: usize) -> SignatureEnv {
    let mut env = SignatureEnv::new();
    env.add(Definition::class(well_known::BASIC_OBJECT)).unwrap();
    env.add(
        Definition::class(well_known::OBJECT)
            .with_super_class(well_known::BASIC_OBJECT, Vec::new()),
    )
    .unwrap();
    env.add(
        Definition::class(well_known::INTEGER)
            .with_method("to_int", vec![MethodType::new(Type::instance(well_known::INTEGER))]),
    )
    .unwrap();
    for prefix in ["::Node", "::Mirror"] {
        for level in 0..depth {
            let next = if level + 1 == depth {
                Type::var("a")
            } else {
                Type::instance_with(format!("{prefix}{}", level + 1), vec![Type::var("a")])
            };
            env.add(
                Definition::class(format!("{prefix}{level}"))
                    .with_type_param(TypeParam::covariant("a"))
                    .with_method("value", vec![MethodType::new(Type::var("a"))])
                    .with_method("next", vec![MethodType::new(next)])
                    .with_method(
                        "map",
                        vec![
                            MethodType::new(Type::var("a"))
                                .with_type_params(["b"])
                                .with_required(Type::var("b")),
                        ],
                    ),
            )
            .unwrap();
        }
    }
    env
}

fn bench_structural(c: &mut Criterion) {
    gradus::tracing_config::init_tracing();
    let mut group = c.benchmark_group("structural");
    for depth in [4, 16, 64] {
        let env = hierarchy(depth);
        let relation = Relation::new(
            Type::instance_with("::Node0", vec![Type::instance(well_known::INTEGER)]),
            Type::instance_with("::Mirror0", vec![Type::instance(well_known::OBJECT)]),
        );

        group.bench_with_input(BenchmarkId::new("uncached", depth), &relation, |b, relation| {
            let policy = RelationPolicy::default()
                .with_relation_cache(false)
                .with_interface_cache(false);
            b.iter(|| {
                let mut checker = SubtypeChecker::with_policy(&env, policy);
                let result = checker
                    .check(relation, &CheckContext::empty(), Constraints::empty())
                    .unwrap();
                black_box(result.is_success())
            })
        });

        group.bench_with_input(BenchmarkId::new("cached", depth), &relation, |b, relation| {
            let mut checker = SubtypeChecker::new(&env);
            b.iter(|| {
                let result = checker
                    .check(relation, &CheckContext::empty(), Constraints::empty())
                    .unwrap();
                black_box(result.is_success())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_structural);
criterion_main!(benches);
