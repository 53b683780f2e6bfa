use compiler::{passes, Benchmark, CompilerEnv, ObservationKind, RewardKind};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gym::{Environment, ResetOptions};

fn bench_fixed_point(c: &mut Criterion) {
    let module = Benchmark::from_uri("cbench-v1/susan").unwrap().module().clone();
    c.bench_function("is_fixed_point_susan", |b| {
        b.iter(|| passes::is_fixed_point(black_box(&module)));
    });
}

fn bench_episode(c: &mut Criterion) {
    let mut env = CompilerEnv::new(
        "cbench-v1/qsort",
        ObservationKind::Autophase,
        RewardKind::IrInstructionCountOz,
    )
    .unwrap();
    c.bench_function("round_robin_episode_qsort", |b| {
        b.iter(|| {
            env.reset(&ResetOptions::default()).unwrap();
            let n = env.action_space().n();
            for action in (0..n).cycle() {
                if env.apply(action).unwrap().done {
                    break;
                }
            }
        });
    });
}

criterion_group!(benches, bench_fixed_point, bench_episode);
criterion_main!(benches);
