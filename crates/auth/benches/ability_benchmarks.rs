use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use permgate_auth::{Ability, RuleSet, SplitCodes};
use permgate_state::{AuthState, Store, actions};

fn codes(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("act{}_subj{}", i % 8, i)).collect()
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_set_build");

    for n in [2usize, 32, 512] {
        let codes = codes(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &codes, |b, codes| {
            b.iter(|| {
                let (set, _) = RuleSet::build(codes.iter().map(String::as_str), &SplitCodes::strict());
                black_box(set)
            })
        });
    }

    group.finish();
}

fn bench_can(c: &mut Criterion) {
    let store = Store::create();
    let ability = match Ability::attach(&store, SplitCodes::strict()) {
        Ok(ability) => ability,
        Err(err) => panic!("attach failed: {err}"),
    };
    store
        .dispatch(actions::login_as(AuthState {
            permissions: Some(codes(512)),
            ..AuthState::default()
        }))
        .ok();

    let mut group = c.benchmark_group("ability_can");
    group.bench_function("hit", |b| b.iter(|| ability.can(black_box("act3"), black_box("subj11"))));
    group.bench_function("miss", |b| b.iter(|| ability.can(black_box("act3"), black_box("subj12"))));
    group.bench_function("snapshot_then_check", |b| {
        b.iter(|| {
            let rules = ability.snapshot();
            rules.contains(black_box("act3"), black_box("subj11"))
        })
    });
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let store = Store::create();
    let _ability = Ability::attach(&store, SplitCodes::strict());

    c.bench_function("dispatch_login_logout", |b| {
        b.iter(|| {
            store.dispatch(actions::login()).ok();
            store.dispatch(actions::logout()).ok();
        })
    });
}

criterion_group!(benches, bench_rebuild, bench_can, bench_dispatch);
criterion_main!(benches);
