use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use foreach_map::{CompactionPolicy, OrderedMap};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn filled(seed: u64, n: usize) -> (OrderedMap<String, u64>, Vec<String>) {
    let m = OrderedMap::new();
    let keys: Vec<String> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        m.set(k.clone(), i as u64);
    }
    (m, keys)
}

fn bench_set_fresh_100k(c: &mut Criterion) {
    c.bench_function("ordered::set_fresh_100k", |b| {
        b.iter_batched(
            OrderedMap::<String, u64>::new,
            |m| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    m.set(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    let (m, keys) = filled(7, 20_000);
    c.bench_function("ordered::get_hit_10k", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for k in keys.iter().take(10_000) {
                acc = acc.wrapping_add(m.get(k.as_str()).unwrap_or(0));
            }
            black_box(acc)
        })
    });
}

fn bench_delete_half_compacting(c: &mut Criterion) {
    c.bench_function("ordered::delete_half_of_50k", |b| {
        b.iter_batched(
            || filled(5, 50_000),
            |(m, keys)| {
                for k in keys.iter().step_by(2) {
                    m.delete(k.as_str());
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_delete_half_never_compacting(c: &mut Criterion) {
    c.bench_function("ordered::delete_half_of_50k_no_compaction", |b| {
        b.iter_batched(
            || {
                let m = OrderedMap::with_policy(CompactionPolicy::never());
                let keys: Vec<String> = lcg(5).take(50_000).map(key).collect();
                for (i, k) in keys.iter().enumerate() {
                    m.set(k.clone(), i as u64);
                }
                (m, keys)
            },
            |(m, keys)| {
                for k in keys.iter().step_by(2) {
                    m.delete(k.as_str());
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_for_each_with_holes(c: &mut Criterion) {
    let m = OrderedMap::with_policy(CompactionPolicy::never());
    for (i, x) in lcg(11).take(50_000).enumerate() {
        m.set(x, i as u64);
    }
    for x in lcg(11).take(50_000).skip(1).step_by(3) {
        m.delete(&x);
    }
    c.bench_function("ordered::for_each_50k_third_holes", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            m.for_each(|&v, _, _| acc = acc.wrapping_add(v));
            black_box(acc)
        })
    });
}

fn bench_for_each_mutating(c: &mut Criterion) {
    c.bench_function("ordered::for_each_delete_ahead_10k", |b| {
        b.iter_batched(
            || {
                let m = OrderedMap::new();
                for i in 0..10_000u64 {
                    m.set(i, i);
                }
                m
            },
            |m| {
                m.for_each(|_, &k, this| {
                    if k < 10_000 {
                        this.delete(&(k + 1));
                        this.set(k + 20_000, k);
                    }
                });
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_lookup;
    config = bench_config();
    targets = bench_set_fresh_100k, bench_get_hit_10k
}
criterion_group! {
    name = benches_holes;
    config = bench_config();
    targets = bench_delete_half_compacting,
              bench_delete_half_never_compacting,
              bench_for_each_with_holes,
              bench_for_each_mutating
}
criterion_main!(benches_lookup, benches_holes);
