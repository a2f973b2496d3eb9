use criterion::measurement::WallTime;
use criterion::{BenchmarkGroup, BenchmarkId, Criterion, criterion_group, criterion_main};
use ordered_forest::{AvlMap, OrderedContainer, RbMap, SkipMap};
use std::collections::BTreeMap;
use std::hint::black_box;

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn key_orders() -> [(&'static str, Vec<i64>); 3] {
    [
        ("ordered", ordered_keys(N)),
        ("reverse", reverse_ordered_keys(N)),
        ("random", random_keys(N)),
    ]
}

fn filled<C: OrderedContainer<i64, i64> + Default>(keys: &[i64]) -> C {
    let mut map = C::default();
    for &k in keys {
        map.insert(k, k);
    }
    map
}

// ─── Generic bodies, shared by the three maps ───────────────────────────────

fn insert_into<C: OrderedContainer<i64, i64> + Default>(group: &mut BenchmarkGroup<'_, WallTime>, name: &str, keys: &[i64]) {
    group.bench_function(BenchmarkId::new(name, N), |b| b.iter(|| filled::<C>(keys)));
}

fn search_in<C: OrderedContainer<i64, i64> + Default>(group: &mut BenchmarkGroup<'_, WallTime>, name: &str, keys: &[i64]) {
    let map = filled::<C>(keys);
    group.bench_function(BenchmarkId::new(name, N), |b| {
        b.iter(|| {
            for k in keys {
                black_box(map.search(k));
            }
        });
    });
}

fn delete_from<C: OrderedContainer<i64, i64> + Default + Clone>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    name: &str,
    keys: &[i64],
) {
    let map = filled::<C>(keys);
    group.bench_function(BenchmarkId::new(name, N), |b| {
        b.iter_batched(
            || map.clone(),
            |mut map| {
                for k in keys {
                    black_box(map.delete(k));
                }
                map
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

fn nearest_in<C: OrderedContainer<i64, i64> + Default>(group: &mut BenchmarkGroup<'_, WallTime>, name: &str, keys: &[i64]) {
    // Even keys only, so every probe on an odd key misses.
    let evens: Vec<i64> = keys.iter().map(|k| k * 2).collect();
    let map = filled::<C>(&evens);
    group.bench_function(BenchmarkId::new(name, N), |b| {
        b.iter(|| {
            for k in keys {
                black_box(map.last_less_or_equal(&(k * 2 + 1)));
                black_box(map.first_greater(&(k * 2 + 1)));
            }
        });
    });
}

// ─── Map Benchmarks ─────────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let mut group = c.benchmark_group(format!("insert_{order}"));
        insert_into::<AvlMap<i64, i64>>(&mut group, "AvlMap", &keys);
        insert_into::<RbMap<i64, i64>>(&mut group, "RbMap", &keys);
        insert_into::<SkipMap<i64, i64>>(&mut group, "SkipMap", &keys);
        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                let mut map = BTreeMap::new();
                for &k in &keys {
                    map.entry(k).or_insert(k);
                }
                map
            });
        });
        group.finish();
    }
}

fn bench_search(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let mut group = c.benchmark_group(format!("search_{order}"));
        search_in::<AvlMap<i64, i64>>(&mut group, "AvlMap", &keys);
        search_in::<RbMap<i64, i64>>(&mut group, "RbMap", &keys);
        search_in::<SkipMap<i64, i64>>(&mut group, "SkipMap", &keys);
        let map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                for k in &keys {
                    black_box(map.get_key_value(k));
                }
            });
        });
        group.finish();
    }
}

fn bench_delete(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let mut group = c.benchmark_group(format!("delete_{order}"));
        delete_from::<AvlMap<i64, i64>>(&mut group, "AvlMap", &keys);
        delete_from::<RbMap<i64, i64>>(&mut group, "RbMap", &keys);
        delete_from::<SkipMap<i64, i64>>(&mut group, "SkipMap", &keys);
        let map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter_batched(
                || map.clone(),
                |mut map| {
                    for k in &keys {
                        black_box(map.remove_entry(k));
                    }
                    map
                },
                criterion::BatchSize::LargeInput,
            );
        });
        group.finish();
    }
}

fn bench_nearest(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("nearest_random");
    nearest_in::<AvlMap<i64, i64>>(&mut group, "AvlMap", &keys);
    nearest_in::<RbMap<i64, i64>>(&mut group, "RbMap", &keys);
    nearest_in::<SkipMap<i64, i64>>(&mut group, "SkipMap", &keys);
    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let keys = random_keys(N);
    let avl = filled::<AvlMap<i64, i64>>(&keys);
    let rb = filled::<RbMap<i64, i64>>(&keys);
    let skip = filled::<SkipMap<i64, i64>>(&keys);

    let mut group = c.benchmark_group("iterate");
    group.bench_function(BenchmarkId::new("AvlMap", N), |b| b.iter(|| avl.iter(None, None).map(|(_, v)| v).sum::<i64>()));
    group.bench_function(BenchmarkId::new("RbMap", N), |b| b.iter(|| rb.iter(None, None).map(|(_, v)| v).sum::<i64>()));
    group.bench_function(BenchmarkId::new("SkipMap", N), |b| b.iter(|| skip.iter(None, None).map(|(_, v)| v).sum::<i64>()));
    group.finish();

    let mut group = c.benchmark_group("iterate_reverse");
    group.bench_function(BenchmarkId::new("AvlMap", N), |b| {
        b.iter(|| avl.iter_reverse(None, None).map(|(_, v)| v).sum::<i64>());
    });
    group.bench_function(BenchmarkId::new("RbMap", N), |b| {
        b.iter(|| rb.iter_reverse(None, None).map(|(_, v)| v).sum::<i64>());
    });
    group.bench_function(BenchmarkId::new("SkipMap", N), |b| {
        b.iter(|| skip.iter_reverse(None, None).map(|(_, v)| v).sum::<i64>());
    });
    group.finish();
}

criterion_group!(crud_benches, bench_insert, bench_search, bench_delete);

criterion_group!(query_benches, bench_nearest, bench_iterate);

criterion_main!(crud_benches, query_benches);
