//! B-tree benchmarks over the memory and disk backends.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pagedex::{BTree, DiskBackend, MemoryBackend};
use tempfile::{tempdir, TempDir};

/// Keys 1..=count in a scattered but repeatable order.
fn scattered(count: u64) -> Vec<u64> {
    let modulus = count + 1;
    (1..=count).map(|i| (i * 7919) % modulus).collect()
}

fn memory_tree(keys: &[u64]) -> BTree<MemoryBackend> {
    let mut tree = BTree::in_memory().unwrap();
    for &key in keys {
        tree.insert(key, key as i64).unwrap();
    }
    tree
}

fn disk_tree(keys: &[u64]) -> (TempDir, BTree<DiskBackend>) {
    let dir = tempdir().unwrap();
    let mut tree = BTree::open(dir.path().join("bench.idx")).unwrap();
    for &key in keys {
        tree.insert(key, key as i64).unwrap();
    }
    (dir, tree)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_insert");

    for count in [1_000u64, 10_000] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("memory_sequential", count), &count, |b, &count| {
            let keys: Vec<u64> = (1..=count).collect();
            b.iter(|| memory_tree(black_box(&keys)));
        });

        group.bench_with_input(BenchmarkId::new("memory_scattered", count), &count, |b, &count| {
            let keys = scattered(count);
            b.iter(|| memory_tree(black_box(&keys)));
        });

        group.bench_with_input(BenchmarkId::new("disk_scattered", count), &count, |b, &count| {
            let keys = scattered(count);
            b.iter(|| disk_tree(black_box(&keys)));
        });
    }

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_query");

    for count in [1_000u64, 100_000] {
        let keys = scattered(count);

        group.bench_with_input(BenchmarkId::new("memory", count), &count, |b, &count| {
            let mut tree = memory_tree(&keys);
            let mut next = 0u64;
            b.iter(|| {
                next = next % count + 1;
                black_box(tree.query(next).unwrap())
            });
        });

        group.bench_with_input(BenchmarkId::new("disk", count), &count, |b, &count| {
            let (_dir, mut tree) = disk_tree(&keys);
            let mut next = 0u64;
            b.iter(|| {
                next = next % count + 1;
                black_box(tree.query(next).unwrap())
            });
        });

        group.bench_with_input(BenchmarkId::new("memory_missing", count), &count, |b, &count| {
            let mut tree = memory_tree(&keys);
            b.iter(|| black_box(tree.contains(count + 1).unwrap()));
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_remove");

    let count = 10_000u64;
    let keys = scattered(count);
    group.throughput(Throughput::Elements(count));

    group.bench_function("memory_all", |b| {
        b.iter_with_setup(
            || memory_tree(&keys),
            |mut tree| {
                for &key in keys.iter().rev() {
                    tree.remove(key).unwrap();
                }
                tree
            },
        );
    });

    group.bench_function("disk_all", |b| {
        b.iter_with_setup(
            || disk_tree(&keys),
            |(dir, mut tree)| {
                for &key in keys.iter().rev() {
                    tree.remove(key).unwrap();
                }
                (dir, tree)
            },
        );
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_query, bench_remove);
criterion_main!(benches);
