//! Benchmarks for kd-tree partitioning and job chunking.

use binsplit_core::chunk;
use binsplit_core::noise;
use binsplit_core::partition::partition;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn columns(len: usize, dims: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..dims)
        .map(|_| (0..len).map(|_| rng.gen_range(0.0..1000.0)).collect())
        .collect()
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");
    for len in [10_000usize, 100_000] {
        let cols = columns(len, 2, 1);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("uniform_2d", len), &cols, |b, cols| {
            b.iter(|| partition(black_box(len), black_box(cols), 100));
        });
    }

    // Heavy ties: integer-valued attribute with few levels.
    let tied: Vec<f64> = (0..100_000).map(|i| f64::from(i % 50)).collect();
    group.throughput(Throughput::Elements(100_000));
    group.bench_function("tied_1d", |b| {
        b.iter(|| partition(100_000, black_box(std::slice::from_ref(&tied)), 100));
    });
    group.finish();
}

fn bench_noise(c: &mut Criterion) {
    let values: Vec<f64> = (0..100_000).map(|i| f64::from(i % 500)).collect();
    let mut group = c.benchmark_group("noise");
    group.throughput(Throughput::Elements(100_000));
    group.bench_function("inject", |b| {
        let mut rng = StdRng::seed_from_u64(2);
        b.iter(|| noise::inject(black_box(&values), true, &mut rng));
    });
    group.finish();
}

fn bench_chunk(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk");
    group.bench_function("assign_shuffled_10k_over_64", |b| {
        let mut rng = StdRng::seed_from_u64(3);
        b.iter(|| chunk::assign((0..10_000).collect(), black_box(64), Some(&mut rng)));
    });
    group.finish();
}

criterion_group!(benches, bench_partition, bench_noise, bench_chunk);
criterion_main!(benches);
