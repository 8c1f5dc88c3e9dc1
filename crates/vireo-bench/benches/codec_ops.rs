//! Criterion micro-benchmarks for the block vector codecs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vireo_bench::flock_profile;
use vireo_core::{DimRange, SliceSpec};

fn bench_to_vector(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_vector");
    for n in [64usize, 1024, 16384] {
        let registry = flock_profile(n, 42).unwrap();
        let block = registry.block("flock").unwrap();
        group.bench_function(format!("{n}_boids"), |b| {
            b.iter(|| black_box(block.to_vector().unwrap()))
        });
    }
    group.finish();
}

fn bench_from_vector(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_vector");
    for n in [64usize, 1024, 16384] {
        let registry = flock_profile(n, 42).unwrap();
        let block = registry.block("flock").unwrap();
        let vector = block.to_vector().unwrap();
        group.bench_function(format!("{n}_boids"), |b| {
            b.iter(|| block.from_vector(black_box(&vector)).unwrap())
        });
    }
    group.finish();
}

fn bench_attr_slice(c: &mut Criterion) {
    let registry = flock_profile(16384, 42).unwrap();
    let block = registry.block("flock").unwrap();
    // middle half of the flock, every other boid
    let spec = SliceSpec::new([DimRange {
        start: 4096,
        stop: 12288,
        step: 2,
    }]);
    c.bench_function("attr_slice_to_vector/pos_8k_stride2", |b| {
        b.iter(|| black_box(block.attr_slice_to_vector("pos", &spec).unwrap()))
    });
}

fn bench_registry_load(c: &mut Criterion) {
    let registry = flock_profile(16384, 42).unwrap();
    let vector = registry.block("flock").unwrap().to_vector().unwrap();
    c.bench_function("registry_load_vector/16k_boids", |b| {
        b.iter(|| registry.load_vector(&["flock"], black_box(&vector)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_to_vector,
    bench_from_vector,
    bench_attr_slice,
    bench_registry_load
);
criterion_main!(benches);
