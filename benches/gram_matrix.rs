//! Benchmarks for gram matrix construction
//!
//! This benchmark suite measures the cost of building kernel matrices
//! across kernel types, input sizes and composition depth.
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gp_kernels::{
    ArcCosine, Kernel, Linear, Matern52, Periodic, PrimitiveKernel, Rbf, White,
};

/// Generate deterministic input rows
fn generate_inputs(rows: usize, dim: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|i| (0..dim).map(|j| ((i * dim + j) as f64).sin()).collect())
        .collect()
}

/// Benchmark RBF gram matrices over growing input sets
fn bench_rbf_gram(c: &mut Criterion) {
    let mut group = c.benchmark_group("rbf_gram");

    for size in [10, 50, 100, 500].iter() {
        let x = generate_inputs(*size, 8);
        let kernel = Rbf::new(8).unwrap();

        group.throughput(Throughput::Elements((*size * *size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                black_box(kernel.k(&x).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark the primitive catalogue at a fixed input size
fn bench_kernel_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_types");
    let x = generate_inputs(100, 4);

    let kernels: Vec<(&str, Kernel)> = vec![
        ("rbf", Rbf::new(4).unwrap().into()),
        ("matern52", Matern52::new(4).unwrap().into()),
        ("periodic", Periodic::new(4).unwrap().into()),
        ("linear", Linear::new(4).unwrap().into()),
        ("arccosine", ArcCosine::new(4, 1).unwrap().into()),
    ];
    for (name, kernel) in kernels {
        group.bench_function(name, |b| {
            b.iter(|| {
                black_box(kernel.k(&x).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark combination overhead against the primitive baseline
fn bench_composition(c: &mut Criterion) {
    let mut group = c.benchmark_group("composition");
    let x = generate_inputs(100, 2);

    let single: Kernel = Rbf::new(2).unwrap().into();
    let sum = Rbf::new(2).unwrap() + Matern52::new(2).unwrap() + White::new(2).unwrap();
    let product = Rbf::new(2).unwrap() * Linear::new(2).unwrap() * Periodic::new(2).unwrap();

    group.bench_function("single", |b| {
        b.iter(|| black_box(single.k(&x).unwrap()))
    });
    group.bench_function("sum_of_three", |b| {
        b.iter(|| black_box(sum.k(&x).unwrap()))
    });
    group.bench_function("product_of_three", |b| {
        b.iter(|| black_box(product.k(&x).unwrap()))
    });

    group.finish();
}

/// Benchmark random Fourier feature projection widths
fn bench_feature_maps(c: &mut Criterion) {
    let mut group = c.benchmark_group("fourier_features");
    let x = generate_inputs(50, 3);

    for m in [100, 1000, 10_000].iter() {
        let kernel = Rbf::new(3).unwrap().with_num_features(*m);
        group.throughput(Throughput::Elements((*m * 50) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(m), m, |b, _| {
            b.iter(|| {
                black_box(kernel.feature_map(&x).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_rbf_gram,
    bench_kernel_types,
    bench_composition,
    bench_feature_maps
);
criterion_main!(benches);
