//! Benchmarks for coefficient kernel generation and packing.

use ained::{Ained, CoefficientBank, CoefficientKernel, Metric, SimFabric, UNBOUNDED_REACH};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_generate");

    for metric in [Metric::Euclidean, Metric::Manhattan] {
        group.bench_with_input(BenchmarkId::from_parameter(metric), &metric, |b, &m| {
            b.iter(|| {
                black_box(CoefficientKernel::generate(
                    m,
                    black_box(0.7),
                    black_box(UNBOUNDED_REACH),
                ))
            });
        });
    }

    group.finish();
}

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_pack");
    let kernel = CoefficientKernel::generate(Metric::Manhattan, 0.5, 4);

    group.bench_function("to_groups", |b| {
        b.iter(|| black_box(black_box(&kernel).to_groups()));
    });

    let groups = kernel.to_groups();
    group.bench_function("from_groups", |b| {
        b.iter(|| black_box(CoefficientKernel::from_groups(black_box(groups))));
    });

    group.bench_function("matrix", |b| {
        b.iter(|| black_box(black_box(&kernel).matrix()));
    });

    group.finish();
}

fn bench_device_load(c: &mut Criterion) {
    let mut device = Ained::new(SimFabric::new(0));
    c.bench_function("set_coefficients", |b| {
        b.iter(|| {
            black_box(device.set_coefficients(
                CoefficientBank::Low,
                Metric::Euclidean,
                black_box(0.6),
                black_box(3),
            ))
        });
    });
}

criterion_group!(benches, bench_generate, bench_pack, bench_device_load);
criterion_main!(benches);
