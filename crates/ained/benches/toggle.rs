//! Benchmarks for commits, the cross flip and board reconstruction on the
//! simulated fabric.

use ained::{Ained, Board, LightsOutSolver, Region, SimFabric};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");
    group.throughput(Throughput::Elements(1));

    let mut device = Ained::new(SimFabric::new(0));
    group.bench_function("single_bit", |b| {
        b.iter(|| {
            device.set_bit(black_box(37), black_box(21), true).unwrap();
            device.commit().unwrap();
        });
    });

    group.bench_function("full_word", |b| {
        b.iter(|| {
            device
                .stage_word(black_box(42), black_box(0xDEAD_BEEF), u64::MAX)
                .unwrap();
            device.commit().unwrap();
        });
    });

    group.bench_function("clear_all", |b| {
        b.iter(|| device.clear_all());
    });

    group.finish();
}

fn bench_flip(c: &mut Criterion) {
    let mut group = c.benchmark_group("flip_lights");

    for size in [5usize, 8, 16, 64] {
        let region = Region::square(size);
        group.throughput(Throughput::Elements(region.len() as u64));
        let mut device = Ained::new(SimFabric::new(0));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &n| {
            b.iter(|| device.flip_lights(region, black_box(n / 2), black_box(n / 2)).unwrap());
        });
    }

    group.finish();
}

fn bench_reconstruct(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruct_board");

    for size in [5usize, 8, 16, 64] {
        // Offset by 3 so the region straddles tiles.
        let region = Region::new(3, 0, size, size);
        let cells = (0..region.len()).map(|i| i % 3 == 0).collect();
        let board = Board::from_cells(size, size, cells).unwrap();
        let mut device = Ained::new(SimFabric::new(0));
        group.throughput(Throughput::Elements(region.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &board, |b, board| {
            b.iter(|| device.reconstruct_board(region, black_box(board)).unwrap());
        });
    }

    group.finish();
}

fn bench_solver(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver");

    for size in [5usize, 8, 16] {
        group.bench_with_input(BenchmarkId::new("eliminate", size), &size, |b, &n| {
            b.iter(|| black_box(LightsOutSolver::new(n, n)));
        });
    }

    let solver = LightsOutSolver::new(5, 5);
    let mut board = Board::new(5, 5);
    for (r, c) in [(0, 1), (2, 2), (3, 4), (4, 0)] {
        board.toggle_cross(r, c);
    }
    group.bench_function("optimal_5x5", |b| {
        b.iter(|| black_box(solver.optimal_solution(black_box(&board))));
    });

    group.finish();
}

criterion_group!(benches, bench_commit, bench_flip, bench_reconstruct, bench_solver);
criterion_main!(benches);
