//! Performance benchmarks for AMUSEt
//!
//! Compares the exact (HOSVD) and cross-approximated (HOCUR) construction
//! of Ψ on a chain of weakly coupled oscillators, and times the reduced
//! matrix alone.

use amuset_basis::{Basis, Constant, Cos, Sin};
use amuset_koopman::{amuset_hocur, amuset_hosvd, reduced_matrix, HocurOptions, HosvdOptions, IndexSets};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scirs2_core::ndarray_ext::{Array2, Array4};
use std::hint::black_box;

fn oscillator_data(dim: usize, snapshots: usize) -> Array2<f64> {
    let mut data = Array2::zeros((dim, snapshots));
    for i in 0..dim {
        data[[i, 0]] = 0.3 * (i as f64 + 1.0);
    }
    for t in 1..snapshots {
        for i in 0..dim {
            let left = data[[(i + dim - 1) % dim, t - 1]];
            let right = data[[(i + 1) % dim, t - 1]];
            let x = data[[i, t - 1]];
            data[[i, t]] = x + 0.05 * (left + right - 2.0 * x).sin() + 0.02 * (t as f64).cos();
        }
    }
    data
}

fn trig_basis(dim: usize) -> Vec<Basis> {
    (0..dim)
        .map(|i| -> Basis { vec![Box::new(Constant), Box::new(Sin::new(i, 1.0)), Box::new(Cos::new(i, 1.0))] })
        .collect()
}

// ============================================================================
// Driver Benchmarks
// ============================================================================

fn bench_drivers(c: &mut Criterion) {
    let mut group = c.benchmark_group("amuset_drivers");
    group.sample_size(10);

    for &(dim, snapshots) in &[(3, 40), (4, 60)] {
        let data = oscillator_data(dim, snapshots);
        let basis = trig_basis(dim);
        let pairs = IndexSets::single((0..snapshots - 1).collect(), (1..snapshots).collect());

        group.throughput(Throughput::Elements(snapshots as u64));
        group.bench_with_input(
            BenchmarkId::new("hosvd", format!("d{}_m{}", dim, snapshots)),
            &(&data, &basis, &pairs),
            |b, (data, basis, pairs)| {
                b.iter(|| {
                    black_box(amuset_hosvd(
                        black_box(&data.view()),
                        pairs,
                        basis,
                        &HosvdOptions::default(),
                    ))
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("hocur", format!("d{}_m{}", dim, snapshots)),
            &(&data, &basis, &pairs),
            |b, (data, basis, pairs)| {
                b.iter(|| {
                    black_box(amuset_hocur(
                        black_box(&data.view()),
                        pairs,
                        basis,
                        &HocurOptions::default().with_max_rank(20).with_seed(1),
                    ))
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// Reduced Matrix Benchmarks
// ============================================================================

fn bench_reduced_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduced_matrix");

    for &(rank, snapshots) in &[(10, 100), (40, 400), (100, 1000)] {
        let core = Array4::from_shape_fn((rank, snapshots, 1, 1), |(a, t, _, _)| {
            ((a * 7 + t * 13) % 17) as f64 / 17.0 + 0.01 * t as f64
        });
        let x: Vec<usize> = (0..snapshots - 1).collect();
        let y: Vec<usize> = (1..snapshots).collect();

        group.throughput(Throughput::Elements((rank * snapshots) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("r{}_m{}", rank, snapshots)),
            &(core, x, y),
            |b, (core, x, y)| b.iter(|| black_box(reduced_matrix(black_box(core), x, y, 1e-3))),
        );
    }

    group.finish();
}

criterion_group!(driver_benches, bench_drivers);
criterion_group!(reduced_benches, bench_reduced_matrix);
criterion_main!(driver_benches, reduced_benches);
