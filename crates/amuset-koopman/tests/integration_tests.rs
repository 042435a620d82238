//! Integration tests for the AMUSEt drivers
//!
//! The reference system is x_{t+1} = diag(0.5, -0.8) x_t started at (1, 1).
//! With the basis {1, x0} ⊗ {1, x1} the span is Koopman invariant and the
//! exact spectrum is {1, 0.5, -0.4, -0.8} with eigenfunctions 1, x0, x0·x1
//! and x1.

use amuset_basis::{Basis, BasisError, Constant, Identity};
use amuset_koopman::{
    amuset_hocur, amuset_hosvd, evaluate_eigenfunctions, HocurOptions, HosvdOptions, IndexSets,
    KoopmanError,
};
use scirs2_core::ndarray_ext::{Array2, ArrayView1};

const LAMBDA: [f64; 2] = [0.5, -0.8];
const EXPECTED: [f64; 4] = [1.0, 0.5, -0.4, -0.8];

fn linear_data(steps: usize) -> Array2<f64> {
    Array2::from_shape_fn((2, steps), |(i, t)| LAMBDA[i].powi(t as i32))
}

fn affine_basis() -> Vec<Basis> {
    vec![
        vec![Box::new(Constant), Box::new(Identity::new(0))],
        vec![Box::new(Constant), Box::new(Identity::new(1))],
    ]
}

fn abs_cosine(a: ArrayView1<f64>, b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    (dot / (na * nb)).abs()
}

#[test]
fn test_hosvd_recovers_linear_spectrum() {
    let data = linear_data(6);
    let pairs = IndexSets::single(vec![0, 1, 2, 3], vec![1, 2, 3, 4]);
    let d = amuset_hosvd(&data.view(), &pairs, &affine_basis(), &HosvdOptions::default())
        .unwrap()
        .into_single()
        .unwrap();

    assert_eq!(d.len(), EXPECTED.len());
    for (got, want) in d.eigenvalues.iter().zip(EXPECTED.iter()) {
        assert!((got - want).abs() < 1e-8, "eigenvalue {} vs {}", got, want);
    }
}

#[test]
fn test_eigenfunctions_match_known_directions() {
    let data = linear_data(6);
    let basis = affine_basis();
    let pairs = IndexSets::single(vec![0, 1, 2, 3], vec![1, 2, 3, 4]);
    let d = amuset_hosvd(&data.view(), &pairs, &basis, &HosvdOptions::default())
        .unwrap()
        .into_single()
        .unwrap();

    let x_points = data.slice(scirs2_core::ndarray_ext::s![.., 0..4]);
    let values = evaluate_eigenfunctions(&d.eigentensor, &basis, &x_points).unwrap();
    assert_eq!(values.dim(), (4, 4));

    let column = |f: &dyn Fn(f64, f64) -> f64| -> Vec<f64> {
        (0..4).map(|j| f(data[[0, j]], data[[1, j]])).collect()
    };
    let known = [
        column(&|_, _| 1.0),
        column(&|a, _| a),
        column(&|a, b| a * b),
        column(&|_, b| b),
    ];
    for (k, direction) in known.iter().enumerate() {
        let cosine = abs_cosine(values.row(k), direction);
        assert!(cosine > 1.0 - 1e-8, "eigenfunction {} has |cos| {}", k, cosine);
    }
}

#[test]
fn test_eigenfunctions_satisfy_koopman_relation() {
    let data = linear_data(6);
    let basis = affine_basis();
    let pairs = IndexSets::single(vec![0, 1, 2, 3], vec![1, 2, 3, 4]);
    let d = amuset_hosvd(&data.view(), &pairs, &basis, &HosvdOptions::default())
        .unwrap()
        .into_single()
        .unwrap();

    let values = evaluate_eigenfunctions(&d.eigentensor, &basis, &data.view()).unwrap();
    for (k, &lambda) in d.eigenvalues.iter().enumerate() {
        for t in 0..4 {
            let lhs = values[[k, t + 1]];
            let rhs = lambda * values[[k, t]];
            assert!((lhs - rhs).abs() < 1e-8, "ξ_{}(x_{}) mismatch", k, t + 1);
        }
    }
}

#[test]
fn test_batch_matches_individual_calls() {
    let data = linear_data(6);
    let basis = affine_basis();
    let options = HosvdOptions::default();
    let xs = vec![vec![0, 1, 2, 3], vec![1, 2, 3, 4]];
    let ys = vec![vec![1, 2, 3, 4], vec![2, 3, 4, 5]];

    let batch = amuset_hosvd(
        &data.view(),
        &IndexSets::batch(xs.clone(), ys.clone()).unwrap(),
        &basis,
        &options,
    )
    .unwrap();
    assert!(!batch.is_single());
    assert_eq!(batch.len(), 2);

    for (i, from_batch) in batch.decompositions().iter().enumerate() {
        let single = amuset_hosvd(
            &data.view(),
            &IndexSets::single(xs[i].clone(), ys[i].clone()),
            &basis,
            &options,
        )
        .unwrap()
        .into_single()
        .unwrap();

        for (a, b) in from_batch.eigenvalues.iter().zip(single.eigenvalues.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
        let core_a = from_batch.eigentensor.last_core();
        let core_b = single.eigentensor.last_core();
        assert_eq!(core_a.shape(), core_b.shape());
        for (a, b) in core_a.iter().zip(core_b.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    // no aliasing: the two eigentensors carry different last cores
    let items = batch.decompositions();
    let diff = items[0]
        .eigentensor
        .last_core()
        .iter()
        .zip(items[1].eigentensor.last_core().iter())
        .fold(0.0f64, |m, (a, b)| m.max((a - b).abs()));
    assert!(diff > 1e-6);
}

#[test]
fn test_singleton_unwrap_differs_by_calling_convention() {
    let data = linear_data(6);
    let basis = affine_basis();

    let single = amuset_hosvd(
        &data.view(),
        &IndexSets::single(vec![0, 1, 2, 3], vec![1, 2, 3, 4]),
        &basis,
        &HosvdOptions::default(),
    )
    .unwrap();
    assert!(single.is_single());

    let batch_of_one = amuset_hosvd(
        &data.view(),
        &IndexSets::batch(vec![vec![0, 1, 2, 3]], vec![vec![1, 2, 3, 4]]).unwrap(),
        &basis,
        &HosvdOptions::default(),
    )
    .unwrap();
    assert!(!batch_of_one.is_single());
    assert_eq!(batch_of_one.len(), 1);
    assert!(batch_of_one.into_single().is_none());
}

#[test]
fn test_hocur_agrees_with_hosvd() {
    let data = linear_data(6);
    let basis = affine_basis();
    let pairs = IndexSets::single(vec![0, 1, 2, 3], vec![1, 2, 3, 4]);

    let exact = amuset_hosvd(&data.view(), &pairs, &basis, &HosvdOptions::default())
        .unwrap()
        .into_single()
        .unwrap();
    let cross = amuset_hocur(
        &data.view(),
        &pairs,
        &basis,
        &HocurOptions::default().with_seed(3),
    )
    .unwrap()
    .into_single()
    .unwrap();

    assert_eq!(cross.len(), exact.len());
    for (a, b) in cross.eigenvalues.iter().zip(exact.eigenvalues.iter()) {
        assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
    }
}

#[test]
fn test_eigentensor_rank_matches_eigenvalue_count() {
    let data = linear_data(6);
    let pairs = IndexSets::single(vec![0, 1, 2, 3], vec![1, 2, 3, 4]);
    for threshold in [1e-2, 0.2, 0.6] {
        let d = amuset_hosvd(
            &data.view(),
            &pairs,
            &affine_basis(),
            &HosvdOptions::default().with_threshold(threshold),
        )
        .unwrap()
        .into_single()
        .unwrap();
        assert_eq!(d.eigentensor.last_core().shape()[1], d.len());
        assert!(d.len() <= 4);
    }
}

#[test]
fn test_error_propagation() {
    let data = linear_data(6);

    assert!(matches!(
        IndexSets::batch(vec![vec![0], vec![1]], vec![vec![1]]),
        Err(KoopmanError::IndexSetLengthMismatch { x: 2, y: 1 })
    ));

    let bad_basis: Vec<Basis> = vec![vec![Box::new(Identity::new(5))]];
    let pairs = IndexSets::single(vec![0, 1], vec![1, 2]);
    assert!(matches!(
        amuset_hosvd(&data.view(), &pairs, &bad_basis, &HosvdOptions::default()),
        Err(KoopmanError::Basis(BasisError::StateIndexOutOfBounds { index: 5, .. }))
    ));

    let out_of_range = IndexSets::single(vec![0, 1], vec![6, 7]);
    assert!(matches!(
        amuset_hocur(&data.view(), &out_of_range, &affine_basis(), &HocurOptions::default()),
        Err(KoopmanError::IndexOutOfBounds { index: 6, snapshots: 6 })
    ));
}
