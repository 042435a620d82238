//! AMUSEt on a Linear Dynamical System
//!
//! This example estimates Koopman eigenvalues of x_{t+1} = A x_t from a
//! single trajectory, using both the exact (HOSVD) and the cross-approximated
//! (HOCUR) construction of the data tensor, and evaluates the resulting
//! eigenfunctions along the trajectory.
//!
//! Run with:
//! ```bash
//! cargo run --example linear_system
//! ```

use amuset_basis::{Basis, BasisFunction, Constant, Identity, Legendre};
use amuset_koopman::{
    amuset_hocur, amuset_hosvd, evaluate_eigenfunctions, HocurOptions, HosvdOptions, IndexPair,
    IndexSets,
};
use scirs2_core::ndarray_ext::{array, Array2};

fn trajectory(a: &Array2<f64>, x0: [f64; 2], steps: usize) -> Array2<f64> {
    let mut data = Array2::zeros((2, steps));
    let mut x = array![x0[0], x0[1]];
    for t in 0..steps {
        data.column_mut(t).assign(&x);
        x = a.dot(&x);
    }
    data
}

fn main() -> anyhow::Result<()> {
    println!("{}", "=".repeat(80));
    println!("AMUSEt: Koopman Eigenvalues of a Linear System");
    println!("{}", "=".repeat(80));
    println!();

    // upper triangular: eigenvalues are the diagonal entries
    let a = array![[0.9, 0.1], [0.0, 0.6]];
    let steps = 12;
    let data = trajectory(&a, [1.0, 1.0], steps);

    println!("System matrix A =\n{}", a);
    println!("Snapshots: {}", steps);
    println!("Koopman eigenvalues in span{{1, x0, x1, x0·x1}}: 1, 0.9, 0.6, 0.54");
    println!();

    let basis: Vec<Basis> = vec![
        vec![Box::new(Constant), Box::new(Identity::new(0))],
        vec![Box::new(Constant), Box::new(Identity::new(1))],
    ];

    // ========================================================================
    // Example 1: exact transform
    // ========================================================================
    println!("Example 1: amuset_hosvd");
    println!("{}", "-".repeat(80));

    let pairs = IndexSets::from(IndexPair::lagged(steps, 1));
    let options = HosvdOptions::default().with_threshold(1e-8).with_svd_threshold(1e-8);
    let result = amuset_hosvd(&data.view(), &pairs, &basis, &options)?;

    for decomposition in result.decompositions() {
        println!("  - Eigenvalues: {:.6}", decomposition.eigenvalues);
        println!("  - TT ranks: {:?}", decomposition.eigentensor.ranks());
        println!(
            "  - Discarded imaginary part: {:.2e}",
            decomposition.max_discarded_imag
        );

        let values = evaluate_eigenfunctions(&decomposition.eigentensor, &basis, &data.view())?;
        println!("  - Koopman relation ξ(x_(t+1)) = λ ξ(x_t):");
        for (k, &lambda) in decomposition.eigenvalues.iter().enumerate() {
            let residual = (0..steps - 1)
                .map(|t| (values[[k, t + 1]] - lambda * values[[k, t]]).abs())
                .fold(0.0f64, f64::max);
            println!("      λ = {:>9.6}  max residual {:.2e}", lambda, residual);
        }
    }
    println!();

    // ========================================================================
    // Example 2: cross approximation, two lag pairs in one call
    // ========================================================================
    println!("Example 2: amuset_hocur with a batch of index pairs");
    println!("{}", "-".repeat(80));

    let half = steps / 2;
    let batch = IndexSets::batch(
        vec![(0..half).collect(), (half..steps - 1).collect()],
        vec![(1..half + 1).collect(), (half + 1..steps).collect()],
    )?;
    let options = HocurOptions::default()
        .with_max_rank(8)
        .with_seed(2024)
        .with_svd_threshold(1e-8);
    let result = amuset_hocur(&data.view(), &batch, &basis, &options)?;

    for (i, decomposition) in result.decompositions().iter().enumerate() {
        println!("  - Pair {}: eigenvalues {:.6}", i, decomposition.eigenvalues);
    }
    println!();

    // ========================================================================
    // Example 3: a richer basis
    // ========================================================================
    println!("Example 3: Legendre basis of degree 2 per coordinate");
    println!("{}", "-".repeat(80));

    let legendre: Vec<Basis> = (0..2)
        .map(|i| -> Basis {
            (0..3)
                .map(|deg| Box::new(Legendre::new(i, deg, 1.0)) as Box<dyn BasisFunction>)
                .collect()
        })
        .collect();
    let result = amuset_hosvd(
        &data.view(),
        &IndexSets::from(IndexPair::lagged(steps, 1)),
        &legendre,
        &HosvdOptions::default(),
    )?;
    for decomposition in result.decompositions() {
        println!("  - Leading eigenvalues: {:.6}", decomposition.eigenvalues);
    }

    println!();
    println!("{}", "=".repeat(80));
    Ok(())
}
