//! Pointwise evaluation of eigenfunctions stored as eigentensors

use crate::error::{KoopmanError, KoopmanResult};
use amuset_basis::{evaluate_basis, Basis};
use amuset_tt::TensorTrain;
use scirs2_core::ndarray_ext::{Array2, ArrayView2};

/// Evaluate the eigenfunctions of an eigentensor at arbitrary states
///
/// For p basis modes the eigentensor has p+1 cores; the first p match the
/// basis sizes and the last one holds one eigenvector per row index. Each
/// state is mapped through the basis list and contracted with the first p
/// cores, then with the last core.
///
/// Returns a k × q matrix for k eigenfunctions and q states (`points` has
/// one state per column).
///
/// # Errors
///
/// Returns error if the eigentensor does not match the basis list or the
/// basis list does not fit the states.
pub fn evaluate_eigenfunctions(
    eigentensor: &TensorTrain<f64>,
    basis_list: &[Basis],
    points: &ArrayView2<'_, f64>,
) -> KoopmanResult<Array2<f64>> {
    let modes = basis_list.len();
    if eigentensor.order() != modes + 1 {
        return Err(KoopmanError::InvalidCore(format!(
            "eigentensor of order {} does not match {} basis modes",
            eigentensor.order(),
            modes
        )));
    }
    if eigentensor.col_dims().iter().any(|&m| m != 1) {
        return Err(KoopmanError::InvalidCore(
            "eigentensor cores must have unit column dimension".into(),
        ));
    }
    for (mode, (basis, n)) in basis_list.iter().zip(eigentensor.row_dims()).enumerate() {
        if basis.len() != n {
            return Err(KoopmanError::InvalidCore(format!(
                "core {} has row dimension {} but basis has {} functions",
                mode,
                n,
                basis.len()
            )));
        }
    }

    let evaluations = evaluate_basis(points, basis_list)?;
    let q = points.ncols();
    let last = eigentensor.last_core();
    let (r_last, k, _, _) = last.dim();

    let mut result = Array2::zeros((k, q));
    for j in 0..q {
        // row vector contracted through the basis modes
        let mut state = Array2::<f64>::ones((1, 1));
        for (mode, values) in evaluations.iter().enumerate() {
            let core = eigentensor.core(mode);
            let (r_left, n, _, r_right) = core.dim();
            let mut local = Array2::<f64>::zeros((r_left, r_right));
            for i in 0..n {
                let weight = values[[i, j]];
                for a in 0..r_left {
                    for b in 0..r_right {
                        local[[a, b]] += weight * core[[a, i, 0, b]];
                    }
                }
            }
            state = state.dot(&local);
        }
        for l in 0..k {
            result[[l, j]] = (0..r_last).map(|a| state[[0, a]] * last[[a, l, 0, 0]]).sum();
        }
    }

    Ok(result)
}
