//! Exact tensor-train representation of transformed snapshot data
//!
//! For a basis list (B_0, …, B_{p-1}) and snapshots x_1, …, x_m the
//! transformed data tensor is
//!
//! ```text
//! Ψ(i_0, …, i_{p-1}, j) = φ^0_{i_0}(x_j) · φ^1_{i_1}(x_j) ⋯ φ^{p-1}_{i_{p-1}}(x_j)
//! ```
//!
//! [`basis_decomposition`] stores Ψ with p+1 cores: the first core holds the
//! evaluations of B_0, the middle cores are diagonal in the snapshot index,
//! and the last core is the m×m identity that exposes the snapshot mode.

use crate::error::{BasisError, BasisResult};
use crate::functions::Basis;
use amuset_tt::TensorTrain;
use scirs2_core::ndarray_ext::{Array2, Array4, ArrayView2};

/// Check a basis list against the state dimension of the snapshot matrix
pub fn validate_basis_list(dimension: usize, basis_list: &[Basis]) -> BasisResult<()> {
    if basis_list.is_empty() {
        return Err(BasisError::EmptyBasisList);
    }
    for (mode, basis) in basis_list.iter().enumerate() {
        if basis.is_empty() {
            return Err(BasisError::EmptyBasis { mode });
        }
        for (function, f) in basis.iter().enumerate() {
            if let Some(index) = f.state_index() {
                if index >= dimension {
                    return Err(BasisError::StateIndexOutOfBounds {
                        mode,
                        function,
                        index,
                        dimension,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Evaluate every basis on every snapshot
///
/// `data` holds one snapshot per column (d × m). Returns one n_k × m matrix
/// per mode with entry `[i, j] = φ^k_i(x_j)`.
///
/// # Errors
///
/// Returns error if the basis list is empty or malformed, if a basis
/// function reads a coordinate outside the state, or if there are no
/// snapshots.
pub fn evaluate_basis(data: &ArrayView2<'_, f64>, basis_list: &[Basis]) -> BasisResult<Vec<Array2<f64>>> {
    let (dimension, m) = data.dim();
    if m == 0 {
        return Err(BasisError::NoSnapshots);
    }
    validate_basis_list(dimension, basis_list)?;

    Ok(basis_list
        .iter()
        .map(|basis| {
            Array2::from_shape_fn((basis.len(), m), |(i, j)| basis[i].evaluate(data.column(j)))
        })
        .collect())
}

/// Exact tensor-train decomposition of the transformed data tensor
///
/// The result has order p+1 for p modes, row dimensions (n_0, …, n_{p-1}, m),
/// all column dimensions 1 and ranks (1, m, …, m, 1).
///
/// # Errors
///
/// See [`evaluate_basis`].
///
/// # Complexity
///
/// Memory O(m² · Σ n_k) for the diagonal middle cores.
pub fn basis_decomposition(data: &ArrayView2<'_, f64>, basis_list: &[Basis]) -> BasisResult<TensorTrain<f64>> {
    let evaluations = evaluate_basis(data, basis_list)?;
    let m = data.ncols();

    let mut cores = Vec::with_capacity(evaluations.len() + 1);
    for (k, values) in evaluations.iter().enumerate() {
        let n = values.nrows();
        let core = if k == 0 {
            Array4::from_shape_fn((1, n, 1, m), |(_, i, _, j)| values[[i, j]])
        } else {
            let mut core = Array4::zeros((m, n, 1, m));
            for j in 0..m {
                for i in 0..n {
                    core[[j, i, 0, j]] = values[[i, j]];
                }
            }
            core
        };
        cores.push(core);
    }

    let mut last = Array4::zeros((m, m, 1, 1));
    for j in 0..m {
        last[[j, j, 0, 0]] = 1.0;
    }
    cores.push(last);

    log::debug!(
        "basis_decomposition: {} modes, {} snapshots, row dims {:?}",
        evaluations.len(),
        m,
        evaluations.iter().map(|e| e.nrows()).collect::<Vec<_>>()
    );

    Ok(TensorTrain::new(cores)?)
}
