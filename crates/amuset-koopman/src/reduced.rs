//! Reduced transition matrix from the last core of an orthonormalized Ψ
//!
//! With Ψ left-orthonormal, the last core C (r × m) holds the coordinates of
//! every transformed snapshot in an orthonormal basis of the feature space.
//! For time-lagged column sets x and y let X = C\[:, x\], Y = C\[:, y\] and
//! X ≈ U·diag(s)·V the truncated SVD. The reduced matrix
//!
//! ```text
//! M = V · Yᵀ · U · diag(1/s)
//! ```
//!
//! is the Koopman operator restricted to the dominant left-singular subspace
//! of X. An eigenvector w of M lifts to the eigenfunction coefficients
//! U·diag(1/s)·w in the basis of C.

use crate::error::{KoopmanError, KoopmanResult};
use amuset_tt::{relative_rank, thin_svd};
use scirs2_core::ndarray_ext::{Array1, Array2, Array4};

/// Reduced matrix together with the truncated SVD of the x-slice
#[derive(Debug, Clone)]
pub struct ReducedMatrix {
    /// k × k reduced transition matrix
    pub matrix: Array2<f64>,
    /// r × k left singular vectors
    pub u: Array2<f64>,
    /// k retained singular values, descending
    pub s: Array1<f64>,
    /// k × |x| right singular vectors, one per row
    pub v: Array2<f64>,
}

impl ReducedMatrix {
    /// Retained rank k
    pub fn rank(&self) -> usize {
        self.s.len()
    }

    /// U · diag(s) · V, the rank-k approximation of the x-slice
    pub fn reconstruct_x(&self) -> Array2<f64> {
        let mut us = self.u.clone();
        for (mut col, &sigma) in us.columns_mut().into_iter().zip(self.s.iter()) {
            col *= sigma;
        }
        us.dot(&self.v)
    }
}

/// Gather the snapshot columns `indices` of a last core (r, m, 1, 1) into an
/// r × |indices| matrix
pub fn snapshot_slice(last_core: &Array4<f64>, indices: &[usize]) -> KoopmanResult<Array2<f64>> {
    let (r, m, cols, r_right) = last_core.dim();
    if cols != 1 || r_right != 1 {
        return Err(KoopmanError::InvalidCore(format!(
            "last core must have shape (r, m, 1, 1), got {:?}",
            last_core.shape()
        )));
    }
    if let Some(&index) = indices.iter().find(|&&i| i >= m) {
        return Err(KoopmanError::IndexOutOfBounds {
            index,
            snapshots: m,
        });
    }
    Ok(Array2::from_shape_fn((r, indices.len()), |(a, j)| {
        last_core[[a, indices[j], 0, 0]]
    }))
}

/// Build the reduced matrix of one time-lagged pair
///
/// Singular values of the x-slice are kept while `s_i / s_0 > svd_threshold`;
/// the retained set is always a prefix.
///
/// # Arguments
///
/// * `last_core` - Last core of the orthonormalized Ψ, shape (r, m, 1, 1)
/// * `x` - Snapshot columns before the time step
/// * `y` - Snapshot columns after the time step, same length as `x`
/// * `svd_threshold` - Relative truncation threshold in [0, 1)
///
/// # Errors
///
/// Returns error if:
/// - either index set is empty, or their lengths differ
/// - an index exceeds the snapshot count of the core
/// - the x-slice is zero or non-finite (`DegenerateSlice`)
/// - the y-slice is non-finite
/// - no singular value passes the threshold (`EmptyRank`)
///
/// # Examples
///
/// ```
/// use amuset_koopman::reduced_matrix;
/// use scirs2_core::ndarray_ext::Array4;
///
/// // one feature evolving as c_{t+1} = 0.5 c_t
/// let core = Array4::from_shape_fn((1, 4, 1, 1), |(_, t, _, _)| 0.5f64.powi(t as i32));
/// let reduced = reduced_matrix(&core, &[0, 1, 2], &[1, 2, 3], 1e-3)?;
/// assert_eq!(reduced.rank(), 1);
/// assert!((reduced.matrix[[0, 0]] - 0.5).abs() < 1e-12);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn reduced_matrix(
    last_core: &Array4<f64>,
    x: &[usize],
    y: &[usize],
    svd_threshold: f64,
) -> KoopmanResult<ReducedMatrix> {
    if x.is_empty() {
        return Err(KoopmanError::EmptyIndexSet { side: "x" });
    }
    if y.is_empty() {
        return Err(KoopmanError::EmptyIndexSet { side: "y" });
    }
    if x.len() != y.len() {
        return Err(KoopmanError::PairSizeMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if !svd_threshold.is_finite() || svd_threshold < 0.0 {
        return Err(KoopmanError::InvalidOption(format!(
            "svd threshold must be finite and non-negative, got {}",
            svd_threshold
        )));
    }

    let x_slice = snapshot_slice(last_core, x)?;
    let y_slice = snapshot_slice(last_core, y)?;

    if let Some(&value) = x_slice.iter().find(|v| !v.is_finite()) {
        return Err(KoopmanError::DegenerateSlice { value });
    }
    if y_slice.iter().any(|v| !v.is_finite()) {
        return Err(KoopmanError::Linalg("y-slice contains non-finite entries".into()));
    }

    let svd = thin_svd(&x_slice.view())
        .map_err(|e| KoopmanError::Linalg(format!("SVD of x-slice failed: {}", e)))?;

    let s_max = svd.s.first().copied().unwrap_or(0.0);
    if s_max <= f64::MIN_POSITIVE {
        return Err(KoopmanError::DegenerateSlice { value: s_max });
    }

    let rank = relative_rank(&svd.s.view(), svd_threshold);
    if rank == 0 {
        return Err(KoopmanError::EmptyRank {
            threshold: svd_threshold,
        });
    }
    log::debug!(
        "reduced_matrix: kept {} of {} singular values (threshold {})",
        rank,
        svd.rank(),
        svd_threshold
    );

    let svd = svd.truncate(rank);
    let (u, s, v) = (svd.u, svd.s, svd.vt);

    let mut matrix = v.dot(&y_slice.t()).dot(&u);
    for (mut col, &sigma_i) in matrix.columns_mut().into_iter().zip(s.iter()) {
        col /= sigma_i;
    }

    Ok(ReducedMatrix { matrix, u, s, v })
}
