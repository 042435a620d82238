//! Left-orthonormalization of tensor trains
//!
//! Sweeps the cores from left to right. Each core is unfolded into the matrix
//! (r_left·n·m, r_right) and factorized; the orthonormal factor replaces the
//! core and the remainder is absorbed into the next core. After the sweep all
//! cores except the last are left-orthonormal and the last core carries the
//! full weight of the tensor.
//!
//! Without truncation the factorization is a thin QR (or an SVD when the
//! unfolding has fewer rows than columns). With a relative threshold (or a
//! rank cap) it is a truncated SVD, which compresses the bond ranks while
//! keeping the relative approximation error controlled.

use crate::error::{TtError, TtResult};
use crate::svd::{thin_svd, ThinSvd};
use crate::tensor_train::{fold, unfold_left, unfold_right, TensorTrain, TtScalar};
use scirs2_core::ndarray_ext::{s, Array2, ArrayView1};
use scirs2_core::numeric::{Float, NumCast};
use scirs2_linalg::qr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options for [`TensorTrain::ortho_left`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrthoOptions {
    /// Relative singular-value threshold; 0 disables truncation
    pub threshold: f64,
    /// Cap on the bond ranks, None = unlimited
    pub max_rank: Option<usize>,
    /// Report per-core progress through the `log` facade
    pub progress: bool,
}

impl Default for OrthoOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            max_rank: None,
            progress: false,
        }
    }
}

impl OrthoOptions {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_rank(mut self, max_rank: usize) -> Self {
        self.max_rank = Some(max_rank);
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    fn validate(&self) -> TtResult<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(TtError::InvalidOption(format!(
                "threshold must be finite and non-negative, got {}",
                self.threshold
            )));
        }
        if self.max_rank == Some(0) {
            return Err(TtError::InvalidOption("max_rank must be positive".into()));
        }
        Ok(())
    }

    fn truncates(&self) -> bool {
        self.threshold > 0.0 || self.max_rank.is_some()
    }
}

/// Number of leading singular values whose ratio to the largest one exceeds
/// `threshold`
///
/// Singular values are expected in descending order; the retained set is
/// always a prefix. Returns 0 if the largest singular value is not positive.
pub fn relative_rank<T: Float>(singular_values: &ArrayView1<T>, threshold: T) -> usize {
    let Some(&s_max) = singular_values.first() else {
        return 0;
    };
    if !(s_max > T::zero()) || !s_max.is_finite() {
        return 0;
    }
    singular_values
        .iter()
        .take_while(|&&sigma| sigma / s_max > threshold)
        .count()
}

impl<T: TtScalar> TensorTrain<T> {
    /// Left-orthonormalize the tensor train
    ///
    /// Returns a new tensor train; `self` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the options are invalid
    /// - a QR or SVD factorization fails
    /// - a core has a vanishing leading singular value while truncating
    ///
    /// # Examples
    ///
    /// ```
    /// use amuset_tt::{OrthoOptions, TensorTrain};
    /// use scirs2_core::ndarray_ext::Array4;
    ///
    /// let g1 = Array4::<f64>::from_shape_fn((1, 3, 1, 2), |(_, i, _, k)| (i + k) as f64 + 1.0);
    /// let g2 = Array4::<f64>::from_shape_fn((2, 4, 1, 1), |(k, i, _, _)| (i * k) as f64 + 1.0);
    /// let tt = TensorTrain::new(vec![g1, g2])?;
    ///
    /// let ortho = tt.ortho_left(&OrthoOptions::default())?;
    /// assert!(ortho.is_left_orthonormal(1e-10));
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn ortho_left(&self, options: &OrthoOptions) -> TtResult<Self> {
        options.validate()?;

        let mut cores: Vec<_> = self.cores().iter().map(|c| c.as_ref().clone()).collect();
        let n_cores = cores.len();
        let truncate = options.truncates();

        for k in 0..n_cores - 1 {
            let (r_left, n, m, _) = cores[k].dim();
            let core_mat = unfold_left(&cores[k])?;

            let (left, remainder) = if truncate {
                truncated_split(&core_mat, k, options)?
            } else {
                thin_qr(&core_mat, k)?
            };

            let new_rank = left.ncols();
            cores[k] = fold(&left, (r_left, n, m, new_rank))?;

            // Absorb remainder into next core
            let (_, n_next, m_next, r_next) = cores[k + 1].dim();
            let next_mat = unfold_right(&cores[k + 1])?;
            let updated = remainder.dot(&next_mat);
            cores[k + 1] = fold(&updated, (new_rank, n_next, m_next, r_next))?;

            log::debug!("ortho_left: core {} -> rank {}", k, new_rank);
            if options.progress {
                log::info!("ortho_left: {}/{} cores done", k + 1, n_cores - 1);
            }
        }

        TensorTrain::new(cores)
    }
}

/// Thin QR of the unfolding: returns (Q, R) with Q (rows × k), R (k × cols)
///
/// A wide unfolding is split by its SVD instead: U is then square
/// orthogonal and diag(s)·Vᵀ takes the place of R.
fn thin_qr<T: TtScalar>(matrix: &Array2<T>, index: usize) -> TtResult<(Array2<T>, Array2<T>)> {
    let (rows, cols) = matrix.dim();
    if rows < cols {
        let svd = core_svd(matrix, index)?;
        let remainder = svd.weighted_vt();
        return Ok((svd.u, remainder));
    }

    let (q, r) = qr(&matrix.view(), None)
        .map_err(|e| TtError::Decomposition(format!("QR failed at core {}: {}", index, e)))?;

    Ok((
        q.slice(s![.., ..cols]).to_owned(),
        r.slice(s![..cols, ..]).to_owned(),
    ))
}

/// Truncated SVD of the unfolding: returns (U, diag(s)·Vᵀ) restricted to the
/// retained rank
fn truncated_split<T: TtScalar>(
    matrix: &Array2<T>,
    index: usize,
    options: &OrthoOptions,
) -> TtResult<(Array2<T>, Array2<T>)> {
    let svd = core_svd(matrix, index)?;

    let threshold: T = NumCast::from(options.threshold).ok_or_else(|| {
        TtError::InvalidOption(format!("threshold {} not representable", options.threshold))
    })?;

    let mut rank = relative_rank(&svd.s.view(), threshold);
    if rank == 0 {
        let value = svd.s.first().and_then(|v| v.to_f64()).unwrap_or(0.0);
        return Err(TtError::DegenerateCore { index, value });
    }
    if let Some(max_rank) = options.max_rank {
        rank = rank.min(max_rank);
    }

    let svd = svd.truncate(rank);
    let remainder = svd.weighted_vt();
    Ok((svd.u, remainder))
}

fn core_svd<T: TtScalar>(matrix: &Array2<T>, index: usize) -> TtResult<ThinSvd<T>> {
    thin_svd(&matrix.view())
        .map_err(|e| TtError::Decomposition(format!("SVD failed at core {}: {}", index, e)))
}
