//! Tensor-train container with 4-index cores
//!
//! A tensor train of order d represents a tensor
//!
//! T(i₁, j₁, ..., i_d, j_d) = G₁\[i₁, j₁\] × G₂\[i₂, j₂\] × ... × G_d\[i_d, j_d\]
//!
//! where each core Gₖ has shape (rₖ₋₁, nₖ, mₖ, rₖ): left rank, row dimension,
//! column dimension and right rank. Plain tensors use mₖ = 1 throughout.
//! Boundary conditions: r₀ = r_d = 1.
//!
//! Cores are stored behind [`Arc`], so tensors that differ in a single core
//! (for example the eigentensors produced by AMUSEt) share all other cores.

use crate::error::{TtError, TtResult};
use scirs2_core::ndarray_ext::{Array2, Array4, ArrayD, IxDyn, ScalarOperand};
use scirs2_core::numeric::{Float, NumAssign, NumCast};
use std::fmt;
use std::iter::Sum;
use std::sync::Arc;

/// Scalar types usable as tensor-train entries
pub trait TtScalar:
    Float + NumCast + NumAssign + Sum + Send + Sync + ScalarOperand + fmt::Debug + 'static
{
}

impl<T> TtScalar for T where
    T: Float + NumCast + NumAssign + Sum + Send + Sync + ScalarOperand + fmt::Debug + 'static
{
}

/// Tensor train with 4-index cores (r_left, row, col, r_right)
#[derive(Clone, Debug)]
pub struct TensorTrain<T> {
    cores: Vec<Arc<Array4<T>>>,
}

impl<T: TtScalar> TensorTrain<T> {
    /// Build a tensor train from its cores
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `cores` is empty
    /// - the first left rank or the last right rank differs from 1
    /// - neighbouring ranks do not match
    /// - any core has a zero-sized axis
    pub fn new(cores: Vec<Array4<T>>) -> TtResult<Self> {
        Self::from_shared(cores.into_iter().map(Arc::new).collect())
    }

    /// Build a tensor train from already shared cores
    pub fn from_shared(cores: Vec<Arc<Array4<T>>>) -> TtResult<Self> {
        validate_cores(&cores)?;
        Ok(Self { cores })
    }

    /// Number of cores
    pub fn order(&self) -> usize {
        self.cores.len()
    }

    /// Row dimensions n₁, ..., n_d
    pub fn row_dims(&self) -> Vec<usize> {
        self.cores.iter().map(|c| c.shape()[1]).collect()
    }

    /// Column dimensions m₁, ..., m_d
    pub fn col_dims(&self) -> Vec<usize> {
        self.cores.iter().map(|c| c.shape()[2]).collect()
    }

    /// TT-ranks [r₀, r₁, ..., r_d] including the boundary ranks
    pub fn ranks(&self) -> Vec<usize> {
        let mut ranks: Vec<usize> = self.cores.iter().map(|c| c.shape()[0]).collect();
        ranks.push(1);
        ranks
    }

    /// Shared handles to all cores
    pub fn cores(&self) -> &[Arc<Array4<T>>] {
        &self.cores
    }

    /// Core at position `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.order()`.
    pub fn core(&self, index: usize) -> &Array4<T> {
        &self.cores[index]
    }

    /// Last core, which carries the weight after left-orthonormalization
    pub fn last_core(&self) -> &Array4<T> {
        // validated non-empty at construction
        &self.cores[self.cores.len() - 1]
    }

    /// Replace the core at position `index`
    ///
    /// The new core must keep the ranks that connect it to its neighbours.
    pub fn set_core(&mut self, index: usize, core: Array4<T>) -> TtResult<()> {
        let order = self.order();
        if index >= order {
            return Err(TtError::IndexOutOfBounds { index, order });
        }

        let old = self.cores[index].shape();
        let new = core.shape();
        if new[0] != old[0] || new[3] != old[3] {
            return Err(TtError::ShapeMismatch(format!(
                "Core {} must keep ranks ({}, {}), got ({}, {})",
                index, old[0], old[3], new[0], new[3]
            )));
        }
        if new[1] == 0 || new[2] == 0 {
            return Err(TtError::InvalidCore {
                index,
                reason: format!("zero-sized mode in shape {:?}", new),
            });
        }

        self.cores[index] = Arc::new(core);
        Ok(())
    }

    /// New tensor train sharing every core with `self` except the last one
    ///
    /// The replacement may change the row/column dimensions of the last mode
    /// but must keep its left rank.
    pub fn with_last_core(&self, core: Array4<T>) -> TtResult<Self> {
        let mut cores = self.cores.clone();
        let last = cores.len() - 1;
        cores[last] = Arc::new(core);
        Self::from_shared(cores)
    }

    /// Number of stored entries across all cores
    pub fn num_parameters(&self) -> usize {
        self.cores.iter().map(|core| core.len()).sum()
    }

    /// Contract all cores into a dense array
    ///
    /// The result has shape `row_dims ++ col_dims`.
    ///
    /// # Complexity
    ///
    /// Time: O(∏ nₖmₖ × R²), Space: O(∏ nₖmₖ)
    pub fn full(&self) -> TtResult<ArrayD<T>> {
        let mut acc = Array2::<T>::ones((1, 1));

        for core in &self.cores {
            let (_, n, m, r_right) = core.dim();
            let core_mat = unfold_right(core)?;
            let contracted = acc.dot(&core_mat);
            let rows = contracted.nrows() * n * m;
            acc = Array2::from_shape_vec((rows, r_right), contracted.iter().cloned().collect())
                .map_err(|e| TtError::ShapeMismatch(format!("Contraction reshape failed: {}", e)))?;
        }

        // interleaved (n₁, m₁, n₂, m₂, ...) -> (n₁, ..., n_d, m₁, ..., m_d)
        let d = self.order();
        let mut interleaved = Vec::with_capacity(2 * d);
        for core in &self.cores {
            interleaved.push(core.shape()[1]);
            interleaved.push(core.shape()[2]);
        }
        let full = ArrayD::from_shape_vec(IxDyn(&interleaved), acc.iter().cloned().collect())
            .map_err(|e| TtError::ShapeMismatch(format!("Final reshape failed: {}", e)))?;

        let perm: Vec<usize> = (0..d).map(|k| 2 * k).chain((0..d).map(|k| 2 * k + 1)).collect();
        Ok(full.permuted_axes(perm).as_standard_layout().into_owned())
    }

    /// Frobenius norm computed by contracting cores from left to right
    pub fn norm(&self) -> TtResult<T> {
        let mut v = Array2::<T>::eye(1);

        for core in &self.cores {
            let (r_left, n, m, r_right) = core.dim();
            if v.nrows() != r_left {
                return Err(TtError::ShapeMismatch(format!(
                    "Running matrix has {} rows, core expects {}",
                    v.nrows(),
                    r_left
                )));
            }
            // W = G₂ᵀ · (V · G₁), with G₁ = (r_left, n·m·r_right), G₂ = (r_left·n·m, r_right)
            let tmp = v.dot(&unfold_right(core)?);
            let tmp = Array2::from_shape_vec((r_left * n * m, r_right), tmp.iter().cloned().collect())
                .map_err(|e| TtError::ShapeMismatch(format!("Norm reshape failed: {}", e)))?;
            v = unfold_left(core)?.t().dot(&tmp);
        }

        // clamp round-off below zero
        Ok(v[[0, 0]].max(T::zero()).sqrt())
    }

    /// Check whether all cores but the last are left-orthonormal
    ///
    /// A core is left-orthonormal if its (r_left·n·m, r_right) unfolding U
    /// satisfies ‖UᵀU - I‖_max ≤ `tol`.
    pub fn is_left_orthonormal(&self, tol: T) -> bool {
        self.cores[..self.cores.len() - 1].iter().all(|core| {
            let Ok(u) = unfold_left(core) else {
                return false;
            };
            let gram = u.t().dot(&u);
            gram.indexed_iter().all(|((i, j), &g)| {
                let target = if i == j { T::one() } else { T::zero() };
                (g - target).abs() <= tol
            })
        })
    }
}

/// Unfold a core (r_left, n, m, r_right) into the matrix (r_left·n·m, r_right)
pub fn unfold_left<T: Clone>(core: &Array4<T>) -> TtResult<Array2<T>> {
    let (r_left, n, m, r_right) = core.dim();
    Array2::from_shape_vec((r_left * n * m, r_right), core.iter().cloned().collect())
        .map_err(|e| TtError::ShapeMismatch(format!("Left unfolding failed: {}", e)))
}

/// Unfold a core (r_left, n, m, r_right) into the matrix (r_left, n·m·r_right)
pub fn unfold_right<T: Clone>(core: &Array4<T>) -> TtResult<Array2<T>> {
    let (r_left, n, m, r_right) = core.dim();
    Array2::from_shape_vec((r_left, n * m * r_right), core.iter().cloned().collect())
        .map_err(|e| TtError::ShapeMismatch(format!("Right unfolding failed: {}", e)))
}

/// Fold a matrix back into a core of the given shape (row-major order)
pub fn fold<T: Clone>(
    matrix: &Array2<T>,
    shape: (usize, usize, usize, usize),
) -> TtResult<Array4<T>> {
    Array4::from_shape_vec(shape, matrix.iter().cloned().collect())
        .map_err(|e| TtError::ShapeMismatch(format!("Core reshape to {:?} failed: {}", shape, e)))
}

fn validate_cores<T>(cores: &[Arc<Array4<T>>]) -> TtResult<()> {
    if cores.is_empty() {
        return Err(TtError::Empty);
    }

    for (index, core) in cores.iter().enumerate() {
        if core.shape().iter().any(|&dim| dim == 0) {
            return Err(TtError::InvalidCore {
                index,
                reason: format!("zero-sized axis in shape {:?}", core.shape()),
            });
        }
    }

    if cores[0].shape()[0] != 1 {
        return Err(TtError::InvalidCore {
            index: 0,
            reason: format!("first core must have left rank 1, got {}", cores[0].shape()[0]),
        });
    }

    let last = cores.len() - 1;
    if cores[last].shape()[3] != 1 {
        return Err(TtError::InvalidCore {
            index: last,
            reason: format!(
                "last core must have right rank 1, got {}",
                cores[last].shape()[3]
            ),
        });
    }

    for k in 0..last {
        let left_rank = cores[k].shape()[3];
        let right_rank = cores[k + 1].shape()[0];
        if left_rank != right_rank {
            return Err(TtError::RankMismatch {
                left: k,
                right: k + 1,
                left_rank,
                right_rank,
            });
        }
    }

    Ok(())
}
