//! Higher-order CUR (cross) approximation of transformed data tensors
//!
//! Builds a tensor train of Ψ(i_0, …, i_{p-1}, j) = ∏_k φ^k_{i_k}(x_j)
//! from a small number of sampled entries, without ever forming Ψ or the
//! m×m diagonal cores of [`crate::basis_decomposition`].
//!
//! Each bond k carries a left index set I_{k} (multi-indices over modes
//! 0..k) and a right index set J_{k} (multi-indices over modes k+1..). A
//! left-to-right sweep samples the cross matrices Ψ(I_k × i_k, J_k),
//! chooses the dominant rank via SVD and selects interpolation rows with
//! [`maxvol`]. Right-to-left sweeps (for `repeats > 1`) refresh the right
//! index sets the same way and enrich them with random columns.

use crate::decomposition::evaluate_basis;
use crate::error::{BasisError, BasisResult};
use crate::functions::Basis;
use crate::maxvol::{interpolation_matrix, maxvol};
use amuset_tt::{fold, relative_rank, thin_svd, TensorTrain};
use scirs2_core::ndarray_ext::{Array2, Array4, ArrayView2};
use scirs2_core::random::{thread_rng, Rng, SeedableRng, StdRng};
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Multi-index over a contiguous range of tensor modes
pub type MultiIndex = Vec<usize>;

/// Options for [`hocur`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CrossOptions {
    /// Upper bound on every bond rank
    pub max_rank: usize,
    /// Number of left-to-right sweeps
    pub repeats: usize,
    /// Oversampling factor: right index sets hold multiplier·rank columns
    pub multiplier: usize,
    /// Relative singular-value cutoff on the cross matrices
    pub tolerance: f64,
    /// Seed for column sampling, None = nondeterministic
    pub seed: Option<u64>,
    /// Report sweep progress through the `log` facade
    pub progress: bool,
}

impl Default for CrossOptions {
    fn default() -> Self {
        Self {
            max_rank: 1000,
            repeats: 1,
            multiplier: 2,
            tolerance: 1e-12,
            seed: None,
            progress: false,
        }
    }
}

impl CrossOptions {
    pub fn with_max_rank(mut self, max_rank: usize) -> Self {
        self.max_rank = max_rank;
        self
    }

    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats;
        self
    }

    pub fn with_multiplier(mut self, multiplier: usize) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    fn validate(&self) -> BasisResult<()> {
        if self.max_rank == 0 {
            return Err(BasisError::InvalidOption("max_rank must be positive".into()));
        }
        if self.repeats == 0 {
            return Err(BasisError::InvalidOption("repeats must be positive".into()));
        }
        if self.multiplier == 0 {
            return Err(BasisError::InvalidOption("multiplier must be positive".into()));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(BasisError::InvalidOption(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    fn sample_size(&self, rank: usize) -> usize {
        self.multiplier.saturating_mul(rank)
    }
}

/// Entry oracle for the transformed data tensor
struct EntrySampler<'a> {
    evaluations: &'a [Array2<f64>],
}

impl EntrySampler<'_> {
    /// Ψ at the multi-index `left ++ [local] ++ right`; the last position is
    /// the snapshot index
    fn entry(&self, left: &[usize], local: usize, right: &[usize]) -> f64 {
        let p = self.evaluations.len();
        let position = |k: usize| -> usize {
            if k < left.len() {
                left[k]
            } else if k == left.len() {
                local
            } else {
                right[k - left.len() - 1]
            }
        };
        let snapshot = position(p);
        (0..p)
            .map(|k| self.evaluations[k][[position(k), snapshot]])
            .product()
    }
}

/// Cross approximation of the transformed data tensor
///
/// The returned tensor train has the same layout as
/// [`crate::basis_decomposition`]: p+1 cores with row dimensions
/// (n_0, …, n_{p-1}, m) and unit column dimensions, but bond ranks bounded
/// by `options.max_rank` instead of m.
///
/// # Arguments
///
/// * `data` - Snapshot matrix, one state per column (d × m)
/// * `basis_list` - One basis per mode
/// * `options` - Rank bound, sweep count, oversampling and seed
///
/// # Errors
///
/// Returns error if the options or the basis list are invalid, if a
/// sampled cross matrix or interpolation core is not finite, or if an SVD
/// fails.
///
/// # Examples
///
/// ```
/// use amuset_basis::{hocur, Basis, Constant, CrossOptions, Identity};
/// use scirs2_core::ndarray_ext::array;
///
/// let data = array![[1.0, 2.0, 3.0], [0.5, 0.25, 0.125]];
/// let basis: Vec<Basis> = vec![
///     vec![Box::new(Constant), Box::new(Identity::new(0))],
///     vec![Box::new(Constant), Box::new(Identity::new(1))],
/// ];
/// let tt = hocur(&data.view(), &basis, &CrossOptions::default().with_seed(7))?;
/// assert_eq!(tt.row_dims(), vec![2, 2, 3]);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn hocur(
    data: &ArrayView2<'_, f64>,
    basis_list: &[Basis],
    options: &CrossOptions,
) -> BasisResult<TensorTrain<f64>> {
    options.validate()?;
    let evaluations = evaluate_basis(data, basis_list)?;
    let sampler = EntrySampler {
        evaluations: &evaluations,
    };

    let mut dims: Vec<usize> = evaluations.iter().map(|e| e.nrows()).collect();
    dims.push(data.ncols());
    let order = dims.len();

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => {
            let mut thread_rng_instance = thread_rng();
            StdRng::from_rng(&mut thread_rng_instance)
        }
    };

    let mut i_set: Vec<Vec<MultiIndex>> = vec![Vec::new(); order];
    i_set[0] = vec![Vec::new()];
    let mut j_set: Vec<Vec<MultiIndex>> = (0..order)
        .map(|k| {
            if k + 1 == order {
                vec![Vec::new()]
            } else {
                enrich(Vec::new(), options.sample_size(options.max_rank), &dims[k + 1..], &mut rng)
            }
        })
        .collect();

    let mut cores = Vec::new();
    for sweep in 0..options.repeats {
        if sweep > 0 {
            backward_sweep(&sampler, &dims, &i_set, &mut j_set, options, &mut rng)?;
        }
        cores = forward_sweep(&sampler, &dims, &mut i_set, &j_set, options)?;
        if options.progress {
            log::info!(
                "hocur: sweep {}/{} done, ranks {:?}",
                sweep + 1,
                options.repeats,
                cores.iter().map(|c| c.shape()[3]).collect::<Vec<_>>()
            );
        }
    }

    Ok(TensorTrain::new(cores)?)
}

/// Left-to-right sweep: builds all cores and refreshes the left index sets
fn forward_sweep(
    sampler: &EntrySampler<'_>,
    dims: &[usize],
    i_set: &mut [Vec<MultiIndex>],
    j_set: &[Vec<MultiIndex>],
    options: &CrossOptions,
) -> BasisResult<Vec<Array4<f64>>> {
    let order = dims.len();
    let mut cores = Vec::with_capacity(order);

    for k in 0..order {
        let n = dims[k];
        let rows = &i_set[k];
        let cols = &j_set[k];
        let cross = Array2::from_shape_fn((rows.len() * n, cols.len()), |(row, col)| {
            sampler.entry(&rows[row / n], row % n, &cols[col])
        });

        check_finite(&cross, k)?;

        if k + 1 == order {
            cores.push(fold(&cross, (rows.len(), n, 1, 1))?);
            break;
        }

        let basis = dominant_columns(&cross, options, k)?;
        let pivots = maxvol(&basis.view())?;
        let interpolation = interpolation_matrix(&basis.view(), &pivots)
            .map_err(|e| BasisError::Decomposition(format!("interpolation at core {}: {}", k, e)))?;
        let rank = pivots.len();
        cores.push(fold(&interpolation, (rows.len(), n, 1, rank))?);

        let next: Vec<MultiIndex> = pivots
            .iter()
            .map(|&p| {
                let mut idx = rows[p / n].clone();
                idx.push(p % n);
                idx
            })
            .collect();
        log::debug!("hocur: core {} rank {} from {} candidate columns", k, rank, cols.len());
        i_set[k + 1] = next;
    }

    Ok(cores)
}

/// Right-to-left sweep: re-selects the right index sets from the current
/// left index sets
fn backward_sweep<R: Rng>(
    sampler: &EntrySampler<'_>,
    dims: &[usize],
    i_set: &[Vec<MultiIndex>],
    j_set: &mut [Vec<MultiIndex>],
    options: &CrossOptions,
    rng: &mut R,
) -> BasisResult<()> {
    let order = dims.len();
    for k in (1..order).rev() {
        let n = dims[k];
        let rows = &i_set[k];
        let cols = &j_set[k];
        let width = cols.len();
        // transposed cross matrix: (n·|J_k|) × |I_k|, row = local·|J_k| + b
        let cross_t = Array2::from_shape_fn((n * width, rows.len()), |(row, a)| {
            sampler.entry(&rows[a], row / width, &cols[row % width])
        });
        check_finite(&cross_t, k)?;

        let basis = dominant_columns(&cross_t, options, k)?;
        let pivots = maxvol(&basis.view())?;
        let selected: Vec<MultiIndex> = pivots
            .iter()
            .map(|&p| {
                let mut idx = vec![p / width];
                idx.extend(cols[p % width].iter().copied());
                idx
            })
            .collect();

        let target = options.sample_size(selected.len());
        j_set[k - 1] = enrich(selected, target, &dims[k..], rng);
    }
    Ok(())
}

/// Leading left singular vectors of `matrix`, truncated by the relative
/// tolerance and the rank cap; at least one vector is kept
fn dominant_columns(matrix: &Array2<f64>, options: &CrossOptions, core: usize) -> BasisResult<Array2<f64>> {
    let svd = thin_svd(&matrix.view())
        .map_err(|e| BasisError::Decomposition(format!("SVD failed at core {}: {}", core, e)))?;

    let rank = relative_rank(&svd.s.view(), options.tolerance)
        .min(options.max_rank)
        .min(svd.rank())
        .max(1);
    Ok(svd.truncate(rank).u)
}

fn check_finite(cross: &Array2<f64>, core: usize) -> BasisResult<()> {
    match cross.iter().position(|v| !v.is_finite()) {
        Some(flat) => Err(BasisError::Decomposition(format!(
            "cross matrix at core {} has a non-finite entry at ({}, {})",
            core,
            flat / cross.ncols(),
            flat % cross.ncols()
        ))),
        None => Ok(()),
    }
}

/// Extend `indices` with distinct random multi-indices over `dims` until it
/// holds `target` entries or the index space is exhausted
fn enrich<R: Rng>(indices: Vec<MultiIndex>, target: usize, dims: &[usize], rng: &mut R) -> Vec<MultiIndex> {
    let total = dims.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n));
    let target = match total {
        Some(total) => target.min(total),
        None => target,
    };

    if total.is_some_and(|t| t <= target) {
        return enumerate(dims);
    }

    let mut seen: HashSet<MultiIndex> = indices.iter().cloned().collect();
    let mut result = indices;
    let mut attempts = 0usize;
    let budget = target.saturating_mul(20).max(64);
    while result.len() < target && attempts < budget {
        attempts += 1;
        let candidate: MultiIndex = dims.iter().map(|&n| rng.random_range(0..n)).collect();
        if seen.insert(candidate.clone()) {
            result.push(candidate);
        }
    }
    result
}

/// All multi-indices over `dims` in row-major order
fn enumerate(dims: &[usize]) -> Vec<MultiIndex> {
    let mut result: Vec<MultiIndex> = vec![Vec::new()];
    for &n in dims {
        result = result
            .into_iter()
            .flat_map(|prefix| {
                (0..n).map(move |i| {
                    let mut idx = prefix.clone();
                    idx.push(i);
                    idx
                })
            })
            .collect();
    }
    result
}
