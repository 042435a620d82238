//! AMUSEt drivers
//!
//! Both drivers share one pipeline and differ only in how Ψ is built:
//!
//! 1. transform the snapshots into Ψ (exactly, or by cross approximation)
//! 2. left-orthonormalize Ψ so its last core carries all weight
//! 3. per index pair: reduced matrix, dense eigen-solve ([`eigenpairs`]),
//!    eigenpairs sorted by |λ - 1|, eigentensor = Ψ with its last core
//!    replaced by U·diag(1/s)·W
//!
//! Eigentensors share every core but the last with the orthonormalized Ψ
//! through [`TensorTrain::with_last_core`]; pairs never observe each
//! other's cores.

use crate::error::{KoopmanError, KoopmanResult};
use crate::index_sets::{IndexPair, IndexSets};
use crate::options::{HocurOptions, HosvdOptions, PairSettings};
use crate::reduced::reduced_matrix;
use crate::spectrum::eigenpairs;
use amuset_basis::{basis_decomposition, hocur, Basis};
use amuset_tt::{fold, TensorTrain};
use scirs2_core::ndarray_ext::{Array1, Array2, ArrayView2};
use scirs2_core::num_complex::Complex;

/// Eigenvalues and eigentensor of one index pair
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Real parts of the eigenvalues
    ///
    /// Eigenpairs are sorted by the complex distance |λ - 1| before the
    /// imaginary parts are dropped. For real spectra `|eigenvalues[i] - 1|`
    /// is therefore non-decreasing; a complex pair may sort after a real
    /// eigenvalue whose real part lies farther from 1 (λ = ±0.9i sorts
    /// after λ = -0.2). Check [`Self::max_discarded_imag`] before relying
    /// on the order of the real parts.
    pub eigenvalues: Array1<f64>,
    /// Ψ with its last core replaced by the lifted eigenvectors; the last
    /// core has shape (r, k, 1, 1), one row index per eigenvalue
    pub eigentensor: TensorTrain<f64>,
    /// Largest |Im λ| / |λ| among the eigenvalues
    pub max_discarded_imag: f64,
}

impl Decomposition {
    /// Number of eigenpairs (the retained rank of the x-slice)
    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }
}

/// Driver output, shaped like the [`IndexSets`] input
#[derive(Debug, Clone)]
pub enum AmusetOutput {
    Single(Decomposition),
    Batch(Vec<Decomposition>),
}

impl AmusetOutput {
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// Number of index pairs covered
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-pair results in list form
    pub fn decompositions(&self) -> &[Decomposition] {
        match self {
            Self::Single(item) => std::slice::from_ref(item),
            Self::Batch(items) => items,
        }
    }

    /// The single result, `None` for batch output
    pub fn into_single(self) -> Option<Decomposition> {
        match self {
            Self::Single(item) => Some(item),
            Self::Batch(_) => None,
        }
    }

    pub fn into_vec(self) -> Vec<Decomposition> {
        match self {
            Self::Single(item) => vec![item],
            Self::Batch(items) => items,
        }
    }
}

/// AMUSEt with the exact basis transform and truncated orthonormalization
///
/// # Arguments
///
/// * `data` - Snapshot matrix, one state per column, ordered in time
/// * `index_sets` - One x/y pair or a batch of pairs
/// * `basis_list` - One basis per tensor mode
/// * `options` - Truncation thresholds and progress flag
///
/// # Errors
///
/// Returns error if:
/// - an index set is empty, mismatched or out of bounds
/// - the basis list does not fit the snapshot matrix
/// - Ψ or an x-slice is numerically degenerate
/// - a factorization fails
///
/// # Examples
///
/// ```
/// use amuset_basis::{Basis, Constant, Identity};
/// use amuset_koopman::{amuset_hosvd, HosvdOptions, IndexSets};
/// use scirs2_core::ndarray_ext::Array2;
///
/// // x_{t+1} = diag(0.5, -0.8) x_t
/// let data = Array2::from_shape_fn((2, 6), |(i, t)| {
///     let lambda: f64 = if i == 0 { 0.5 } else { -0.8 };
///     lambda.powi(t as i32)
/// });
/// let basis: Vec<Basis> = vec![
///     vec![Box::new(Constant), Box::new(Identity::new(0))],
///     vec![Box::new(Constant), Box::new(Identity::new(1))],
/// ];
/// let pairs = IndexSets::single(vec![0, 1, 2, 3], vec![1, 2, 3, 4]);
///
/// let result = amuset_hosvd(&data.view(), &pairs, &basis, &HosvdOptions::default())?;
/// let decomposition = result.into_single().expect("single pair");
/// assert!((decomposition.eigenvalues[0] - 1.0).abs() < 1e-8);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn amuset_hosvd(
    data: &ArrayView2<'_, f64>,
    index_sets: &IndexSets,
    basis_list: &[Basis],
    options: &HosvdOptions,
) -> KoopmanResult<AmusetOutput> {
    options.validate()?;
    index_sets.validate(data.ncols())?;

    let psi = basis_decomposition(data, basis_list)?;
    log::debug!("amuset_hosvd: Ψ built with ranks {:?}", psi.ranks());
    let psi = psi.ortho_left(&options.ortho_options())?;
    log::debug!("amuset_hosvd: orthonormalized ranks {:?}", psi.ranks());

    solve_pairs(&psi, index_sets, &options.pair_settings())
}

/// AMUSEt with the cross-approximated basis transform
///
/// Identical to [`amuset_hosvd`] after Ψ is built; the orthonormalization
/// runs without a relative threshold but keeps the `max_rank` cap.
///
/// # Errors
///
/// See [`amuset_hosvd`]; additionally fails on invalid cross-approximation
/// options.
pub fn amuset_hocur(
    data: &ArrayView2<'_, f64>,
    index_sets: &IndexSets,
    basis_list: &[Basis],
    options: &HocurOptions,
) -> KoopmanResult<AmusetOutput> {
    options.validate()?;
    index_sets.validate(data.ncols())?;

    let psi = hocur(data, basis_list, &options.cross_options())?;
    log::debug!("amuset_hocur: Ψ approximated with ranks {:?}", psi.ranks());
    let psi = psi.ortho_left(&options.ortho_options())?;

    solve_pairs(&psi, index_sets, &options.pair_settings())
}

/// Per-pair reduction shared by both drivers
fn solve_pairs(
    psi: &TensorTrain<f64>,
    index_sets: &IndexSets,
    settings: &PairSettings,
) -> KoopmanResult<AmusetOutput> {
    match index_sets {
        IndexSets::Single(pair) => Ok(AmusetOutput::Single(solve_pair(psi, pair, settings)?)),
        IndexSets::Batch(pairs) => {
            let mut results = Vec::with_capacity(pairs.len());
            for (i, pair) in pairs.iter().enumerate() {
                results.push(solve_pair(psi, pair, settings)?);
                if settings.progress {
                    log::info!("amuset: pair {}/{} solved", i + 1, pairs.len());
                }
            }
            Ok(AmusetOutput::Batch(results))
        }
    }
}

fn solve_pair(
    psi: &TensorTrain<f64>,
    pair: &IndexPair,
    settings: &PairSettings,
) -> KoopmanResult<Decomposition> {
    let reduced = reduced_matrix(psi.last_core(), &pair.x, &pair.y, settings.svd_threshold)?;

    let spectrum = eigenpairs(&reduced.matrix.view())?;
    let (values, vectors) = (&spectrum.values, &spectrum.vectors);
    log::debug!(
        "amuset: {} eigenpairs, max residual {:.3e}",
        values.len(),
        spectrum.max_residual
    );

    let one = Complex::new(1.0, 0.0);
    let distance: Vec<f64> = values.iter().map(|&lambda| (lambda - one).norm()).collect();
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| distance[a].total_cmp(&distance[b]));

    let eigenvalues: Array1<f64> = order.iter().map(|&i| values[i].re).collect();
    let max_discarded_imag = order
        .iter()
        .map(|&i| {
            let lambda = values[i];
            lambda.im.abs() / lambda.norm().max(f64::MIN_POSITIVE)
        })
        .fold(0.0, f64::max);
    if max_discarded_imag > settings.imag_tolerance {
        log::warn!(
            "amuset: dropping imaginary parts up to {:.3e} of |λ| (tolerance {:.1e})",
            max_discarded_imag,
            settings.imag_tolerance
        );
    }

    let k = order.len();
    let w = Array2::from_shape_fn((k, k), |(row, col)| vectors[[row, order[col]]].re);

    let mut lift = reduced.u.clone();
    for (mut col, &sigma) in lift.columns_mut().into_iter().zip(reduced.s.iter()) {
        col /= sigma;
    }
    let coefficients = lift.dot(&w);
    let r = coefficients.nrows();
    let core = fold(&coefficients, (r, k, 1, 1))?;

    Ok(Decomposition {
        eigenvalues,
        eigentensor: psi.with_last_core(core)?,
        max_discarded_imag,
    })
}
