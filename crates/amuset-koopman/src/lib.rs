//! # amuset-koopman
//!
//! AMUSEt: the AMUSE algorithm on tensor trains, for estimating Koopman
//! eigenvalues and eigenfunctions from snapshot data (tEDMD).
//!
//! Given snapshots x_1, …, x_m of a dynamical system, a basis list and
//! time-lagged column sets (x, y), the drivers
//!
//! 1. build the transformed data tensor Ψ in TT format,
//!    exactly ([`amuset_hosvd`]) or by cross approximation ([`amuset_hocur`]),
//! 2. left-orthonormalize Ψ,
//! 3. reduce the x/y slices of the last core to a small matrix
//!    ([`reduced_matrix`]) and solve its eigenvalue problem,
//! 4. lift every eigenvector back into an eigentensor that shares all but
//!    its last core with Ψ.
//!
//! Eigenvalues are real parts sorted by distance to 1; the discarded
//! imaginary parts are reported in [`Decomposition::max_discarded_imag`].
//!
//! ## Quick Start
//!
//! ```
//! use amuset_basis::{Basis, Constant, Identity};
//! use amuset_koopman::{amuset_hosvd, evaluate_eigenfunctions, HosvdOptions, IndexSets};
//! use scirs2_core::ndarray_ext::Array2;
//!
//! let data = Array2::from_shape_fn((2, 8), |(i, t)| {
//!     let lambda: f64 = if i == 0 { 0.9 } else { 0.3 };
//!     2.0 * lambda.powi(t as i32)
//! });
//! let basis: Vec<Basis> = vec![
//!     vec![Box::new(Constant), Box::new(Identity::new(0))],
//!     vec![Box::new(Constant), Box::new(Identity::new(1))],
//! ];
//! let pairs = IndexSets::single((0..7).collect(), (1..8).collect());
//!
//! let result = amuset_hosvd(&data.view(), &pairs, &basis, &HosvdOptions::default().with_threshold(1e-6))?;
//! for decomposition in result.decompositions() {
//!     println!("eigenvalues: {}", decomposition.eigenvalues);
//!     let values = evaluate_eigenfunctions(&decomposition.eigentensor, &basis, &data.view())?;
//!     assert_eq!(values.nrows(), decomposition.len());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`amuset`]: drivers and output types
//! - [`reduced`]: reduced matrix of one index pair
//! - [`spectrum`]: dense eigen-solver for reduced matrices
//! - [`index_sets`]: single and batched x/y pairs
//! - [`eigenfunctions`]: pointwise evaluation of eigentensors
//! - [`options`]: driver configuration

pub mod amuset;
pub mod eigenfunctions;
pub mod error;
pub mod index_sets;
pub mod options;
pub mod reduced;
pub mod spectrum;

#[cfg(test)]
mod property_tests;

pub use amuset::{amuset_hocur, amuset_hosvd, AmusetOutput, Decomposition};
pub use eigenfunctions::evaluate_eigenfunctions;
pub use error::{KoopmanError, KoopmanResult};
pub use index_sets::{IndexPair, IndexSets};
pub use options::{HocurOptions, HosvdOptions};
pub use reduced::{reduced_matrix, snapshot_slice, ReducedMatrix};
pub use spectrum::{eigenpairs, EigenPairs};
