//! # amuset-tt - Tensor Trains for AMUSEt
//!
//! Tensor-train (TT) container used by the AMUSEt/tEDMD pipeline.
//!
//! ## Overview
//!
//! A tensor train stores an order-d tensor as a chain of 4-index cores
//!
//! ```text
//! T(i₁, j₁, ..., i_d, j_d) = G₁[i₁, j₁] × G₂[i₂, j₂] × ... × G_d[i_d, j_d]
//! ```
//!
//! with core shapes (rₖ₋₁, nₖ, mₖ, rₖ). Data tensors use column dimension
//! mₖ = 1; the trailing core of a transformed data tensor indexes snapshots.
//!
//! **Operations:**
//! - [`TensorTrain::ortho_left`]: left-orthonormalization with optional
//!   relative-threshold / rank-capped truncation
//! - [`TensorTrain::full`], [`TensorTrain::norm`]: dense contraction and norm
//! - [`TensorTrain::with_last_core`]: replace the weight-carrying core while
//!   sharing all others
//!
//! ## Quick Start
//!
//! ```
//! use amuset_tt::{OrthoOptions, TensorTrain};
//! use scirs2_core::ndarray_ext::Array4;
//!
//! let g1 = Array4::<f64>::ones((1, 4, 1, 3));
//! let g2 = Array4::<f64>::ones((3, 5, 1, 1));
//! let tt = TensorTrain::new(vec![g1, g2])?;
//!
//! // all-ones tensor has TT-rank 1
//! let compressed = tt.ortho_left(&OrthoOptions::default().with_threshold(1e-10))?;
//! assert_eq!(compressed.ranks(), vec![1, 1, 1]);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## SciRS2 Integration
//!
//! Arrays come from `scirs2_core::ndarray_ext` and QR from `scirs2_linalg`.
//! Singular value decompositions use the one-sided Jacobi kernel in [`svd`],
//! which stays accurate for repeated, vanishing and wide spectra.
//!
//! ## References
//!
//! - Oseledets (2011), "Tensor-Train Decomposition"
//! - Klus, Gelß, Peitz, Schütte (2018), "Tensor-based dynamic mode decomposition"

pub mod error;
pub mod ortho;
pub mod svd;
pub mod tensor_train;


pub use error::{TtError, TtResult};
pub use ortho::{relative_rank, OrthoOptions};
pub use svd::{thin_svd, ThinSvd};
pub use tensor_train::{fold, unfold_left, unfold_right, TensorTrain, TtScalar};
