//! # AMUSEt - Tensor-Train AMUSE for Koopman Analysis
//!
//! Estimate eigenvalues and eigenfunctions of the Koopman operator from
//! snapshot data with tensor-based EDMD, keeping every high-dimensional
//! object in tensor-train format.
//!
//! This is the **meta crate** that re-exports all AMUSEt components.
//!
//! ## Quick Start
//!
//! ```
//! use amuset::prelude::*;
//! use scirs2_core::ndarray_ext::Array2;
//!
//! let data = Array2::from_shape_fn((2, 10), |(i, t)| {
//!     let lambda: f64 = if i == 0 { 0.7 } else { -0.5 };
//!     lambda.powi(t as i32)
//! });
//! let basis: Vec<Basis> = vec![
//!     vec![Box::new(Constant), Box::new(Identity::new(0))],
//!     vec![Box::new(Constant), Box::new(Identity::new(1))],
//! ];
//! let pairs = IndexSets::from(IndexPair::lagged(10, 1));
//!
//! let result = amuset_hosvd(&data.view(), &pairs, &basis, &HosvdOptions::default())?;
//! let eigenvalues = &result.decompositions()[0].eigenvalues;
//! assert!((eigenvalues[0] - 1.0).abs() < 1e-8);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Components
//!
//! ### Tensor Trains ([`tt`])
//!
//! `TensorTrain` with 4-index cores shared behind `Arc`, dense contraction,
//! norms and left-orthonormalization with relative truncation.
//!
//! ```
//! use amuset::tt::{OrthoOptions, TensorTrain};
//! use scirs2_core::ndarray_ext::Array4;
//!
//! let g1 = Array4::<f64>::ones((1, 3, 1, 2));
//! let g2 = Array4::<f64>::ones((2, 4, 1, 1));
//! let tt = TensorTrain::new(vec![g1, g2]).unwrap();
//! let ortho = tt.ortho_left(&OrthoOptions::default().with_threshold(1e-10)).unwrap();
//! assert_eq!(ortho.ranks(), vec![1, 1, 1]);
//! ```
//!
//! ### Basis Transforms ([`basis`])
//!
//! Basis functions, the exact transformed data tensor and its cross
//! approximation.
//!
//! ### Koopman Drivers ([`koopman`])
//!
//! `amuset_hosvd`, `amuset_hocur`, the reduced matrix and eigenfunction
//! evaluation.
//!
//! ## Features
//!
//! - `serde`: serialization of option structs, basis functions and index sets

pub use amuset_basis as basis;
pub use amuset_koopman as koopman;
pub use amuset_tt as tt;

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! # Example
    //!
    //! ```
    //! use amuset::prelude::*;
    //!
    //! let options = HosvdOptions::default().with_threshold(1e-3);
    //! assert_eq!(options.threshold, 1e-3);
    //! ```

    // Tensor trains
    pub use crate::tt::{OrthoOptions, TensorTrain};

    // Basis transforms
    pub use crate::basis::{
        basis_decomposition, hocur, Basis, BasisFunction, Constant, Cos, CrossOptions, Gauss,
        Identity, Indicator, Legendre, Monomial, PeriodicGauss, Sin,
    };

    // Drivers
    pub use crate::koopman::{
        amuset_hocur, amuset_hosvd, evaluate_eigenfunctions, reduced_matrix, AmusetOutput,
        Decomposition, HocurOptions, HosvdOptions, IndexPair, IndexSets,
    };
}
