//! # amuset-basis
//!
//! Basis transforms of snapshot data into tensor-train format.
//!
//! A *basis list* assigns one set of scalar [`BasisFunction`]s to each
//! tensor mode. Applied to snapshots x_1, …, x_m (columns of a d × m
//! matrix) it defines the transformed data tensor
//!
//! ```text
//! Ψ(i_0, …, i_{p-1}, j) = φ^0_{i_0}(x_j) ⋯ φ^{p-1}_{i_{p-1}}(x_j)
//! ```
//!
//! whose last mode indexes snapshots. Two constructions are provided:
//!
//! - [`basis_decomposition`]: exact representation with bond ranks m
//! - [`hocur`]: cross approximation with bounded ranks, sampling only a
//!   few entries of Ψ
//!
//! ## Quick Start
//!
//! ```
//! use amuset_basis::{basis_decomposition, Basis, Constant, Identity, Legendre};
//! use scirs2_core::ndarray_ext::array;
//!
//! let data = array![[0.1, 0.5, -0.3, 0.8], [1.0, 0.2, -0.4, 0.0]];
//! let basis: Vec<Basis> = vec![
//!     vec![Box::new(Constant), Box::new(Legendre::new(0, 2, 1.0))],
//!     vec![Box::new(Constant), Box::new(Identity::new(1))],
//! ];
//!
//! let psi = basis_decomposition(&data.view(), &basis)?;
//! assert_eq!(psi.row_dims(), vec![2, 2, 4]);
//! assert_eq!(psi.ranks(), vec![1, 4, 4, 1]);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cross;
pub mod decomposition;
pub mod error;
pub mod functions;
pub mod maxvol;


pub use cross::{hocur, CrossOptions, MultiIndex};
pub use decomposition::{basis_decomposition, evaluate_basis, validate_basis_list};
pub use error::{BasisError, BasisResult};
pub use functions::{
    Basis, BasisFunction, Constant, Cos, Gauss, Identity, Indicator, Legendre, Monomial,
    PeriodicGauss, Sin,
};
pub use maxvol::{interpolation_matrix, maxvol};
