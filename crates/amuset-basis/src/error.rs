//! Error types for basis evaluation and tensor-train construction

use amuset_tt::TtError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BasisError {
    #[error("Basis list must contain at least one mode")]
    EmptyBasisList,

    #[error("Basis of mode {mode} is empty")]
    EmptyBasis { mode: usize },

    #[error(
        "Basis function {function} of mode {mode} reads state index {index}, \
         but states have dimension {dimension}"
    )]
    StateIndexOutOfBounds {
        mode: usize,
        function: usize,
        index: usize,
        dimension: usize,
    },

    #[error("Snapshot matrix has no snapshots")]
    NoSnapshots,

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Decomposition failed: {0}")]
    Decomposition(String),

    #[error(transparent)]
    Tt(#[from] TtError),
}

/// Result alias for basis operations
pub type BasisResult<T> = Result<T, BasisError>;
