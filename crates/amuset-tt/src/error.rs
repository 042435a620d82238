//! Error types for tensor-train construction and manipulation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtError {
    #[error("Tensor train must have at least one core")]
    Empty,

    #[error("Invalid core {index}: {reason}")]
    InvalidCore { index: usize, reason: String },

    #[error("Rank mismatch between cores {left} and {right}: {left_rank} != {right_rank}")]
    RankMismatch {
        left: usize,
        right: usize,
        left_rank: usize,
        right_rank: usize,
    },

    #[error("Core index {index} out of bounds for tensor train of order {order}")]
    IndexOutOfBounds { index: usize, order: usize },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Decomposition failed: {0}")]
    Decomposition(String),

    #[error("Degenerate core {index}: leading singular value is {value:e}")]
    DegenerateCore { index: usize, value: f64 },

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

/// Result alias for tensor-train operations
pub type TtResult<T> = Result<T, TtError>;
