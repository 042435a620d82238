//! Error types for the AMUSEt drivers

use amuset_basis::BasisError;
use amuset_tt::TtError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KoopmanError {
    #[error("Index set {side} is empty")]
    EmptyIndexSet { side: &'static str },

    #[error("Snapshot index {index} out of bounds for {snapshots} snapshots")]
    IndexOutOfBounds { index: usize, snapshots: usize },

    #[error("Got {x} x-index sets but {y} y-index sets")]
    IndexSetLengthMismatch { x: usize, y: usize },

    #[error("Index pair has {x} x-snapshots but {y} y-snapshots")]
    PairSizeMismatch { x: usize, y: usize },

    #[error("Degenerate x-slice: leading singular value is {value:e}")]
    DegenerateSlice { value: f64 },

    #[error("No singular value of the x-slice exceeds the relative threshold {threshold}")]
    EmptyRank { threshold: f64 },

    #[error("Invalid core: {0}")]
    InvalidCore(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Linear algebra failure: {0}")]
    Linalg(String),

    #[error(transparent)]
    Basis(#[from] BasisError),

    #[error(transparent)]
    Tt(#[from] TtError),
}

/// Result alias for AMUSEt operations
pub type KoopmanResult<T> = Result<T, KoopmanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = KoopmanError::IndexOutOfBounds {
            index: 9,
            snapshots: 6,
        };
        assert_eq!(err.to_string(), "Snapshot index 9 out of bounds for 6 snapshots");

        let err = KoopmanError::PairSizeMismatch { x: 4, y: 3 };
        assert!(err.to_string().contains("4 x-snapshots"));
    }

    #[test]
    fn test_from_lower_layers() {
        let err: KoopmanError = BasisError::NoSnapshots.into();
        assert!(matches!(err, KoopmanError::Basis(BasisError::NoSnapshots)));

        let err: KoopmanError = TtError::Empty.into();
        assert!(matches!(err, KoopmanError::Tt(TtError::Empty)));
    }
}
