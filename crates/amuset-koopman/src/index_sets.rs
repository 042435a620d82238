//! Time-lagged snapshot index sets
//!
//! An [`IndexPair`] selects the "before" (x) and "after" (y) columns of the
//! snapshot matrix for one dynamical pair. [`IndexSets`] carries either one
//! pair or a batch; the drivers mirror that shape in their output.

use crate::error::{KoopmanError, KoopmanResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// x/y snapshot columns of one time-lagged pair
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexPair {
    pub x: Vec<usize>,
    pub y: Vec<usize>,
}

impl IndexPair {
    pub fn new(x: Vec<usize>, y: Vec<usize>) -> Self {
        Self { x, y }
    }

    /// Pair (t, t + lag) for every t in `0..snapshots - lag`
    pub fn lagged(snapshots: usize, lag: usize) -> Self {
        let count = snapshots.saturating_sub(lag);
        Self {
            x: (0..count).collect(),
            y: (lag..lag + count).collect(),
        }
    }

    /// Check sizes and bounds against a snapshot count
    pub fn validate(&self, snapshots: usize) -> KoopmanResult<()> {
        if self.x.is_empty() {
            return Err(KoopmanError::EmptyIndexSet { side: "x" });
        }
        if self.y.is_empty() {
            return Err(KoopmanError::EmptyIndexSet { side: "y" });
        }
        if self.x.len() != self.y.len() {
            return Err(KoopmanError::PairSizeMismatch {
                x: self.x.len(),
                y: self.y.len(),
            });
        }
        match self.x.iter().chain(self.y.iter()).find(|&&i| i >= snapshots) {
            Some(&index) => Err(KoopmanError::IndexOutOfBounds { index, snapshots }),
            None => Ok(()),
        }
    }
}

/// One index pair or a batch of pairs
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IndexSets {
    Single(IndexPair),
    Batch(Vec<IndexPair>),
}

impl IndexSets {
    pub fn single(x: Vec<usize>, y: Vec<usize>) -> Self {
        Self::Single(IndexPair::new(x, y))
    }

    /// Zip per-pair x and y sets into a batch
    ///
    /// # Errors
    ///
    /// Returns [`KoopmanError::IndexSetLengthMismatch`] if `xs` and `ys`
    /// hold different numbers of sets.
    pub fn batch(xs: Vec<Vec<usize>>, ys: Vec<Vec<usize>>) -> KoopmanResult<Self> {
        if xs.len() != ys.len() {
            return Err(KoopmanError::IndexSetLengthMismatch {
                x: xs.len(),
                y: ys.len(),
            });
        }
        Ok(Self::Batch(
            xs.into_iter().zip(ys).map(|(x, y)| IndexPair::new(x, y)).collect(),
        ))
    }

    /// All pairs in list form
    pub fn pairs(&self) -> &[IndexPair] {
        match self {
            Self::Single(pair) => std::slice::from_ref(pair),
            Self::Batch(pairs) => pairs,
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    pub fn validate(&self, snapshots: usize) -> KoopmanResult<()> {
        self.pairs().iter().try_for_each(|pair| pair.validate(snapshots))
    }
}

impl From<IndexPair> for IndexSets {
    fn from(pair: IndexPair) -> Self {
        Self::Single(pair)
    }
}

impl From<Vec<IndexPair>> for IndexSets {
    fn from(pairs: Vec<IndexPair>) -> Self {
        Self::Batch(pairs)
    }
}
