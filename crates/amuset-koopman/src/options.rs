//! Configuration of the AMUSEt drivers

use crate::error::{KoopmanError, KoopmanResult};
use amuset_basis::CrossOptions;
use amuset_tt::OrthoOptions;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options for [`crate::amuset_hosvd`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HosvdOptions {
    /// Relative truncation threshold of the left-orthonormalization
    pub threshold: f64,
    /// Relative truncation threshold of the x-slice SVD
    pub svd_threshold: f64,
    /// Largest relative imaginary part dropped without a warning
    pub imag_tolerance: f64,
    /// Report progress through the `log` facade
    pub progress: bool,
}

impl Default for HosvdOptions {
    fn default() -> Self {
        Self {
            threshold: 1e-2,
            svd_threshold: 1e-3,
            imag_tolerance: 1e-8,
            progress: false,
        }
    }
}

impl HosvdOptions {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_svd_threshold(mut self, svd_threshold: f64) -> Self {
        self.svd_threshold = svd_threshold;
        self
    }

    pub fn with_imag_tolerance(mut self, imag_tolerance: f64) -> Self {
        self.imag_tolerance = imag_tolerance;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub(crate) fn ortho_options(&self) -> OrthoOptions {
        OrthoOptions::default()
            .with_threshold(self.threshold)
            .with_progress(self.progress)
    }

    pub(crate) fn pair_settings(&self) -> PairSettings {
        PairSettings {
            svd_threshold: self.svd_threshold,
            imag_tolerance: self.imag_tolerance,
            progress: self.progress,
        }
    }

    pub(crate) fn validate(&self) -> KoopmanResult<()> {
        check_threshold("threshold", self.threshold)?;
        self.pair_settings().validate()
    }
}

/// Options for [`crate::amuset_hocur`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HocurOptions {
    /// Cap on the TT ranks, in the cross approximation and the
    /// orthonormalization
    pub max_rank: usize,
    /// Oversampling factor of the column index sets
    pub multiplier: usize,
    /// Number of cross-approximation sweeps
    pub repeats: usize,
    /// Seed of the column sampling, None = nondeterministic
    pub seed: Option<u64>,
    /// Relative truncation threshold of the x-slice SVD
    pub svd_threshold: f64,
    /// Largest relative imaginary part dropped without a warning
    pub imag_tolerance: f64,
    /// Report progress through the `log` facade
    pub progress: bool,
}

impl Default for HocurOptions {
    fn default() -> Self {
        Self {
            max_rank: 1000,
            multiplier: 2,
            repeats: 1,
            seed: None,
            svd_threshold: 1e-3,
            imag_tolerance: 1e-8,
            progress: false,
        }
    }
}

impl HocurOptions {
    pub fn with_max_rank(mut self, max_rank: usize) -> Self {
        self.max_rank = max_rank;
        self
    }

    pub fn with_multiplier(mut self, multiplier: usize) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_svd_threshold(mut self, svd_threshold: f64) -> Self {
        self.svd_threshold = svd_threshold;
        self
    }

    pub fn with_imag_tolerance(mut self, imag_tolerance: f64) -> Self {
        self.imag_tolerance = imag_tolerance;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub(crate) fn cross_options(&self) -> CrossOptions {
        let options = CrossOptions::default()
            .with_max_rank(self.max_rank)
            .with_multiplier(self.multiplier)
            .with_repeats(self.repeats)
            .with_progress(self.progress);
        match self.seed {
            Some(seed) => options.with_seed(seed),
            None => options,
        }
    }

    pub(crate) fn ortho_options(&self) -> OrthoOptions {
        OrthoOptions::default()
            .with_max_rank(self.max_rank)
            .with_progress(self.progress)
    }

    pub(crate) fn pair_settings(&self) -> PairSettings {
        PairSettings {
            svd_threshold: self.svd_threshold,
            imag_tolerance: self.imag_tolerance,
            progress: self.progress,
        }
    }

    pub(crate) fn validate(&self) -> KoopmanResult<()> {
        if self.max_rank == 0 {
            return Err(KoopmanError::InvalidOption("max_rank must be positive".into()));
        }
        self.pair_settings().validate()
    }
}

/// Settings of the per-pair reduction shared by both drivers
#[derive(Debug, Clone, Copy)]
pub(crate) struct PairSettings {
    pub svd_threshold: f64,
    pub imag_tolerance: f64,
    pub progress: bool,
}

impl PairSettings {
    fn validate(&self) -> KoopmanResult<()> {
        check_threshold("svd_threshold", self.svd_threshold)?;
        check_threshold("imag_tolerance", self.imag_tolerance)
    }
}

fn check_threshold(name: &str, value: f64) -> KoopmanResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(KoopmanError::InvalidOption(format!(
            "{} must be finite and non-negative, got {}",
            name, value
        )))
    }
}
