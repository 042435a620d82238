//! Scalar basis functions (feature maps) on state vectors
//!
//! Every function reads at most one coordinate of the state vector; the
//! coordinate is exposed through [`BasisFunction::state_index`] so basis
//! lists can be validated against the snapshot matrix before evaluation.

use scirs2_core::ndarray_ext::ArrayView1;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A scalar-valued function of a state vector
pub trait BasisFunction: fmt::Debug + Send + Sync {
    /// Evaluate the function at state `x`
    ///
    /// Callers must ensure `x` has more than `state_index()` entries.
    fn evaluate(&self, x: ArrayView1<'_, f64>) -> f64;

    /// Coordinate read by this function, `None` if it ignores the state
    fn state_index(&self) -> Option<usize>;
}

/// Basis functions of one mode
pub type Basis = Vec<Box<dyn BasisFunction>>;

/// Constant function 1
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Constant;

impl BasisFunction for Constant {
    fn evaluate(&self, _x: ArrayView1<'_, f64>) -> f64 {
        1.0
    }

    fn state_index(&self) -> Option<usize> {
        None
    }
}

/// Indicator of the half-open interval [a, b) on one coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Indicator {
    pub index: usize,
    pub a: f64,
    pub b: f64,
}

impl Indicator {
    pub fn new(index: usize, a: f64, b: f64) -> Self {
        Self { index, a, b }
    }
}

impl BasisFunction for Indicator {
    fn evaluate(&self, x: ArrayView1<'_, f64>) -> f64 {
        let v = x[self.index];
        if self.a <= v && v < self.b {
            1.0
        } else {
            0.0
        }
    }

    fn state_index(&self) -> Option<usize> {
        Some(self.index)
    }
}

/// Coordinate projection x ↦ x\[index\]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Identity {
    pub index: usize,
}

impl Identity {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl BasisFunction for Identity {
    fn evaluate(&self, x: ArrayView1<'_, f64>) -> f64 {
        x[self.index]
    }

    fn state_index(&self) -> Option<usize> {
        Some(self.index)
    }
}

/// Monomial x\[index\]^exponent
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Monomial {
    pub index: usize,
    pub exponent: i32,
}

impl Monomial {
    pub fn new(index: usize, exponent: i32) -> Self {
        Self { index, exponent }
    }
}

impl BasisFunction for Monomial {
    fn evaluate(&self, x: ArrayView1<'_, f64>) -> f64 {
        x[self.index].powi(self.exponent)
    }

    fn state_index(&self) -> Option<usize> {
        Some(self.index)
    }
}

/// Legendre polynomial of the given degree on x\[index\] / domain
///
/// Evaluated with Bonnet's recursion
/// (k+1) P_{k+1}(t) = (2k+1) t P_k(t) - k P_{k-1}(t).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Legendre {
    pub index: usize,
    pub degree: usize,
    pub domain: f64,
}

impl Legendre {
    pub fn new(index: usize, degree: usize, domain: f64) -> Self {
        Self {
            index,
            degree,
            domain,
        }
    }
}

impl BasisFunction for Legendre {
    fn evaluate(&self, x: ArrayView1<'_, f64>) -> f64 {
        let t = x[self.index] / self.domain;
        let (mut prev, mut curr) = (1.0, t);
        if self.degree == 0 {
            return prev;
        }
        for k in 1..self.degree {
            let k = k as f64;
            let next = ((2.0 * k + 1.0) * t * curr - k * prev) / (k + 1.0);
            prev = curr;
            curr = next;
        }
        curr
    }

    fn state_index(&self) -> Option<usize> {
        Some(self.index)
    }
}

/// sin(alpha · x\[index\])
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sin {
    pub index: usize,
    pub alpha: f64,
}

impl Sin {
    pub fn new(index: usize, alpha: f64) -> Self {
        Self { index, alpha }
    }
}

impl BasisFunction for Sin {
    fn evaluate(&self, x: ArrayView1<'_, f64>) -> f64 {
        (self.alpha * x[self.index]).sin()
    }

    fn state_index(&self) -> Option<usize> {
        Some(self.index)
    }
}

/// cos(alpha · x\[index\])
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cos {
    pub index: usize,
    pub alpha: f64,
}

impl Cos {
    pub fn new(index: usize, alpha: f64) -> Self {
        Self { index, alpha }
    }
}

impl BasisFunction for Cos {
    fn evaluate(&self, x: ArrayView1<'_, f64>) -> f64 {
        (self.alpha * x[self.index]).cos()
    }

    fn state_index(&self) -> Option<usize> {
        Some(self.index)
    }
}

/// Gaussian bump exp(-½ (x\[index\] - mean)² / variance)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gauss {
    pub index: usize,
    pub mean: f64,
    pub variance: f64,
}

impl Gauss {
    pub fn new(index: usize, mean: f64, variance: f64) -> Self {
        Self {
            index,
            mean,
            variance,
        }
    }
}

impl BasisFunction for Gauss {
    fn evaluate(&self, x: ArrayView1<'_, f64>) -> f64 {
        let d = x[self.index] - self.mean;
        (-0.5 * d * d / self.variance).exp()
    }

    fn state_index(&self) -> Option<usize> {
        Some(self.index)
    }
}

/// Periodic Gaussian exp(-½ sin²(½ (x\[index\] - mean)) / variance)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PeriodicGauss {
    pub index: usize,
    pub mean: f64,
    pub variance: f64,
}

impl PeriodicGauss {
    pub fn new(index: usize, mean: f64, variance: f64) -> Self {
        Self {
            index,
            mean,
            variance,
        }
    }
}

impl BasisFunction for PeriodicGauss {
    fn evaluate(&self, x: ArrayView1<'_, f64>) -> f64 {
        let s = (0.5 * (x[self.index] - self.mean)).sin();
        (-0.5 * s * s / self.variance).exp()
    }

    fn state_index(&self) -> Option<usize> {
        Some(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    #[test]
    fn test_constant_and_identity() {
        let x = array![0.5, -2.0];
        assert_eq!(Constant.evaluate(x.view()), 1.0);
        assert_eq!(Identity::new(1).evaluate(x.view()), -2.0);
        assert_eq!(Constant.state_index(), None);
        assert_eq!(Identity::new(1).state_index(), Some(1));
    }

    #[test]
    fn test_indicator_half_open() {
        let f = Indicator::new(0, 0.0, 1.0);
        assert_eq!(f.evaluate(array![0.0].view()), 1.0);
        assert_eq!(f.evaluate(array![0.999].view()), 1.0);
        assert_eq!(f.evaluate(array![1.0].view()), 0.0);
        assert_eq!(f.evaluate(array![-0.1].view()), 0.0);
    }

    #[test]
    fn test_monomial() {
        let x = array![3.0];
        assert_eq!(Monomial::new(0, 0).evaluate(x.view()), 1.0);
        assert_eq!(Monomial::new(0, 2).evaluate(x.view()), 9.0);
    }

    #[test]
    fn test_legendre_low_degrees() {
        let x = array![0.5];
        let p = |deg| Legendre::new(0, deg, 1.0).evaluate(x.view());
        assert!((p(0) - 1.0).abs() < 1e-14);
        assert!((p(1) - 0.5).abs() < 1e-14);
        // P2(t) = (3t² - 1) / 2
        assert!((p(2) - (-0.125)).abs() < 1e-14);
        // P3(t) = (5t³ - 3t) / 2
        assert!((p(3) - (-0.4375)).abs() < 1e-14);
    }

    #[test]
    fn test_legendre_scales_by_domain() {
        let f = Legendre::new(0, 1, 4.0);
        assert!((f.evaluate(array![2.0].view()) - 0.5).abs() < 1e-14);
    }

    #[test]
    fn test_trigonometric() {
        let x = array![std::f64::consts::FRAC_PI_2];
        assert!((Sin::new(0, 1.0).evaluate(x.view()) - 1.0).abs() < 1e-14);
        assert!(Cos::new(0, 1.0).evaluate(x.view()).abs() < 1e-14);
        assert!((Cos::new(0, 2.0).evaluate(x.view()) + 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_gaussians_peak_at_mean() {
        let g = Gauss::new(0, 1.0, 0.5);
        assert!((g.evaluate(array![1.0].view()) - 1.0).abs() < 1e-14);
        assert!((g.evaluate(array![2.0].view()) - (-1.0f64).exp()).abs() < 1e-14);

        let pg = PeriodicGauss::new(0, 0.0, 1.0);
        let two_pi = 2.0 * std::f64::consts::PI;
        assert!((pg.evaluate(array![two_pi].view()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_boxed_basis() {
        let basis: Basis = vec![Box::new(Constant), Box::new(Identity::new(0))];
        let x = array![4.0];
        let values: Vec<f64> = basis.iter().map(|f| f.evaluate(x.view())).collect();
        assert_eq!(values, vec![1.0, 4.0]);
    }
}
