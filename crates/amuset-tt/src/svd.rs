//! Thin singular value decomposition by one-sided Jacobi rotations
//!
//! The columns of a tall matrix are rotated pairwise until they are
//! mutually orthogonal. Column norms are then the singular values, the
//! normalized columns the left singular vectors and the accumulated
//! rotations the right singular vectors. The Gram matrix AᵀA is never
//! formed: small singular values keep their relative accuracy and the
//! singular vectors stay orthonormal when singular values repeat or vanish.
//!
//! Wide matrices are factorized through their transpose.

use crate::error::{TtError, TtResult};
use crate::tensor_train::TtScalar;
use scirs2_core::ndarray_ext::{s, Array1, Array2, ArrayView2};
use scirs2_core::numeric::NumCast;
use std::cmp::Ordering;

/// Upper bound on Jacobi sweeps over all column pairs
pub const JACOBI_MAX_SWEEPS: usize = 60;

/// Thin SVD A = U·diag(s)·Vᵀ with k = min(rows, cols) triplets
#[derive(Debug, Clone)]
pub struct ThinSvd<T> {
    /// rows × k, orthonormal columns
    pub u: Array2<T>,
    /// k singular values, descending
    pub s: Array1<T>,
    /// k × cols, orthonormal rows
    pub vt: Array2<T>,
}

impl<T: TtScalar> ThinSvd<T> {
    /// Number of singular triplets
    pub fn rank(&self) -> usize {
        self.s.len()
    }

    /// Keep the leading `rank` triplets
    pub fn truncate(self, rank: usize) -> Self {
        let rank = rank.min(self.s.len());
        Self {
            u: self.u.slice(s![.., ..rank]).to_owned(),
            s: self.s.slice(s![..rank]).to_owned(),
            vt: self.vt.slice(s![..rank, ..]).to_owned(),
        }
    }

    /// diag(s)·Vᵀ
    pub fn weighted_vt(&self) -> Array2<T> {
        let mut sv = self.vt.clone();
        for (mut row, &sigma) in sv.rows_mut().into_iter().zip(self.s.iter()) {
            row.mapv_inplace(|v| v * sigma);
        }
        sv
    }
}

/// Thin SVD of a dense matrix
///
/// # Errors
///
/// Returns error if the matrix is empty or has non-finite entries, or if
/// the rotations do not converge within [`JACOBI_MAX_SWEEPS`] sweeps.
///
/// # Examples
///
/// ```
/// use amuset_tt::thin_svd;
/// use scirs2_core::ndarray_ext::{array, Array2};
///
/// // repeated singular values
/// let rotation: Array2<f64> = array![[0.6, -0.8], [0.8, 0.6]];
/// let svd = thin_svd(&rotation.view())?;
/// assert!((svd.s[0] - 1.0).abs() < 1e-14);
/// assert!((svd.s[1] - 1.0).abs() < 1e-14);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn thin_svd<T: TtScalar>(matrix: &ArrayView2<'_, T>) -> TtResult<ThinSvd<T>> {
    let (rows, cols) = matrix.dim();
    if rows == 0 || cols == 0 {
        return Err(TtError::ShapeMismatch(format!(
            "cannot factorize an empty {}×{} matrix",
            rows, cols
        )));
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(TtError::Decomposition(
            "SVD input contains non-finite entries".into(),
        ));
    }

    if rows >= cols {
        let (u, s, v) = one_sided_jacobi(matrix.to_owned())?;
        Ok(ThinSvd {
            u,
            s,
            vt: v.reversed_axes(),
        })
    } else {
        let (u, s, v) = one_sided_jacobi(matrix.t().to_owned())?;
        Ok(ThinSvd {
            u: v,
            s,
            vt: u.reversed_axes(),
        })
    }
}

/// Hestenes iteration on a tall matrix: returns (U, s, V) with U rows × cols
fn one_sided_jacobi<T: TtScalar>(mut a: Array2<T>) -> TtResult<(Array2<T>, Array1<T>, Array2<T>)> {
    let (m, n) = a.dim();
    let mut v = Array2::<T>::eye(n);
    let rows: T = NumCast::from(m).unwrap_or_else(T::one);
    let tol = T::epsilon() * rows.sqrt();
    let two = T::one() + T::one();

    let mut converged = false;
    for sweep in 0..JACOBI_MAX_SWEEPS {
        let mut rotated = false;
        for p in 0..n.saturating_sub(1) {
            for q in p + 1..n {
                let (alpha, beta, gamma) = {
                    let cp = a.column(p);
                    let cq = a.column(q);
                    (cp.dot(&cp), cq.dot(&cq), cp.dot(&cq))
                };
                if alpha == T::zero()
                    || beta == T::zero()
                    || gamma.abs() <= tol * alpha.sqrt() * beta.sqrt()
                {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (two * gamma);
                let t = zeta.signum() / (zeta.abs() + (T::one() + zeta * zeta).sqrt());
                let c = T::one() / (T::one() + t * t).sqrt();
                let sn = c * t;
                rotate_columns(&mut a, p, q, c, sn);
                rotate_columns(&mut v, p, q, c, sn);
            }
        }
        if !rotated {
            log::trace!("jacobi svd: {}×{} converged after {} sweeps", m, n, sweep);
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(TtError::Decomposition(format!(
            "Jacobi SVD of a {}×{} matrix did not converge in {} sweeps",
            m, n, JACOBI_MAX_SWEEPS
        )));
    }

    let norms: Vec<T> = a.columns().into_iter().map(|c| c.dot(&c).sqrt()).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| norms[j].partial_cmp(&norms[i]).unwrap_or(Ordering::Equal));

    let mut u = Array2::<T>::zeros((m, n));
    let mut sigma = Array1::<T>::zeros(n);
    let mut v_sorted = Array2::<T>::zeros((n, n));
    for (new, &old) in order.iter().enumerate() {
        let norm = norms[old];
        sigma[new] = norm;
        v_sorted.column_mut(new).assign(&v.column(old));
        if norm > T::zero() {
            u.column_mut(new).assign(&a.column(old).mapv(|x| x / norm));
        } else {
            let completion = complement_vector(&u, new);
            u.column_mut(new).assign(&completion);
        }
    }

    Ok((u, sigma, v_sorted))
}

/// Apply the plane rotation (c, s) to columns p and q
fn rotate_columns<T: TtScalar>(matrix: &mut Array2<T>, p: usize, q: usize, c: T, sn: T) {
    for mut row in matrix.rows_mut() {
        let (xp, xq) = (row[p], row[q]);
        row[p] = c * xp - sn * xq;
        row[q] = sn * xp + c * xq;
    }
}

/// Unit vector orthogonal to the first `filled` columns of `u`
///
/// Projects unit vectors out of the span of the filled columns (twice, for
/// orthogonality to working precision) and keeps the first one with a
/// residual of norm² ≥ 1/2, or the largest residual seen.
fn complement_vector<T: TtScalar>(u: &Array2<T>, filled: usize) -> Array1<T> {
    let m = u.nrows();
    let basis = u.slice(s![.., ..filled]);
    let half = T::one() / (T::one() + T::one());

    let mut best = Array1::<T>::zeros(m);
    let mut best_norm_sq = -T::one();
    for e in 0..m {
        let mut w = Array1::<T>::zeros(m);
        w[e] = T::one();
        for _ in 0..2 {
            let coef = basis.t().dot(&w);
            w = w - basis.dot(&coef);
        }
        let norm_sq = w.dot(&w);
        if norm_sq > best_norm_sq {
            best_norm_sq = norm_sq;
            best = w;
        }
        if best_norm_sq >= half {
            break;
        }
    }

    let norm = best_norm_sq.sqrt();
    best.mapv(|x| x / norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    fn check_factorization(a: &Array2<f64>, svd: &ThinSvd<f64>) {
        let k = a.nrows().min(a.ncols());
        assert_eq!(svd.u.dim(), (a.nrows(), k));
        assert_eq!(svd.s.len(), k);
        assert_eq!(svd.vt.dim(), (k, a.ncols()));

        let rebuilt = svd.u.dot(&svd.weighted_vt());
        for (x, y) in rebuilt.iter().zip(a.iter()) {
            assert!((x - y).abs() < 1e-12, "reconstruction {} vs {}", x, y);
        }
        let utu = svd.u.t().dot(&svd.u);
        let vvt = svd.vt.dot(&svd.vt.t());
        for i in 0..k {
            for j in 0..k {
                let target = if i == j { 1.0 } else { 0.0 };
                assert!((utu[[i, j]] - target).abs() < 1e-12);
                assert!((vvt[[i, j]] - target).abs() < 1e-12);
            }
        }
        assert!(svd.s.windows(2).into_iter().all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_identity_keeps_orthonormal_factors() {
        let a = Array2::<f64>::eye(3);
        let svd = thin_svd(&a.view()).unwrap();
        check_factorization(&a, &svd);
        assert!(svd.s.iter().all(|&s| (s - 1.0).abs() < 1e-15));
    }

    #[test]
    fn test_rotation_has_unit_singular_values() {
        let a = array![[0.6, -0.8], [0.8, 0.6]];
        let svd = thin_svd(&a.view()).unwrap();
        check_factorization(&a, &svd);
    }

    #[test]
    fn test_rank_deficient_and_zero() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let svd = thin_svd(&a.view()).unwrap();
        check_factorization(&a, &svd);
        assert!((svd.s[0] - 5.0).abs() < 1e-12);
        assert!(svd.s[1].abs() < 1e-12);

        let zero = Array2::<f64>::zeros((3, 2));
        let svd = thin_svd(&zero.view()).unwrap();
        check_factorization(&zero, &svd);
        assert!(svd.s.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_tall_and_wide() {
        let tall = Array2::from_shape_fn((5, 3), |(i, j)| ((i * 3 + j) as f64 * 0.7).sin());
        let svd = thin_svd(&tall.view()).unwrap();
        check_factorization(&tall, &svd);

        let wide = tall.t().to_owned();
        let svd_wide = thin_svd(&wide.view()).unwrap();
        check_factorization(&wide, &svd_wide);
        for (a, b) in svd.s.iter().zip(svd_wide.s.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_truncate_and_rank() {
        let a: Array2<f64> = array![[3.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0]];
        let svd = thin_svd(&a.view()).unwrap().truncate(2);
        assert_eq!(svd.rank(), 2);
        assert_eq!(svd.u.dim(), (3, 2));
        assert_eq!(svd.vt.dim(), (2, 3));
        assert!((svd.s[0] - 3.0).abs() < 1e-14);
        assert!((svd.s[1] - 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_rejects_invalid_input() {
        let empty = Array2::<f64>::zeros((0, 2));
        assert!(matches!(thin_svd(&empty.view()), Err(TtError::ShapeMismatch(_))));

        let nan = array![[1.0, f64::NAN]];
        assert!(matches!(thin_svd(&nan.view()), Err(TtError::Decomposition(_))));
    }
}
