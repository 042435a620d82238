//! Maximum-volume row selection
//!
//! Given a tall matrix A (n × r, n ≥ r) find r rows whose square submatrix
//! has (locally) maximal volume |det A\[P, :\]|. Rows of such a submatrix are
//! good interpolation points: every row of A is a combination of the
//! selected rows with coefficients bounded by 1 + tolerance.
//!
//! The start is a greedy pivoted Gram-Schmidt on the rows, followed by swap
//! iterations that replace a pivot row whenever some coefficient exceeds the
//! bound.

use crate::error::{BasisError, BasisResult};
use scirs2_core::ndarray_ext::{Array2, ArrayView2, Axis};
use scirs2_linalg::solve_multiple;

/// Volume growth required for a swap
pub const MAXVOL_TOLERANCE: f64 = 1e-2;

/// Upper bound on swap iterations
pub const MAXVOL_MAX_ITERATIONS: usize = 100;

/// Select r row indices of the n × r matrix `a` spanning a dominant submatrix
///
/// # Errors
///
/// Returns error if `a` has no columns, fewer rows than columns, or if the
/// selected submatrix is singular.
///
/// # Complexity
///
/// O(n·r²) per swap iteration.
pub fn maxvol(a: &ArrayView2<'_, f64>) -> BasisResult<Vec<usize>> {
    let (n, r) = a.dim();
    if r == 0 || n < r {
        return Err(BasisError::Decomposition(format!(
            "maxvol needs a tall matrix with at least one column, got {}×{}",
            n, r
        )));
    }

    let mut pivots = greedy_pivots(a);

    for iteration in 0..MAXVOL_MAX_ITERATIONS {
        let coefficients = interpolation_matrix(a, &pivots)?;

        let ((row, col), value) = coefficients
            .indexed_iter()
            .map(|(idx, v)| (idx, v.abs()))
            .fold(((0, 0), 0.0), |best, cand| if cand.1 > best.1 { cand } else { best });

        if value <= 1.0 + MAXVOL_TOLERANCE {
            log::trace!("maxvol converged after {} swaps", iteration);
            break;
        }
        pivots[col] = row;
    }

    Ok(pivots)
}

/// Row selection by pivoted Gram-Schmidt: repeatedly take the row with the
/// largest residual norm and project it out of the remaining rows
fn greedy_pivots(a: &ArrayView2<'_, f64>) -> Vec<usize> {
    let (n, r) = a.dim();
    let mut residual = a.to_owned();
    let mut used = vec![false; n];
    let mut pivots = Vec::with_capacity(r);

    for _ in 0..r {
        let (best, norm_sq) = (0..n)
            .filter(|&i| !used[i])
            .map(|i| (i, residual.row(i).dot(&residual.row(i))))
            .fold((usize::MAX, -1.0), |acc, cand| if cand.1 > acc.1 { cand } else { acc });

        // n >= r guarantees a free row
        used[best] = true;
        pivots.push(best);
        if norm_sq <= 0.0 {
            continue;
        }

        let pivot_row = residual.row(best).to_owned();
        for i in 0..n {
            if used[i] {
                continue;
            }
            let coef = residual.row(i).dot(&pivot_row) / norm_sq;
            residual.row_mut(i).scaled_add(-coef, &pivot_row);
        }
    }

    pivots
}

/// Interpolation matrix A·A\[P, :\]⁻¹ of the rows `pivots`
///
/// Every row of `a` is expressed in the selected rows; the rows of the
/// result at `pivots` form the identity. Solved by LU on the transposed
/// system A\[P, :\]ᵀ·Xᵀ = Aᵀ after scaling the submatrix to unit maximum.
///
/// # Errors
///
/// Returns error if `pivots` does not select a square submatrix, if `a` has
/// non-finite entries or if the submatrix is singular.
pub fn interpolation_matrix(a: &ArrayView2<'_, f64>, pivots: &[usize]) -> BasisResult<Array2<f64>> {
    let (n, r) = a.dim();
    if pivots.len() != r || pivots.iter().any(|&p| p >= n) {
        return Err(BasisError::Decomposition(format!(
            "{} pivots do not select a square submatrix of a {}×{} matrix",
            pivots.len(),
            n,
            r
        )));
    }
    if a.iter().any(|v| !v.is_finite()) {
        return Err(BasisError::Decomposition(
            "interpolation basis contains non-finite entries".into(),
        ));
    }

    let sub = a.select(Axis(0), pivots);
    let scale = sub.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 {
        return Err(BasisError::Decomposition(
            "selected submatrix is zero".into(),
        ));
    }
    let sub_t = sub.t().mapv(|v| v / scale);
    let a_t = a.t().mapv(|v| v / scale);

    let x_t = solve_multiple(&sub_t.view(), &a_t.view(), None).map_err(|e| {
        BasisError::Decomposition(format!("selected submatrix is singular: {}", e))
    })?;
    let result = x_t.reversed_axes();
    if result.iter().any(|v| !v.is_finite()) {
        return Err(BasisError::Decomposition(
            "interpolation matrix has non-finite entries".into(),
        ));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    fn volume(a: &Array2<f64>, pivots: &[usize]) -> f64 {
        // 2×2 determinant
        let s = a.select(Axis(0), pivots);
        (s[[0, 0]] * s[[1, 1]] - s[[0, 1]] * s[[1, 0]]).abs()
    }

    #[test]
    fn test_maxvol_square_selects_all_rows() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let mut pivots = maxvol(&a.view()).unwrap();
        pivots.sort_unstable();
        assert_eq!(pivots, vec![0, 1]);
    }

    #[test]
    fn test_maxvol_finds_dominant_rows() {
        let a = array![
            [0.1, 0.0],
            [0.0, 0.2],
            [5.0, 0.1],
            [0.2, 4.0],
            [1.0, 1.0],
        ];
        let mut pivots = maxvol(&a.view()).unwrap();
        pivots.sort_unstable();
        assert_eq!(pivots, vec![2, 3]);

        // coefficients are bounded after convergence
        let b = interpolation_matrix(&a.view(), &pivots).unwrap();
        assert!(b.iter().all(|v| v.abs() <= 1.0 + MAXVOL_TOLERANCE + 1e-12));
        assert!(volume(&a, &pivots) > volume(&a, &[0, 1]));
    }

    #[test]
    fn test_maxvol_single_column() {
        let a = array![[1.0], [-7.0], [3.0]];
        assert_eq!(maxvol(&a.view()).unwrap(), vec![1]);
    }

    #[test]
    fn test_maxvol_rejects_wide_matrix() {
        let a = array![[1.0, 2.0, 3.0]];
        assert!(matches!(maxvol(&a.view()), Err(BasisError::Decomposition(_))));
    }

    #[test]
    fn test_interpolation_reproduces_pivot_rows() {
        let a = array![[4.0, 7.0], [2.0, 6.0], [1.0, -1.0]];
        let b = interpolation_matrix(&a.view(), &[0, 1]).unwrap();

        assert_eq!(b.dim(), (3, 2));
        for (x, y) in b.dot(&a.select(Axis(0), &[0, 1])).iter().zip(a.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
        assert!((b[[0, 0]] - 1.0).abs() < 1e-12 && b[[0, 1]].abs() < 1e-12);
        assert!(b[[1, 0]].abs() < 1e-12 && (b[[1, 1]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_interpolation_with_orthogonal_block() {
        // equal singular values in the selected block
        let a = array![[1.0, 0.0], [0.0, 1.0], [0.3, -0.5]];
        let b = interpolation_matrix(&a.view(), &[0, 1]).unwrap();
        for (x, y) in b.iter().zip(a.iter()) {
            assert!((x - y).abs() < 1e-14);
        }

        let rotation = array![[0.6, -0.8], [0.8, 0.6]];
        let b = interpolation_matrix(&rotation.view(), &[1, 0]).unwrap();
        let expected = array![[0.0, 1.0], [1.0, 0.0]];
        for (x, y) in b.iter().zip(expected.iter()) {
            assert!((x - y).abs() < 1e-14);
        }
    }

    #[test]
    fn test_interpolation_rejects_singular_and_non_finite() {
        let a = array![[1.0, 2.0], [2.0, 4.0], [0.0, 1.0]];
        assert!(matches!(
            interpolation_matrix(&a.view(), &[0, 1]),
            Err(BasisError::Decomposition(_))
        ));

        let nan = array![[1.0, 0.0], [0.0, f64::NAN]];
        assert!(matches!(
            interpolation_matrix(&nan.view(), &[0, 1]),
            Err(BasisError::Decomposition(_))
        ));

        assert!(matches!(
            interpolation_matrix(&a.view(), &[0]),
            Err(BasisError::Decomposition(_))
        ));
    }
}
