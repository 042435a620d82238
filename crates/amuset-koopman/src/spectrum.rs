//! Dense eigen-solver for reduced matrices
//!
//! Reduced matrices are small (k × k with k the retained rank) but may be
//! non-normal, have complex-conjugate pairs or repeated eigenvalues.
//! Eigenvalues come from Francis double-shift QR iterations on the
//! Hessenberg form. Eigenvectors come from shifted inverse iteration on the
//! matrix itself, solved as a real 2k × 2k system, and every pair is
//! accepted only if its residual ‖Mw − λw‖ is small.

use crate::error::{KoopmanError, KoopmanResult};
use scirs2_core::ndarray_ext::{s, Array1, Array2, ArrayView2};
use scirs2_core::num_complex::Complex;
use scirs2_core::random::{Rng, SeedableRng, StdRng};
use scirs2_linalg::solve_multiple;

/// Upper bound on QR iterations spent on a single eigenvalue
pub const QR_MAX_ITERATIONS: usize = 60;

/// Inverse-iteration steps per eigenvector
pub const INVERSE_ITERATION_STEPS: usize = 10;

/// Largest accepted residual ‖Mw − λw‖ / ‖M‖_F of a unit eigenvector
pub const EIGENVECTOR_TOLERANCE: f64 = 1e-6;

/// Offset of the inverse-iteration shift from the computed eigenvalue
const SHIFT_OFFSET: f64 = 1e-8;

const CONVERGED_RESIDUAL: f64 = 1e-12;

/// Eigenvalues and unit eigenvectors of a real square matrix
#[derive(Debug, Clone)]
pub struct EigenPairs {
    pub values: Array1<Complex<f64>>,
    /// One unit eigenvector per column, largest component real and positive
    pub vectors: Array2<Complex<f64>>,
    /// Largest relative residual ‖Mw − λw‖ / ‖M‖_F over all pairs
    pub max_residual: f64,
}

/// Eigen-decomposition of a real square matrix
///
/// # Errors
///
/// Returns `KoopmanError::Linalg` if the matrix is empty, not square or not
/// finite, if the QR iteration does not converge, or if an eigenvector
/// fails the residual check.
///
/// # Examples
///
/// ```
/// use amuset_koopman::spectrum::eigenpairs;
/// use scirs2_core::ndarray_ext::array;
///
/// let rotation = array![[0.0, -0.9], [0.9, 0.0]];
/// let pairs = eigenpairs(&rotation.view())?;
/// assert!(pairs.values.iter().all(|l| (l.im.abs() - 0.9).abs() < 1e-12));
/// assert!(pairs.max_residual < 1e-10);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn eigenpairs(matrix: &ArrayView2<'_, f64>) -> KoopmanResult<EigenPairs> {
    let (n, cols) = matrix.dim();
    if n == 0 || n != cols {
        return Err(KoopmanError::Linalg(format!(
            "eigen-decomposition needs a non-empty square matrix, got {}×{}",
            n, cols
        )));
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(KoopmanError::Linalg(
            "eigen-decomposition input contains non-finite entries".into(),
        ));
    }

    let scale = matrix.iter().map(|v| v * v).sum::<f64>().sqrt();
    if scale == 0.0 {
        return Ok(EigenPairs {
            values: Array1::from_elem(n, Complex::new(0.0, 0.0)),
            vectors: Array2::<f64>::eye(n).mapv(|v| Complex::new(v, 0.0)),
            max_residual: 0.0,
        });
    }
    let scaled = matrix.mapv(|v| v / scale);

    let values = hqr(hessenberg(scaled.clone()))?;
    let mut vectors = Array2::zeros((n, n));
    let mut max_residual = 0.0_f64;
    for (j, &lambda) in values.iter().enumerate() {
        let (w, residual) = inverse_iteration(&scaled, lambda, j as u64)?;
        if residual > EIGENVECTOR_TOLERANCE {
            return Err(KoopmanError::Linalg(format!(
                "eigenvector for λ = {:.6} has relative residual {:.3e}",
                lambda * scale,
                residual
            )));
        }
        vectors.column_mut(j).assign(&w);
        max_residual = max_residual.max(residual);
    }
    log::trace!("eigenpairs: n = {}, max residual {:.3e}", n, max_residual);

    Ok(EigenPairs {
        values: values.iter().map(|&lambda| lambda * scale).collect(),
        vectors,
        max_residual,
    })
}

/// Householder reduction to upper Hessenberg form
fn hessenberg(mut h: Array2<f64>) -> Array2<f64> {
    let n = h.nrows();
    for k in 0..n.saturating_sub(2) {
        let x: Vec<f64> = (k + 1..n).map(|i| h[[i, k]]).collect();
        let mut alpha = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        if alpha == 0.0 {
            continue;
        }
        if x[0] > 0.0 {
            alpha = -alpha;
        }
        let mut v = x;
        v[0] -= alpha;
        let v_norm = v.iter().map(|t| t * t).sum::<f64>().sqrt();
        if v_norm == 0.0 {
            continue;
        }
        v.iter_mut().for_each(|t| *t /= v_norm);

        // H ← P·H·P, P = I − 2vvᵀ on rows and columns k+1..
        for j in 0..n {
            let d: f64 = v.iter().enumerate().map(|(i, vi)| vi * h[[k + 1 + i, j]]).sum();
            for (i, vi) in v.iter().enumerate() {
                h[[k + 1 + i, j]] -= 2.0 * vi * d;
            }
        }
        for i in 0..n {
            let d: f64 = v.iter().enumerate().map(|(j, vj)| h[[i, k + 1 + j]] * vj).sum();
            for (j, vj) in v.iter().enumerate() {
                h[[i, k + 1 + j]] -= 2.0 * d * vj;
            }
        }
        for i in k + 2..n {
            h[[i, k]] = 0.0;
        }
    }
    h
}

/// Eigenvalues of an upper Hessenberg matrix by Francis double-shift QR
///
/// Deflates one real eigenvalue or one 2 × 2 block at a time from the
/// bottom of the active window. Exceptional shifts are applied after 10
/// and 20 iterations without deflation.
fn hqr(mut a: Array2<f64>) -> KoopmanResult<Vec<Complex<f64>>> {
    let n = a.nrows();
    let eps = f64::EPSILON;
    let mut anorm = 0.0;
    for i in 0..n {
        for j in i.saturating_sub(1)..n {
            anorm += a[[i, j]].abs();
        }
    }

    let mut out = vec![Complex::new(0.0, 0.0); n];
    let mut remaining = n;
    let mut t = 0.0;
    let mut its = 0;
    while remaining > 0 {
        let nn = remaining - 1;

        // smallest l with a negligible subdiagonal a[l, l-1]
        let mut l = nn;
        while l > 0 {
            let mut s = a[[l - 1, l - 1]].abs() + a[[l, l]].abs();
            if s == 0.0 {
                s = anorm;
            }
            if a[[l, l - 1]].abs() <= eps * s {
                a[[l, l - 1]] = 0.0;
                break;
            }
            l -= 1;
        }

        let mut x = a[[nn, nn]];
        if l == nn {
            out[nn] = Complex::new(x + t, 0.0);
            remaining -= 1;
            its = 0;
            continue;
        }

        let mut y = a[[nn - 1, nn - 1]];
        let mut w = a[[nn, nn - 1]] * a[[nn - 1, nn]];
        if l + 1 == nn {
            let p = 0.5 * (y - x);
            let q = p * p + w;
            let mut z = q.abs().sqrt();
            x += t;
            if q >= 0.0 {
                z = p + z.copysign(p);
                out[nn - 1] = Complex::new(x + z, 0.0);
                out[nn] = Complex::new(if z != 0.0 { x - w / z } else { x + z }, 0.0);
            } else {
                out[nn] = Complex::new(x + p, -z);
                out[nn - 1] = Complex::new(x + p, z);
            }
            remaining -= 2;
            its = 0;
            continue;
        }

        if its == QR_MAX_ITERATIONS {
            return Err(KoopmanError::Linalg(format!(
                "QR iteration did not converge in {} steps",
                QR_MAX_ITERATIONS
            )));
        }
        if its == 10 || its == 20 {
            t += x;
            for i in 0..=nn {
                a[[i, i]] -= x;
            }
            let s = a[[nn, nn - 1]].abs() + a[[nn - 1, nn - 2]].abs();
            x = 0.75 * s;
            y = x;
            w = -0.4375 * s * s;
        }
        its += 1;

        // look for two consecutive small subdiagonals
        let mut p;
        let mut q;
        let mut r;
        let mut z;
        let mut m = nn - 2;
        loop {
            z = a[[m, m]];
            r = x - z;
            let s = y - z;
            p = (r * s - w) / a[[m + 1, m]] + a[[m, m + 1]];
            q = a[[m + 1, m + 1]] - z - r - s;
            r = a[[m + 2, m + 1]];
            let s = p.abs() + q.abs() + r.abs();
            p /= s;
            q /= s;
            r /= s;
            if m == l {
                break;
            }
            let u = a[[m, m - 1]].abs() * (q.abs() + r.abs());
            let v = p.abs() * (a[[m - 1, m - 1]].abs() + z.abs() + a[[m + 1, m + 1]].abs());
            if u <= eps * v {
                break;
            }
            m -= 1;
        }

        for i in m..nn - 1 {
            a[[i + 2, i]] = 0.0;
            if i != m {
                a[[i + 2, i - 1]] = 0.0;
            }
        }

        // double-shift QR step on rows l..=nn, columns m..=nn
        for k in m..nn {
            if k != m {
                p = a[[k, k - 1]];
                q = a[[k + 1, k - 1]];
                r = if k + 1 != nn { a[[k + 2, k - 1]] } else { 0.0 };
                x = p.abs() + q.abs() + r.abs();
                if x != 0.0 {
                    p /= x;
                    q /= x;
                    r /= x;
                }
            }
            let s = (p * p + q * q + r * r).sqrt().copysign(p);
            if s == 0.0 {
                continue;
            }
            if k == m {
                if l != m {
                    a[[k, k - 1]] = -a[[k, k - 1]];
                }
            } else {
                a[[k, k - 1]] = -s * x;
            }
            p += s;
            x = p / s;
            y = q / s;
            z = r / s;
            q /= p;
            r /= p;
            for j in k..=nn {
                let mut pj = a[[k, j]] + q * a[[k + 1, j]];
                if k + 1 != nn {
                    pj += r * a[[k + 2, j]];
                    a[[k + 2, j]] -= pj * z;
                }
                a[[k + 1, j]] -= pj * y;
                a[[k, j]] -= pj * x;
            }
            for i in l..=nn.min(k + 3) {
                let mut pi = x * a[[i, k]] + y * a[[i, k + 1]];
                if k + 1 != nn {
                    pi += z * a[[i, k + 2]];
                    a[[i, k + 2]] -= pi * r;
                }
                a[[i, k + 1]] -= pi * q;
                a[[i, k]] -= pi;
            }
        }
    }

    if out.iter().any(|lambda| !lambda.re.is_finite() || !lambda.im.is_finite()) {
        return Err(KoopmanError::Linalg("QR iteration produced non-finite eigenvalues".into()));
    }
    Ok(out)
}

/// Unit eigenvector of `scaled` for `lambda` by shifted inverse iteration
///
/// The complex system (M − μI)·(x + iy) = z is solved in real form
///
/// ```text
/// [ M − Re μ   Im μ     ] [x]   [z_re]
/// [ −Im μ      M − Re μ ] [y] = [z_im]
/// ```
///
/// from a start vector seeded by `seed`. Real eigenvalues start with a zero
/// imaginary part and so yield real eigenvectors.
fn inverse_iteration(
    scaled: &Array2<f64>,
    lambda: Complex<f64>,
    seed: u64,
) -> KoopmanResult<(Array1<Complex<f64>>, f64)> {
    let n = scaled.nrows();
    let shift = lambda.re + SHIFT_OFFSET;
    let b = lambda.im;

    let mut block = Array2::<f64>::zeros((2 * n, 2 * n));
    for i in 0..n {
        for k in 0..n {
            let diagonal = if i == k { shift } else { 0.0 };
            block[[i, k]] = scaled[[i, k]] - diagonal;
            block[[n + i, n + k]] = scaled[[i, k]] - diagonal;
        }
        block[[i, n + i]] = b;
        block[[n + i, i]] = -b;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut z = Array2::from_shape_fn((2 * n, 1), |(i, _)| {
        if i < n || b != 0.0 {
            rng.random::<f64>() - 0.5
        } else {
            0.0
        }
    });

    let mut residual = f64::INFINITY;
    for _ in 0..INVERSE_ITERATION_STEPS {
        z = solve_multiple(&block.view(), &z.view(), None).map_err(|e| {
            KoopmanError::Linalg(format!("inverse iteration for λ = {:.6} failed: {}", lambda, e))
        })?;
        let norm = z.iter().map(|v| v * v).sum::<f64>().sqrt();
        if !norm.is_finite() || norm == 0.0 {
            return Err(KoopmanError::Linalg(format!(
                "inverse iteration for λ = {:.6} lost its iterate",
                lambda
            )));
        }
        z.mapv_inplace(|v| v / norm);

        residual = pair_residual(scaled, lambda, &z);
        if residual <= CONVERGED_RESIDUAL {
            break;
        }
    }

    let mut w: Array1<Complex<f64>> = (0..n).map(|i| Complex::new(z[[i, 0]], z[[n + i, 0]])).collect();
    let pivot = w
        .iter()
        .copied()
        .fold(Complex::new(0.0, 0.0), |best, c| if c.norm() > best.norm() { c } else { best });
    let phase = pivot.conj() / pivot.norm();
    w.mapv_inplace(|c| c * phase);

    Ok((w, residual))
}

/// ‖M(x + iy) − λ(x + iy)‖ for the stacked iterate z = [x; y]
fn pair_residual(scaled: &Array2<f64>, lambda: Complex<f64>, z: &Array2<f64>) -> f64 {
    let n = scaled.nrows();
    let x = z.slice(s![..n, 0]);
    let y = z.slice(s![n.., 0]);
    let mx: Array1<f64> = scaled.dot(&x);
    let my: Array1<f64> = scaled.dot(&y);
    (0..n)
        .map(|i| {
            let re = mx[i] - (lambda.re * x[i] - lambda.im * y[i]);
            let im = my[i] - (lambda.re * y[i] + lambda.im * x[i]);
            re * re + im * im
        })
        .sum::<f64>()
        .sqrt()
}
