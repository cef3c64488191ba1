//! Eigenvalues of general real square matrices.
//!
//! The matrix is first reduced to upper Hessenberg form by Householder
//! similarity transforms. The Francis implicit double-shift QR iteration
//! then deflates it to quasi-triangular (real Schur) form: 1x1 diagonal
//! blocks give real eigenvalues, 2x2 blocks give complex conjugate pairs.
//! Only eigenvalues are produced.

use log::{debug, warn};
use num_complex::Complex;

use crate::error::{LinalgError, Result, SolveStatus};
use crate::linalg::blas;
use crate::matrix::Matrix;
use crate::options::Options;

/// Eigenvalues of a general real matrix.
///
/// Conjugate pairs are adjacent, the one with positive imaginary part
/// first. Values appear in the order they deflate from the bottom of the
/// Schur form; no further sorting is applied.
#[derive(Debug, Clone)]
#[must_use]
pub struct GeneralEigenvalues {
    values: Vec<Complex<f64>>,
    iterations: usize,
    status: SolveStatus,
}

impl GeneralEigenvalues {
    /// Compute all eigenvalues of a square matrix.
    ///
    /// ```
    /// # use densolve_core::matrix;
    /// # use densolve_core::linalg::decomp::GeneralEigenvalues;
    /// // 90 degree rotation: eigenvalues are ±i
    /// let a = matrix![[0.0, -1.0], [1.0, 0.0]];
    /// let eig = GeneralEigenvalues::compute(&a).unwrap();
    /// let vals = eig.eigenvalues();
    /// assert!(vals[0].re.abs() < 1e-12);
    /// assert!((vals[0].im - 1.0).abs() < 1e-12);
    /// assert!((vals[1].im + 1.0).abs() < 1e-12);
    /// ```
    pub fn compute(a: &Matrix) -> Result<Self> {
        Self::compute_with(a, &Options::default())
    }

    /// [`compute`](Self::compute) with an explicit iteration budget.
    ///
    /// The QR iteration stops after
    /// `qr_iterations_per_eigenvalue * n` steps; the result then carries
    /// [`SolveStatus::DidNotConverge`] and the unreduced block contributes
    /// its diagonal entries as approximations.
    pub fn compute_with(a: &Matrix, opts: &Options) -> Result<Self> {
        if !a.is_square() {
            return Err(LinalgError::not_square("eigenvalues_general", a.rows(), a.cols()));
        }
        let n = a.rows();
        let mut h = a.as_slice().to_vec();
        hessenberg(&mut h, n);
        let budget = opts.qr_iterations_per_eigenvalue.saturating_mul(n);
        let (values, iterations, converged) = francis_qr(&mut h, n, budget);

        let status = if converged {
            debug!("eigenvalues_general: {n}x{n} converged after {iterations} QR steps");
            SolveStatus::Success
        } else {
            warn!("eigenvalues_general: {n}x{n} hit the {budget} step QR budget");
            SolveStatus::DidNotConverge
        };
        Ok(Self {
            values,
            iterations,
            status,
        })
    }

    /// Eigenvalues in deflation order, conjugate pairs adjacent.
    pub fn eigenvalues(&self) -> &[Complex<f64>] {
        &self.values
    }

    /// Consume the result and return the eigenvalues.
    pub fn into_vec(self) -> Vec<Complex<f64>> {
        self.values
    }

    /// `Success`, or `DidNotConverge` when the QR step budget ran out.
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Total Francis QR steps performed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether every eigenvalue has `|im| <= tol * max|λ|`.
    pub fn is_real(&self, tol: f64) -> bool {
        let scale = self.spectral_radius();
        self.values.iter().all(|z| z.im.abs() <= tol * scale)
    }

    /// Largest eigenvalue modulus; `0.0` for an empty matrix.
    pub fn spectral_radius(&self) -> f64 {
        self.values.iter().fold(0.0, |m, z| m.max(z.norm()))
    }
}

/// Reduce the row-major `n x n` buffer to upper Hessenberg form in place.
#[allow(clippy::needless_range_loop)]
fn hessenberg(h: &mut [f64], n: usize) {
    let mut buf = vec![0.0; n];
    for k in 0..n.saturating_sub(2) {
        let len = n - k - 1;
        let v = &mut buf[..len];
        for (i, vi) in v.iter_mut().enumerate() {
            *vi = h[(k + 1 + i) * n + k];
        }
        if v[1..].iter().all(|&x| x == 0.0) {
            continue;
        }
        // Reflect x onto alpha * e1 with the sign that avoids cancellation.
        let norm = blas::nrm2(v);
        let alpha = if v[0] > 0.0 { -norm } else { norm };
        v[0] -= alpha;
        let beta = 2.0 / blas::dot(v, v);

        for j in (k + 1)..n {
            let mut s = 0.0;
            for i in 0..len {
                s += v[i] * h[(k + 1 + i) * n + j];
            }
            s *= beta;
            for i in 0..len {
                h[(k + 1 + i) * n + j] -= s * v[i];
            }
        }
        for i in 0..n {
            let row = &mut h[i * n + k + 1..(i + 1) * n];
            let s = beta * blas::dot(row, v);
            blas::axpy(-s, v, row);
        }

        h[(k + 1) * n + k] = alpha;
        for i in (k + 2)..n {
            h[i * n + k] = 0.0;
        }
    }
}

/// Francis double-shift QR on an upper Hessenberg buffer.
///
/// Returns the eigenvalues, the number of QR steps taken and whether all
/// eigenvalues deflated within `max_iter` steps.
#[allow(
    clippy::many_single_char_names,
    clippy::needless_range_loop,
    clippy::too_many_lines
)]
fn francis_qr(h: &mut [f64], n: usize, max_iter: usize) -> (Vec<Complex<f64>>, usize, bool) {
    let eps = f64::EPSILON;
    let mut wr = vec![0.0; n];
    let mut wi = vec![0.0; n];

    // Scale used when both neighbouring diagonals vanish.
    let norm: f64 = (0..n)
        .map(|i| {
            h[i * n + i.saturating_sub(1)..(i + 1) * n]
                .iter()
                .map(|x| x.abs())
                .sum::<f64>()
        })
        .sum();

    let mut exshift = 0.0;
    let mut its = 0;
    let mut total = 0;
    let mut converged = true;
    // Rows 0..top are still active.
    let mut top = n;

    while top > 0 {
        let en = top - 1;

        // Find the lowest negligible subdiagonal entry at or above `en`.
        let mut l = en;
        while l > 0 {
            let mut s = h[(l - 1) * n + l - 1].abs() + h[l * n + l].abs();
            if s == 0.0 {
                s = norm;
            }
            if h[l * n + l - 1].abs() < eps * s {
                break;
            }
            l -= 1;
        }

        if l == en {
            wr[en] = h[en * n + en] + exshift;
            top -= 1;
            its = 0;
            continue;
        }

        if l + 1 == en {
            // 2x2 block: closed form.
            let w = h[en * n + en - 1] * h[(en - 1) * n + en];
            let p = 0.5 * (h[(en - 1) * n + en - 1] - h[en * n + en]);
            let q = p * p + w;
            let z = q.abs().sqrt();
            let x = h[en * n + en] + exshift;
            if q >= 0.0 {
                let z = if p >= 0.0 { p + z } else { p - z };
                wr[en - 1] = x + z;
                wr[en] = if z == 0.0 { x + z } else { x - w / z };
            } else {
                wr[en - 1] = x + p;
                wr[en] = x + p;
                wi[en - 1] = z;
                wi[en] = -z;
            }
            top -= 2;
            its = 0;
            continue;
        }

        if total >= max_iter {
            for i in 0..=en {
                wr[i] = h[i * n + i] + exshift;
            }
            converged = false;
            break;
        }

        let mut x = h[en * n + en];
        let mut y = h[(en - 1) * n + en - 1];
        let mut w = h[en * n + en - 1] * h[(en - 1) * n + en];

        // Exceptional shifts break cycles on matrices like permutations.
        if its == 10 {
            exshift += x;
            for i in 0..=en {
                h[i * n + i] -= x;
            }
            let s = h[en * n + en - 1].abs() + h[(en - 1) * n + en - 2].abs();
            x = 0.75 * s;
            y = x;
            w = -0.4375 * s * s;
        }
        if its == 30 {
            let mut s = 0.5 * (y - x);
            s = s * s + w;
            if s > 0.0 {
                s = s.sqrt();
                if y < x {
                    s = -s;
                }
                s = x - w / (0.5 * (y - x) + s);
                for i in 0..=en {
                    h[i * n + i] -= s;
                }
                exshift += s;
                x = 0.964;
                y = x;
                w = x;
            }
        }
        its += 1;
        total += 1;

        // Look for two consecutive small subdiagonal entries.
        let mut m = en - 2;
        let (mut p, mut q, mut r);
        loop {
            let z = h[m * n + m];
            let rr = x - z;
            let ss = y - z;
            p = (rr * ss - w) / h[(m + 1) * n + m] + h[m * n + m + 1];
            q = h[(m + 1) * n + m + 1] - z - rr - ss;
            r = h[(m + 2) * n + m + 1];
            let s = p.abs() + q.abs() + r.abs();
            p /= s;
            q /= s;
            r /= s;
            if m == l {
                break;
            }
            let lhs = h[m * n + m - 1].abs() * (q.abs() + r.abs());
            let rhs =
                eps * (p.abs() * (h[(m - 1) * n + m - 1].abs() + z.abs() + h[(m + 1) * n + m + 1].abs()));
            if lhs < rhs {
                break;
            }
            m -= 1;
        }

        for i in (m + 2)..=en {
            h[i * n + i - 2] = 0.0;
            if i > m + 2 {
                h[i * n + i - 3] = 0.0;
            }
        }

        // Chase the bulge from row m down to row en.
        for k in m..en {
            let notlast = k + 1 != en;
            let mut scale = 0.0;
            if k != m {
                p = h[k * n + k - 1];
                q = h[(k + 1) * n + k - 1];
                r = if notlast { h[(k + 2) * n + k - 1] } else { 0.0 };
                scale = p.abs() + q.abs() + r.abs();
                if scale == 0.0 {
                    continue;
                }
                p /= scale;
                q /= scale;
                r /= scale;
            }
            let mut s = (p * p + q * q + r * r).sqrt();
            if p < 0.0 {
                s = -s;
            }
            if s == 0.0 {
                continue;
            }
            if k != m {
                h[k * n + k - 1] = -s * scale;
            } else if l != m {
                h[k * n + k - 1] = -h[k * n + k - 1];
            }
            p += s;
            let vx = p / s;
            let vy = q / s;
            let vz = r / s;
            q /= p;
            r /= p;

            for j in k..n {
                let mut t = h[k * n + j] + q * h[(k + 1) * n + j];
                if notlast {
                    t += r * h[(k + 2) * n + j];
                    h[(k + 2) * n + j] -= t * vz;
                }
                h[k * n + j] -= t * vx;
                h[(k + 1) * n + j] -= t * vy;
            }
            for i in 0..=en.min(k + 3) {
                let mut t = vx * h[i * n + k] + vy * h[i * n + k + 1];
                if notlast {
                    t += vz * h[i * n + k + 2];
                    h[i * n + k + 2] -= t * r;
                }
                h[i * n + k] -= t;
                h[i * n + k + 1] -= t * q;
            }
        }
    }

    let values = wr.into_iter().zip(wi).map(|(re, im)| Complex::new(re, im)).collect();
    (values, total, converged)
}
