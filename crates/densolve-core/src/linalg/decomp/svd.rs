//! Singular Value Decomposition (SVD).
//!
//! Decomposes a matrix `A` (m x n) into `A = U S V^T` where:
//! - `U` is orthogonal (m x m)
//! - `S` is diagonal with non-negative entries (m x n)
//! - `V` is orthogonal (n x n)
//!
//! Implementation uses the one-sided Jacobi method: column pairs of a
//! working copy of `A` are rotated until mutually orthogonal, the
//! rotations accumulate into `V`, and the final column norms are the
//! singular values.

use log::{debug, warn};

use crate::error::{LinalgError, Result, SolveStatus};
use crate::linalg::blas;
use crate::linalg::decomp::QrDecomposition;
use crate::linalg::rotation::JacobiRotation;
use crate::matrix::Matrix;
use crate::options::Options;
use crate::vector::Vector;

/// Result of a Singular Value Decomposition.
#[derive(Debug, Clone)]
#[must_use]
pub struct SvdDecomposition {
    /// Left singular vectors (m x m).
    u: Vec<f64>,
    /// Singular values in descending order (length min(m,n)).
    s: Vec<f64>,
    /// Right singular vectors (n x n), stored untransposed.
    v: Vec<f64>,
    /// Number of rows.
    m: usize,
    /// Number of columns.
    n: usize,
    /// Relative cutoff used by [`solve`](SvdDecomposition::solve).
    tolerance: f64,
    sweeps: usize,
    status: SolveStatus,
}

/// Output of the one-sided Jacobi kernel on a tall matrix.
struct TallSvd {
    u: Vec<f64>,
    s: Vec<f64>,
    v: Vec<f64>,
    sweeps: usize,
    converged: bool,
}

impl SvdDecomposition {
    /// Compute the SVD of a matrix `A` (m x n).
    ///
    /// Returns `A = U diag(s) V^T`.
    ///
    /// ```
    /// # use densolve_core::matrix;
    /// # use densolve_core::linalg::decomp::SvdDecomposition;
    /// let a = matrix![[3.0, 0.0], [0.0, 4.0]];
    /// let svd = SvdDecomposition::decompose(&a).unwrap();
    /// let s = svd.singular_values();
    /// // Singular values of diag(3,4) are 4 and 3
    /// assert!((s[0] - 4.0).abs() < 1e-10);
    /// assert!((s[1] - 3.0).abs() < 1e-10);
    /// ```
    pub fn decompose(a: &Matrix) -> Result<Self> {
        Self::decompose_with(a, &Options::default())
    }

    /// [`decompose`](Self::decompose) with explicit tolerances and sweep cap.
    ///
    /// Hitting `max_sweeps` is reported through
    /// [`SolveStatus::DidNotConverge`], not as an error.
    pub fn decompose_with(a: &Matrix, opts: &Options) -> Result<Self> {
        let (m, n) = a.shape();

        let (tall, swapped) = if m >= n {
            (svd_tall(a.as_slice(), m, n, opts)?, false)
        } else {
            (svd_tall(a.transpose().as_slice(), n, m, opts)?, true)
        };
        let TallSvd {
            u,
            s,
            v,
            sweeps,
            converged,
        } = tall;
        // A^T = U' S V'^T  =>  A = V' S U'^T
        let (u, v) = if swapped { (v, u) } else { (u, v) };

        let status = if converged {
            debug!("svd: {m}x{n} converged after {sweeps} sweeps");
            SolveStatus::Success
        } else {
            warn!("svd: {m}x{n} did not converge after {sweeps} sweeps");
            SolveStatus::DidNotConverge
        };

        Ok(Self {
            u,
            s,
            v,
            m,
            n,
            tolerance: opts.tolerance,
            sweeps,
            status,
        })
    }

    /// The singular values in descending order.
    pub fn singular_values(&self) -> &[f64] {
        &self.s
    }

    /// The singular values as a [`Vector`].
    pub fn s(&self) -> Vector {
        Vector::from_slice(&self.s)
    }

    /// The left singular vectors `U` (m x m).
    pub fn u(&self) -> Matrix {
        Matrix::from_parts(self.m, self.m, self.u.clone())
    }

    /// The right singular vectors `V` (n x n).
    pub fn v(&self) -> Matrix {
        Matrix::from_parts(self.n, self.n, self.v.clone())
    }

    /// The right singular vectors transposed `V^T` (n x n).
    pub fn vt(&self) -> Matrix {
        self.v().transpose()
    }

    /// `Success`, or `DidNotConverge` when the sweep cap was hit.
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Jacobi sweeps that performed at least one rotation.
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// Number of singular values above `tol * sigma_max`.
    pub fn rank(&self, tol: f64) -> usize {
        let cutoff = tol * self.norm_2();
        self.s.iter().filter(|&&sv| sv > cutoff).count()
    }

    /// Spectral norm: the largest singular value (`0.0` when empty).
    pub fn norm_2(&self) -> f64 {
        self.s.first().copied().unwrap_or(0.0)
    }

    /// Compute the condition number (ratio of largest to smallest singular value).
    ///
    /// Infinite when the smallest singular value is exactly zero.
    pub fn condition_number(&self) -> f64 {
        let Some(&min_s) = self.s.last() else {
            return 0.0;
        };
        if min_s == 0.0 {
            return f64::INFINITY;
        }
        self.norm_2() / min_s
    }

    /// Moore-Penrose pseudo-inverse `V S^+ U^T` (n x m).
    ///
    /// Singular values at or below `tol * sigma_max` are treated as zero.
    pub fn pseudo_inverse(&self, tol: f64) -> Matrix {
        let (m, n) = (self.m, self.n);
        let cutoff = tol * self.norm_2();
        let mut pinv = Matrix::zeros(n, m);
        for (k, &sk) in self.s.iter().enumerate() {
            if sk <= cutoff {
                continue;
            }
            let inv = 1.0 / sk;
            for i in 0..n {
                let vik = self.v[i * n + k] * inv;
                if vik == 0.0 {
                    continue;
                }
                for j in 0..m {
                    pinv[(i, j)] += vik * self.u[j * m + k];
                }
            }
        }
        pinv
    }

    /// Minimum-norm least-squares solution `x = V S^+ U^T b`.
    ///
    /// Uses the tolerance the decomposition was computed with.
    pub fn solve(&self, b: &Vector) -> Result<Vector> {
        let (m, n) = (self.m, self.n);
        if b.len() != m {
            return Err(LinalgError::vector_len("svd solve", m, b.len()));
        }
        let cutoff = self.tolerance * self.norm_2();
        let mut x = vec![0.0; n];
        let mut col = vec![0.0; m];
        let mut vcol = vec![0.0; n];
        for (k, &sk) in self.s.iter().enumerate() {
            if sk <= cutoff {
                continue;
            }
            for (j, c) in col.iter_mut().enumerate() {
                *c = self.u[j * m + k];
            }
            let coeff = blas::dot(&col, b.as_slice()) / sk;
            for (i, vc) in vcol.iter_mut().enumerate() {
                *vc = self.v[i * n + k];
            }
            blas::axpy(coeff, &vcol, &mut x);
        }
        Ok(Vector::from_vec(x))
    }
}

/// One-sided Jacobi SVD for tall or square matrices (m >= n).
#[allow(clippy::many_single_char_names)]
fn svd_tall(a_data: &[f64], m: usize, n: usize, opts: &Options) -> Result<TallSvd> {
    // Working copy: columns of A that will converge to U * S, scaled so the
    // Gram entries below neither overflow nor underflow.
    let scale = blas::unit_scale(a_data.iter().fold(0.0, |acc: f64, x| acc.max(x.abs())));
    let mut work = a_data.to_vec();
    blas::scal(scale, &mut work);
    // V starts as identity
    let mut v = vec![0.0; n * n];
    for i in 0..n {
        v[i * n + i] = 1.0;
    }

    let mut sweeps = 0;
    let converged = 'sweep: loop {
        let mut rotated = false;
        for p in 0..n {
            for q in (p + 1)..n {
                // Gram matrix entries for columns p and q
                let mut alpha = 0.0;
                let mut beta = 0.0;
                let mut gamma = 0.0;
                for row in work.chunks_exact(n) {
                    alpha += row[p] * row[p];
                    beta += row[q] * row[q];
                    gamma += row[p] * row[q];
                }
                if gamma.abs() <= opts.convergence * (alpha * beta).sqrt() {
                    continue;
                }
                if sweeps == opts.max_sweeps {
                    break 'sweep false;
                }
                let Some(rot) = JacobiRotation::annihilating(alpha, beta, gamma) else {
                    continue;
                };
                rot.rotate_columns(&mut work, n, m, p, q);
                rot.rotate_columns(&mut v, n, n, p, q);
                rotated = true;
            }
        }
        if !rotated {
            break true;
        }
        sweeps += 1;
    };

    // Singular values are the column norms of the rotated matrix.
    let mut col = vec![0.0; m];
    let mut norms = vec![0.0; n];
    for (j, norm) in norms.iter_mut().enumerate() {
        for (i, c) in col.iter_mut().enumerate() {
            *c = work[i * n + j];
        }
        *norm = blas::nrm2(&col);
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| norms[b].total_cmp(&norms[a]));
    let sorted: Vec<f64> = indices.iter().map(|&j| norms[j]).collect();
    let cutoff = opts.tolerance * sorted.first().copied().unwrap_or(0.0);

    // Normalized columns for the retained singular values; they form a
    // prefix because `sorted` is descending.
    let retained = sorted.iter().take_while(|&&sv| sv > cutoff && sv > 0.0).count();
    let mut u_retained = Matrix::zeros(m, retained);
    for (new_j, &old_j) in indices.iter().take(retained).enumerate() {
        let inv = 1.0 / norms[old_j];
        for i in 0..m {
            u_retained[(i, new_j)] = work[i * n + old_j] * inv;
        }
    }

    // Complete U with the orthogonal complement of the retained columns.
    let q = QrDecomposition::decompose_with(&u_retained, opts)?.q();
    let mut u = vec![0.0; m * m];
    for i in 0..m {
        for j in 0..m {
            u[i * m + j] = if j < retained {
                u_retained[(i, j)]
            } else {
                q[(i, j)]
            };
        }
    }

    let mut v_sorted = vec![0.0; n * n];
    for (new_j, &old_j) in indices.iter().enumerate() {
        for i in 0..n {
            v_sorted[i * n + new_j] = v[i * n + old_j];
        }
    }

    Ok(TallSvd {
        u,
        s: sorted.into_iter().map(|sv| sv / scale).collect(),
        v: v_sorted,
        sweeps,
        converged,
    })
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::many_single_char_names)]
mod tests {
    use super::*;
    use crate::matrix;

    fn approx_eq(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| (x - y).abs() < tol)
    }

    fn reconstruct(svd: &SvdDecomposition, m: usize, n: usize) -> Matrix {
        let mut s_mat = Matrix::zeros(m, n);
        for (i, &sv) in svd.singular_values().iter().enumerate() {
            s_mat[(i, i)] = sv;
        }
        svd.u().matmul(&s_mat).unwrap().matmul(&svd.vt()).unwrap()
    }

    fn assert_orthogonal(q: &Matrix, tol: f64) {
        let qtq = q.transpose().matmul(q).unwrap();
        assert!(approx_eq(qtq.as_slice(), Matrix::eye(q.cols()).as_slice(), tol));
    }

    #[test]
    fn test_svd_diagonal() {
        let a = matrix![[3.0, 0.0], [0.0, 4.0]];
        let svd = SvdDecomposition::decompose(&a).unwrap();
        let s = svd.singular_values();
        assert!((s[0] - 4.0).abs() < 1e-10);
        assert!((s[1] - 3.0).abs() < 1e-10);
        assert_eq!(svd.sweeps(), 0);
    }

    #[test]
    fn test_svd_identity() {
        let svd = SvdDecomposition::decompose(&Matrix::eye(3)).unwrap();
        for &sv in svd.singular_values() {
            assert!((sv - 1.0).abs() < 1e-10);
        }
        assert!((svd.condition_number() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_svd_reconstruction() {
        let a = matrix![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 10.0]];
        let svd = SvdDecomposition::decompose(&a).unwrap();
        assert!(svd.status().is_success());
        assert!(approx_eq(reconstruct(&svd, 3, 3).as_slice(), a.as_slice(), 1e-10));
        assert_orthogonal(&svd.u(), 1e-10);
        assert_orthogonal(&svd.v(), 1e-10);
        let s = svd.singular_values();
        assert!(s.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_svd_tall_matrix() {
        let a = matrix![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let svd = SvdDecomposition::decompose(&a).unwrap();
        assert_eq!(svd.singular_values().len(), 2);
        assert!(approx_eq(reconstruct(&svd, 3, 2).as_slice(), a.as_slice(), 1e-10));
        assert_orthogonal(&svd.u(), 1e-10);
    }

    #[test]
    fn test_svd_wide_matrix() {
        let a = matrix![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let svd = SvdDecomposition::decompose(&a).unwrap();
        assert_eq!(svd.singular_values().len(), 2);
        assert_eq!(svd.u().shape(), (2, 2));
        assert_eq!(svd.v().shape(), (3, 3));
        assert!(approx_eq(reconstruct(&svd, 2, 3).as_slice(), a.as_slice(), 1e-10));
        assert_orthogonal(&svd.v(), 1e-10);
    }

    #[test]
    fn test_svd_rank_deficient_completes_u() {
        // Rank-1 matrix
        let a = matrix![[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [3.0, 6.0, 9.0]];
        let svd = SvdDecomposition::decompose(&a).unwrap();
        assert_eq!(svd.rank(1e-10), 1);
        assert!(svd.condition_number() > 1e10);
        // sigma_1 = ||a||_F for a rank-1 matrix
        assert!((svd.norm_2() - a.norm_frobenius()).abs() < 1e-10);
        assert_orthogonal(&svd.u(), 1e-10);
        assert!(approx_eq(reconstruct(&svd, 3, 3).as_slice(), a.as_slice(), 1e-9));
    }

    #[test]
    fn test_svd_zero_matrix() {
        let svd = SvdDecomposition::decompose(&Matrix::zeros(3, 2)).unwrap();
        assert_eq!(svd.singular_values(), &[0.0, 0.0]);
        assert_eq!(svd.rank(1e-10), 0);
        assert_eq!(svd.condition_number(), f64::INFINITY);
        assert_orthogonal(&svd.u(), 1e-12);
    }

    #[test]
    fn test_svd_pseudo_inverse() {
        let a = matrix![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let svd = SvdDecomposition::decompose(&a).unwrap();
        let pinv = svd.pseudo_inverse(1e-10);
        assert_eq!(pinv.shape(), (2, 3));
        // A^+ A = I for full column rank
        let prod = pinv.matmul(&a).unwrap();
        assert!(approx_eq(prod.as_slice(), Matrix::eye(2).as_slice(), 1e-10));
        // A A^+ A = A
        let aaa = a.matmul(&prod).unwrap();
        assert!(approx_eq(aaa.as_slice(), a.as_slice(), 1e-10));
    }

    #[test]
    fn test_svd_solve_minimum_norm() {
        // x1 + x2 = 2 has minimum-norm solution [1, 1].
        let a = matrix![[1.0, 1.0]];
        let svd = SvdDecomposition::decompose(&a).unwrap();
        let x = svd.solve(&Vector::from_vec(vec![2.0])).unwrap();
        assert!(approx_eq(x.as_slice(), &[1.0, 1.0], 1e-12));
        assert!(svd.solve(&Vector::zeros(2)).is_err());
    }

    #[test]
    fn test_svd_extreme_magnitudes() {
        // [[10,1],[1,10]] has singular values 11 and 9 at every scale.
        let base = matrix![[10.0, 1.0], [1.0, 10.0]];
        for sc in [1e200, 1e160, 1e-160, 1e-200] {
            let a = base.scale(sc);
            let svd = SvdDecomposition::decompose(&a).unwrap();
            assert!(svd.status().is_success());
            let s = svd.singular_values();
            assert!((s[0] / sc - 11.0).abs() < 1e-12, "scale {sc}: {s:?}");
            assert!((s[1] / sc - 9.0).abs() < 1e-12, "scale {sc}: {s:?}");
            let back = reconstruct(&svd, 2, 2).scale(1.0 / sc);
            assert!(approx_eq(back.as_slice(), base.as_slice(), 1e-10));
            assert_orthogonal(&svd.u(), 1e-12);
        }
    }

    #[test]
    fn test_svd_sweep_cap() {
        let a = matrix![[1.0, 2.0], [3.0, 4.0]];
        let opts = Options::default().with_max_sweeps(0);
        let svd = SvdDecomposition::decompose_with(&a, &opts).unwrap();
        assert_eq!(svd.status(), SolveStatus::DidNotConverge);
        assert_eq!(svd.sweeps(), 0);
    }

    #[test]
    fn test_svd_empty() {
        let svd = SvdDecomposition::decompose(&Matrix::zeros(0, 0)).unwrap();
        assert!(svd.singular_values().is_empty());
        assert_eq!(svd.norm_2(), 0.0);
        let svd = SvdDecomposition::decompose(&Matrix::zeros(2, 0)).unwrap();
        assert_eq!(svd.u().shape(), (2, 2));
    }
}
