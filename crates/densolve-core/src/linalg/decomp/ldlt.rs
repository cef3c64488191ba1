//! LDLᵀ decomposition for symmetric (possibly indefinite) matrices.
//!
//! Computes `Pᵀ A P = L D Lᵀ` with `L` unit lower triangular, `D`
//! diagonal and `P` a symmetric permutation chosen by diagonal pivoting:
//! at each step the remaining diagonal entry of largest magnitude is moved
//! to the front. Only 1x1 pivots are used, so a symmetric matrix whose
//! remaining diagonal vanishes (e.g. `[[0, 1], [1, 0]]`) is reported as
//! [`SolveStatus::SingularOrIllConditioned`] even when it is invertible.

use log::{debug, warn};

use crate::error::{LinalgError, Result, SolveStatus};
use crate::linalg::blas;
use crate::matrix::Matrix;
use crate::options::Options;
use crate::vector::Vector;

/// Result of an LDLᵀ decomposition with symmetric diagonal pivoting.
#[derive(Debug, Clone)]
#[must_use]
pub struct LdltDecomposition {
    /// Strict lower triangle holds `L` (unit diagonal implicit).
    l_data: Vec<f64>,
    d: Vec<f64>,
    /// `(Pᵀ A P)[i][j] = A[perm[i]][perm[j]]`.
    perm: Vec<usize>,
    n: usize,
    thresh: f64,
    status: SolveStatus,
}

/// Sign counts of the pivots in `D`.
///
/// By Sylvester's law of inertia these are the numbers of positive,
/// negative and zero eigenvalues of `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inertia {
    pub positive: usize,
    pub negative: usize,
    pub zero: usize,
}

impl LdltDecomposition {
    /// Factorize a symmetric matrix.
    ///
    /// ```
    /// # use densolve_core::{matrix, Vector};
    /// # use densolve_core::linalg::decomp::LdltDecomposition;
    /// // Indefinite: Cholesky would fail here.
    /// let a = matrix![[1.0, 2.0], [2.0, 1.0]];
    /// let ldlt = LdltDecomposition::decompose(&a).unwrap();
    /// let x = ldlt.solve(&Vector::from_vec(vec![3.0, 3.0])).unwrap();
    /// assert!((x[0] - 1.0).abs() < 1e-12 && (x[1] - 1.0).abs() < 1e-12);
    /// ```
    pub fn decompose(a: &Matrix) -> Result<Self> {
        Self::decompose_with(a, &Options::default())
    }

    /// [`decompose`](Self::decompose) with explicit tolerances.
    pub fn decompose_with(a: &Matrix, opts: &Options) -> Result<Self> {
        if !a.is_square() {
            return Err(LinalgError::not_square("ldlt", a.rows(), a.cols()));
        }
        if !a.is_symmetric(opts.tolerance) {
            return Err(LinalgError::NotSymmetric);
        }
        let n = a.rows();
        let thresh = opts.threshold(a.norm_max());
        // Full symmetric working copy; columns < k of the lower triangle
        // hold L, the trailing block holds the Schur complement.
        let mut s = a.as_slice().to_vec();
        let mut d = vec![0.0; n];
        let mut perm: Vec<usize> = (0..n).collect();
        let mut status = SolveStatus::Success;

        for k in 0..n {
            let mut p = k;
            let mut best = s[k * n + k].abs();
            for j in (k + 1)..n {
                let v = s[j * n + j].abs();
                if v > best {
                    best = v;
                    p = j;
                }
            }
            if p != k {
                for c in 0..n {
                    s.swap(k * n + c, p * n + c);
                }
                for r in 0..n {
                    s.swap(r * n + k, r * n + p);
                }
                perm.swap(k, p);
            }

            let dk = s[k * n + k];
            d[k] = dk;
            if dk.abs() <= thresh || !dk.is_finite() {
                if status.is_success() {
                    warn!("ldlt: pivot {k} is {dk:e}, threshold {thresh:e}");
                }
                status = SolveStatus::SingularOrIllConditioned;
            }
            if dk == 0.0 {
                for i in (k + 1)..n {
                    s[i * n + k] = 0.0;
                }
                continue;
            }

            for i in (k + 1)..n {
                s[i * n + k] /= dk;
            }
            for i in (k + 1)..n {
                let lik = s[i * n + k];
                if lik == 0.0 {
                    continue;
                }
                for j in (k + 1)..=i {
                    let v = s[i * n + j] - lik * dk * s[j * n + k];
                    s[i * n + j] = v;
                    s[j * n + i] = v;
                }
            }
        }

        // Clear everything outside the strict lower triangle.
        for i in 0..n {
            for j in i..n {
                s[i * n + j] = 0.0;
            }
        }
        debug!("ldlt: {n}x{n} factorized, status {status}");
        Ok(Self {
            l_data: s,
            d,
            perm,
            n,
            thresh,
            status,
        })
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Unit lower triangular factor `L`.
    pub fn l(&self) -> Matrix {
        let mut l = Matrix::from_parts(self.n, self.n, self.l_data.clone());
        for i in 0..self.n {
            l[(i, i)] = 1.0;
        }
        l
    }

    /// Diagonal of `D`.
    pub fn d(&self) -> Vector {
        Vector::from_slice(&self.d)
    }

    /// Symmetric permutation: `(Pᵀ A P)[i][j] = A[perm[i]][perm[j]]`.
    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    /// Permutation matrix `P` with `Pᵀ A P = L D Lᵀ`.
    pub fn p(&self) -> Matrix {
        let n = self.n;
        let mut p = Matrix::zeros(n, n);
        for (j, &pj) in self.perm.iter().enumerate() {
            p[(pj, j)] = 1.0;
        }
        p
    }

    /// `det(A) = prod(D)`; the symmetric permutation does not change it.
    pub fn det(&self) -> f64 {
        self.d.iter().product()
    }

    /// Sign counts of `D`, treating pivots within the tolerance as zero.
    pub fn inertia(&self) -> Inertia {
        let mut out = Inertia {
            positive: 0,
            negative: 0,
            zero: 0,
        };
        for &dk in &self.d {
            if dk.abs() <= self.thresh {
                out.zero += 1;
            } else if dk > 0.0 {
                out.positive += 1;
            } else {
                out.negative += 1;
            }
        }
        out
    }

    /// Solve `Ax = b`.
    ///
    /// Components belonging to zero pivots are set to zero, so a flagged
    /// factorization still yields a finite vector.
    pub fn solve(&self, b: &Vector) -> Result<Vector> {
        let n = self.n;
        if b.len() != n {
            return Err(LinalgError::vector_len("ldlt solve", n, b.len()));
        }
        let mut y: Vec<f64> = self.perm.iter().map(|&pi| b[pi]).collect();
        blas::solve_lower(&self.l_data, n, n, true, &mut y);
        for (yi, &di) in y.iter_mut().zip(&self.d) {
            *yi = if di == 0.0 { 0.0 } else { *yi / di };
        }
        blas::solve_lower_transpose(&self.l_data, n, n, true, &mut y);
        let mut x = vec![0.0; n];
        for (i, &pi) in self.perm.iter().enumerate() {
            x[pi] = y[i];
        }
        Ok(Vector::from_vec(x))
    }
}
