//! QR decomposition via Householder reflections.
//!
//! Decomposes any `m x n` matrix `A` into `A = QR` where:
//! - `Q` is an orthogonal matrix (m x m) such that `Q^T Q = I`
//! - `R` is upper trapezoidal (m x n)
//!
//! The column-pivoted variant computes `A Π = QR` with the diagonal of `R`
//! non-increasing in magnitude, which exposes the numerical rank.

use log::debug;

use crate::error::{LinalgError, Result, SolveStatus};
use crate::linalg::blas;
use crate::matrix::Matrix;
use crate::options::Options;
use crate::vector::Vector;

/// Result of a QR decomposition via Householder reflections.
///
/// Stores the factorization in compact form: the Householder vectors are
/// stored in the lower triangle of the working matrix, and `R` is stored
/// in the upper triangle.
#[derive(Debug, Clone)]
#[must_use]
pub struct QrDecomposition {
    /// Working matrix: upper triangle holds R, columns on and below the
    /// diagonal hold the Householder vectors. A zero diagonal entry marks
    /// a skipped (identity) reflection.
    qr: Vec<f64>,
    /// Diagonal of R stored separately (the Householder reflections
    /// overwrite the diagonal of the working matrix).
    r_diag: Vec<f64>,
    /// Column permutation: column `j` of `A Π` is column `perm[j]` of `A`.
    perm: Vec<usize>,
    m: usize,
    n: usize,
    /// Absolute threshold below which a diagonal of R counts as zero.
    thresh: f64,
}

#[allow(clippy::many_single_char_names)]
impl QrDecomposition {
    /// Perform QR decomposition on a matrix `A` (any shape).
    ///
    /// ```
    /// # use densolve_core::{matrix, Matrix};
    /// # use densolve_core::linalg::decomp::QrDecomposition;
    /// let a = matrix![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
    /// let qr = QrDecomposition::decompose(&a).unwrap();
    /// let q = qr.q();
    /// // Verify Q is orthogonal: Q^T Q ≈ I
    /// let qtq = q.transpose().matmul(&q).unwrap();
    /// for (a, b) in qtq.as_slice().iter().zip(Matrix::eye(3).as_slice()) {
    ///     assert!((a - b).abs() < 1e-10);
    /// }
    /// ```
    pub fn decompose(a: &Matrix) -> Result<Self> {
        Self::decompose_with(a, &Options::default())
    }

    /// [`decompose`](Self::decompose) with explicit tolerances.
    pub fn decompose_with(a: &Matrix, opts: &Options) -> Result<Self> {
        Ok(Self::factor(a, opts, false))
    }

    /// Column-pivoted QR: `A Π = QR`.
    ///
    /// Before each reflection the remaining column with the largest
    /// 2-norm (over the unreduced rows) is swapped into place.
    pub fn decompose_pivoted(a: &Matrix) -> Result<Self> {
        Self::decompose_pivoted_with(a, &Options::default())
    }

    /// [`decompose_pivoted`](Self::decompose_pivoted) with explicit tolerances.
    pub fn decompose_pivoted_with(a: &Matrix, opts: &Options) -> Result<Self> {
        Ok(Self::factor(a, opts, true))
    }

    fn factor(a: &Matrix, opts: &Options, pivoting: bool) -> Self {
        let (m, n) = a.shape();
        let kmax = m.min(n);
        let mut qr = a.as_slice().to_vec();
        let mut r_diag = vec![0.0; kmax];
        let mut perm: Vec<usize> = (0..n).collect();

        for k in 0..kmax {
            if pivoting {
                let mut best = k;
                let mut best_norm = column_norm(&qr, m, n, k, k);
                for j in (k + 1)..n {
                    let nj = column_norm(&qr, m, n, k, j);
                    if nj > best_norm {
                        best_norm = nj;
                        best = j;
                    }
                }
                if best != k {
                    for i in 0..m {
                        qr.swap(i * n + k, i * n + best);
                    }
                    perm.swap(k, best);
                }
            }

            // Compute the norm of the k-th column below the diagonal
            let mut norm = column_norm(&qr, m, n, k, k);
            if norm == 0.0 {
                // Nothing to annihilate; qr[k][k] is already 0 and marks
                // the reflection as the identity.
                r_diag[k] = 0.0;
                continue;
            }

            // Choose sign to avoid cancellation
            if qr[k * n + k] > 0.0 {
                norm = -norm;
            }

            // Scale the Householder vector
            for i in k..m {
                qr[i * n + k] /= -norm;
            }
            qr[k * n + k] += 1.0;

            // Apply the Householder reflection to remaining columns
            for j in (k + 1)..n {
                let mut s = 0.0;
                for i in k..m {
                    s += qr[i * n + k] * qr[i * n + j];
                }
                s = -s / qr[k * n + k];
                for i in k..m {
                    let v = qr[i * n + k];
                    qr[i * n + j] += s * v;
                }
            }

            r_diag[k] = norm;
        }

        let thresh = opts.threshold(a.norm_max());
        debug!("qr: {m}x{n} factorized (pivoting: {pivoting})");
        Self {
            qr,
            r_diag,
            perm,
            m,
            n,
            thresh,
        }
    }

    /// `(rows, cols)` of the factorized matrix.
    pub fn shape(&self) -> (usize, usize) {
        (self.m, self.n)
    }

    /// Whether the matrix has full column rank (requires `m >= n`).
    pub fn is_full_rank(&self) -> bool {
        self.m >= self.n && self.r_diag.iter().all(|d| d.abs() > self.thresh)
    }

    /// Always [`SolveStatus::Success`]: Householder QR exists for every
    /// shape and rank. Use [`is_full_rank`](Self::is_full_rank) or
    /// [`rank`](Self::rank) to decide whether [`solve`](Self::solve) is
    /// reliable.
    pub fn status(&self) -> SolveStatus {
        SolveStatus::Success
    }

    /// Number of diagonal entries with `|r_kk| > tol * |r_00|`.
    ///
    /// Meaningful for the pivoted factorization, where `|r_kk|` is
    /// non-increasing.
    pub fn rank(&self, tol: f64) -> usize {
        let Some(&r00) = self.r_diag.first() else {
            return 0;
        };
        if r00 == 0.0 {
            return 0;
        }
        let cutoff = tol * r00.abs();
        self.r_diag.iter().take_while(|d| d.abs() > cutoff).count()
    }

    /// The diagonal of `R`.
    pub fn r_diagonal(&self) -> &[f64] {
        &self.r_diag
    }

    /// The column permutation (identity for the unpivoted factorization).
    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    /// The permutation matrix `Π` (n x n) with `A Π = QR`.
    pub fn p(&self) -> Matrix {
        let n = self.n;
        let mut p = Matrix::zeros(n, n);
        for (j, &pj) in self.perm.iter().enumerate() {
            p[(pj, j)] = 1.0;
        }
        p
    }

    fn r_rows(&self, rows: usize) -> Matrix {
        let n = self.n;
        let kmax = self.r_diag.len();
        let mut r = Matrix::zeros(rows, n);
        for i in 0..kmax {
            r[(i, i)] = self.r_diag[i];
            for j in (i + 1)..n {
                r[(i, j)] = self.qr[i * n + j];
            }
        }
        r
    }

    /// Extract the upper trapezoidal matrix `R` (m x n).
    pub fn r(&self) -> Matrix {
        self.r_rows(self.m)
    }

    /// Extract the reduced `R` (min(m, n) x n).
    pub fn r_thin(&self) -> Matrix {
        self.r_rows(self.r_diag.len())
    }

    /// Apply `H_k = I - v v^T / v[k]` to column `col` of a row-major buffer.
    fn reflect(&self, k: usize, x: &mut [f64], stride: usize, col: usize) {
        let (m, n) = (self.m, self.n);
        let vk = self.qr[k * n + k];
        if vk == 0.0 {
            return;
        }
        let mut s = 0.0;
        for i in k..m {
            s += self.qr[i * n + k] * x[i * stride + col];
        }
        s = -s / vk;
        for i in k..m {
            x[i * stride + col] += s * self.qr[i * n + k];
        }
    }

    fn accumulate_q(&self, cols: usize) -> Matrix {
        let m = self.m;
        let mut q = Matrix::zeros(m, cols);
        for i in 0..cols.min(m) {
            q[(i, i)] = 1.0;
        }
        // Apply Householder reflections in reverse order
        let data = q.as_mut_slice();
        for k in (0..self.r_diag.len()).rev() {
            for j in 0..cols {
                self.reflect(k, data, cols, j);
            }
        }
        q
    }

    /// Extract the orthogonal matrix `Q` (m x m).
    pub fn q(&self) -> Matrix {
        self.accumulate_q(self.m)
    }

    /// Extract the "thin" Q matrix (m x min(m, n)).
    pub fn q_thin(&self) -> Matrix {
        self.accumulate_q(self.r_diag.len())
    }

    /// Overwrite `x` (length m) with `Q^T x`.
    pub(crate) fn apply_qt(&self, x: &mut [f64]) {
        for k in 0..self.r_diag.len() {
            self.reflect(k, x, 1, 0);
        }
    }

    /// Overwrite `x` (length m) with `Q x`.
    pub(crate) fn apply_q(&self, x: &mut [f64]) {
        for k in (0..self.r_diag.len()).rev() {
            self.reflect(k, x, 1, 0);
        }
    }

    /// Solve the least-squares problem `min ||Ax - b||_2`.
    ///
    /// For a full-rank system where `m == n`, this is equivalent to solving
    /// `Ax = b`. For overdetermined systems (`m > n`), it returns the
    /// least-squares solution. When [`status`](Self::status) reports a
    /// rank deficiency, unknowns whose `R` diagonal is negligible are set
    /// to zero (a basic solution, not the minimum-norm one).
    pub fn solve(&self, b: &Vector) -> Result<Vector> {
        if b.len() != self.m {
            return Err(LinalgError::vector_len("qr solve", self.m, b.len()));
        }
        let n = self.n;
        let kmax = self.r_diag.len();
        let mut y = b.as_slice().to_vec();
        self.apply_qt(&mut y);

        // Back substitution on the upper triangular part: Rz = Q^T b
        let mut z = vec![0.0; n];
        for i in (0..kmax).rev() {
            if self.r_diag[i].abs() <= self.thresh {
                continue;
            }
            let row = &self.qr[i * n + i + 1..(i + 1) * n];
            z[i] = (y[i] - blas::dot(row, &z[i + 1..])) / self.r_diag[i];
        }

        let mut x = vec![0.0; n];
        for (j, &pj) in self.perm.iter().enumerate() {
            x[pj] = z[j];
        }
        Ok(Vector::from_vec(x))
    }
}

/// Euclidean norm of column `j` over rows `k..m` of a row-major `m x n` buffer.
fn column_norm(qr: &[f64], m: usize, n: usize, k: usize, j: usize) -> f64 {
    let mut scale = 0.0_f64;
    let mut ssq = 1.0_f64;
    for i in k..m {
        let v = qr[i * n + j];
        if v != 0.0 {
            let a = v.abs();
            if scale < a {
                ssq = 1.0 + ssq * (scale / a) * (scale / a);
                scale = a;
            } else {
                ssq += (a / scale) * (a / scale);
            }
        }
    }
    scale * ssq.sqrt()
}
