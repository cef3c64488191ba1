//! LU decomposition with partial pivoting.
//!
//! Decomposes a square matrix `A` into `PA = LU` where:
//! - `P` is a permutation matrix (stored as a row index vector)
//! - `L` is lower triangular with unit diagonal
//! - `U` is upper triangular
//!
//! A pivot whose magnitude falls below `tolerance * norm_max(A)` does not
//! abort the factorization: the result is returned with status
//! [`SolveStatus::SingularOrIllConditioned`] so callers can still inspect
//! `L` and `U`.

use log::{debug, warn};

use crate::error::{LinalgError, Result, SolveStatus};
use crate::linalg::blas;
use crate::matrix::Matrix;
use crate::options::Options;
use crate::vector::Vector;

/// Result of an LU decomposition with partial pivoting.
///
/// Stores the factorization `PA = LU` in compact form: `L` and `U` are
/// packed into a single matrix (the unit diagonal of `L` is implicit),
/// and the permutation is stored as a row index vector.
#[derive(Debug, Clone)]
#[must_use]
pub struct LuDecomposition {
    /// Packed LU matrix: lower triangle holds L (without diagonal),
    /// upper triangle (including diagonal) holds U.
    lu: Vec<f64>,
    /// `perm[i]` is the row of `A` that ended up in row `i` of `PA`.
    perm: Vec<usize>,
    /// Matrix dimension (n x n).
    n: usize,
    /// Sign of the permutation (+1 or -1), for determinant computation.
    sign: f64,
    status: SolveStatus,
}

impl LuDecomposition {
    /// Perform LU decomposition with partial pivoting on a square matrix.
    ///
    /// ```
    /// # use densolve_core::matrix;
    /// # use densolve_core::linalg::decomp::LuDecomposition;
    /// let a = matrix![[2.0, 1.0], [1.0, 4.0]];
    /// let lu = LuDecomposition::decompose(&a).unwrap();
    /// assert!((lu.det() - 7.0).abs() < 1e-10);
    /// assert!(lu.status().is_success());
    /// ```
    pub fn decompose(a: &Matrix) -> Result<Self> {
        Self::decompose_with(a, &Options::default())
    }

    /// [`decompose`](Self::decompose) with explicit tolerances.
    pub fn decompose_with(a: &Matrix, opts: &Options) -> Result<Self> {
        if !a.is_square() {
            return Err(LinalgError::not_square("lu", a.rows(), a.cols()));
        }
        let n = a.rows();
        let thresh = opts.threshold(a.norm_max());

        let mut lu = a.as_slice().to_vec();
        let mut perm: Vec<usize> = (0..n).collect();
        let mut sign = 1.0;
        let mut status = SolveStatus::Success;

        for k in 0..n {
            // Find pivot: first row with the largest |lu[i, k]| for i >= k
            let mut max_val = lu[k * n + k].abs();
            let mut max_row = k;
            for i in (k + 1)..n {
                let val = lu[i * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_row != k {
                let (head, tail) = lu.split_at_mut(max_row * n);
                head[k * n..(k + 1) * n].swap_with_slice(&mut tail[..n]);
                perm.swap(k, max_row);
                sign = -sign;
            }

            let pivot = lu[k * n + k];
            if pivot.abs() <= thresh || !pivot.is_finite() {
                if status.is_success() {
                    warn!("lu: pivot {k} is {pivot:e}, threshold {thresh:e}; matrix is singular or ill-conditioned");
                }
                status = SolveStatus::SingularOrIllConditioned;
            }
            if pivot == 0.0 {
                // Whole column below is zero too; nothing to eliminate.
                continue;
            }

            // Eliminate below the pivot
            for i in (k + 1)..n {
                let factor = lu[i * n + k] / pivot;
                lu[i * n + k] = factor;
                if factor == 0.0 {
                    continue;
                }
                let (upper, lower) = lu.split_at_mut(i * n);
                let u_row = &upper[k * n + k + 1..(k + 1) * n];
                blas::axpy(-factor, u_row, &mut lower[k + 1..n]);
            }
        }

        debug!("lu: {n}x{n} factorized, status {status}");
        Ok(Self {
            lu,
            perm,
            n,
            sign,
            status,
        })
    }

    /// [`SolveStatus::Success`], or [`SolveStatus::SingularOrIllConditioned`]
    /// when some pivot fell below the tolerance.
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Whether a pivot fell below the tolerance.
    pub fn is_singular(&self) -> bool {
        !self.status.is_success()
    }

    /// Dimension `n` of the factorized matrix.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Extract the lower triangular matrix `L` (with unit diagonal).
    pub fn l(&self) -> Matrix {
        let n = self.n;
        Matrix::from_fn(n, n, |i, j| match i.cmp(&j) {
            core::cmp::Ordering::Greater => self.lu[i * n + j],
            core::cmp::Ordering::Equal => 1.0,
            core::cmp::Ordering::Less => 0.0,
        })
    }

    /// Extract the upper triangular matrix `U`.
    pub fn u(&self) -> Matrix {
        let n = self.n;
        Matrix::from_fn(n, n, |i, j| if j >= i { self.lu[i * n + j] } else { 0.0 })
    }

    /// Extract the permutation matrix `P`.
    pub fn p(&self) -> Matrix {
        let n = self.n;
        let mut p = Matrix::zeros(n, n);
        for (i, &pi) in self.perm.iter().enumerate() {
            p[(i, pi)] = 1.0;
        }
        p
    }

    /// The row permutation: `(PA)[i] = A[perm[i]]`.
    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    /// Compute the determinant from the LU factorization.
    ///
    /// `det(A) = sign * product(diag(U))`
    pub fn det(&self) -> f64 {
        let n = self.n;
        (0..n).fold(self.sign, |d, i| d * self.lu[i * n + i])
    }

    /// Ratio of the smallest to the largest `|u_ii|`.
    ///
    /// A cheap conditioning indicator, not a true reciprocal condition
    /// number. `1.0` for the empty matrix, `0.0` when `U` is all zero.
    pub fn rcond_estimate(&self) -> f64 {
        let n = self.n;
        if n == 0 {
            return 1.0;
        }
        let (lo, hi) = (0..n)
            .map(|i| self.lu[i * n + i].abs())
            .fold((f64::INFINITY, 0.0_f64), |(lo, hi), d| (lo.min(d), hi.max(d)));
        if hi == 0.0 { 0.0 } else { lo / hi }
    }

    fn solve_in_place(&self, x: &mut [f64]) {
        blas::solve_lower(&self.lu, self.n, self.n, true, x);
        blas::solve_upper(&self.lu, self.n, self.n, x);
    }

    /// Solve the linear system `Ax = b` using the precomputed factorization.
    ///
    /// If the factorization is flagged singular the result may contain
    /// infinities or NaN; check [`status`](Self::status) first.
    pub fn solve(&self, b: &Vector) -> Result<Vector> {
        if b.len() != self.n {
            return Err(LinalgError::vector_len("lu solve", self.n, b.len()));
        }
        let mut x: Vec<f64> = self.perm.iter().map(|&pi| b[pi]).collect();
        self.solve_in_place(&mut x);
        Ok(Vector::from_vec(x))
    }

    /// Solve `AX = B` for every column of `B`.
    pub fn solve_matrix(&self, b: &Matrix) -> Result<Matrix> {
        if b.rows() != self.n {
            return Err(LinalgError::DimensionMismatch {
                op: "lu solve_matrix",
                expected: (self.n, b.cols()),
                got: b.shape(),
            });
        }
        let mut out = Matrix::zeros(self.n, b.cols());
        let mut x = vec![0.0; self.n];
        for col in 0..b.cols() {
            for (i, &pi) in self.perm.iter().enumerate() {
                x[i] = b[(pi, col)];
            }
            self.solve_in_place(&mut x);
            for (row, &v) in x.iter().enumerate() {
                out[(row, col)] = v;
            }
        }
        Ok(out)
    }

    /// Compute the inverse matrix using the LU factorization.
    ///
    /// Solves `AX = I` column by column.
    pub fn inverse(&self) -> Matrix {
        let n = self.n;
        let mut inv = Matrix::zeros(n, n);
        let mut e = vec![0.0; n];
        for col in 0..n {
            // (P e_col)[i] = 1 where perm[i] == col
            for (i, &pi) in self.perm.iter().enumerate() {
                e[i] = if pi == col { 1.0 } else { 0.0 };
            }
            self.solve_in_place(&mut e);
            for (row, &v) in e.iter().enumerate() {
                inv[(row, col)] = v;
            }
        }
        inv
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::matrix;

    fn approx_eq(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| (x - y).abs() < tol)
    }

    fn assert_pa_eq_lu(a: &Matrix, lu: &LuDecomposition) {
        let pa = lu.p().matmul(a).unwrap();
        let prod = lu.l().matmul(&lu.u()).unwrap();
        assert!(approx_eq(pa.as_slice(), prod.as_slice(), 1e-12));
    }

    #[test]
    fn test_lu_2x2() {
        let a = matrix![[2.0, 1.0], [1.0, 4.0]];
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert_pa_eq_lu(&a, &lu);
        assert_eq!(lu.status(), SolveStatus::Success);
    }

    #[test]
    fn test_lu_3x3() {
        let a = matrix![[2.0, 1.0, 1.0], [4.0, 3.0, 3.0], [8.0, 7.0, 9.0]];
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert_pa_eq_lu(&a, &lu);
        // Largest first-column entry is 8 in row 2.
        assert_eq!(lu.permutation()[0], 2);
    }

    #[test]
    fn test_permutation_is_bijection() {
        let a = matrix![
            [0.0, 2.0, 1.0, 4.0],
            [1.0, -3.0, 2.0, 0.5],
            [-5.0, 1.0, 0.0, 2.0],
            [2.0, 2.0, 7.0, -1.0]
        ];
        let lu = LuDecomposition::decompose(&a).unwrap();
        let mut seen = lu.permutation().to_vec();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
        for (i, &pi) in lu.permutation().iter().enumerate() {
            let pa = lu.p().matmul(&a).unwrap();
            assert_eq!(pa.row(i).unwrap(), a.row(pi).unwrap());
        }
        assert_pa_eq_lu(&a, &lu);
    }

    #[test]
    fn test_first_max_wins_on_ties() {
        let a = matrix![[1.0, 2.0], [-1.0, 3.0]];
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert_eq!(lu.permutation(), &[0, 1]);
    }

    #[test]
    fn test_lu_det() {
        // >>> np.linalg.det([[6,1,1],[4,-2,5],[2,8,7]])
        // -306.0
        let a = matrix![[6.0, 1.0, 1.0], [4.0, -2.0, 5.0], [2.0, 8.0, 7.0]];
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert!((lu.det() - (-306.0)).abs() < 1e-9);
    }

    #[test]
    fn test_lu_singular_is_flagged() {
        let a = matrix![[1.0, 2.0], [2.0, 4.0]];
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert_eq!(lu.status(), SolveStatus::SingularOrIllConditioned);
        assert!(lu.is_singular());
        // Factors are still returned and consistent.
        assert_pa_eq_lu(&a, &lu);
        assert!(lu.det().abs() < 1e-12);
        assert_eq!(lu.rcond_estimate(), 0.0);
    }

    #[test]
    fn test_lu_zero_column_continues() {
        let a = matrix![[0.0, 1.0, 2.0], [0.0, 3.0, 4.0], [0.0, 5.0, 7.0]];
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert_eq!(lu.status(), SolveStatus::SingularOrIllConditioned);
        assert_pa_eq_lu(&a, &lu);
    }

    #[test]
    fn test_lu_solve() {
        let a = matrix![[2.0, 1.0, -1.0], [-3.0, -1.0, 2.0], [-2.0, 1.0, 2.0]];
        let b = Vector::from_vec(vec![8.0, -11.0, -3.0]);
        let x = LuDecomposition::decompose(&a).unwrap().solve(&b).unwrap();
        assert!(approx_eq(x.as_slice(), &[2.0, 3.0, -1.0], 1e-12));
    }

    #[test]
    fn test_lu_solve_matrix_and_inverse() {
        let a = matrix![[4.0, 7.0], [2.0, 6.0]];
        let lu = LuDecomposition::decompose(&a).unwrap();
        let inv = lu.inverse();
        // >>> np.linalg.inv([[4,7],[2,6]])
        // array([[ 0.6, -0.7], [-0.2,  0.4]])
        assert!(approx_eq(inv.as_slice(), &[0.6, -0.7, -0.2, 0.4], 1e-12));
        let x = lu.solve_matrix(&Matrix::eye(2)).unwrap();
        assert!(approx_eq(x.as_slice(), inv.as_slice(), 1e-14));
        assert!(lu.solve_matrix(&Matrix::eye(3)).is_err());
    }

    #[test]
    fn test_lu_dimension_errors() {
        let err = LuDecomposition::decompose(&Matrix::zeros(2, 3)).unwrap_err();
        assert_eq!(err.status(), SolveStatus::DimensionMismatch);
        let lu = LuDecomposition::decompose(&Matrix::eye(2)).unwrap();
        assert!(lu.solve(&Vector::zeros(3)).is_err());
    }

    #[test]
    fn test_lu_empty() {
        let lu = LuDecomposition::decompose(&Matrix::zeros(0, 0)).unwrap();
        assert!(lu.status().is_success());
        assert_eq!(lu.det(), 1.0);
        assert!(lu.solve(&Vector::zeros(0)).unwrap().is_empty());
        assert_eq!(lu.rcond_estimate(), 1.0);
    }

    #[test]
    fn test_custom_tolerance_flags_ill_conditioned() {
        let a = matrix![[1.0, 1.0], [1.0, 1.0 + 1e-8]];
        assert!(LuDecomposition::decompose(&a).unwrap().status().is_success());
        let strict = Options::default().with_tolerance(1e-6);
        let lu = LuDecomposition::decompose_with(&a, &strict).unwrap();
        assert_eq!(lu.status(), SolveStatus::SingularOrIllConditioned);
    }
}
