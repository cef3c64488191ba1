//! Cholesky decomposition for symmetric positive-definite matrices.
//!
//! Decomposes a symmetric positive-definite matrix `A` into `A = L L^T`
//! where `L` is lower triangular with positive diagonal entries.

use log::debug;

use crate::error::{LinalgError, Result, SolveStatus};
use crate::linalg::blas;
use crate::matrix::Matrix;
use crate::options::Options;
use crate::vector::Vector;

/// Result of a Cholesky decomposition.
///
/// Stores the factorization `A = L L^T` where `L` is lower triangular.
/// A value of this type always represents a successful factorization;
/// failures are reported as [`LinalgError`]s.
#[derive(Debug, Clone)]
#[must_use]
pub struct CholeskyDecomposition {
    /// Lower triangular factor stored as a flat n x n array.
    l_data: Vec<f64>,
    /// Matrix dimension.
    n: usize,
}

#[allow(clippy::many_single_char_names)]
impl CholeskyDecomposition {
    /// Compute the Cholesky decomposition of a symmetric positive-definite matrix.
    ///
    /// Symmetry is checked first, relative to the largest entry of `A`.
    /// Fails with [`LinalgError::NotSymmetric`] or
    /// [`LinalgError::NotPositiveDefinite`] (carrying the failing pivot).
    ///
    /// ```
    /// # use densolve_core::matrix;
    /// # use densolve_core::linalg::decomp::CholeskyDecomposition;
    /// let a = matrix![[4.0, 2.0], [2.0, 3.0]];
    /// let chol = CholeskyDecomposition::decompose(&a).unwrap();
    /// let l = chol.l();
    /// // Verify L L^T = A
    /// let prod = l.matmul(&l.transpose()).unwrap();
    /// assert!((prod[(0, 0)] - 4.0).abs() < 1e-10);
    /// ```
    pub fn decompose(a: &Matrix) -> Result<Self> {
        Self::decompose_with(a, &Options::default())
    }

    /// [`decompose`](Self::decompose) with explicit tolerances.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn decompose_with(a: &Matrix, opts: &Options) -> Result<Self> {
        if !a.is_square() {
            return Err(LinalgError::not_square("cholesky", a.rows(), a.cols()));
        }
        if !a.is_symmetric(opts.tolerance) {
            return Err(LinalgError::NotSymmetric);
        }

        let n = a.rows();
        let a_data = a.as_slice();
        let mut l = vec![0.0; n * n];

        for j in 0..n {
            // Diagonal element
            let row_j = &l[j * n..j * n + j];
            let sum = a_data[j * n + j] - blas::dot(row_j, row_j);
            // Negated comparison so NaN also fails.
            if !(sum > 0.0) {
                debug!("cholesky: pivot {j} is {sum:e}, not positive definite");
                return Err(LinalgError::NotPositiveDefinite { index: j });
            }
            let diag = sum.sqrt();
            l[j * n + j] = diag;

            // Off-diagonal elements
            for i in (j + 1)..n {
                let (upper, lower) = l.split_at_mut(i * n);
                let dot = blas::dot(&lower[..j], &upper[j * n..j * n + j]);
                lower[j] = (a_data[i * n + j] - dot) / diag;
            }
        }

        Ok(Self { l_data: l, n })
    }

    /// Always [`SolveStatus::Success`]; failures never produce a value.
    pub fn status(&self) -> SolveStatus {
        SolveStatus::Success
    }

    /// Dimension `n` of the factorized matrix.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Extract the lower triangular factor `L`.
    pub fn l(&self) -> Matrix {
        Matrix::from_parts(self.n, self.n, self.l_data.clone())
    }

    pub(crate) fn l_slice(&self) -> &[f64] {
        &self.l_data
    }

    fn solve_in_place(&self, x: &mut [f64]) {
        let n = self.n;
        blas::solve_lower(&self.l_data, n, n, false, x);
        blas::solve_lower_transpose(&self.l_data, n, n, false, x);
    }

    /// Solve the linear system `Ax = b` using the Cholesky factorization.
    ///
    /// Since `A = L L^T`, solves `L y = b` (forward) then `L^T x = y` (backward).
    pub fn solve(&self, b: &Vector) -> Result<Vector> {
        if b.len() != self.n {
            return Err(LinalgError::vector_len("cholesky solve", self.n, b.len()));
        }
        let mut x = b.as_slice().to_vec();
        self.solve_in_place(&mut x);
        Ok(Vector::from_vec(x))
    }

    /// Compute the inverse using the Cholesky factorization.
    pub fn inverse(&self) -> Matrix {
        let n = self.n;
        let mut inv = Matrix::zeros(n, n);
        let mut e = vec![0.0; n];
        for col in 0..n {
            e.fill(0.0);
            e[col] = 1.0;
            self.solve_in_place(&mut e);
            for (row, &v) in e.iter().enumerate() {
                inv[(row, col)] = v;
            }
        }
        inv
    }

    /// `det(A) = prod(diag(L))^2`.
    pub fn det(&self) -> f64 {
        let n = self.n;
        let p: f64 = (0..n).map(|i| self.l_data[i * n + i]).product();
        p * p
    }

    /// Compute the log-determinant (useful for avoiding overflow).
    ///
    /// `log(det(A)) = 2 * sum(log(diag(L)))`
    pub fn log_det(&self) -> f64 {
        let n = self.n;
        2.0 * (0..n).map(|i| self.l_data[i * n + i].ln()).sum::<f64>()
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

    fn assert_llt(a: &Matrix, tol: f64) -> CholeskyDecomposition {
        let chol = CholeskyDecomposition::decompose(a).unwrap();
        let l = chol.l();
        let prod = l.matmul(&l.transpose()).unwrap();
        assert!(approx_eq(prod.as_slice(), a.as_slice(), tol));
        chol
    }

    #[test]
    fn test_cholesky_2x2() {
        assert_llt(&matrix![[4.0, 2.0], [2.0, 3.0]], 1e-12);
    }

    #[test]
    fn test_cholesky_3x3() {
        // Classic example: L = [[5,0,0],[3,3,0],[-1,1,3]]
        let a = matrix![[25.0, 15.0, -5.0], [15.0, 18.0, 0.0], [-5.0, 0.0, 11.0]];
        let chol = assert_llt(&a, 1e-10);
        let l = chol.l();
        assert!(approx_eq(
            l.as_slice(),
            &[5.0, 0.0, 0.0, 3.0, 3.0, 0.0, -1.0, 1.0, 3.0],
            1e-12
        ));
    }

    #[test]
    fn test_cholesky_identity() {
        let eye = Matrix::eye(4);
        let chol = CholeskyDecomposition::decompose(&eye).unwrap();
        assert!(approx_eq(chol.l().as_slice(), eye.as_slice(), 1e-14));
        assert_eq!(chol.status(), SolveStatus::Success);
    }

    #[test]
    fn test_cholesky_solve() {
        let a = matrix![[25.0, 15.0, -5.0], [15.0, 18.0, 0.0], [-5.0, 0.0, 11.0]];
        let b = Vector::from_vec(vec![1.0, 2.0, 3.0]);
        let x = CholeskyDecomposition::decompose(&a).unwrap().solve(&b).unwrap();
        let ax = a.matvec(&x).unwrap();
        assert!(approx_eq(ax.as_slice(), b.as_slice(), 1e-10));
    }

    #[test]
    fn test_cholesky_inverse_and_det() {
        let a = matrix![[4.0, 2.0], [2.0, 3.0]];
        let chol = CholeskyDecomposition::decompose(&a).unwrap();
        let eye = a.matmul(&chol.inverse()).unwrap();
        assert!(approx_eq(eye.as_slice(), Matrix::eye(2).as_slice(), 1e-12));
        // det(A) = 4*3 - 2*2 = 8
        assert!((chol.det() - 8.0).abs() < 1e-12);
        assert!((chol.log_det() - 8.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_cholesky_not_pd() {
        // Eigenvalues 3 and -1
        let a = matrix![[1.0, 2.0], [2.0, 1.0]];
        let err = CholeskyDecomposition::decompose(&a).unwrap_err();
        assert_eq!(err, LinalgError::NotPositiveDefinite { index: 1 });
        assert_eq!(err.status(), SolveStatus::NotPositiveDefinite);
    }

    #[test]
    fn test_cholesky_zero_pivot_is_not_pd() {
        let a = matrix![[0.0, 0.0], [0.0, 1.0]];
        let err = CholeskyDecomposition::decompose(&a).unwrap_err();
        assert_eq!(err, LinalgError::NotPositiveDefinite { index: 0 });
    }

    #[test]
    fn test_cholesky_nan_is_not_pd() {
        let a = matrix![[f64::NAN]];
        assert!(matches!(
            CholeskyDecomposition::decompose(&a),
            Err(LinalgError::NotPositiveDefinite { index: 0 })
        ));
    }

    #[test]
    fn test_cholesky_not_symmetric() {
        let a = matrix![[1.0, 2.0], [3.0, 4.0]];
        let err = CholeskyDecomposition::decompose(&a).unwrap_err();
        assert_eq!(err.status(), SolveStatus::NotSymmetric);
    }

    #[test]
    fn test_cholesky_not_square() {
        let err = CholeskyDecomposition::decompose(&Matrix::zeros(2, 3)).unwrap_err();
        assert_eq!(err.status(), SolveStatus::DimensionMismatch);
    }

    #[test]
    fn test_cholesky_generated_spd() {
        // Build A^T A + I to guarantee symmetric positive definite
        let a = matrix![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let spd = &a.transpose().matmul(&a).unwrap() + &Matrix::eye(3);
        assert_llt(&spd, 1e-10);
    }

    #[test]
    fn test_cholesky_empty() {
        let chol = CholeskyDecomposition::decompose(&Matrix::zeros(0, 0)).unwrap();
        assert_eq!(chol.det(), 1.0);
        assert!(chol.solve(&Vector::zeros(0)).unwrap().is_empty());
    }
}
