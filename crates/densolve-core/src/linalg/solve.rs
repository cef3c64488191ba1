//! Linear systems and least-squares problems.
//!
//! [`solve`] picks a factorization from the structure of `A`; [`solve_qr`]
//! and [`solve_least_squares`] force a particular method. Every entry point
//! returns a [`Solution`] carrying the residual norm, computed directly as
//! `‖A x − b‖₂`.

use core::fmt;

use log::debug;

use crate::error::{LinalgError, Result, SolveStatus};
use crate::linalg::blas;
use crate::linalg::decomp::{CholeskyDecomposition, LuDecomposition, QrDecomposition};
use crate::matrix::Matrix;
use crate::options::Options;
use crate::vector::Vector;

/// The factorization a [`Solution`] was computed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveMethod {
    Cholesky,
    Lu,
    Qr,
    /// Column-pivoted QR followed by a complete orthogonal decomposition.
    LeastSquares,
}

impl fmt::Display for SolveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cholesky => "cholesky",
            Self::Lu => "lu",
            Self::Qr => "qr",
            Self::LeastSquares => "least squares",
        };
        f.write_str(s)
    }
}

/// Solution vector plus diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    x: Vector,
    method: SolveMethod,
    status: SolveStatus,
    residual_norm: f64,
    rank: Option<usize>,
}

impl Solution {
    fn new(
        a: &Matrix,
        b: &Vector,
        x: Vector,
        method: SolveMethod,
        status: SolveStatus,
        rank: Option<usize>,
    ) -> Result<Self> {
        let mut r = a.matvec(&x)?.into_vec();
        blas::axpy(-1.0, b.as_slice(), &mut r);
        let residual_norm = blas::nrm2(&r);
        debug!("solve: {method}, status {status}, residual {residual_norm:e}");
        Ok(Self {
            x,
            method,
            status,
            residual_norm,
            rank,
        })
    }

    /// The computed solution.
    pub fn x(&self) -> &Vector {
        &self.x
    }

    /// Consume the result and return the solution vector.
    pub fn into_x(self) -> Vector {
        self.x
    }

    /// Factorization that produced `x`.
    pub fn method(&self) -> SolveMethod {
        self.method
    }

    /// Soft outcome of the solve; see [`SolveStatus`].
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// `‖A x − b‖₂`.
    pub fn residual_norm(&self) -> f64 {
        self.residual_norm
    }

    /// Numerical rank of `A`; only the least-squares solver reports it.
    pub fn rank(&self) -> Option<usize> {
        self.rank
    }
}

fn check_rhs(op: &'static str, a: &Matrix, b: &Vector) -> Result<()> {
    if b.len() == a.rows() {
        Ok(())
    } else {
        Err(LinalgError::vector_len(op, a.rows(), b.len()))
    }
}

/// Solve `Ax = b`, choosing the method from the structure of `A`.
///
/// Square symmetric matrices try Cholesky first and fall back to LU when
/// it rejects them. Other square matrices use LU; a flagged pivot is
/// reported as [`SolveStatus::SingularOrIllConditioned`]. Rectangular
/// matrices are handed to [`solve_least_squares`].
///
/// ```
/// # use densolve_core::{matrix, Vector};
/// # use densolve_core::linalg::{self, SolveMethod};
/// let a = matrix![[4.0, 1.0], [1.0, 3.0]];
/// let b = Vector::from_vec(vec![1.0, 2.0]);
/// let sol = linalg::solve(&a, &b).unwrap();
/// assert_eq!(sol.method(), SolveMethod::Cholesky);
/// assert!(sol.residual_norm() < 1e-12);
/// ```
pub fn solve(a: &Matrix, b: &Vector) -> Result<Solution> {
    solve_with(a, b, &Options::default())
}

/// [`solve`] with explicit tolerances.
pub fn solve_with(a: &Matrix, b: &Vector, opts: &Options) -> Result<Solution> {
    check_rhs("solve", a, b)?;
    if !a.is_square() {
        debug!("solve: {}x{} is rectangular, using least squares", a.rows(), a.cols());
        return solve_least_squares_with(a, b, opts);
    }
    if a.is_symmetric(opts.tolerance) {
        match CholeskyDecomposition::decompose_with(a, opts) {
            Ok(chol) => {
                let x = chol.solve(b)?;
                return Solution::new(a, b, x, SolveMethod::Cholesky, SolveStatus::Success, None);
            }
            Err(err) => debug!("solve: cholesky rejected the matrix ({err}), using lu"),
        }
    }
    let lu = LuDecomposition::decompose_with(a, opts)?;
    let x = lu.solve(b)?;
    Solution::new(a, b, x, SolveMethod::Lu, lu.status(), None)
}

/// Solve `Ax = b` in the least-squares sense with Householder QR.
///
/// Rank-deficient or underdetermined systems get a basic solution (see
/// [`QrDecomposition::solve`]) and a
/// [`SolveStatus::SingularOrIllConditioned`] status.
pub fn solve_qr(a: &Matrix, b: &Vector) -> Result<Solution> {
    solve_qr_with(a, b, &Options::default())
}

/// [`solve_qr`] with explicit tolerances.
pub fn solve_qr_with(a: &Matrix, b: &Vector, opts: &Options) -> Result<Solution> {
    check_rhs("solve_qr", a, b)?;
    let qr = QrDecomposition::decompose_with(a, opts)?;
    let x = qr.solve(b)?;
    let status = if qr.is_full_rank() {
        SolveStatus::Success
    } else {
        SolveStatus::SingularOrIllConditioned
    };
    Solution::new(a, b, x, SolveMethod::Qr, status, None)
}

/// Minimum-norm least-squares solution of `Ax = b` for any shape of `A`.
///
/// Column-pivoted QR gives `A Π = Q R` and the numerical rank `r`. When
/// `r < n` the leading `r` rows `[R11 R12]` are reduced once more by a QR
/// of their transpose (a complete orthogonal decomposition), which yields
/// the solution of smallest 2-norm among all least-squares minimizers.
/// The status is [`SolveStatus::SingularOrIllConditioned`] when
/// `r < min(m, n)`.
///
/// ```
/// # use densolve_core::{matrix, Vector};
/// # use densolve_core::linalg;
/// // Underdetermined: x + y = 2 has minimum-norm solution (1, 1).
/// let a = matrix![[1.0, 1.0]];
/// let sol = linalg::solve_least_squares(&a, &Vector::from_vec(vec![2.0])).unwrap();
/// assert!((sol.x()[0] - 1.0).abs() < 1e-12);
/// assert!((sol.x()[1] - 1.0).abs() < 1e-12);
/// assert_eq!(sol.rank(), Some(1));
/// ```
pub fn solve_least_squares(a: &Matrix, b: &Vector) -> Result<Solution> {
    solve_least_squares_with(a, b, &Options::default())
}

/// [`solve_least_squares`] with explicit tolerances.
pub fn solve_least_squares_with(a: &Matrix, b: &Vector, opts: &Options) -> Result<Solution> {
    check_rhs("solve_least_squares", a, b)?;
    let (m, n) = a.shape();
    let qr = QrDecomposition::decompose_pivoted_with(a, opts)?;
    let rank = qr.rank(opts.tolerance);

    let mut c = b.as_slice().to_vec();
    qr.apply_qt(&mut c);
    c.truncate(rank);

    // y solves the permuted problem: x[perm[j]] = y[j].
    let mut y = vec![0.0; n];
    if rank == n {
        let r = qr.r_thin();
        y.copy_from_slice(&c);
        blas::solve_upper(r.as_slice(), n, n, &mut y);
    } else if rank > 0 {
        // [R11 R12]^T = Z S, so [R11 R12] y = c has minimum-norm solution
        // y = Z w with S^T w = c.
        let r = qr.r_thin();
        let top_t = Matrix::from_fn(n, rank, |i, j| r[(j, i)]);
        let cod = QrDecomposition::decompose_with(&top_t, opts)?;
        let s = cod.r_thin();
        blas::solve_upper_transpose(s.as_slice(), rank, rank, &mut c);
        y[..rank].copy_from_slice(&c);
        cod.apply_q(&mut y);
    }

    let mut x = vec![0.0; n];
    for (j, &pj) in qr.permutation().iter().enumerate() {
        x[pj] = y[j];
    }

    let status = if rank < m.min(n) {
        SolveStatus::SingularOrIllConditioned
    } else {
        SolveStatus::Success
    };
    debug!("solve_least_squares: {m}x{n}, rank {rank}");
    Solution::new(a, b, Vector::from_vec(x), SolveMethod::LeastSquares, status, Some(rank))
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::matrix;

    fn approx_eq(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| (x - y).abs() < tol)
    }

    #[test]
    fn test_solve_symmetric_uses_cholesky() {
        let a = matrix![[3.0, 2.0, 1.0], [2.0, 3.0, 2.0], [1.0, 2.0, 3.0]];
        let b = Vector::from_vec(vec![1.0, 2.0, 3.0]);
        let sol = solve(&a, &b).unwrap();
        assert_eq!(sol.method(), SolveMethod::Cholesky);
        assert!(sol.status().is_success());
        assert!(sol.residual_norm() < 1e-12);
        // Exact solution is [0, 0, 1].
        assert!(approx_eq(sol.x().as_slice(), &[0.0, 0.0, 1.0], 1e-12));
        assert_eq!(sol.rank(), None);
    }

    #[test]
    fn test_solve_indefinite_symmetric_falls_back_to_lu() {
        let a = matrix![[1.0, 2.0], [2.0, 1.0]];
        let b = Vector::from_vec(vec![3.0, 3.0]);
        let sol = solve(&a, &b).unwrap();
        assert_eq!(sol.method(), SolveMethod::Lu);
        assert!(approx_eq(sol.x().as_slice(), &[1.0, 1.0], 1e-12));
    }

    #[test]
    fn test_solve_general_square() {
        let a = matrix![[2.0, 1.0, -1.0], [-3.0, -1.0, 2.0], [-2.0, 1.0, 2.0]];
        let b = Vector::from_vec(vec![8.0, -11.0, -3.0]);
        let sol = solve(&a, &b).unwrap();
        assert_eq!(sol.method(), SolveMethod::Lu);
        assert!(approx_eq(sol.x().as_slice(), &[2.0, 3.0, -1.0], 1e-12));
    }

    #[test]
    fn test_solve_singular_is_flagged() {
        let a = matrix![[1.0, 2.0], [2.0, 4.0]];
        let b = Vector::from_vec(vec![1.0, 2.0]);
        let sol = solve(&a, &b).unwrap();
        assert_eq!(sol.status(), SolveStatus::SingularOrIllConditioned);
    }

    #[test]
    fn test_solve_rectangular_routes_to_least_squares() {
        let a = matrix![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let b = Vector::from_vec(vec![1.0, 1.0, 0.0]);
        let sol = solve(&a, &b).unwrap();
        assert_eq!(sol.method(), SolveMethod::LeastSquares);
        assert_eq!(sol.rank(), Some(2));
        // Normal equations [[2,1],[1,2]] x = [1,1] give x = [1/3, 1/3].
        assert!(approx_eq(sol.x().as_slice(), &[1.0 / 3.0, 1.0 / 3.0], 1e-12));
    }

    #[test]
    fn test_rhs_length_checked_first() {
        let b = Vector::zeros(2);
        for result in [
            solve(&Matrix::eye(3), &b),
            solve_qr(&Matrix::eye(3), &b),
            solve_least_squares(&Matrix::zeros(3, 4), &b),
        ] {
            assert_eq!(result.unwrap_err().status(), SolveStatus::DimensionMismatch);
        }
    }

    #[test]
    fn test_least_squares_overdetermined() {
        let a = matrix![[1.0, 2.0, 1.0], [2.0, 1.0, 3.0], [1.0, 3.0, 2.0], [3.0, 1.0, 1.0]];
        let b = Vector::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let ls = solve_least_squares(&a, &b).unwrap();
        let qr = solve_qr(&a, &b).unwrap();
        assert!(ls.status().is_success());
        assert_eq!(ls.rank(), Some(3));
        assert!(approx_eq(ls.x().as_slice(), qr.x().as_slice(), 1e-10));
        // The residual is orthogonal to the columns of A.
        let r = a.matvec(ls.x()).unwrap().sub_checked(&b).unwrap();
        let atr = a.transpose().matvec(&r).unwrap();
        assert!(atr.norm_inf() < 1e-10);
        assert!((ls.residual_norm() - r.norm_l2()).abs() < 1e-12);
    }

    #[test]
    fn test_solve_qr_flags_rank_deficiency() {
        let b = Vector::from_vec(vec![1.0, 2.0, 3.0]);
        let dependent = matrix![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]];
        let sol = solve_qr(&dependent, &b).unwrap();
        assert_eq!(sol.method(), SolveMethod::Qr);
        assert_eq!(sol.status(), SolveStatus::SingularOrIllConditioned);

        let wide = matrix![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let sol = solve_qr(&wide, &Vector::from_vec(vec![1.0, 2.0])).unwrap();
        assert_eq!(sol.status(), SolveStatus::SingularOrIllConditioned);

        let full = matrix![[1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let sol = solve_qr(&full, &Vector::from_vec(vec![6.0, 5.0, 7.0])).unwrap();
        assert!(sol.status().is_success());
    }

    #[test]
    fn test_least_squares_rank_deficient_is_minimum_norm() {
        // Third column = first + second; rank 2.
        let a = matrix![[1.0, 0.0, 1.0], [0.0, 1.0, 1.0], [1.0, 1.0, 2.0], [2.0, 1.0, 3.0]];
        let b = Vector::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let sol = solve_least_squares(&a, &b).unwrap();
        assert_eq!(sol.rank(), Some(2));
        assert_eq!(sol.status(), SolveStatus::SingularOrIllConditioned);
        // The minimum-norm solution is orthogonal to the null space [1, 1, -1].
        let x = sol.x();
        assert!((x[0] + x[1] - x[2]).abs() < 1e-10);
        // It still satisfies the normal equations.
        let r = a.matvec(x).unwrap().sub_checked(&b).unwrap();
        assert!(a.transpose().matvec(&r).unwrap().norm_inf() < 1e-10);
    }

    #[test]
    fn test_least_squares_underdetermined() {
        let a = matrix![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let b = Vector::from_vec(vec![6.0, 15.0]);
        let sol = solve_least_squares(&a, &b).unwrap();
        assert!(sol.status().is_success());
        assert_eq!(sol.rank(), Some(2));
        assert!(sol.residual_norm() < 1e-10);
        // Minimum norm: x lies in the row space, so x is orthogonal to the
        // null space direction [1, -2, 1].
        let x = sol.x();
        assert!((x[0] - 2.0 * x[1] + x[2]).abs() < 1e-10);
        assert!(approx_eq(x.as_slice(), &[1.0, 1.0, 1.0], 1e-10));
    }

    #[test]
    fn test_least_squares_zero_matrix() {
        let a = Matrix::zeros(2, 3);
        let b = Vector::from_vec(vec![1.0, -1.0]);
        let sol = solve_least_squares(&a, &b).unwrap();
        assert_eq!(sol.rank(), Some(0));
        assert!(sol.x().iter().all(|&v| v == 0.0));
        assert!((sol.residual_norm() - 2.0_f64.sqrt()).abs() < 1e-15);
    }
}
