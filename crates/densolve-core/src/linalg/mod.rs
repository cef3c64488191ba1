//! Linear algebra operations.
//!
//! All routines are implemented from scratch on row-major `f64` buffers;
//! there are no external BLAS/LAPACK bindings. The module is split into
//! slice kernels ([`blas`]), matrix decompositions ([`decomp`]) and the
//! solvers built on them.
//!
//! Every free function has a `*_with` variant taking [`Options`] to
//! override tolerances and iteration caps for a single call.
//!
//! | Function | Algorithm |
//! |----------|-----------|
//! | [`lu_decompose`] | partial-pivoting LU |
//! | [`qr_decompose`] | Householder QR |
//! | [`cholesky_decompose`] | `L L^T` for SPD matrices |
//! | [`ldlt_decompose`] | symmetric-pivoted `L D L^T` |
//! | [`eigen_symmetric`], [`generalized_eigen`] | cyclic Jacobi |
//! | [`eigenvalues_general`] | Hessenberg + Francis double-shift QR |
//! | [`svd`] | one-sided Jacobi |
//! | [`solve`], [`solve_qr`], [`solve_least_squares`] | see [`Solution`] |

pub mod blas;
pub mod decomp;
pub(crate) mod rotation;
mod solve;

pub use decomp::{
    CholeskyDecomposition, EigDecomposition, GeneralEigenvalues, Inertia, LdltDecomposition,
    LuDecomposition, QrDecomposition, SvdDecomposition,
};
pub use solve::{
    Solution, SolveMethod, solve, solve_least_squares, solve_least_squares_with, solve_qr,
    solve_qr_with, solve_with,
};

use crate::error::{LinalgError, Result};
use crate::matrix::Matrix;
use crate::options::Options;
use crate::vector::Vector;

/// LU decomposition with partial pivoting, `PA = LU`.
pub fn lu_decompose(a: &Matrix) -> Result<LuDecomposition> {
    LuDecomposition::decompose(a)
}

pub fn lu_decompose_with(a: &Matrix, opts: &Options) -> Result<LuDecomposition> {
    LuDecomposition::decompose_with(a, opts)
}

/// Householder QR, `A = QR`.
pub fn qr_decompose(a: &Matrix) -> Result<QrDecomposition> {
    QrDecomposition::decompose(a)
}

pub fn qr_decompose_with(a: &Matrix, opts: &Options) -> Result<QrDecomposition> {
    QrDecomposition::decompose_with(a, opts)
}

/// Cholesky factorization `A = L L^T` of a symmetric positive-definite matrix.
pub fn cholesky_decompose(a: &Matrix) -> Result<CholeskyDecomposition> {
    CholeskyDecomposition::decompose(a)
}

pub fn cholesky_decompose_with(a: &Matrix, opts: &Options) -> Result<CholeskyDecomposition> {
    CholeskyDecomposition::decompose_with(a, opts)
}

/// `P^T A P = L D L^T` for symmetric, possibly indefinite, matrices.
pub fn ldlt_decompose(a: &Matrix) -> Result<LdltDecomposition> {
    LdltDecomposition::decompose(a)
}

pub fn ldlt_decompose_with(a: &Matrix, opts: &Options) -> Result<LdltDecomposition> {
    LdltDecomposition::decompose_with(a, opts)
}

/// Eigenvalues (ascending) and orthonormal eigenvectors of a symmetric matrix.
///
/// ```
/// # use densolve_core::matrix;
/// # use densolve_core::linalg;
/// let a = matrix![[2.0, 0.0], [0.0, 1.0]];
/// let eig = linalg::eigen_symmetric(&a).unwrap();
/// assert_eq!(eig.eigenvalues(), &[1.0, 2.0]);
/// ```
pub fn eigen_symmetric(a: &Matrix) -> Result<EigDecomposition> {
    EigDecomposition::decompose_symmetric(a)
}

pub fn eigen_symmetric_with(a: &Matrix, opts: &Options) -> Result<EigDecomposition> {
    EigDecomposition::decompose_symmetric_with(a, opts)
}

/// Solve `A x = λ B x` for symmetric `A` and symmetric positive-definite `B`.
pub fn generalized_eigen(a: &Matrix, b: &Matrix) -> Result<EigDecomposition> {
    EigDecomposition::decompose_generalized(a, b)
}

pub fn generalized_eigen_with(a: &Matrix, b: &Matrix, opts: &Options) -> Result<EigDecomposition> {
    EigDecomposition::decompose_generalized_with(a, b, opts)
}

/// Eigenvalues of a general square matrix, possibly complex.
pub fn eigenvalues_general(a: &Matrix) -> Result<GeneralEigenvalues> {
    GeneralEigenvalues::compute(a)
}

pub fn eigenvalues_general_with(a: &Matrix, opts: &Options) -> Result<GeneralEigenvalues> {
    GeneralEigenvalues::compute_with(a, opts)
}

/// Singular value decomposition `A = U diag(s) V^T` of any shape.
pub fn svd(a: &Matrix) -> Result<SvdDecomposition> {
    SvdDecomposition::decompose(a)
}

pub fn svd_with(a: &Matrix, opts: &Options) -> Result<SvdDecomposition> {
    SvdDecomposition::decompose_with(a, opts)
}

/// Compute the determinant of a square matrix.
///
/// Uses LU decomposition with partial pivoting internally.
///
/// ```
/// # use densolve_core::matrix;
/// # use densolve_core::linalg;
/// let a = matrix![[2.0, 1.0], [1.0, 4.0]];
/// let det = linalg::det(&a).unwrap();
/// assert!((det - 7.0).abs() < 1e-10);
/// ```
pub fn det(a: &Matrix) -> Result<f64> {
    det_with(a, &Options::default())
}

pub fn det_with(a: &Matrix, opts: &Options) -> Result<f64> {
    Ok(LuDecomposition::decompose_with(a, opts)?.det())
}

/// Compute the inverse of a square matrix.
///
/// Unlike the decompositions this is strict: a matrix whose LU
/// factorization is flagged singular yields [`LinalgError::Singular`].
///
/// ```
/// # use densolve_core::matrix;
/// # use densolve_core::linalg;
/// let a = matrix![[2.0, 1.0], [1.0, 4.0]];
/// let inv = linalg::inv(&a).unwrap();
/// // A * A^-1 ≈ I
/// let eye = a.matmul(&inv).unwrap();
/// assert!((eye[(0, 0)] - 1.0).abs() < 1e-10);
/// assert!(linalg::inv(&matrix![[1.0, 2.0], [2.0, 4.0]]).is_err());
/// ```
pub fn inv(a: &Matrix) -> Result<Matrix> {
    inv_with(a, &Options::default())
}

pub fn inv_with(a: &Matrix, opts: &Options) -> Result<Matrix> {
    let lu = LuDecomposition::decompose_with(a, opts)?;
    if lu.is_singular() {
        return Err(LinalgError::Singular);
    }
    Ok(lu.inverse())
}

/// Shorthands for the default-option entry points.
impl Matrix {
    pub fn lu(&self) -> Result<LuDecomposition> {
        lu_decompose(self)
    }

    pub fn qr(&self) -> Result<QrDecomposition> {
        qr_decompose(self)
    }

    pub fn cholesky(&self) -> Result<CholeskyDecomposition> {
        cholesky_decompose(self)
    }

    pub fn ldlt(&self) -> Result<LdltDecomposition> {
        ldlt_decompose(self)
    }

    pub fn eigen_symmetric(&self) -> Result<EigDecomposition> {
        eigen_symmetric(self)
    }

    pub fn eigenvalues(&self) -> Result<GeneralEigenvalues> {
        eigenvalues_general(self)
    }

    pub fn svd(&self) -> Result<SvdDecomposition> {
        svd(self)
    }

    /// See [`solve`](crate::linalg::solve).
    pub fn solve(&self, b: &Vector) -> Result<Solution> {
        solve(self, b)
    }

    pub fn det(&self) -> Result<f64> {
        det(self)
    }

    /// See [`inv`]; fails with [`LinalgError::Singular`] when flagged.
    pub fn inverse(&self) -> Result<Matrix> {
        inv(self)
    }

    /// Spectral norm, the largest singular value.
    pub fn norm_2(&self) -> Result<f64> {
        Ok(svd(self)?.norm_2())
    }
}
