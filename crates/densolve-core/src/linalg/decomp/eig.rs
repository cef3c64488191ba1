//! Eigendecomposition for symmetric matrices.
//!
//! Decomposes a real symmetric matrix `A` into `A = V D V^T` where:
//! - `V` is orthogonal (columns are eigenvectors)
//! - `D` is diagonal (eigenvalues on the diagonal)
//!
//! Implementation uses the cyclic Jacobi eigenvalue algorithm. The
//! generalized problem `A x = λ B x` with `B` positive definite is reduced
//! to a standard one through the Cholesky factor of `B`.

use log::{debug, warn};

use crate::error::{LinalgError, Result, SolveStatus};
use crate::linalg::blas;
use crate::linalg::decomp::CholeskyDecomposition;
use crate::linalg::rotation::JacobiRotation;
use crate::matrix::Matrix;
use crate::options::Options;
use crate::vector::Vector;

/// Result of an eigendecomposition for symmetric matrices.
#[derive(Debug, Clone)]
#[must_use]
pub struct EigDecomposition {
    /// Eigenvalues in ascending order.
    eigenvalues: Vec<f64>,
    /// Eigenvectors as columns of an n x n matrix (stored row-major).
    eigenvectors: Vec<f64>,
    /// Matrix dimension.
    n: usize,
    sweeps: usize,
    status: SolveStatus,
}

/// Square root of the sum of squared off-diagonal entries.
fn off_diagonal_norm(s: &[f64], n: usize) -> f64 {
    let mut sum = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            sum += 2.0 * s[i * n + j] * s[i * n + j];
        }
    }
    sum.sqrt()
}

/// Run cyclic Jacobi sweeps on the symmetric buffer `s` in place.
///
/// Returns the accumulated rotations `V`, the number of sweeps performed,
/// and whether the off-diagonal norm reached `convergence * ‖S‖_F`.
fn jacobi_sweeps(s: &mut [f64], n: usize, opts: &Options) -> (Vec<f64>, usize, bool) {
    let mut v = vec![0.0; n * n];
    for i in 0..n {
        v[i * n + i] = 1.0;
    }

    // Unit-scale the working copy so squared entries stay representable.
    let scale = blas::unit_scale(s.iter().fold(0.0, |acc: f64, x| acc.max(x.abs())));
    blas::scal(scale, s);
    let frob = blas::nrm2(s);
    let target = opts.convergence * frob;
    let mut sweeps = 0;
    let mut converged = off_diagonal_norm(s, n) <= target;

    while !converged && sweeps < opts.max_sweeps {
        for p in 0..n {
            for q in (p + 1)..n {
                let apq = s[p * n + q];
                let Some(rot) = JacobiRotation::annihilating(s[p * n + p], s[q * n + q], apq)
                else {
                    continue;
                };
                rot.apply_symmetric(s, n, p, q);
                rot.rotate_columns(&mut v, n, n, p, q);
            }
        }
        sweeps += 1;
        converged = off_diagonal_norm(s, n) <= target;
    }
    blas::scal(scale.recip(), s);
    (v, sweeps, converged)
}

impl EigDecomposition {
    /// Compute the eigendecomposition of a symmetric matrix.
    ///
    /// Returns eigenvalues in ascending order and eigenvectors such that
    /// `A = V diag(d) V^T`. Fails with [`LinalgError::NotSymmetric`] when
    /// `A` is not symmetric within the tolerance. Hitting the sweep cap is
    /// not an error: the result carries [`SolveStatus::DidNotConverge`].
    ///
    /// ```
    /// # use densolve_core::matrix;
    /// # use densolve_core::linalg::decomp::EigDecomposition;
    /// let a = matrix![[2.0, 1.0], [1.0, 3.0]];
    /// let eig = EigDecomposition::decompose_symmetric(&a).unwrap();
    /// // Eigenvalues of [[2,1],[1,3]] are (5±sqrt(5))/2
    /// let vals = eig.eigenvalues();
    /// assert!((vals[0] - (5.0 - 5.0_f64.sqrt()) / 2.0).abs() < 1e-12);
    /// ```
    pub fn decompose_symmetric(a: &Matrix) -> Result<Self> {
        Self::decompose_symmetric_with(a, &Options::default())
    }

    /// [`decompose_symmetric`](Self::decompose_symmetric) with explicit
    /// tolerances and sweep cap.
    pub fn decompose_symmetric_with(a: &Matrix, opts: &Options) -> Result<Self> {
        if !a.is_square() {
            return Err(LinalgError::not_square("eigen_symmetric", a.rows(), a.cols()));
        }
        if !a.is_symmetric(opts.tolerance) {
            return Err(LinalgError::NotSymmetric);
        }
        let n = a.rows();
        let mut s = a.as_slice().to_vec();
        let (v, sweeps, converged) = jacobi_sweeps(&mut s, n, opts);
        Ok(Self::from_jacobi(&s, v, n, sweeps, converged))
    }

    /// Solve the generalized problem `A x = λ B x`.
    ///
    /// `A` must be symmetric and `B` symmetric positive definite. With
    /// `B = L Lᵀ` the standard problem `C y = λ y`, `C = L⁻¹ A L⁻ᵀ`, is
    /// solved by Jacobi and the eigenvectors are mapped back through
    /// `x = L⁻ᵀ y`, which makes them `B`-orthonormal (`Xᵀ B X = I`).
    pub fn decompose_generalized(a: &Matrix, b: &Matrix) -> Result<Self> {
        Self::decompose_generalized_with(a, b, &Options::default())
    }

    /// [`decompose_generalized`](Self::decompose_generalized) with explicit
    /// tolerances.
    #[allow(clippy::needless_range_loop)]
    pub fn decompose_generalized_with(a: &Matrix, b: &Matrix, opts: &Options) -> Result<Self> {
        if !a.is_square() {
            return Err(LinalgError::not_square("generalized_eigen", a.rows(), a.cols()));
        }
        if b.shape() != a.shape() {
            return Err(LinalgError::DimensionMismatch {
                op: "generalized_eigen",
                expected: a.shape(),
                got: b.shape(),
            });
        }
        if !a.is_symmetric(opts.tolerance) {
            return Err(LinalgError::NotSymmetric);
        }
        let chol = CholeskyDecomposition::decompose_with(b, opts)?;
        let l = chol.l_slice();
        let n = a.rows();

        // X = L⁻¹ A, one column at a time.
        let mut x = vec![0.0; n * n];
        let mut col = vec![0.0; n];
        for j in 0..n {
            for i in 0..n {
                col[i] = a[(i, j)];
            }
            blas::solve_lower(l, n, n, false, &mut col);
            for i in 0..n {
                x[i * n + j] = col[i];
            }
        }
        // C = L⁻¹ Xᵀ; column j of Xᵀ is row j of X.
        let mut c = vec![0.0; n * n];
        for j in 0..n {
            col.copy_from_slice(&x[j * n..(j + 1) * n]);
            blas::solve_lower(l, n, n, false, &mut col);
            for i in 0..n {
                c[i * n + j] = col[i];
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                let avg = 0.5 * (c[i * n + j] + c[j * n + i]);
                c[i * n + j] = avg;
                c[j * n + i] = avg;
            }
        }

        let (mut v, sweeps, converged) = jacobi_sweeps(&mut c, n, opts);
        // Back-transform each eigenvector column: x = L⁻ᵀ y.
        for j in 0..n {
            for i in 0..n {
                col[i] = v[i * n + j];
            }
            blas::solve_lower_transpose(l, n, n, false, &mut col);
            for i in 0..n {
                v[i * n + j] = col[i];
            }
        }
        Ok(Self::from_jacobi(&c, v, n, sweeps, converged))
    }

    /// Sort the diagonal of `s` ascending and permute the columns of `v`.
    fn from_jacobi(s: &[f64], v: Vec<f64>, n: usize, sweeps: usize, converged: bool) -> Self {
        let status = if converged {
            debug!("eig: {n}x{n} converged after {sweeps} sweeps");
            SolveStatus::Success
        } else {
            warn!("eig: {n}x{n} did not converge after {sweeps} sweeps");
            SolveStatus::DidNotConverge
        };

        let diag: Vec<f64> = (0..n).map(|i| s[i * n + i]).collect();
        let mut indices: Vec<usize> = (0..n).collect();
        indices.sort_by(|&a, &b| diag[a].total_cmp(&diag[b]));

        let eigenvalues = indices.iter().map(|&i| diag[i]).collect();
        let mut sorted = vec![0.0; n * n];
        for (new_j, &old_j) in indices.iter().enumerate() {
            for i in 0..n {
                sorted[i * n + new_j] = v[i * n + old_j];
            }
        }
        Self {
            eigenvalues,
            eigenvectors: sorted,
            n,
            sweeps,
            status,
        }
    }

    /// The eigenvalues, sorted ascending.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// The eigenvalues as a [`Vector`].
    pub fn eigenvalues_vector(&self) -> Vector {
        Vector::from_slice(&self.eigenvalues)
    }

    /// The eigenvector matrix `V` (n x n, columns are eigenvectors).
    pub fn eigenvectors(&self) -> Matrix {
        Matrix::from_parts(self.n, self.n, self.eigenvectors.clone())
    }

    /// [`SolveStatus::Success`] or [`SolveStatus::DidNotConverge`].
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Number of Jacobi sweeps performed.
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// `V f(Λ) Vᵀ`, e.g. a matrix power or square root.
    ///
    /// Only meaningful for the standard symmetric problem, where `V` is
    /// orthogonal.
    ///
    /// ```
    /// # use densolve_core::matrix;
    /// # use densolve_core::linalg::decomp::EigDecomposition;
    /// let a = matrix![[4.0, 1.0], [1.0, 3.0]];
    /// let eig = EigDecomposition::decompose_symmetric(&a).unwrap();
    /// let root = eig.matrix_function(f64::sqrt);
    /// let back = root.matmul(&root).unwrap();
    /// assert!((back[(0, 1)] - 1.0).abs() < 1e-12);
    /// ```
    pub fn matrix_function<F>(&self, f: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        let n = self.n;
        let fl: Vec<f64> = self.eigenvalues.iter().map(|&l| f(l)).collect();
        let v = &self.eigenvectors;
        Matrix::from_fn(n, n, |i, j| {
            (0..n).map(|k| v[i * n + k] * fl[k] * v[j * n + k]).sum()
        })
    }

    /// `V Λ Vᵀ`.
    pub fn reconstruct(&self) -> Matrix {
        self.matrix_function(|l| l)
    }
}
