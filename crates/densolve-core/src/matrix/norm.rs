//! Entry-wise and induced norms, plus the symmetry predicate.
//!
//! The spectral norm lives with the SVD in [`crate::linalg`].

use super::Matrix;
use crate::linalg::blas;

impl Matrix {
    /// Frobenius norm `sqrt(sum a_ij^2)`.
    pub fn norm_frobenius(&self) -> f64 {
        blas::nrm2(&self.data)
    }

    /// Induced 1-norm: maximum absolute column sum.
    pub fn norm_1(&self) -> f64 {
        (0..self.cols)
            .map(|j| {
                (0..self.rows)
                    .map(|i| self.data[i * self.cols + j].abs())
                    .sum::<f64>()
            })
            .fold(0.0, f64::max)
    }

    /// Induced infinity-norm: maximum absolute row sum.
    pub fn norm_inf(&self) -> f64 {
        self.row_iter()
            .map(|r| r.iter().map(|x| x.abs()).sum::<f64>())
            .fold(0.0, f64::max)
    }

    /// Largest absolute entry; `0.0` for an empty matrix.
    pub fn norm_max(&self) -> f64 {
        self.data.iter().fold(0.0, |m, x| m.max(x.abs()))
    }

    /// Whether `|a_ij - a_ji| <= tol * norm_max` for all pairs.
    ///
    /// Non-square matrices are never symmetric.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        let thresh = tol * self.norm_max();
        let n = self.rows;
        for i in 0..n {
            for j in (i + 1)..n {
                if (self.data[i * n + j] - self.data[j * n + i]).abs() > thresh {
                    return false;
                }
            }
        }
        true
    }
}
