//! Arithmetic on [`Matrix`].
//!
//! The operator impls panic on shape mismatch, like slice indexing; the
//! named methods (`add`, `sub`, `matmul`, `matvec`) return a
//! [`LinalgError::DimensionMismatch`] instead.

use core::ops::{Add, Mul, Neg, Sub};

use crate::error::{LinalgError, Result};
use crate::linalg::blas;
use crate::vector::Vector;

use super::Matrix;

// ======================================================================
// Matrix + Matrix  (element-wise, same shape, panics on mismatch)
// ======================================================================

macro_rules! impl_matrix_binop {
    ($trait:ident, $method:ident, $checked:ident) => {
        impl $trait for &Matrix {
            type Output = Matrix;

            fn $method(self, rhs: &Matrix) -> Matrix {
                match self.$checked(rhs) {
                    Ok(m) => m,
                    Err(e) => panic!("{e}"),
                }
            }
        }

        impl $trait for Matrix {
            type Output = Matrix;

            fn $method(self, rhs: Matrix) -> Matrix {
                $trait::$method(&self, &rhs)
            }
        }
    };
}

impl_matrix_binop!(Add, add, add_checked);
impl_matrix_binop!(Sub, sub, sub_checked);
impl_matrix_binop!(Mul, mul, matmul);

impl Mul<f64> for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: f64) -> Matrix {
        self.scale(rhs)
    }
}

impl Mul<f64> for Matrix {
    type Output = Matrix;

    fn mul(mut self, rhs: f64) -> Matrix {
        self.scale_in_place(rhs);
        self
    }
}

impl Mul<&Vector> for &Matrix {
    type Output = Vector;

    fn mul(self, rhs: &Vector) -> Vector {
        match self.matvec(rhs) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl Neg for Matrix {
    type Output = Matrix;

    fn neg(mut self) -> Matrix {
        self.apply(|x| -x);
        self
    }
}

impl Neg for &Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        self.map(|x| -x)
    }
}

impl Matrix {
    fn check_same_shape(&self, other: &Matrix, op: &'static str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(LinalgError::DimensionMismatch {
                op,
                expected: self.shape(),
                got: other.shape(),
            });
        }
        Ok(())
    }

    /// Element-wise sum; errors when the shapes differ.
    pub fn add_checked(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_shape(other, "add")?;
        self.zip_map(other, |a, b| a + b)
    }

    /// Element-wise difference; errors when the shapes differ.
    pub fn sub_checked(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_shape(other, "sub")?;
        self.zip_map(other, |a, b| a - b)
    }

    /// `self += other`.
    pub fn add_in_place(&mut self, other: &Matrix) -> Result<()> {
        self.check_same_shape(other, "add_in_place")?;
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
        Ok(())
    }

    /// `self -= other`.
    pub fn sub_in_place(&mut self, other: &Matrix) -> Result<()> {
        self.check_same_shape(other, "sub_in_place")?;
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a -= b;
        }
        Ok(())
    }

    /// Multiply every element by `alpha`.
    pub fn scale(&self, alpha: f64) -> Matrix {
        self.map(|x| x * alpha)
    }

    pub fn scale_in_place(&mut self, alpha: f64) {
        for x in &mut self.data {
            *x *= alpha;
        }
    }

    /// Matrix product `self * other`.
    ///
    /// Uses the i-k-j loop order so the inner loop walks both operands
    /// contiguously.
    ///
    /// ```
    /// # use densolve_core::matrix;
    /// let a = matrix![[1.0, 2.0], [3.0, 4.0]];
    /// let b = matrix![[5.0, 6.0], [7.0, 8.0]];
    /// assert_eq!(a.matmul(&b).unwrap(), matrix![[19.0, 22.0], [43.0, 50.0]]);
    /// ```
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(LinalgError::DimensionMismatch {
                op: "matmul",
                expected: (self.cols, other.cols),
                got: other.shape(),
            });
        }
        let (m, k, n) = (self.rows, self.cols, other.cols);
        let mut out = vec![0.0; m * n];
        blas::gemm(m, k, n, 1.0, &self.data, &other.data, 0.0, &mut out);
        Ok(Matrix::from_parts(m, n, out))
    }

    /// Matrix-vector product `self * x`.
    pub fn matvec(&self, x: &Vector) -> Result<Vector> {
        if x.len() != self.cols {
            return Err(LinalgError::vector_len("matvec", self.cols, x.len()));
        }
        let mut out = vec![0.0; self.rows];
        blas::gemv(self.rows, self.cols, 1.0, &self.data, x.as_slice(), 0.0, &mut out);
        Ok(Vector::from_vec(out))
    }

    /// The transpose as a new matrix.
    pub fn transpose(&self) -> Matrix {
        let (r, c) = self.shape();
        let mut out = vec![0.0; r * c];
        for i in 0..r {
            for j in 0..c {
                out[j * r + i] = self.data[i * c + j];
            }
        }
        Matrix::from_parts(c, r, out)
    }

    /// Sum of the main diagonal; errors for non-square input.
    pub fn trace(&self) -> Result<f64> {
        if !self.is_square() {
            return Err(LinalgError::not_square("trace", self.rows, self.cols));
        }
        Ok((0..self.rows).map(|i| self.data[i * self.cols + i]).sum())
    }
}
