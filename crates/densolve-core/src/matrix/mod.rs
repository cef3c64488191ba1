//! Dense row-major matrix with runtime dimensions.
//!
//! The [`Matrix`] type is the container every decomposition consumes and
//! produces. Elements are `f64`, stored contiguously in row-major (C) order,
//! and cloning performs a deep copy.

mod create;
mod display;
mod indexing;
mod norm;
mod ops;

use core::ops::{Index, IndexMut};

use crate::error::{LinalgError, Result};

/// A dense `rows x cols` matrix of `f64`.
///
/// A `0 x 0` matrix is valid and denotes "empty".
///
/// ```
/// # use densolve_core::Matrix;
/// let a = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// assert_eq!(a.shape(), (2, 3));
/// assert_eq!(a[(1, 0)], 4.0);
/// assert!(a.get(2, 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    // ------------------------------------------------------------------
    // Construction from raw parts
    // ------------------------------------------------------------------

    /// Create a matrix from row-major data.
    ///
    /// Returns an error if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(LinalgError::DimensionMismatch {
                op: "from_vec",
                expected: (rows, cols),
                got: (data.len(), 1),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Create a matrix from a row-major slice (copies the data).
    pub fn from_slice(rows: usize, cols: usize, data: &[f64]) -> Result<Self> {
        Self::from_vec(rows, cols, data.to_vec())
    }

    /// Internal constructor for buffers whose length is already known to fit.
    #[inline]
    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { data, rows, cols }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Whether the matrix has zero elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A flat slice of all elements in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// A mutable flat slice of all elements in row-major order.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consume the matrix and return the underlying row-major buffer.
    #[inline]
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    // ------------------------------------------------------------------
    // Checked element access
    // ------------------------------------------------------------------

    fn flat_index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(LinalgError::IndexOutOfBounds {
                index: (row, col),
                shape: self.shape(),
            });
        }
        Ok(row * self.cols + col)
    }

    /// The element at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        let flat = self.flat_index(row, col)?;
        Ok(self.data[flat])
    }

    /// Set the element at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let flat = self.flat_index(row, col)?;
        self.data[flat] = value;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Map / apply
    // ------------------------------------------------------------------

    /// Apply a function to every element, returning a new matrix.
    pub fn map<F>(&self, f: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            data: self.data.iter().map(|&x| f(x)).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Apply a function element-wise to two matrices of the same shape.
    pub fn zip_map<F>(&self, other: &Matrix, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != other.shape() {
            return Err(LinalgError::DimensionMismatch {
                op: "zip_map",
                expected: self.shape(),
                got: other.shape(),
            });
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Matrix {
            data,
            rows: self.rows,
            cols: self.cols,
        })
    }

    /// Apply a function to every element in place.
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64,
    {
        for x in &mut self.data {
            *x = f(*x);
        }
    }
}

/// Unchecked element access; panics when out of range, like slice indexing.
impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols,
        );
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols,
        );
        &mut self.data[row * self.cols + col]
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec() {
        let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert!(!m.is_square());
    }

    #[test]
    fn test_from_vec_shape_mismatch() {
        let r = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0]);
        assert!(matches!(r, Err(LinalgError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_empty_matrix() {
        let m = Matrix::from_vec(0, 0, vec![]).unwrap();
        assert!(m.is_empty());
        assert!(m.is_square());
        assert!(m.get(0, 0).is_err());
    }

    #[test]
    fn test_get_set() {
        let mut m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m.get(1, 0).unwrap(), 3.0);
        m.set(0, 1, 9.0).unwrap();
        assert_eq!(m[(0, 1)], 9.0);
        m[(1, 1)] = -1.0;
        assert_eq!(m.get(1, 1).unwrap(), -1.0);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let mut m = Matrix::zeros(2, 2);
        let err = m.get(2, 0).unwrap_err();
        assert_eq!(
            err,
            LinalgError::IndexOutOfBounds {
                index: (2, 0),
                shape: (2, 2)
            }
        );
        assert!(m.set(0, 5, 1.0).is_err());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_index_panics() {
        let m = Matrix::zeros(2, 2);
        let _ = m[(0, 2)];
    }

    #[test]
    fn test_map_zip_map() {
        let a = Matrix::from_vec(1, 3, vec![1.0, 2.0, 3.0]).unwrap();
        let b = a.map(|x| x * 10.0);
        assert_eq!(b.as_slice(), &[10.0, 20.0, 30.0]);
        let c = a.zip_map(&b, |x, y| x + y).unwrap();
        assert_eq!(c.as_slice(), &[11.0, 22.0, 33.0]);
        assert!(a.zip_map(&Matrix::zeros(3, 1), |x, y| x + y).is_err());
    }

    #[test]
    fn test_apply_in_place() {
        let mut a = Matrix::from_vec(2, 1, vec![-1.0, 4.0]).unwrap();
        a.apply(f64::abs);
        assert_eq!(a.as_slice(), &[1.0, 4.0]);
    }
}
