//! Row, column and block access for [`Matrix`].

use crate::error::{LinalgError, Result};
use crate::vector::Vector;

use super::Matrix;

impl Matrix {
    /// Row `i` as a contiguous slice.
    pub fn row_slice(&self, i: usize) -> Result<&[f64]> {
        if i >= self.rows {
            return Err(LinalgError::IndexOutOfBounds {
                index: (i, 0),
                shape: self.shape(),
            });
        }
        Ok(&self.data[i * self.cols..(i + 1) * self.cols])
    }

    /// Row `i` copied into a [`Vector`].
    pub fn row(&self, i: usize) -> Result<Vector> {
        self.row_slice(i).map(|r| Vector::from_vec(r.to_vec()))
    }

    /// Column `j` copied into a [`Vector`].
    pub fn col(&self, j: usize) -> Result<Vector> {
        if j >= self.cols {
            return Err(LinalgError::IndexOutOfBounds {
                index: (0, j),
                shape: self.shape(),
            });
        }
        Ok(Vector::from_vec(
            (0..self.rows).map(|i| self.data[i * self.cols + j]).collect(),
        ))
    }

    /// Copy the `nrows x ncols` block whose top-left corner is `(row, col)`.
    ///
    /// ```
    /// # use densolve_core::matrix;
    /// let a = matrix![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
    /// let b = a.block(1, 1, 2, 2).unwrap();
    /// assert_eq!(b, matrix![[5.0, 6.0], [8.0, 9.0]]);
    /// ```
    pub fn block(&self, row: usize, col: usize, nrows: usize, ncols: usize) -> Result<Matrix> {
        self.check_block(row, col, nrows, ncols)?;
        let mut out = Vec::with_capacity(nrows * ncols);
        for i in row..row + nrows {
            let start = i * self.cols + col;
            out.extend_from_slice(&self.data[start..start + ncols]);
        }
        Ok(Matrix::from_parts(nrows, ncols, out))
    }

    /// Overwrite the block starting at `(row, col)` with `src`.
    pub fn set_block(&mut self, row: usize, col: usize, src: &Matrix) -> Result<()> {
        self.check_block(row, col, src.rows, src.cols)?;
        for i in 0..src.rows {
            let dst = (row + i) * self.cols + col;
            self.data[dst..dst + src.cols]
                .copy_from_slice(&src.data[i * src.cols..(i + 1) * src.cols]);
        }
        Ok(())
    }

    fn check_block(&self, row: usize, col: usize, nrows: usize, ncols: usize) -> Result<()> {
        if row + nrows > self.rows || col + ncols > self.cols {
            return Err(LinalgError::IndexOutOfBounds {
                index: (row + nrows, col + ncols),
                shape: self.shape(),
            });
        }
        Ok(())
    }

    /// Swap rows `a` and `b` in place. Panics when either is out of range.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let c = self.cols;
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.data.split_at_mut(hi * c);
        head[lo * c..(lo + 1) * c].swap_with_slice(&mut tail[..c]);
    }

    /// Swap columns `a` and `b` in place. Panics when either is out of range.
    pub fn swap_cols(&mut self, a: usize, b: usize) {
        assert!(a < self.cols && b < self.cols, "column index out of range");
        for i in 0..self.rows {
            self.data.swap(i * self.cols + a, i * self.cols + b);
        }
    }

    /// Iterate over rows as slices.
    pub fn row_iter(&self) -> impl Iterator<Item = &[f64]> {
        let c = self.cols;
        (0..self.rows).map(move |i| &self.data[i * c..(i + 1) * c])
    }
}
