//! Matrix creation functions analogous to `np.zeros`, `np.eye`, etc.

use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use crate::error::{LinalgError, Result};
use crate::vector::Vector;

use super::Matrix;

/// Build a [`Matrix`] from row literals.
///
/// Every row must have the same length; this is checked at compile time
/// through the array type.
///
/// ```
/// # use densolve_core::matrix;
/// let a = matrix![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
/// assert_eq!(a.shape(), (3, 2));
/// assert_eq!(a[(2, 1)], 6.0);
/// ```
#[macro_export]
macro_rules! matrix {
    ($([$($x:expr),* $(,)?]),+ $(,)?) => {
        $crate::Matrix::from_array([$([$($x),*]),+])
    };
}

impl Matrix {
    /// Create a matrix filled with zeros.
    ///
    /// ```
    /// # use densolve_core::Matrix;
    /// let m = Matrix::zeros(2, 3);
    /// assert_eq!(m.shape(), (2, 3));
    /// assert!(m.as_slice().iter().all(|&x| x == 0.0));
    /// ```
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_parts(rows, cols, vec![0.0; rows * cols])
    }

    /// Create a matrix filled with a constant value.
    pub fn full(rows: usize, cols: usize, value: f64) -> Self {
        Self::from_parts(rows, cols, vec![value; rows * cols])
    }

    /// Create an identity matrix of size `n x n`.
    ///
    /// ```
    /// # use densolve_core::Matrix;
    /// let eye = Matrix::eye(3);
    /// assert_eq!(eye[(0, 0)], 1.0);
    /// assert_eq!(eye[(0, 1)], 0.0);
    /// ```
    pub fn eye(n: usize) -> Self {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Self::from_parts(n, n, data)
    }

    /// Create a matrix whose `(i, j)` entry is `f(i, j)`.
    pub fn from_fn<F>(rows: usize, cols: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self::from_parts(rows, cols, data)
    }

    /// Create a square diagonal matrix from its diagonal entries.
    pub fn from_diag(diag: &[f64]) -> Self {
        let n = diag.len();
        let mut data = vec![0.0; n * n];
        for (i, &d) in diag.iter().enumerate() {
            data[i * n + i] = d;
        }
        Self::from_parts(n, n, data)
    }

    /// Create a matrix from a list of rows.
    ///
    /// Fails with a dimension mismatch when the rows are ragged. An empty
    /// list yields the `0 x 0` matrix.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != ncols {
                return Err(LinalgError::DimensionMismatch {
                    op: "from_rows",
                    expected: (1, ncols),
                    got: (1, row.len()),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self::from_parts(nrows, ncols, data))
    }

    /// Create a matrix from a fixed-size array of rows.
    pub fn from_array<const R: usize, const C: usize>(rows: [[f64; C]; R]) -> Self {
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::from_parts(R, C, data)
    }

    /// Create a matrix whose columns are the given vectors.
    pub fn from_columns(columns: &[Vector]) -> Result<Self> {
        let ncols = columns.len();
        let nrows = columns.first().map_or(0, Vector::len);
        let mut m = Self::zeros(nrows, ncols);
        for (j, c) in columns.iter().enumerate() {
            if c.len() != nrows {
                return Err(LinalgError::vector_len("from_columns", nrows, c.len()));
            }
            for (i, &v) in c.iter().enumerate() {
                m.data[i * ncols + j] = v;
            }
        }
        Ok(m)
    }

    /// Create a matrix with entries drawn uniformly from `[-1, 1)`.
    ///
    /// ```
    /// # use densolve_core::Matrix;
    /// use rand::SeedableRng;
    /// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    /// let m = Matrix::random(3, 4, &mut rng);
    /// assert!(m.as_slice().iter().all(|x| (-1.0..1.0).contains(x)));
    /// ```
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let dist = Uniform::new(-1.0, 1.0);
        let data = (0..rows * cols).map(|_| dist.sample(rng)).collect();
        Self::from_parts(rows, cols, data)
    }

    /// Create a random symmetric positive-definite matrix `M Mᵀ + n I`.
    pub fn random_spd<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let m = Self::random(n, n, rng);
        let mut spd = m.matmul(&m.transpose()).unwrap_or_else(|_| Self::zeros(n, n));
        for i in 0..n {
            spd.data[i * n + i] += n as f64;
        }
        spd
    }

    /// The main diagonal as a vector (length `min(rows, cols)`).
    pub fn diag(&self) -> Vector {
        let k = self.rows.min(self.cols);
        Vector::from_vec((0..k).map(|i| self.data[i * self.cols + i]).collect())
    }
}
