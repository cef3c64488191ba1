//! One-dimensional dense vector of `f64`.
//!
//! Right-hand sides, solutions, singular values and eigenvalues are all
//! [`Vector`]s.

use core::fmt;
use core::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

use crate::error::{LinalgError, Result};
use crate::linalg::blas;

/// A dense vector of length `k`.
///
/// ```
/// # use densolve_core::Vector;
/// let v = Vector::from_vec(vec![3.0, 4.0]);
/// assert!((v.norm_l2() - 5.0).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vector {
    data: Vec<f64>,
}

impl Vector {
    pub fn from_vec(data: Vec<f64>) -> Self {
        Self { data }
    }

    pub fn from_slice(data: &[f64]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
        }
    }

    pub fn full(len: usize, value: f64) -> Self {
        Self {
            data: vec![value; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn iter(&self) -> core::slice::Iter<'_, f64> {
        self.data.iter()
    }

    /// The element at `i`, or an out-of-bounds error.
    pub fn get(&self, i: usize) -> Result<f64> {
        self.data
            .get(i)
            .copied()
            .ok_or(LinalgError::IndexOutOfBounds {
                index: (i, 0),
                shape: (self.len(), 1),
            })
    }

    fn check_len(&self, other: &Vector, op: &'static str) -> Result<()> {
        if self.len() != other.len() {
            return Err(LinalgError::vector_len(op, self.len(), other.len()));
        }
        Ok(())
    }

    /// Inner product.
    pub fn dot(&self, other: &Vector) -> Result<f64> {
        self.check_len(other, "dot")?;
        Ok(blas::dot(&self.data, &other.data))
    }

    /// Cross product; defined only for length-3 vectors.
    ///
    /// ```
    /// # use densolve_core::Vector;
    /// let x = Vector::from_vec(vec![1.0, 0.0, 0.0]);
    /// let y = Vector::from_vec(vec![0.0, 1.0, 0.0]);
    /// assert_eq!(x.cross(&y).unwrap().as_slice(), &[0.0, 0.0, 1.0]);
    /// assert!(Vector::zeros(2).cross(&Vector::zeros(2)).is_err());
    /// ```
    pub fn cross(&self, other: &Vector) -> Result<Vector> {
        if self.len() != 3 {
            return Err(LinalgError::vector_len("cross", 3, self.len()));
        }
        if other.len() != 3 {
            return Err(LinalgError::vector_len("cross", 3, other.len()));
        }
        let (a, b) = (&self.data, &other.data);
        Ok(Vector::from_vec(vec![
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]))
    }

    pub fn norm_l1(&self) -> f64 {
        self.data.iter().map(|x| x.abs()).sum()
    }

    /// Euclidean norm, computed without intermediate overflow.
    pub fn norm_l2(&self) -> f64 {
        blas::nrm2(&self.data)
    }

    pub fn norm_inf(&self) -> f64 {
        self.data.iter().fold(0.0, |m, x| m.max(x.abs()))
    }

    /// Unit vector in the same direction; `None` for the zero vector.
    pub fn normalized(&self) -> Option<Vector> {
        let n = self.norm_l2();
        if n == 0.0 || !n.is_finite() {
            return None;
        }
        Some(self.scale(1.0 / n))
    }

    /// Angle between two vectors in radians, in `[0, π]`.
    ///
    /// Returns `None` when either vector is zero.
    pub fn angle(&self, other: &Vector) -> Result<Option<f64>> {
        let d = self.dot(other)?;
        let denom = self.norm_l2() * other.norm_l2();
        if denom == 0.0 {
            return Ok(None);
        }
        Ok(Some((d / denom).clamp(-1.0, 1.0).acos()))
    }

    pub fn add_checked(&self, other: &Vector) -> Result<Vector> {
        self.check_len(other, "add")?;
        Ok(self.zip(other, |a, b| a + b))
    }

    pub fn sub_checked(&self, other: &Vector) -> Result<Vector> {
        self.check_len(other, "sub")?;
        Ok(self.zip(other, |a, b| a - b))
    }

    fn zip(&self, other: &Vector, f: impl Fn(f64, f64) -> f64) -> Vector {
        Vector::from_vec(
            self.data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        )
    }

    pub fn scale(&self, alpha: f64) -> Vector {
        Vector::from_vec(self.data.iter().map(|x| x * alpha).collect())
    }

    /// `self += alpha * x`.
    pub fn axpy(&mut self, alpha: f64, x: &Vector) -> Result<()> {
        self.check_len(x, "axpy")?;
        blas::axpy(alpha, &x.data, &mut self.data);
        Ok(())
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Self::from_vec(data)
    }
}

impl FromIterator<f64> for Vector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Vector {
    type Item = &'a f64;
    type IntoIter = core::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    #[inline]
    fn index(&self, i: usize) -> &f64 {
        &self.data[i]
    }
}

impl IndexMut<usize> for Vector {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.data[i]
    }
}

impl Add for &Vector {
    type Output = Vector;

    fn add(self, rhs: &Vector) -> Vector {
        match self.add_checked(rhs) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl Sub for &Vector {
    type Output = Vector;

    fn sub(self, rhs: &Vector) -> Vector {
        match self.sub_checked(rhs) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl Mul<f64> for &Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        self.scale(rhs)
    }
}

impl Neg for &Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self.scale(-1.0)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match f.precision() {
                Some(p) => write!(f, "{v:.p$}")?,
                None => write!(f, "{v}")?,
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_dot_and_norms() {
        let a = Vector::from_vec(vec![1.0, -2.0, 2.0]);
        let b = Vector::from_vec(vec![4.0, 0.0, 1.0]);
        assert_eq!(a.dot(&b).unwrap(), 6.0);
        assert_eq!(a.norm_l1(), 5.0);
        assert!(approx_eq(a.norm_l2(), 3.0, 1e-15));
        assert_eq!(a.norm_inf(), 2.0);
        assert!(a.dot(&Vector::zeros(2)).is_err());
    }

    #[test]
    fn test_cross_is_orthogonal() {
        let a = Vector::from_vec(vec![1.0, 2.0, 3.0]);
        let b = Vector::from_vec(vec![-2.0, 0.5, 4.0]);
        let c = a.cross(&b).unwrap();
        assert!(approx_eq(c.dot(&a).unwrap(), 0.0, 1e-12));
        assert!(approx_eq(c.dot(&b).unwrap(), 0.0, 1e-12));
        let err = a.cross(&Vector::zeros(4)).unwrap_err();
        assert_eq!(err.status(), crate::SolveStatus::DimensionMismatch);
    }

    #[test]
    fn test_normalized_and_angle() {
        let v = Vector::from_vec(vec![3.0, 0.0, 4.0]);
        let u = v.normalized().unwrap();
        assert!(approx_eq(u.norm_l2(), 1.0, 1e-15));
        assert!(Vector::zeros(3).normalized().is_none());

        let x = Vector::from_vec(vec![1.0, 0.0]);
        let y = Vector::from_vec(vec![0.0, 2.0]);
        let theta = x.angle(&y).unwrap().unwrap();
        assert!(approx_eq(theta, core::f64::consts::FRAC_PI_2, 1e-15));
        assert!(x.angle(&Vector::zeros(2)).unwrap().is_none());
    }

    #[test]
    fn test_arithmetic() {
        let a = Vector::from_vec(vec![1.0, 2.0]);
        let b = Vector::from_vec(vec![3.0, 5.0]);
        assert_eq!((&a + &b).as_slice(), &[4.0, 7.0]);
        assert_eq!((&b - &a).as_slice(), &[2.0, 3.0]);
        assert_eq!((&a * 3.0).as_slice(), &[3.0, 6.0]);
        assert_eq!((-&a).as_slice(), &[-1.0, -2.0]);
        let mut c = a.clone();
        c.axpy(2.0, &b).unwrap();
        assert_eq!(c.as_slice(), &[7.0, 12.0]);
        assert!(c.axpy(1.0, &Vector::zeros(3)).is_err());
        assert!(a.add_checked(&Vector::zeros(1)).is_err());
    }

    #[test]
    fn test_get_and_display() {
        let a = Vector::from_vec(vec![1.0, 2.5]);
        assert_eq!(a.get(1).unwrap(), 2.5);
        assert!(a.get(2).is_err());
        assert_eq!(format!("{a}"), "[1, 2.5]");
        assert_eq!(format!("{a:.2}"), "[1.00, 2.50]");
    }
}
