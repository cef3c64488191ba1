//! The Jacobi plane rotation shared by the symmetric eigensolver and the
//! one-sided SVD.
//!
//! For a symmetric 2x2 block `[[app, apq], [apq, aqq]]` the rotation
//! `J = [[c, s], [-s, c]]` makes `Jᵀ [[app, apq], [apq, aqq]] J` diagonal.

/// A plane rotation in the `(p, q)` plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct JacobiRotation {
    pub c: f64,
    pub s: f64,
    /// `tan` of the rotation angle; shifts the diagonal by `∓ t·apq`.
    pub t: f64,
}

impl JacobiRotation {
    /// The rotation annihilating `apq`, or `None` when it is already zero.
    pub(crate) fn annihilating(app: f64, aqq: f64, apq: f64) -> Option<Self> {
        if apq == 0.0 {
            return None;
        }
        let theta = (aqq - app) / (2.0 * apq);
        // θ² overflows for very large θ; use the first-order expansion.
        let t = if theta.abs() > 1e150 {
            0.5 / theta
        } else {
            let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
            sign / (theta.abs() + theta.mul_add(theta, 1.0).sqrt())
        };
        let c = 1.0 / t.mul_add(t, 1.0).sqrt();
        Some(Self { c, s: t * c, t })
    }

    /// Rotate columns `p` and `q` of a row-major buffer with `rows` rows.
    ///
    /// `col_p ← c·col_p − s·col_q`, `col_q ← s·col_p + c·col_q`.
    #[inline]
    pub(crate) fn rotate_columns(&self, data: &mut [f64], stride: usize, rows: usize, p: usize, q: usize) {
        for r in 0..rows {
            let xp = data[r * stride + p];
            let xq = data[r * stride + q];
            data[r * stride + p] = self.c * xp - self.s * xq;
            data[r * stride + q] = self.s * xp + self.c * xq;
        }
    }

    /// Apply `Jᵀ S J` to a symmetric `n x n` buffer, zeroing `S[p][q]`.
    pub(crate) fn apply_symmetric(&self, s: &mut [f64], n: usize, p: usize, q: usize) {
        let apq = s[p * n + q];
        for r in 0..n {
            if r == p || r == q {
                continue;
            }
            let srp = s[r * n + p];
            let srq = s[r * n + q];
            let np = self.c * srp - self.s * srq;
            let nq = self.s * srp + self.c * srq;
            s[r * n + p] = np;
            s[p * n + r] = np;
            s[r * n + q] = nq;
            s[q * n + r] = nq;
        }
        s[p * n + p] -= self.t * apq;
        s[q * n + q] += self.t * apq;
        s[p * n + q] = 0.0;
        s[q * n + p] = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_no_rotation_for_zero() {
        assert!(JacobiRotation::annihilating(1.0, 2.0, 0.0).is_none());
    }

    #[test]
    fn test_rotation_is_orthonormal() {
        let r = JacobiRotation::annihilating(2.0, -1.0, 0.7).unwrap();
        assert!(approx_eq(r.c * r.c + r.s * r.s, 1.0, 1e-15));
        // |t| <= 1 selects the smaller of the two possible angles.
        assert!(r.t.abs() <= 1.0);
    }

    #[test]
    fn test_diagonalizes_2x2() {
        // [[2, 1], [1, 3]] has eigenvalues (5 ± sqrt(5)) / 2.
        let mut s = vec![2.0, 1.0, 1.0, 3.0];
        let r = JacobiRotation::annihilating(s[0], s[3], s[1]).unwrap();
        r.apply_symmetric(&mut s, 2, 0, 1);
        let lo = (5.0 - 5.0_f64.sqrt()) / 2.0;
        let hi = (5.0 + 5.0_f64.sqrt()) / 2.0;
        assert!(approx_eq(s[0], lo, 1e-14));
        assert!(approx_eq(s[3], hi, 1e-14));
        assert!(s[1].abs() < f64::EPSILON && s[2].abs() < f64::EPSILON);
    }

    #[test]
    fn test_equal_diagonal_uses_45_degrees() {
        let r = JacobiRotation::annihilating(1.0, 1.0, 0.5).unwrap();
        assert!(approx_eq(r.t, 1.0, 1e-15));
        assert!(approx_eq(r.c, core::f64::consts::FRAC_1_SQRT_2, 1e-15));
    }

    #[test]
    fn test_column_rotation_orthogonalizes() {
        // Columns a = [1, 1], b = [1, 0]; Gram = [[2, 1], [1, 1]].
        let mut m = vec![1.0, 1.0, 1.0, 0.0];
        let r = JacobiRotation::annihilating(2.0, 1.0, 1.0).unwrap();
        r.rotate_columns(&mut m, 2, 2, 0, 1);
        let g = m[0] * m[1] + m[2] * m[3];
        assert!(g.abs() < 1e-15);
    }
}
