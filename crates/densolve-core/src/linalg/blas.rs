//! BLAS-style kernels on raw `f64` slices.
//!
//! These are the inner loops shared by the decompositions. They do not
//! validate lengths beyond what slice indexing enforces; callers check
//! shapes at the [`Matrix`](crate::Matrix) level first.
//!
//! Triangular routines take a row-major buffer `a` with row stride
//! `stride` and operate on its leading `n x n` block.

// ======================================================================
// BLAS Level 1: vector operations, O(n)
// ======================================================================

/// Inner (dot) product `sum(x_i * y_i)` over the shorter of the two slices.
///
/// ```
/// # use densolve_core::linalg::blas::dot;
/// assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
/// ```
#[inline]
pub fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(&a, &b)| a * b).sum()
}

/// `y = alpha * x + y`.
#[inline]
pub fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// `x = alpha * x`.
#[inline]
pub fn scal(alpha: f64, x: &mut [f64]) {
    for xi in x {
        *xi *= alpha;
    }
}

/// Euclidean norm with scaling, so entries near `f64::MAX` do not overflow.
///
/// ```
/// # use densolve_core::linalg::blas::nrm2;
/// assert!((nrm2(&[3.0, 4.0]) - 5.0).abs() < 1e-15);
/// assert!(nrm2(&[1e300, 1e300]).is_finite());
/// ```
pub fn nrm2(x: &[f64]) -> f64 {
    let mut scale = 0.0_f64;
    let mut ssq = 1.0_f64;
    for &v in x {
        if v != 0.0 {
            let a = v.abs();
            if scale < a {
                let r = scale / a;
                ssq = 1.0 + ssq * r * r;
                scale = a;
            } else {
                let r = a / scale;
                ssq += r * r;
            }
        }
    }
    scale * ssq.sqrt()
}

/// Power of two that brings `max_abs` close to one.
///
/// Multiplying by it (and later by its reciprocal) is exact, so iterative
/// kernels can work on unit-scale data whose squares neither overflow nor
/// underflow. Returns `1.0` for zero or non-finite input.
pub fn unit_scale(max_abs: f64) -> f64 {
    if max_abs == 0.0 || !max_abs.is_finite() {
        return 1.0;
    }
    #[allow(clippy::cast_possible_truncation)]
    let e = (max_abs.log2().round() as i32).clamp(-1022, 1022);
    2.0_f64.powi(-e)
}

// ======================================================================
// BLAS Level 2: matrix-vector operations, O(n^2)
// ======================================================================

/// `y = alpha * A * x + beta * y` for a row-major `m x n` block `a`.
///
/// If `beta` is zero, `y` is overwritten (not read).
///
/// ```
/// # use densolve_core::linalg::blas::gemv;
/// let mut y = [0.0; 2];
/// gemv(2, 2, 1.0, &[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0], 0.0, &mut y);
/// assert_eq!(y, [17.0, 39.0]);
/// ```
#[allow(clippy::many_single_char_names)]
pub fn gemv(m: usize, n: usize, alpha: f64, a: &[f64], x: &[f64], beta: f64, y: &mut [f64]) {
    for (i, yi) in y.iter_mut().enumerate().take(m) {
        let ax = dot(&a[i * n..(i + 1) * n], &x[..n]);
        *yi = if beta == 0.0 {
            alpha * ax
        } else {
            alpha * ax + beta * *yi
        };
    }
}

// ======================================================================
// BLAS Level 3: matrix-matrix operations, O(n^3)
// ======================================================================

/// `C = alpha * A * B + beta * C` with `A: m x k`, `B: k x n`, `C: m x n`,
/// all row-major and contiguous.
///
/// Uses the i-p-j loop order so the innermost loop streams rows of `B`
/// and `C`.
#[allow(clippy::many_single_char_names)]
#[allow(clippy::too_many_arguments)]
pub fn gemm(
    m: usize,
    k: usize,
    n: usize,
    alpha: f64,
    a: &[f64],
    b: &[f64],
    beta: f64,
    c: &mut [f64],
) {
    for i in 0..m {
        let c_row = &mut c[i * n..(i + 1) * n];
        if beta == 0.0 {
            c_row.fill(0.0);
        } else if beta != 1.0 {
            scal(beta, c_row);
        }
        for p in 0..k {
            let aip = alpha * a[i * k + p];
            if aip == 0.0 {
                continue;
            }
            axpy(aip, &b[p * n..(p + 1) * n], c_row);
        }
    }
}

// ======================================================================
// Triangular solves, O(n^2)
// ======================================================================

/// Solve `L x = b` in place, `L` lower triangular.
///
/// With `unit_diag` the diagonal is taken to be one and never read.
pub fn solve_lower(a: &[f64], stride: usize, n: usize, unit_diag: bool, b: &mut [f64]) {
    for i in 0..n {
        let row = &a[i * stride..i * stride + i];
        let mut s = b[i] - dot(row, &b[..i]);
        if !unit_diag {
            s /= a[i * stride + i];
        }
        b[i] = s;
    }
}

/// Solve `U x = b` in place, `U` upper triangular.
pub fn solve_upper(a: &[f64], stride: usize, n: usize, b: &mut [f64]) {
    for i in (0..n).rev() {
        let row = &a[i * stride + i + 1..i * stride + n];
        let s = b[i] - dot(row, &b[i + 1..n]);
        b[i] = s / a[i * stride + i];
    }
}

/// Solve `Lᵀ x = b` in place, reading only the lower triangle of `a`.
pub fn solve_lower_transpose(a: &[f64], stride: usize, n: usize, unit_diag: bool, b: &mut [f64]) {
    for i in (0..n).rev() {
        let mut s = b[i];
        for k in (i + 1)..n {
            s -= a[k * stride + i] * b[k];
        }
        if !unit_diag {
            s /= a[i * stride + i];
        }
        b[i] = s;
    }
}

/// Solve `Uᵀ x = b` in place, reading only the upper triangle of `a`.
pub fn solve_upper_transpose(a: &[f64], stride: usize, n: usize, b: &mut [f64]) {
    for i in 0..n {
        let mut s = b[i];
        for k in 0..i {
            s -= a[k * stride + i] * b[k];
        }
        b[i] = s / a[i * stride + i];
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_gemv_beta_accumulates() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut y = [1.0, 1.0];
        gemv(2, 3, 2.0, &a, &[1.0, 0.0, -1.0], 3.0, &mut y);
        // A x = [-2, -2]
        assert_eq!(y, [-1.0, -1.0]);
    }

    #[test]
    fn test_gemm_numpy_reference() {
        // >>> np.array([[1,2],[3,4],[5,6]]) @ np.array([[7,8,9],[10,11,12]])
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let mut c = [f64::NAN; 9];
        gemm(3, 2, 3, 1.0, &a, &b, 0.0, &mut c);
        assert_eq!(c, [27.0, 30.0, 33.0, 61.0, 68.0, 75.0, 95.0, 106.0, 117.0]);
    }

    #[test]
    fn test_unit_scale_is_exact_power_of_two() {
        for x in [1e-300, 3e-200, 0.7, 1.0, 5e150, 1e300] {
            let sc = unit_scale(x);
            assert_eq!(sc.to_bits() & ((1_u64 << 52) - 1), 0, "{sc} is not a power of two");
            let y = x * sc;
            assert!((0.5..=2.0).contains(&y), "{x} scaled to {y}");
            assert_eq!(y / sc, x);
        }
        assert_eq!(unit_scale(0.0), 1.0);
        assert_eq!(unit_scale(f64::INFINITY), 1.0);
        assert!(unit_scale(f64::MIN_POSITIVE / 8.0).is_finite());
    }

    #[test]
    fn test_dot_numpy_reference() {
        // >>> np.dot([1,2,3,4,5], [5,4,3,2,1])
        // 35
        assert_eq!(dot(&[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0, 4.0, 3.0, 2.0, 1.0]), 35.0);
        assert_eq!(dot(&[], &[]), 0.0);
    }

    #[test]
    fn test_axpy_scal() {
        let mut y = vec![10.0, 20.0, 30.0];
        axpy(2.0, &[1.0, 2.0, 3.0], &mut y);
        assert_eq!(y, vec![12.0, 24.0, 36.0]);
        scal(0.5, &mut y);
        assert_eq!(y, vec![6.0, 12.0, 18.0]);
    }

    #[test]
    fn test_nrm2_numpy_reference() {
        // >>> np.linalg.norm([1, 2, 3, 4, 5])
        // 7.416198487095663
        let n = nrm2(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((n - 7.416_198_487_095_663).abs() < 1e-12);
        assert_eq!(nrm2(&[]), 0.0);
        assert_eq!(nrm2(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_nrm2_no_overflow() {
        let n = nrm2(&[1e200, 1e200]);
        assert!((n / 1e200 - 2.0_f64.sqrt()).abs() < 1e-14);
    }

    #[test]
    fn test_triangular_solves() {
        // L = [[2, 0], [1, 4]] stored with stride 3 (extra column ignored).
        let l = [2.0, 0.0, 99.0, 1.0, 4.0, 99.0];
        let mut b = [4.0, 10.0];
        solve_lower(&l, 3, 2, false, &mut b);
        assert_eq!(b, [2.0, 2.0]);

        // Lᵀ = [[2, 1], [0, 4]]
        let mut c = [4.0, 8.0];
        solve_lower_transpose(&l, 3, 2, false, &mut c);
        assert_eq!(c, [1.0, 2.0]);

        // Unit diagonal ignores the stored 2 and 4.
        let mut d = [1.0, 3.0];
        solve_lower(&l, 3, 2, true, &mut d);
        assert_eq!(d, [1.0, 2.0]);

        // U = [[2, 1], [0, 4]]
        let u = [2.0, 1.0, 0.0, 4.0];
        let mut e = [4.0, 8.0];
        solve_upper(&u, 2, 2, &mut e);
        assert_eq!(e, [1.0, 2.0]);

        // Uᵀ = [[2, 0], [1, 4]]
        let mut f = [4.0, 10.0];
        solve_upper_transpose(&u, 2, 2, &mut f);
        assert_eq!(f, [2.0, 2.0]);
    }
}
