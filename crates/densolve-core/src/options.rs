//! Numerical tolerances and iteration caps.
//!
//! Every `*_with` entry point in [`crate::linalg`] takes an [`Options`];
//! the plain entry points use [`Options::default`].
//!
//! ```
//! # use densolve_core::Options;
//! let opts = Options::default().with_tolerance(1e-12).with_max_sweeps(50);
//! assert_eq!(opts.tolerance, 1e-12);
//! assert_eq!(opts.max_sweeps, 50);
//! ```

/// Default relative tolerance for "near-zero" decisions.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default relative off-diagonal tolerance for Jacobi sweeps.
pub const DEFAULT_CONVERGENCE: f64 = 1e-14;

/// Default cap on Jacobi sweeps.
pub const DEFAULT_MAX_SWEEPS: usize = 100;

/// Default Francis QR iteration budget per eigenvalue.
pub const DEFAULT_QR_ITERATIONS: usize = 30;

/// Tolerances and iteration budgets shared by all algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    /// Relative tolerance for pivot, symmetry and rank decisions.
    ///
    /// Scaled by the largest absolute entry of the input (or by the largest
    /// diagonal of `R` / the largest singular value for rank decisions).
    pub tolerance: f64,
    /// Relative off-diagonal threshold at which Jacobi iteration stops.
    pub convergence: f64,
    /// Maximum number of Jacobi sweeps (eigensolver and SVD).
    pub max_sweeps: usize,
    /// Francis QR iterations allowed per eigenvalue in the general solver.
    pub qr_iterations_per_eigenvalue: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            convergence: DEFAULT_CONVERGENCE,
            max_sweeps: DEFAULT_MAX_SWEEPS,
            qr_iterations_per_eigenvalue: DEFAULT_QR_ITERATIONS,
        }
    }
}

impl Options {
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_convergence(mut self, convergence: f64) -> Self {
        self.convergence = convergence;
        self
    }

    #[must_use]
    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    #[must_use]
    pub fn with_qr_iterations(mut self, per_eigenvalue: usize) -> Self {
        self.qr_iterations_per_eigenvalue = per_eigenvalue;
        self
    }

    /// Absolute threshold for a matrix whose largest entry is `scale`.
    #[inline]
    pub(crate) fn threshold(&self, scale: f64) -> f64 {
        self.tolerance * scale
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let o = Options::default();
        assert_eq!(o.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(o.convergence, DEFAULT_CONVERGENCE);
        assert_eq!(o.max_sweeps, DEFAULT_MAX_SWEEPS);
        assert_eq!(o.qr_iterations_per_eigenvalue, DEFAULT_QR_ITERATIONS);
    }

    #[test]
    fn test_threshold_scales() {
        let o = Options::default().with_tolerance(1e-6);
        assert!((o.threshold(100.0) - 1e-4).abs() < 1e-18);
        assert_eq!(o.threshold(0.0), 0.0);
    }
}
