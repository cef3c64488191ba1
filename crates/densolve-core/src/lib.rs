//! `densolve-core`: dense linear algebra on `f64` matrices.
//!
//! Provides the [`Matrix`] and [`Vector`] containers, the standard
//! decompositions (LU, QR, Cholesky, LDLT, symmetric and general
//! eigenvalue problems, SVD) and the linear / least-squares solvers built
//! on them.
//!
//! # Design
//!
//! - **No external BLAS.** Every kernel is written from scratch in safe
//!   Rust over row-major slices.
//! - **Failures are values.** Shape and precondition violations return a
//!   [`LinalgError`]; numerical trouble (a tiny pivot, an iteration cap)
//!   is reported through the `status()` of an otherwise usable result.
//! - **Tolerances are explicit.** Every entry point has a `*_with` variant
//!   taking [`Options`].
//!
//! ```
//! use densolve_core::prelude::*;
//!
//! let a = matrix![[3.0, 2.0, 1.0], [2.0, 3.0, 2.0], [1.0, 2.0, 3.0]];
//! let b = Vector::from_vec(vec![1.0, 2.0, 3.0]);
//! let sol = linalg::solve(&a, &b).unwrap();
//! assert_eq!(sol.status(), SolveStatus::Success);
//! assert!(sol.residual_norm() < 1e-12);
//! ```

pub mod error;
pub mod linalg;
pub mod matrix;
pub mod options;
pub mod vector;

// Re-export key types at crate root for convenience.
pub use error::{LinalgError, Result, SolveStatus};
pub use matrix::Matrix;
pub use options::Options;
pub use vector::Vector;

/// Items intended for glob-import: `use densolve_core::prelude::*;`
pub mod prelude {
    pub use crate::error::{LinalgError, Result, SolveStatus};
    pub use crate::linalg::{self, Solution, SolveMethod};
    pub use crate::matrix;
    pub use crate::matrix::Matrix;
    pub use crate::options::Options;
    pub use crate::vector::Vector;
}
