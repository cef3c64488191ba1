//! # Densolve
//!
//! Dense linear algebra in pure Rust: matrix and vector containers, LU,
//! QR, Cholesky and LDLT factorizations, symmetric, generalized and general
//! eigenvalue problems, the SVD, and linear / least-squares solvers.
//!
//! One `use densolve::prelude::*;` brings in the containers, the
//! [`matrix!`] macro, [`Options`], the error types and the [`linalg`]
//! module.
//!
//! ```
//! use densolve::prelude::*;
//!
//! let a = matrix![[4.0, 1.0], [1.0, 3.0]];
//! let eig = linalg::eigen_symmetric(&a).unwrap();
//! let vals = eig.eigenvalues();
//! assert!(vals[0] < vals[1]);
//! ```

pub use densolve_core as core;
pub use densolve_core::{
    LinalgError, Matrix, Options, Result, SolveStatus, Vector, linalg, matrix,
};

/// Glob-import convenience: `use densolve::prelude::*;`
pub mod prelude {
    pub use densolve_core::prelude::*;
}
