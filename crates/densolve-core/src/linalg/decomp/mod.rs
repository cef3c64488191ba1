//! Matrix decompositions.
//!
//! | Decomposition | Module       | Factorization               |
//! |---------------|--------------|-----------------------------|
//! | LU            | [`lu`]       | `PA = LU`                   |
//! | QR            | [`qr`]       | `A = QR`, `A Π = QR`        |
//! | Cholesky      | [`cholesky`] | `A = L L^T`                 |
//! | LDLT          | [`ldlt`]     | `P^T A P = L D L^T`         |
//! | Eigen         | [`eig`]      | `A = V diag(d) V^T`         |
//! | Schur         | [`schur`]    | eigenvalues of general `A`  |
//! | SVD           | [`svd`]      | `A = U diag(s) V^T`         |
//!
//! Decompositions that can detect a singular or ill-conditioned input
//! still return a value and report the condition through `status()`.
//! Inputs a method cannot handle at all (wrong shape, not symmetric,
//! not positive definite) are rejected with a [`LinalgError`](crate::LinalgError).

pub mod cholesky;
pub mod eig;
pub mod ldlt;
pub mod lu;
pub mod qr;
pub mod schur;
pub mod svd;

pub use cholesky::CholeskyDecomposition;
pub use eig::EigDecomposition;
pub use ldlt::{Inertia, LdltDecomposition};
pub use lu::LuDecomposition;
pub use qr::QrDecomposition;
pub use schur::GeneralEigenvalues;
pub use svd::SvdDecomposition;
