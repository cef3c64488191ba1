use core::fmt;

use thiserror::Error;

/// Outcome tag attached to every decomposition and solve.
///
/// Hard failures surface as a [`LinalgError`] (see [`LinalgError::status`]);
/// soft failures are reported by the `status()` accessor of an otherwise
/// usable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// The algorithm ran to completion and its preconditions held.
    Success,
    /// A pivot fell below the tolerance; factors are returned but unreliable.
    SingularOrIllConditioned,
    /// A symmetric-only algorithm received a non-symmetric matrix.
    NotSymmetric,
    /// A Cholesky pivot was non-positive.
    NotPositiveDefinite,
    /// Operand shapes do not fit the requested operation.
    DimensionMismatch,
    /// An iterative algorithm hit its iteration cap before the tolerance.
    DidNotConverge,
}

impl SolveStatus {
    /// Whether this is [`SolveStatus::Success`].
    #[inline]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::SingularOrIllConditioned => "singular or ill-conditioned",
            Self::NotSymmetric => "not symmetric",
            Self::NotPositiveDefinite => "not positive definite",
            Self::DimensionMismatch => "dimension mismatch",
            Self::DidNotConverge => "did not converge",
        };
        f.write_str(s)
    }
}

/// All errors returned by `densolve-core`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// Operand shapes do not match the layout `op` requires.
    #[error("{op}: dimension mismatch, expected {}x{}, got {}x{}", expected.0, expected.1, got.0, got.1)]
    DimensionMismatch {
        op: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// An element index is out of range.
    #[error("index ({}, {}) out of bounds for {}x{} matrix", index.0, index.1, shape.0, shape.1)]
    IndexOutOfBounds {
        index: (usize, usize),
        shape: (usize, usize),
    },

    /// The matrix is not symmetric within tolerance.
    #[error("matrix is not symmetric")]
    NotSymmetric,

    /// The Cholesky pivot at `index` was non-positive.
    #[error("matrix is not positive definite (pivot {index})")]
    NotPositiveDefinite { index: usize },

    /// The matrix is singular and a strict operation cannot proceed.
    #[error("matrix is singular")]
    Singular,
}

impl LinalgError {
    /// The [`SolveStatus`] this error reports.
    pub fn status(&self) -> SolveStatus {
        match self {
            Self::DimensionMismatch { .. } | Self::IndexOutOfBounds { .. } => {
                SolveStatus::DimensionMismatch
            }
            Self::NotSymmetric => SolveStatus::NotSymmetric,
            Self::NotPositiveDefinite { .. } => SolveStatus::NotPositiveDefinite,
            Self::Singular => SolveStatus::SingularOrIllConditioned,
        }
    }

    pub(crate) fn not_square(op: &'static str, rows: usize, cols: usize) -> Self {
        Self::DimensionMismatch {
            op,
            expected: (rows, rows),
            got: (rows, cols),
        }
    }

    pub(crate) fn vector_len(op: &'static str, expected: usize, got: usize) -> Self {
        Self::DimensionMismatch {
            op,
            expected: (expected, 1),
            got: (got, 1),
        }
    }
}

/// Convenience alias used throughout `densolve-core`.
pub type Result<T> = std::result::Result<T, LinalgError>;
