//! Error types for sparsekit

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using sparsekit's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
///
/// Callers that expose their own diagnostic surface (shape inference layers,
/// language bindings) switch on the kind rather than on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong rank or number of dimensions
    Shape,
    /// Two operands have shapes that are incompatible for the operation
    ShapeMismatch,
    /// A value violates a domain constraint
    Value,
    /// Mutually exclusive options were requested together
    Config,
    /// Element type not accepted by the operation
    DType,
}

/// Errors that can occur in sparsekit operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Operand has the wrong number of dimensions
    #[error("Invalid rank for '{arg}': expected {expected}, got {got}")]
    InvalidRank {
        /// The argument name
        arg: &'static str,
        /// Human readable description of the accepted ranks
        expected: &'static str,
        /// Actual rank
        got: usize,
    },

    /// Shape mismatch between operands
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Index out of bounds
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index
        index: i64,
        /// Size of the dimension
        size: usize,
    },

    /// Two options that exclude each other were both set
    #[error("Operation '{op}': '{first}' and '{second}' cannot both be set")]
    ConflictingFlags {
        /// The operation name
        op: &'static str,
        /// First flag
        first: &'static str,
        /// Second flag
        second: &'static str,
    },

    /// Option that the operation does not accept was set
    #[error("Operation '{op}' does not support option '{option}'")]
    UnsupportedOption {
        /// The operation name
        op: &'static str,
        /// The rejected option
        option: &'static str,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid rank error
    pub fn invalid_rank(arg: &'static str, expected: &'static str, got: usize) -> Self {
        Self::InvalidRank { arg, expected, got }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRank { .. } => ErrorKind::Shape,
            Self::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            Self::InvalidArgument { .. } | Self::IndexOutOfBounds { .. } => ErrorKind::Value,
            Self::ConflictingFlags { .. } | Self::UnsupportedOption { .. } => ErrorKind::Config,
            Self::UnsupportedDType { .. } => ErrorKind::DType,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::shape_mismatch(&[2, 3], &[3, 2]).kind(),
            ErrorKind::ShapeMismatch
        );
        assert_eq!(
            Error::invalid_rank("dense_shape", "2 or 3", 4).kind(),
            ErrorKind::Shape
        );
        assert_eq!(
            Error::IndexOutOfBounds { index: 5, size: 3 }.kind(),
            ErrorKind::Value
        );
        assert_eq!(
            Error::ConflictingFlags {
                op: "spmm",
                first: "transpose_a",
                second: "adjoint_a"
            }
            .kind(),
            ErrorKind::Config
        );
        assert_eq!(
            Error::unsupported_dtype(DType::Complex64, "minimum").kind(),
            ErrorKind::DType
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::invalid_argument("segment_ids", "must be sorted");
        assert_eq!(
            err.to_string(),
            "Invalid argument 'segment_ids': must be sorted"
        );
    }
}
