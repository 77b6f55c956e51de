//! Per-operation configuration structs
//!
//! Each struct is a plain value with a `Default` matching the operator's
//! documented defaults. Validation of option combinations happens once, in
//! [`SparseOp::new`](super::SparseOp::new).

use std::str::FromStr;

use crate::error::{Error, Result};

/// Options for sparse × dense and sparse × sparse matrix products
///
/// At most one of `transpose_a` / `adjoint_a` may be set, likewise for `b`.
/// Adjoint is transpose plus complex conjugation; for real element types
/// it is equivalent to transpose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatMulConfig {
    /// Transpose the sparse (left) operand before multiplying
    pub transpose_a: bool,
    /// Conjugate-transpose the sparse (left) operand before multiplying
    pub adjoint_a: bool,
    /// Transpose the right operand before multiplying
    pub transpose_b: bool,
    /// Conjugate-transpose the right operand before multiplying
    pub adjoint_b: bool,
    /// Transpose the product (dense output only)
    pub transpose_output: bool,
    /// Conjugate the product (dense output only)
    pub conjugate_output: bool,
}

impl MatMulConfig {
    /// Configuration with every option off
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `transpose_a`
    pub fn transpose_a(mut self, on: bool) -> Self {
        self.transpose_a = on;
        self
    }

    /// Set `adjoint_a`
    pub fn adjoint_a(mut self, on: bool) -> Self {
        self.adjoint_a = on;
        self
    }

    /// Set `transpose_b`
    pub fn transpose_b(mut self, on: bool) -> Self {
        self.transpose_b = on;
        self
    }

    /// Set `adjoint_b`
    pub fn adjoint_b(mut self, on: bool) -> Self {
        self.adjoint_b = on;
        self
    }

    /// Set `transpose_output`
    pub fn transpose_output(mut self, on: bool) -> Self {
        self.transpose_output = on;
        self
    }

    /// Set `conjugate_output`
    pub fn conjugate_output(mut self, on: bool) -> Self {
        self.conjugate_output = on;
        self
    }

    /// How the left operand is viewed by the kernel
    #[inline]
    pub(crate) fn lhs(&self) -> OperandView {
        OperandView {
            transpose: self.transpose_a || self.adjoint_a,
            conjugate: self.adjoint_a,
        }
    }

    /// How the right operand is viewed by the kernel
    #[inline]
    pub(crate) fn rhs(&self) -> OperandView {
        OperandView {
            transpose: self.transpose_b || self.adjoint_b,
            conjugate: self.adjoint_b,
        }
    }
}

/// Resolved transpose/conjugate view of one matmul operand
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct OperandView {
    pub transpose: bool,
    pub conjugate: bool,
}

/// Options for CSR transpose
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransposeConfig {
    /// Conjugate the values while transposing
    pub conjugate: bool,
}

/// Options for thresholded COO addition
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SparseAddConfig {
    /// Output entries whose magnitude is below this value are dropped
    pub thresh: f64,
}

/// Options for sparse segment reductions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentConfig {
    /// Explicit number of output segments; `None` requires contiguous ids
    pub num_segments: Option<usize>,
}

/// Options for COO concatenation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConcatConfig {
    /// Axis to concatenate along, negative values count from the end
    pub dim: isize,
}

/// Options for COO split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    /// Axis to split along
    pub dim: usize,
    /// Number of output pieces
    pub num_split: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            dim: 0,
            num_split: 1,
        }
    }
}

/// Which set each group of a set operation produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SetOperationKind {
    /// Values of `x1` absent from `x2`
    #[default]
    AMinusB,
    /// Values of `x2` absent from `x1`
    BMinusA,
    /// Values present in both
    Intersection,
    /// Values present in either
    Union,
}

impl SetOperationKind {
    /// Canonical spelling (`"a-b"`, `"b-a"`, `"intersection"`, `"union"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AMinusB => "a-b",
            Self::BMinusA => "b-a",
            Self::Intersection => "intersection",
            Self::Union => "union",
        }
    }
}

impl FromStr for SetOperationKind {
    type Err = Error;

    /// Parse a set operation name, ignoring ASCII case
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a-b" => Ok(Self::AMinusB),
            "b-a" => Ok(Self::BMinusA),
            "intersection" => Ok(Self::Intersection),
            "union" => Ok(Self::Union),
            _ => Err(Error::invalid_argument(
                "set_operation",
                format!("expected one of a-b, b-a, intersection, union; got {s:?}"),
            )),
        }
    }
}

/// Options for group-wise set operations over dense tensors
///
/// `validate_indices` is carried for parity with the sparse-operand forms
/// of the operator. Dense operands have no index buffers, so it does not
/// change the result here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOperationConfig {
    /// The set computed per group
    pub op: SetOperationKind,
    /// Check operand index ordering before merging
    pub validate_indices: bool,
}

impl SetOperationConfig {
    /// Configuration for `op` with index validation on
    pub fn new(op: SetOperationKind) -> Self {
        Self {
            op,
            validate_indices: true,
        }
    }
}

impl Default for SetOperationConfig {
    fn default() -> Self {
        Self::new(SetOperationKind::default())
    }
}
