//! Operation descriptors
//!
//! Every public kernel entry point describes itself with a [`SparseOp`]: an
//! [`OpKind`] tag carrying that operation's fixed configuration struct. The
//! descriptor is validated once at construction by shared routines, one per
//! invariant class:
//!
//! - option exclusivity (`transpose_a` with `adjoint_a`, output options on a
//!   sparse-output product, ...)
//! - scalar option domains (`thresh >= 0`, `num_split >= 1`)
//!
//! and afterwards answers dtype-membership questions for the element type the
//! kernel was instantiated with.
//!
//! ```
//! use sparsekit::dtype::DType;
//! use sparsekit::ops::{MatMulConfig, OpKind, SparseOp};
//!
//! let cfg = MatMulConfig::new().transpose_a(true).adjoint_a(true);
//! assert!(SparseOp::new(OpKind::CsrSparseMatMul(cfg)).is_err());
//!
//! let softmax = SparseOp::new(OpKind::CsrSoftmax)?;
//! assert!(softmax.check_dtype(DType::F32).is_ok());
//! assert!(softmax.check_dtype(DType::I32).is_err());
//! # Ok::<(), sparsekit::error::Error>(())
//! ```

mod config;

pub use config::{
    ConcatConfig, MatMulConfig, SegmentConfig, SetOperationConfig, SetOperationKind,
    SparseAddConfig, SplitConfig, TransposeConfig,
};
pub(crate) use config::OperandView;

use crate::dtype::{DType, DTypeSet};
use crate::error::{Error, Result};

/// The operation kinds implemented by this crate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpKind {
    /// COO → CSR conversion
    CooToCsr,
    /// CSR → COO conversion
    CsrToCoo,
    /// CSR → dense conversion
    CsrToDense,
    /// Dense → CSR conversion
    DenseToCsr,
    /// COO → dense conversion
    SparseToDense,
    /// Dense → COO conversion
    DenseToSparse,
    /// COO + dense → dense
    SparseDenseAdd,
    /// COO × dense → dense
    SparseDenseMatMul(MatMulConfig),
    /// CSR × dense → dense
    CsrDenseMatMul(MatMulConfig),
    /// CSR × CSR → CSR
    CsrSparseMatMul(MatMulConfig),
    /// alpha·A + beta·B over CSR
    CsrAdd,
    /// Thresholded COO + COO
    SparseAdd(SparseAddConfig),
    /// Element-wise minimum of two COO tensors
    SparseMinimum,
    /// Segment sum divided by sqrt(segment size)
    SegmentSqrtN(SegmentConfig),
    /// Per-batch non-zero count
    CsrNnz,
    /// Row-wise softmax over explicit entries
    CsrSoftmax,
    /// Batched CSR transpose
    CsrTranspose(TransposeConfig),
    /// COO concatenation
    SparseConcat(ConcatConfig),
    /// COO split
    SparseSplit(SplitConfig),
    /// beta·x1 + alpha·(x2 @ x3)
    Sspaddmm,
    /// Group-wise set operation over two dense tensors, COO output
    SetOperation(SetOperationConfig),
}

/// A validated operation descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparseOp {
    kind: OpKind,
}

impl SparseOp {
    /// Validate `kind` and wrap it
    ///
    /// # Errors
    ///
    /// - `ConflictingFlags` / `UnsupportedOption` for invalid option sets
    /// - `InvalidArgument` for out-of-domain scalar options
    pub fn new(kind: OpKind) -> Result<Self> {
        let name = kind.name();
        match &kind {
            OpKind::SparseDenseMatMul(cfg) | OpKind::CsrDenseMatMul(cfg) => {
                check_operand_flags(name, cfg)?;
            }
            OpKind::CsrSparseMatMul(cfg) => {
                check_operand_flags(name, cfg)?;
                reject_option(name, "transpose_output", cfg.transpose_output)?;
                reject_option(name, "conjugate_output", cfg.conjugate_output)?;
            }
            OpKind::SparseAdd(cfg) => {
                if !(cfg.thresh >= 0.0) || !cfg.thresh.is_finite() {
                    return Err(Error::invalid_argument(
                        "thresh",
                        format!("must be a finite non-negative number, got {}", cfg.thresh),
                    ));
                }
            }
            OpKind::SparseSplit(cfg) => {
                if cfg.num_split == 0 {
                    return Err(Error::invalid_argument("num_split", "must be at least 1"));
                }
            }
            _ => {}
        }
        Ok(Self { kind })
    }

    /// The operation kind and its configuration
    #[inline]
    pub fn kind(&self) -> &OpKind {
        &self.kind
    }

    /// Stable operation name used in errors and log events
    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Value dtypes this operation accepts
    pub fn supported_dtypes(&self) -> DTypeSet {
        match self.kind {
            OpKind::SparseMinimum => DTypeSet::REAL,
            OpKind::CsrSoftmax | OpKind::SegmentSqrtN(_) => DTypeSet::FLOATS,
            OpKind::SetOperation(_) => DTypeSet::INTS,
            _ => DTypeSet::ALL,
        }
    }

    /// Fail with `UnsupportedDType` unless `dtype` is accepted
    pub fn check_dtype(&self, dtype: DType) -> Result<()> {
        if self.supported_dtypes().contains(dtype) {
            Ok(())
        } else {
            Err(Error::unsupported_dtype(dtype, self.name()))
        }
    }
}

impl OpKind {
    /// Stable operation name
    pub fn name(&self) -> &'static str {
        match self {
            Self::CooToCsr => "coo_to_csr",
            Self::CsrToCoo => "csr_to_coo",
            Self::CsrToDense => "csr_to_dense",
            Self::DenseToCsr => "dense_to_csr",
            Self::SparseToDense => "sparse_to_dense",
            Self::DenseToSparse => "dense_to_sparse",
            Self::SparseDenseAdd => "sparse_dense_add",
            Self::SparseDenseMatMul(_) => "sparse_dense_matmul",
            Self::CsrDenseMatMul(_) => "csr_dense_matmul",
            Self::CsrSparseMatMul(_) => "csr_sparse_matmul",
            Self::CsrAdd => "csr_add",
            Self::SparseAdd(_) => "sparse_add",
            Self::SparseMinimum => "sparse_minimum",
            Self::SegmentSqrtN(_) => "segment_sqrt_n",
            Self::CsrNnz => "csr_nnz",
            Self::CsrSoftmax => "csr_softmax",
            Self::CsrTranspose(_) => "csr_transpose",
            Self::SparseConcat(_) => "sparse_concat",
            Self::SparseSplit(_) => "sparse_split",
            Self::Sspaddmm => "sspaddmm",
            Self::SetOperation(_) => "dense_to_dense_set_operation",
        }
    }
}

fn check_operand_flags(op: &'static str, cfg: &MatMulConfig) -> Result<()> {
    if cfg.transpose_a && cfg.adjoint_a {
        return Err(Error::ConflictingFlags {
            op,
            first: "transpose_a",
            second: "adjoint_a",
        });
    }
    if cfg.transpose_b && cfg.adjoint_b {
        return Err(Error::ConflictingFlags {
            op,
            first: "transpose_b",
            second: "adjoint_b",
        });
    }
    Ok(())
}

fn reject_option(op: &'static str, option: &'static str, set: bool) -> Result<()> {
    if set {
        Err(Error::UnsupportedOption { op, option })
    } else {
        Ok(())
    }
}
