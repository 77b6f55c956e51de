//! Sparse containers and the operations defined on them
//!
//! Two formats are provided:
//!
//! - **COO** ([`CooTensor`]): flat `(nnz, rank)` coordinates plus values, any
//!   rank. Used for element-wise merges, dense scatter, concat and split,
//!   and as the output of group-wise set operations.
//!
//! - **CSR** ([`CsrMatrix`]): batched compressed sparse row for rank-2 and
//!   rank-3 dense shapes. Used for matrix products, transpose and softmax.
//!
//! # Usage
//!
//! ```
//! use sparsekit::prelude::*;
//!
//! // [0, 1, 0, 0]
//! // [0, 0, 2, 0]
//! // [0, 0, 0, 0]
//! let coo = CooTensor::new(vec![0, 1, 1, 2], vec![1.0f64, 2.0], &[3, 4])?;
//! let csr = coo.to_csr()?;
//! assert_eq!(csr.row_pointers(), &[0, 1, 2, 2]);
//!
//! let b = DenseTensor::from_vec(vec![1.0; 8], &[4, 2])?;
//! let c = csr.spmm(&b, &MatMulConfig::default())?;
//! assert_eq!(c.as_slice(), &[1.0, 1.0, 2.0, 2.0, 0.0, 0.0]);
//! # Ok::<(), sparsekit::error::Error>(())
//! ```
//!
//! Every operation validates its operands completely before any numeric work
//! starts, so a call either returns a full result or an error.

mod coo;
mod csr;
mod format;
mod segment;
mod set_ops;

pub use coo::{CooTensor, sspaddmm};
pub use csr::{CsrMatrix, CsrParts};
pub use format::{SparseFormat, SparseStorage};
pub use segment::segment_sqrt_n;
pub use set_ops::set_operation;

use crate::dtype::Element;
use crate::error::Result;
use crate::ops::{OpKind, SparseOp};

/// Build and validate the descriptor for an entry point over `T` values
pub(crate) fn prepare<T: Element>(kind: OpKind) -> Result<SparseOp> {
    let op = SparseOp::new(kind)?;
    op.check_dtype(T::DTYPE)?;
    Ok(op)
}
