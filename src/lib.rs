//! # sparsekit
//!
//! **Sparse tensor kernels for Rust: COO and batched CSR containers with the
//! conversions, products and reductions defined over them.**
//!
//! ## Features
//!
//! - **Formats**: any-rank COO tensors and batched CSR matrices with global
//!   row-pointer offsets
//! - **Conversions**: COO ↔ CSR ↔ dense, CSR transpose
//! - **Products**: sparse × dense (CSR and COO), sparse × sparse (Gustavson),
//!   `sspaddmm`
//! - **Element-wise**: scaled CSR addition, thresholded COO addition,
//!   sparse minimum, sparse + dense
//! - **Reductions**: row-wise CSR softmax, segment sqrt-N sums
//! - **Structure**: COO concatenation and split
//! - **Sets**: group-wise difference, intersection and union of dense tensors
//!   with COO output
//!
//! Every entry point validates its operands through an operation descriptor
//! ([`ops::SparseOp`]) before any numeric work, so a call either completes or
//! returns an [`error::Error`].
//!
//! ## Quick Start
//!
//! ```
//! use sparsekit::prelude::*;
//!
//! let a = CsrMatrix::new(&[2, 2], vec![0, 2], vec![0, 1, 2], vec![0, 1], vec![1.0f64, 2.0])?;
//! let sum = a.add(&a, 1.0, 1.0)?;
//! assert_eq!(sum.values(), &[2.0, 4.0]);
//!
//! let product = a.spgemm(&a, &MatMulConfig::default())?;
//! assert_eq!(product.values(), &[1.0, 4.0]);
//! # Ok::<(), sparsekit::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): run independent batches of a batched CSR operation on
//!   the rayon thread pool

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod dtype;
pub mod error;
pub(crate) mod kernels;
pub mod ops;
pub mod sparse;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::{Complex64, Complex128, DType, Element};
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::ops::{MatMulConfig, OpKind, SetOperationConfig, SetOperationKind, SparseOp};
    pub use crate::sparse::{
        CooTensor, CsrMatrix, SparseFormat, SparseStorage, segment_sqrt_n, set_operation,
        sspaddmm,
    };
    pub use crate::tensor::DenseTensor;
}
