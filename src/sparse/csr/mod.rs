//! Batched CSR (Compressed Sparse Row) format
//!
//! Split across modules:
//! - `core`: struct, validation, getters, batch views
//! - `conversion`: CSR ↔ COO and CSR ↔ dense
//! - `elementwise`: scaled add, softmax, transpose
//! - `matmul`: SpMM (CSR × dense) and SpGEMM (CSR × CSR)

mod conversion;
mod core;
mod elementwise;
mod matmul;

pub use self::core::{CsrMatrix, CsrParts};
pub(crate) use self::core::split_shape;
