//! Dense tensor type
//!
//! This module provides `DenseTensor`, the owned row-major buffer used as the
//! dense operand and result of sparse kernels.

mod core;

pub use self::core::DenseTensor;
