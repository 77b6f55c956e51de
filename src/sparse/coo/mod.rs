//! COO (Coordinate) sparse format

mod conversion;
mod core;
mod elementwise;
mod matmul;

pub use self::core::CooTensor;
pub use matmul::sspaddmm;
