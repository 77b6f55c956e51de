//! Sparse format definitions and traits

use crate::dtype::DType;

/// Sparse storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SparseFormat {
    /// Coordinate format (COO)
    ///
    /// Stores explicit (coordinate, value) pairs for any rank.
    /// Best for: construction, element-wise merges, concat/split
    /// Storage: O((rank + 1) * nnz)
    Coo,

    /// Batched Compressed Sparse Row (CSR)
    ///
    /// Batch pointers + row pointers + column indices + values.
    /// Best for: row-wise kernels (SpMM, SpGEMM, softmax)
    /// Storage: O(2 * nnz + batch * (rows + 1))
    Csr,
}

impl SparseFormat {
    /// Returns true if format is efficient for row operations
    #[inline]
    pub fn is_row_major(&self) -> bool {
        matches!(self, SparseFormat::Csr)
    }

    /// Returns the format name as a string
    pub fn name(&self) -> &'static str {
        match self {
            SparseFormat::Coo => "COO",
            SparseFormat::Csr => "CSR",
        }
    }
}

impl std::fmt::Display for SparseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Common interface of the sparse containers
pub trait SparseStorage {
    /// Returns the sparse format type
    fn format(&self) -> SparseFormat;

    /// Returns the logical dense shape
    fn dense_shape(&self) -> &[usize];

    /// Returns the number of explicit entries
    fn nnz(&self) -> usize;

    /// Returns the data type of values
    fn dtype(&self) -> DType;

    /// Returns the sparsity ratio (fraction of implicit zeros)
    ///
    /// Sparsity = 1.0 - (nnz / total_elements)
    #[inline]
    fn sparsity(&self) -> f64 {
        let total = self.dense_shape().iter().product::<usize>() as f64;
        if total == 0.0 {
            0.0
        } else {
            1.0 - (self.nnz() as f64 / total)
        }
    }

    /// Returns the density ratio (fraction of explicit entries)
    #[inline]
    fn density(&self) -> f64 {
        1.0 - self.sparsity()
    }

    /// Returns true if there are no explicit entries
    #[inline]
    fn is_empty(&self) -> bool {
        self.nnz() == 0
    }

    /// Returns the memory usage of the index and value buffers in bytes
    fn memory_usage(&self) -> usize;
}
