//! Slice-level CPU kernels
//!
//! These functions work on borrowed index and value buffers for a single
//! batch and return batch-local outputs. The `sparse` module validates
//! operands, fans batches out through [`batch::map_batches`] and joins
//! per-batch CSR blocks with [`batch::join_blocks`].
//!
//! Nothing in here validates its input. Callers guarantee in-range indices
//! and sorted rows.

pub(crate) mod batch;
pub(crate) mod format_convert;
pub(crate) mod merge;
pub(crate) mod segment;
pub(crate) mod softmax;
pub(crate) mod spgemm;
pub(crate) mod spmm;

use crate::dtype::Element;

/// Borrowed view of one batch of a CSR matrix
///
/// `row_ptrs` is the batch's `rows + 1` pointer slice. Pointers are global
/// offsets, so they index `col_indices` and `values` (the whole-matrix
/// buffers) directly.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CsrView<'a, T> {
    pub rows: usize,
    pub cols: usize,
    pub row_ptrs: &'a [i64],
    pub col_indices: &'a [i64],
    pub values: &'a [T],
}

impl<'a, T: Element> CsrView<'a, T> {
    /// Entry range of row `r`
    #[inline]
    pub fn row_range(&self, r: usize) -> std::ops::Range<usize> {
        self.row_ptrs[r] as usize..self.row_ptrs[r + 1] as usize
    }

    /// Number of entries in this batch
    #[inline]
    pub fn nnz(&self) -> usize {
        (self.row_ptrs[self.rows] - self.row_ptrs[0]) as usize
    }
}

/// Owned CSR output of one batch, with pointers local to the block
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CsrBlock<T> {
    pub row_ptrs: Vec<i64>,
    pub col_indices: Vec<i64>,
    pub values: Vec<T>,
}

impl<T> CsrBlock<T> {
    /// An all-empty block with `rows` rows
    pub fn empty(rows: usize) -> Self {
        Self {
            row_ptrs: vec![0; rows + 1],
            col_indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of entries in the block
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }
}
