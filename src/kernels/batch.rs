//! Batch executor
//!
//! Batches of a CSR matrix are independent, so every batched kernel runs
//! one closure per batch and joins the results. With the `rayon` feature
//! the closures run on the global thread pool when there is more than one
//! batch.
//!
//! ```text
//! batch 0 ──► CsrBlock { row_ptrs: [0, 2, 3], .. }  ─┐
//! batch 1 ──► CsrBlock { row_ptrs: [0, 1, 1], .. }  ─┼─► join_blocks
//! batch 2 ──► CsrBlock { row_ptrs: [0, 0, 4], .. }  ─┘
//!
//! batch_pointers = [0, 3, 4, 8]
//! row_pointers   = [0, 2, 3,  3, 4, 4,  4, 4, 8]
//! ```

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::CsrBlock;

/// Run `f` for every batch index, preserving batch order in the output
pub(crate) fn map_batches<R, F>(batch: usize, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> R + Send + Sync,
{
    #[cfg(feature = "rayon")]
    {
        if batch > 1 {
            return (0..batch).into_par_iter().map(f).collect();
        }
    }

    (0..batch).map(f).collect()
}

/// Concatenated CSR buffers for all batches, pointers global
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct JoinedCsr<T> {
    pub batch_pointers: Vec<i64>,
    pub row_pointers: Vec<i64>,
    pub col_indices: Vec<i64>,
    pub values: Vec<T>,
}

/// Join per-batch blocks, rebasing block-local row pointers by the running
/// nnz total
pub(crate) fn join_blocks<T>(blocks: Vec<CsrBlock<T>>) -> JoinedCsr<T> {
    let total_nnz: usize = blocks.iter().map(CsrBlock::nnz).sum();
    let total_ptrs: usize = blocks.iter().map(|b| b.row_ptrs.len()).sum();

    let mut batch_pointers = Vec::with_capacity(blocks.len() + 1);
    let mut row_pointers = Vec::with_capacity(total_ptrs);
    let mut col_indices = Vec::with_capacity(total_nnz);
    let mut values = Vec::with_capacity(total_nnz);

    batch_pointers.push(0i64);
    let mut offset = 0i64;
    for block in blocks {
        row_pointers.extend(block.row_ptrs.iter().map(|&p| p + offset));
        offset += block.values.len() as i64;
        batch_pointers.push(offset);
        col_indices.extend(block.col_indices);
        values.extend(block.values);
    }

    JoinedCsr {
        batch_pointers,
        row_pointers,
        col_indices,
        values,
    }
}
