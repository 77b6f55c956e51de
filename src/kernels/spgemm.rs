//! Gustavson SpGEMM for one batch
//!
//! # Algorithm
//!
//! ## Phase 1: Symbolic (count nnz per output row)
//! ```text
//! For each output row i:
//!   For each non-zero A[i,k], for each non-zero B[k,j]:
//!     mark column j (stamped with i, so the marker is never cleared)
//!   row_nnz[i] = number of distinct marked columns
//! Build row_ptrs via exclusive scan
//! ```
//!
//! ## Phase 2: Numeric (dense scratch accumulator)
//! ```text
//! For each output row i:
//!   For each non-zero A[i,k], for each non-zero B[k,j]:
//!     acc[j] += A[i,k] * B[k,j], recording j on first touch
//!   Sort touched columns, write (j, acc[j]), reset acc[j] to zero
//! ```
//!
//! The scratch buffers are allocated once per batch and reused by every row.
//! Products that cancel to zero stay in the output as explicit entries.

use super::{CsrBlock, CsrView};
use crate::dtype::Element;

/// Multiply two batch views whose inner dimensions already agree
pub(crate) fn spgemm_block<T: Element>(a: &CsrView<'_, T>, b: &CsrView<'_, T>) -> CsrBlock<T> {
    let m = a.rows;
    let n = b.cols;
    if a.nnz() == 0 || b.nnz() == 0 {
        return CsrBlock::empty(m);
    }

    // Phase 1: symbolic
    let mut marker = vec![usize::MAX; n];
    let mut row_ptrs = Vec::with_capacity(m + 1);
    row_ptrs.push(0i64);
    for i in 0..m {
        let mut count = 0i64;
        for a_idx in a.row_range(i) {
            let k = a.col_indices[a_idx] as usize;
            for b_idx in b.row_range(k) {
                let j = b.col_indices[b_idx] as usize;
                if marker[j] != i {
                    marker[j] = i;
                    count += 1;
                }
            }
        }
        let last = row_ptrs[i];
        row_ptrs.push(last + count);
    }

    // Phase 2: numeric
    let nnz = row_ptrs[m] as usize;
    let mut col_indices = Vec::with_capacity(nnz);
    let mut values = Vec::with_capacity(nnz);
    let mut acc = vec![T::zero(); n];
    let mut touched = vec![false; n];
    let mut row_cols: Vec<usize> = Vec::new();

    for i in 0..m {
        row_cols.clear();
        for a_idx in a.row_range(i) {
            let k = a.col_indices[a_idx] as usize;
            let a_val = a.values[a_idx];
            for b_idx in b.row_range(k) {
                let j = b.col_indices[b_idx] as usize;
                if !touched[j] {
                    touched[j] = true;
                    row_cols.push(j);
                }
                acc[j] = acc[j] + a_val * b.values[b_idx];
            }
        }

        row_cols.sort_unstable();
        for &j in &row_cols {
            col_indices.push(j as i64);
            values.push(acc[j]);
            acc[j] = T::zero();
            touched[j] = false;
        }
    }

    CsrBlock {
        row_ptrs,
        col_indices,
        values,
    }
}
