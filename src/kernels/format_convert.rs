//! Per-batch format conversion kernels (COO↔CSR, CSR↔dense, CSR transpose)

use super::{CsrBlock, CsrView};
use crate::dtype::Element;

/// Counting-sort one batch of row-major COO entries into a CSR block
///
/// `row_idx`, `col_idx` and `values` hold the batch's entries in canonical
/// order. Per-row counts are prefix-summed into the pointer array and the
/// entries are scattered through per-row write cursors, so entry order within
/// a row is kept.
pub(crate) fn coo_to_csr_block<T: Element>(
    rows: usize,
    row_idx: &[i64],
    col_idx: &[i64],
    values: &[T],
) -> CsrBlock<T> {
    let nnz = values.len();

    let mut row_ptrs = vec![0i64; rows + 1];
    for &row in row_idx {
        row_ptrs[row as usize + 1] += 1;
    }
    for i in 1..=rows {
        row_ptrs[i] += row_ptrs[i - 1];
    }

    let mut col_indices = vec![0i64; nnz];
    let mut out_values = vec![T::zero(); nnz];
    let mut cursors = row_ptrs[..rows].to_vec();
    for ((&row, &col), &val) in row_idx.iter().zip(col_idx).zip(values) {
        let pos = cursors[row as usize] as usize;
        col_indices[pos] = col;
        out_values[pos] = val;
        cursors[row as usize] += 1;
    }

    CsrBlock {
        row_ptrs,
        col_indices,
        values: out_values,
    }
}

/// Expand a batch's row pointers into explicit row coordinates
///
/// Returns one row index per entry, in storage order.
pub(crate) fn expand_row_indices<T: Element>(view: &CsrView<'_, T>) -> Vec<i64> {
    let mut row_indices = Vec::with_capacity(view.nnz());
    for row in 0..view.rows {
        let range = view.row_range(row);
        row_indices.extend(std::iter::repeat_n(row as i64, range.len()));
    }
    row_indices
}

/// Transpose one batch by counting sort over the column indices
///
/// Rows of the result come out sorted because source rows are visited in
/// ascending order.
pub(crate) fn transpose_block<T: Element>(view: &CsrView<'_, T>, conjugate: bool) -> CsrBlock<T> {
    let nnz = view.nnz();
    let out_rows = view.cols;

    let mut row_ptrs = vec![0i64; out_rows + 1];
    for row in 0..view.rows {
        for idx in view.row_range(row) {
            row_ptrs[view.col_indices[idx] as usize + 1] += 1;
        }
    }
    for i in 1..=out_rows {
        row_ptrs[i] += row_ptrs[i - 1];
    }

    let mut col_indices = vec![0i64; nnz];
    let mut values = vec![T::zero(); nnz];
    let mut cursors = row_ptrs[..out_rows].to_vec();
    for row in 0..view.rows {
        for idx in view.row_range(row) {
            let col = view.col_indices[idx] as usize;
            let pos = cursors[col] as usize;
            col_indices[pos] = row as i64;
            let v = view.values[idx];
            values[pos] = if conjugate { v.conj() } else { v };
            cursors[col] += 1;
        }
    }

    CsrBlock {
        row_ptrs,
        col_indices,
        values,
    }
}

/// Scatter one batch into a zeroed `rows * cols` row-major buffer
pub(crate) fn scatter_to_dense<T: Element>(view: &CsrView<'_, T>, out: &mut [T]) {
    for row in 0..view.rows {
        let base = row * view.cols;
        for idx in view.row_range(row) {
            out[base + view.col_indices[idx] as usize] = view.values[idx];
        }
    }
}

/// Compress one row-major dense matrix, dropping exact zeros
pub(crate) fn dense_to_block<T: Element>(data: &[T], rows: usize, cols: usize) -> CsrBlock<T> {
    let zero = T::zero();
    let mut row_ptrs = Vec::with_capacity(rows + 1);
    let mut col_indices = Vec::new();
    let mut values = Vec::new();

    row_ptrs.push(0);
    for row in data.chunks_exact(cols.max(1)).take(rows) {
        for (col, &v) in row.iter().enumerate().take(cols) {
            if v != zero {
                col_indices.push(col as i64);
                values.push(v);
            }
        }
        row_ptrs.push(values.len() as i64);
    }
    // cols == 0: chunks of width 1 over an empty buffer yield nothing
    row_ptrs.resize(rows + 1, values.len() as i64);

    CsrBlock {
        row_ptrs,
        col_indices,
        values,
    }
}
