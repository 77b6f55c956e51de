//! Sparse × dense matrix multiplication kernels
//!
//! # Algorithm
//!
//! Row-wise accumulation over the explicit entries of op(A):
//!
//! ```text
//! For each non-zero (i, k, v) of op(A):
//!   C[i, :] += v * op(B)[k, :]
//! ```
//!
//! The right operand arrives already in op(B) form (transposed and/or
//! conjugated by the caller), row-major with `n` columns. Cost is
//! O(nnz(A) · n).

use super::CsrView;
use crate::dtype::Element;
use crate::ops::OperandView;

/// `out[..n] += v * b_row[..n]`
#[inline]
fn axpy_row<T: Element>(out: &mut [T], v: T, b_row: &[T]) {
    for (o, &b) in out.iter_mut().zip(b_row) {
        *o = *o + v * b;
    }
}

/// Multiply one CSR batch by a dense block
///
/// `out` is the zero-initialised row-major result of op(A)'s row count by
/// `n`. When `lhs.transpose` is set, entry `(r, c)` of the stored matrix acts
/// as entry `(c, r)` of op(A).
pub(crate) fn csr_spmm_block<T: Element>(
    a: &CsrView<'_, T>,
    lhs: OperandView,
    b: &[T],
    n: usize,
    out: &mut [T],
) {
    for r in 0..a.rows {
        for idx in a.row_range(r) {
            let c = a.col_indices[idx] as usize;
            let v = if lhs.conjugate {
                a.values[idx].conj()
            } else {
                a.values[idx]
            };
            let (i, k) = if lhs.transpose { (c, r) } else { (r, c) };
            axpy_row(&mut out[i * n..(i + 1) * n], v, &b[k * n..(k + 1) * n]);
        }
    }
}

/// Multiply rank-2 COO entries by a dense block
///
/// Duplicate coordinates contribute once per occurrence.
pub(crate) fn coo_spmm<T: Element>(
    row_idx: &[i64],
    col_idx: &[i64],
    values: &[T],
    lhs: OperandView,
    b: &[T],
    n: usize,
    out: &mut [T],
) {
    for ((&r, &c), &val) in row_idx.iter().zip(col_idx).zip(values) {
        let v = if lhs.conjugate { val.conj() } else { val };
        let (i, k) = if lhs.transpose {
            (c as usize, r as usize)
        } else {
            (r as usize, c as usize)
        };
        axpy_row(&mut out[i * n..(i + 1) * n], v, &b[k * n..(k + 1) * n]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Complex128;

    #[test]
    fn test_csr_spmm_block() {
        // A = [1, 0, 2]
        //     [0, 0, 3]
        let row_ptrs = [0i64, 2, 3];
        let cols = [0i64, 2, 2];
        let vals = [1.0f64, 2.0, 3.0];
        let a = CsrView {
            rows: 2,
            cols: 3,
            row_ptrs: &row_ptrs,
            col_indices: &cols,
            values: &vals,
        };
        // B = I(3) with an extra column of ones
        let b = [1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0];
        let mut out = vec![0.0; 8];
        csr_spmm_block(&a, OperandView::default(), &b, 4, &mut out);
        assert_eq!(out, vec![1.0, 0.0, 2.0, 3.0, 0.0, 0.0, 3.0, 3.0]);
    }

    #[test]
    fn test_csr_spmm_block_transposed() {
        // A^T where A = [0, 5] (1x2), times B = [[2]] gives [[0], [10]]
        let row_ptrs = [0i64, 1];
        let cols = [1i64];
        let vals = [5.0f32];
        let a = CsrView {
            rows: 1,
            cols: 2,
            row_ptrs: &row_ptrs,
            col_indices: &cols,
            values: &vals,
        };
        let mut out = vec![0.0; 2];
        let lhs = OperandView {
            transpose: true,
            conjugate: false,
        };
        csr_spmm_block(&a, lhs, &[2.0], 1, &mut out);
        assert_eq!(out, vec![0.0, 10.0]);
    }

    #[test]
    fn test_coo_spmm_adjoint() {
        let lhs = OperandView {
            transpose: true,
            conjugate: true,
        };
        let mut out = vec![Complex128::ZERO; 2];
        coo_spmm(
            &[0],
            &[1],
            &[Complex128::new(0.0, 1.0)],
            lhs,
            &[Complex128::ONE],
            1,
            &mut out,
        );
        assert_eq!(out, vec![Complex128::ZERO, Complex128::new(0.0, -1.0)]);
    }
}
