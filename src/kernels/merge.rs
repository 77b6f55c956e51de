//! Sorted-merge kernels for element-wise sparse operations
//!
//! One merge routine per layout, parameterized by closures:
//!
//! - `op(a, b)` when both operands hold an entry at a position
//! - `only_a(a)` / `only_b(b)` when just one operand does
//! - `keep(v)` decides whether a combined value is written out
//!
//! ```text
//! csr add      op = alpha*a + beta*b  only_a = alpha*a    only_b = beta*b    keep = always
//! coo add      op = a + b             only_a = a          only_b = b         keep = |v| >= thresh
//! coo minimum  op = min(a, b)         only_a = min(a, 0)  only_b = min(b, 0) keep = always
//! ```
//!
//! Every position present in either operand is visited (union semantics).
//!
//! Set operations over dense groups reuse the same two-pointer walk on
//! sorted, deduplicated values; the operation picks which of the three
//! regions (a only, both, b only) reaches the output.

use std::cmp::Ordering;

use super::{CsrBlock, CsrView};
use crate::dtype::Element;
use crate::ops::SetOperationKind;

/// Merge two CSR batches row by row
///
/// Both views must have the same number of rows and sorted columns per row.
pub(crate) fn merge_csr_block<T, F, FA, FB>(
    a: &CsrView<'_, T>,
    b: &CsrView<'_, T>,
    op: F,
    only_a: FA,
    only_b: FB,
) -> CsrBlock<T>
where
    T: Element,
    F: Fn(T, T) -> T,
    FA: Fn(T) -> T,
    FB: Fn(T) -> T,
{
    let mut row_ptrs = Vec::with_capacity(a.rows + 1);
    let mut col_indices = Vec::with_capacity(a.nnz() + b.nnz());
    let mut values = Vec::with_capacity(a.nnz() + b.nnz());
    row_ptrs.push(0i64);

    for row in 0..a.rows {
        let a_range = a.row_range(row);
        let b_range = b.row_range(row);
        let (mut i, a_end) = (a_range.start, a_range.end);
        let (mut j, b_end) = (b_range.start, b_range.end);

        while i < a_end || j < b_end {
            let a_col = if i < a_end { a.col_indices[i] } else { i64::MAX };
            let b_col = if j < b_end { b.col_indices[j] } else { i64::MAX };

            match a_col.cmp(&b_col) {
                Ordering::Less => {
                    col_indices.push(a_col);
                    values.push(only_a(a.values[i]));
                    i += 1;
                }
                Ordering::Greater => {
                    col_indices.push(b_col);
                    values.push(only_b(b.values[j]));
                    j += 1;
                }
                Ordering::Equal => {
                    col_indices.push(a_col);
                    values.push(op(a.values[i], b.values[j]));
                    i += 1;
                    j += 1;
                }
            }
        }

        row_ptrs.push(values.len() as i64);
    }

    CsrBlock {
        row_ptrs,
        col_indices,
        values,
    }
}

/// Merge two canonical COO entry lists of the same rank
///
/// Coordinates are compared lexicographically, which is row-major order.
/// Returns the flat output indices and values.
#[allow(clippy::too_many_arguments)]
pub(crate) fn merge_coo<T, F, FA, FB, K>(
    rank: usize,
    a_indices: &[i64],
    a_values: &[T],
    b_indices: &[i64],
    b_values: &[T],
    op: F,
    only_a: FA,
    only_b: FB,
    keep: K,
) -> (Vec<i64>, Vec<T>)
where
    T: Element,
    F: Fn(T, T) -> T,
    FA: Fn(T) -> T,
    FB: Fn(T) -> T,
    K: Fn(T) -> bool,
{
    let a_nnz = a_values.len();
    let b_nnz = b_values.len();
    let coord = |n: usize| n * rank..(n + 1) * rank;

    let mut out_indices = Vec::with_capacity((a_nnz + b_nnz) * rank);
    let mut out_values = Vec::with_capacity(a_nnz + b_nnz);
    let mut emit = |idx: &[i64], v: T| {
        if keep(v) {
            out_indices.extend_from_slice(idx);
            out_values.push(v);
        }
    };

    let (mut i, mut j) = (0usize, 0usize);
    while i < a_nnz || j < b_nnz {
        let order = if i == a_nnz {
            Ordering::Greater
        } else if j == b_nnz {
            Ordering::Less
        } else {
            a_indices[coord(i)].cmp(&b_indices[coord(j)])
        };

        match order {
            Ordering::Less => {
                emit(&a_indices[coord(i)], only_a(a_values[i]));
                i += 1;
            }
            Ordering::Greater => {
                emit(&b_indices[coord(j)], only_b(b_values[j]));
                j += 1;
            }
            Ordering::Equal => {
                emit(&a_indices[coord(i)], op(a_values[i], b_values[j]));
                i += 1;
                j += 1;
            }
        }
    }

    (out_indices, out_values)
}

/// Sort COO entries into row-major order and sum duplicate coordinates
pub(crate) fn coalesce<T: Element>(
    rank: usize,
    indices: &[i64],
    values: &[T],
) -> (Vec<i64>, Vec<T>) {
    let nnz = values.len();
    let key = |n: usize| &indices[n * rank..(n + 1) * rank];

    let mut perm: Vec<usize> = (0..nnz).collect();
    perm.sort_by(|&x, &y| key(x).cmp(key(y)));

    let mut out_indices: Vec<i64> = Vec::with_capacity(nnz * rank);
    let mut out_values: Vec<T> = Vec::with_capacity(nnz);
    let mut last: Option<usize> = None;
    for &n in &perm {
        match last {
            Some(prev) if key(prev) == key(n) => {
                if let Some(acc) = out_values.last_mut() {
                    *acc = *acc + values[n];
                }
            }
            _ => {
                out_indices.extend_from_slice(key(n));
                out_values.push(values[n]);
            }
        }
        last = Some(n);
    }

    (out_indices, out_values)
}

/// Sorted, duplicate-free copy of one set group
pub(crate) fn sorted_set<T: Element>(group: &[T]) -> Vec<T> {
    let mut set = group.to_vec();
    set.sort_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));
    set.dedup();
    set
}

/// Two-pointer merge of sorted sets, emitting the regions `kind` selects
pub(crate) fn merge_sets<T: Element>(a: &[T], b: &[T], kind: SetOperationKind) -> Vec<T> {
    let (keep_a, keep_both, keep_b) = match kind {
        SetOperationKind::AMinusB => (true, false, false),
        SetOperationKind::BMinusA => (false, false, true),
        SetOperationKind::Intersection => (false, true, false),
        SetOperationKind::Union => (true, true, true),
    };

    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0usize, 0usize);
    while i < a.len() || j < b.len() {
        let order = if i == a.len() {
            Ordering::Greater
        } else if j == b.len() {
            Ordering::Less
        } else {
            a[i].partial_cmp(&b[j]).unwrap_or(Ordering::Equal)
        };

        match order {
            Ordering::Less => {
                if keep_a {
                    out.push(a[i]);
                }
                i += 1;
            }
            Ordering::Greater => {
                if keep_b {
                    out.push(b[j]);
                }
                j += 1;
            }
            Ordering::Equal => {
                if keep_both {
                    out.push(a[i]);
                }
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// `min(a, b)` under `PartialOrd`; NaN on the left propagates
#[inline]
pub(crate) fn partial_min<T: PartialOrd>(a: T, b: T) -> T {
    if b < a { b } else { a }
}
