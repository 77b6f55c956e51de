//! Row-wise softmax over explicit CSR entries

use num_traits::Float;

use super::CsrView;
use crate::dtype::Element;

/// Softmax every row of one batch, returning the batch's new values
///
/// Each row is shifted by its maximum before exponentiation. Implicit zeros
/// do not take part, and empty rows contribute nothing.
pub(crate) fn softmax_block<T: Element + Float>(view: &CsrView<'_, T>) -> Vec<T> {
    let mut out = Vec::with_capacity(view.nnz());
    for row in 0..view.rows {
        let vals = &view.values[view.row_range(row)];
        let Some(&first) = vals.first() else {
            continue;
        };
        let max = vals.iter().fold(first, |m, &v| if v > m { v } else { m });

        let start = out.len();
        let mut sum = <T as Element>::zero();
        for &v in vals {
            let e = (v - max).exp();
            sum = sum + e;
            out.push(e);
        }
        for e in &mut out[start..] {
            *e = *e / sum;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_block() {
        let row_ptrs = [0i64, 2, 2, 3];
        let cols = [0i64, 1, 0];
        let vals = [0.0f64, 0.0, 7.0];
        let view = CsrView {
            rows: 3,
            cols: 2,
            row_ptrs: &row_ptrs,
            col_indices: &cols,
            values: &vals,
        };
        assert_eq!(softmax_block(&view), vec![0.5, 0.5, 1.0]);
    }

    #[test]
    fn test_softmax_is_shift_stable() {
        let row_ptrs = [0i64, 2];
        let cols = [0i64, 1];
        let vals = [1000.0f32, 1000.0];
        let view = CsrView {
            rows: 1,
            cols: 2,
            row_ptrs: &row_ptrs,
            col_indices: &cols,
            values: &vals,
        };
        assert_eq!(softmax_block(&view), vec![0.5, 0.5]);
    }
}
