//! Single- and two-operand CSR transforms that keep the batched layout

use num_traits::Float;
use tracing::debug;

use super::CsrMatrix;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::kernels::batch::{join_blocks, map_batches};
use crate::kernels::format_convert::transpose_block;
use crate::kernels::merge::merge_csr_block;
use crate::kernels::softmax::softmax_block;
use crate::ops::{OpKind, TransposeConfig};
use crate::sparse::prepare;

impl<T: Element> CsrMatrix<T> {
    /// Compute `alpha * self + beta * other`
    ///
    /// Rows are merged column by column. Positions held by one operand only
    /// are scaled by that operand's coefficient. Entries that cancel to zero
    /// stay explicit.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the dense shapes differ.
    pub fn add(&self, other: &Self, alpha: T, beta: T) -> Result<Self> {
        let op = prepare::<T>(OpKind::CsrAdd)?;
        if self.dense_shape != other.dense_shape {
            return Err(Error::shape_mismatch(&self.dense_shape, &other.dense_shape));
        }
        debug!(
            op = op.name(),
            shape = ?self.dense_shape,
            lhs_nnz = self.nnz(),
            rhs_nnz = other.nnz()
        );

        let blocks = map_batches(self.batch_size(), |b| {
            merge_csr_block(
                &self.batch_view(b),
                &other.batch_view(b),
                |x, y| alpha * x + beta * y,
                |x| alpha * x,
                |y| beta * y,
            )
        });
        Ok(Self::from_joined(self.dense_shape.clone(), join_blocks(blocks)))
    }

    /// Transpose every matrix of the batch, optionally conjugating values
    ///
    /// Batch pointers are unchanged; `dense_shape` swaps rows and cols.
    pub fn transpose(&self, conjugate: bool) -> Self {
        let kind = OpKind::CsrTranspose(TransposeConfig { conjugate });
        debug!(op = kind.name(), shape = ?self.dense_shape, conjugate);

        let blocks = map_batches(self.batch_size(), |b| {
            transpose_block(&self.batch_view(b), conjugate)
        });
        let shape = self.shape_like(self.batch_size(), self.cols(), self.rows());
        Self::from_joined(shape, join_blocks(blocks))
    }
}

impl<T: Element + Float> CsrMatrix<T> {
    /// Row-wise softmax over the explicit entries
    ///
    /// The sparsity pattern is unchanged and empty rows stay empty.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedDType` for non floating-point values.
    pub fn softmax(&self) -> Result<Self> {
        let op = prepare::<T>(OpKind::CsrSoftmax)?;
        debug!(op = op.name(), shape = ?self.dense_shape, nnz = self.nnz());

        let values: Vec<T> = map_batches(self.batch_size(), |b| softmax_block(&self.batch_view(b)))
            .into_iter()
            .flatten()
            .collect();
        Ok(Self {
            dense_shape: self.dense_shape.clone(),
            batch_pointers: self.batch_pointers.clone(),
            row_pointers: self.row_pointers.clone(),
            col_indices: self.col_indices.clone(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Complex64;
    use crate::error::ErrorKind;

    #[test]
    fn test_add_scaled() {
        // (0,0)=1, (1,1)=2 in a 2x6 matrix
        let a = CsrMatrix::new(&[2, 6], vec![0, 2], vec![0, 1, 2], vec![0, 1], vec![1.0, 2.0])
            .unwrap();
        let c = a.add(&a, 1.0f64, 1.0).unwrap();
        assert_eq!(c.row_pointers(), a.row_pointers());
        assert_eq!(c.col_indices(), &[0, 1]);
        assert_eq!(c.values(), &[2.0, 4.0]);

        let d = a.add(&a, 1.0, -1.0).unwrap();
        assert_eq!(d.nnz(), 2);
        assert_eq!(d.values(), &[0.0, 0.0]);
    }

    #[test]
    fn test_add_shape_mismatch() {
        let a = CsrMatrix::<i32>::zeros(&[2, 3]).unwrap();
        let b = CsrMatrix::<i32>::zeros(&[3, 2]).unwrap();
        assert_eq!(
            a.add(&b, 1, 1).unwrap_err().kind(),
            ErrorKind::ShapeMismatch
        );
    }

    #[test]
    fn test_transpose_single_entry() {
        let m = CsrMatrix::new(&[2, 3], vec![0, 1], vec![0, 1, 1], vec![0], vec![99i64]).unwrap();
        let t = m.transpose(false);
        assert_eq!(t.dense_shape(), &[3, 2]);
        assert_eq!(t.batch_pointers(), &[0, 1]);
        assert_eq!(t.row_pointers(), &[0, 1, 1, 1]);
        assert_eq!(t.col_indices(), &[0]);
        assert_eq!(t.values(), &[99]);
    }

    #[test]
    fn test_transpose_batched_conjugate() {
        let m = CsrMatrix::new(
            &[2, 1, 2],
            vec![0, 1, 2],
            vec![0, 1, 1, 2],
            vec![1, 0],
            vec![Complex64::new(1.0, 1.0), Complex64::new(2.0, -2.0)],
        )
        .unwrap();
        let t = m.transpose(true);
        assert_eq!(t.dense_shape(), &[2, 2, 1]);
        assert_eq!(t.row_pointers(), &[0, 0, 1, 1, 2, 2]);
        assert_eq!(
            t.values(),
            &[Complex64::new(1.0, -1.0), Complex64::new(2.0, 2.0)]
        );
    }

    #[test]
    fn test_softmax_keeps_pattern() {
        let m = CsrMatrix::new(
            &[3, 2],
            vec![0, 3],
            vec![0, 2, 2, 3],
            vec![0, 1, 1],
            vec![0.0f32, 0.0, 5.0],
        )
        .unwrap();
        let s = m.softmax().unwrap();
        assert_eq!(s.row_pointers(), m.row_pointers());
        assert_eq!(s.col_indices(), m.col_indices());
        assert_eq!(s.values(), &[0.5, 0.5, 1.0]);
    }
}
