//! CSR format conversion: to COO, to dense, from dense

use tracing::debug;

use super::CsrMatrix;
use crate::dtype::Element;
use crate::error::Result;
use crate::kernels::batch::{join_blocks, map_batches};
use crate::kernels::format_convert::{dense_to_block, expand_row_indices, scatter_to_dense};
use crate::ops::OpKind;
use crate::sparse::{CooTensor, prepare};
use crate::tensor::DenseTensor;

impl<T: Element> CsrMatrix<T> {
    /// Convert to COO, expanding row pointers into explicit coordinates
    ///
    /// Coordinates are `(batch, row, col)` for rank 3 and `(row, col)` for
    /// rank 2. The output is canonical.
    pub fn to_coo(&self) -> CooTensor<T> {
        debug!(
            op = OpKind::CsrToCoo.name(),
            shape = ?self.dense_shape,
            nnz = self.nnz()
        );
        let rank = self.rank();
        let batched = rank == 3;

        let mut indices = Vec::with_capacity(self.nnz() * rank);
        for b in 0..self.batch_size() {
            let view = self.batch_view(b);
            let rows = expand_row_indices(&view);
            let start = self.batch_pointers[b] as usize;
            for (n, &row) in rows.iter().enumerate() {
                if batched {
                    indices.push(b as i64);
                }
                indices.push(row);
                indices.push(self.col_indices[start + n]);
            }
        }

        CooTensor::from_parts_unchecked(indices, self.values.clone(), self.dense_shape.clone())
    }

    /// Scatter into a zero-filled dense tensor of shape `dense_shape`
    pub fn to_dense(&self) -> DenseTensor<T> {
        debug!(
            op = OpKind::CsrToDense.name(),
            shape = ?self.dense_shape,
            nnz = self.nnz()
        );
        let (rows, cols) = (self.rows(), self.cols());
        let chunks = map_batches(self.batch_size(), |b| {
            let mut out = vec![T::zero(); rows * cols];
            scatter_to_dense(&self.batch_view(b), &mut out);
            out
        });
        let data: Vec<T> = chunks.into_iter().flatten().collect();
        DenseTensor::from_parts(data, self.dense_shape.clone())
    }

    /// Compress a rank-2 or rank-3 dense tensor, dropping exact zeros
    ///
    /// # Errors
    ///
    /// Returns `InvalidRank` unless `dense` has rank 2 or 3.
    pub fn from_dense(dense: &DenseTensor<T>) -> Result<Self> {
        let op = prepare::<T>(OpKind::DenseToCsr)?;
        let (batch, rows, cols) = dense.matrix_dims("dense")?;
        debug!(op = op.name(), shape = ?dense.shape());

        let data = dense.as_slice();
        let size = rows * cols;
        let blocks = map_batches(batch, |b| {
            dense_to_block(&data[b * size..(b + 1) * size], rows, cols)
        });
        Ok(Self::from_joined(dense.shape().to_vec(), join_blocks(blocks)))
    }
}
