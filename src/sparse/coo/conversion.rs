//! COO format conversion: to CSR, to dense, from dense

use tracing::debug;

use super::CooTensor;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::kernels::batch::{join_blocks, map_batches};
use crate::kernels::format_convert::coo_to_csr_block;
use crate::ops::OpKind;
use crate::sparse::csr::split_shape;
use crate::sparse::{CsrMatrix, prepare};
use crate::tensor::DenseTensor;

impl<T: Element> CooTensor<T> {
    /// Convert a rank-2 or rank-3 tensor to batched CSR
    ///
    /// Entries are counted per row, the counts prefix-summed into row
    /// pointers and the entries scattered through per-row cursors.
    ///
    /// # Errors
    ///
    /// - `InvalidRank` unless the rank is 2 or 3
    /// - `InvalidArgument` if the tensor is not canonical
    pub fn to_csr(&self) -> Result<CsrMatrix<T>> {
        let op = prepare::<T>(OpKind::CooToCsr)?;
        let (batch, rows, _cols) = split_shape(&self.dense_shape)?;
        self.require_canonical("indices")?;
        debug!(op = op.name(), shape = ?self.dense_shape, nnz = self.nnz());

        let nnz = self.nnz();
        let batched = self.rank() == 3;
        let mut batch_of = Vec::with_capacity(if batched { nnz } else { 0 });
        let mut row_idx = Vec::with_capacity(nnz);
        let mut col_idx = Vec::with_capacity(nnz);
        for n in 0..nnz {
            let coord = self.coord(n);
            let (r, c) = (coord[coord.len() - 2], coord[coord.len() - 1]);
            if batched {
                batch_of.push(coord[0] as usize);
            }
            row_idx.push(r);
            col_idx.push(c);
        }

        // Canonical order keeps each batch contiguous
        let mut offsets = vec![0usize; batch + 1];
        if batched {
            for &b in &batch_of {
                offsets[b + 1] += 1;
            }
            for b in 1..=batch {
                offsets[b] += offsets[b - 1];
            }
        } else {
            offsets[1] = nnz;
        }

        let blocks = map_batches(batch, |b| {
            let range = offsets[b]..offsets[b + 1];
            coo_to_csr_block(
                rows,
                &row_idx[range.clone()],
                &col_idx[range.clone()],
                &self.values[range],
            )
        });
        Ok(CsrMatrix::from_joined(
            self.dense_shape.clone(),
            join_blocks(blocks),
        ))
    }

    /// Scatter into a zero-filled dense tensor, summing duplicate coordinates
    pub fn to_dense(&self) -> DenseTensor<T> {
        debug!(
            op = OpKind::SparseToDense.name(),
            shape = ?self.dense_shape,
            nnz = self.nnz()
        );
        let mut dense = DenseTensor::zeros(&self.dense_shape);
        self.scatter_add(dense.as_mut_slice());
        dense
    }

    /// Collect the non-zero entries of a dense tensor in row-major order
    ///
    /// # Errors
    ///
    /// Returns `InvalidRank` for a rank-0 tensor.
    pub fn from_dense(dense: &DenseTensor<T>) -> Result<Self> {
        let op = prepare::<T>(OpKind::DenseToSparse)?;
        let shape = dense.shape();
        if shape.is_empty() {
            return Err(Error::invalid_rank("dense", "at least 1", 0));
        }
        debug!(op = op.name(), shape = ?shape);

        let rank = shape.len();
        let zero = T::zero();
        let mut indices = Vec::new();
        let mut values = Vec::new();
        let mut coord = vec![0i64; rank];
        for &v in dense.as_slice() {
            if v != zero {
                indices.extend_from_slice(&coord);
                values.push(v);
            }
            // Advance the row-major odometer
            for axis in (0..rank).rev() {
                coord[axis] += 1;
                if (coord[axis] as usize) < shape[axis] {
                    break;
                }
                coord[axis] = 0;
            }
        }

        Ok(Self::from_parts_unchecked(indices, values, shape.to_vec()))
    }

    /// Add every entry into `out`, a row-major buffer of the dense shape
    pub(crate) fn scatter_add(&self, out: &mut [T]) {
        for (n, &v) in self.values.iter().enumerate() {
            let offset = self.linear_offset(n);
            out[offset] = out[offset] + v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_to_csr_rank2() {
        let coo = CooTensor::new(vec![0, 1, 1, 2], vec![1.0f32, 2.0], &[3, 4]).unwrap();
        let csr = coo.to_csr().unwrap();
        assert_eq!(csr.batch_pointers(), &[0, 2]);
        assert_eq!(csr.row_pointers(), &[0, 1, 2, 2]);
        assert_eq!(csr.col_indices(), &[1, 2]);
        assert_eq!(csr.values(), &[1.0, 2.0]);
    }

    #[test]
    fn test_to_csr_batched_with_empty_batch() {
        // batch 0 empty, batch 1 has (0,1) and (1,0)
        let coo = CooTensor::new(vec![1, 0, 1, 1, 1, 0], vec![5i32, 6], &[2, 2, 2]).unwrap();
        let csr = coo.to_csr().unwrap();
        assert_eq!(csr.batch_pointers(), &[0, 0, 2]);
        assert_eq!(csr.row_pointers(), &[0, 0, 0, 0, 1, 2]);
        assert_eq!(csr.col_indices(), &[1, 0]);
        assert_eq!(csr.to_coo(), coo);
    }

    #[test]
    fn test_to_csr_rejects_unsorted_and_rank() {
        let unsorted = CooTensor::new(vec![1, 0, 0, 0], vec![1.0f64, 2.0], &[2, 2]).unwrap();
        assert_eq!(unsorted.to_csr().unwrap_err().kind(), ErrorKind::Value);

        let rank1 = CooTensor::new(vec![0], vec![1.0f64], &[4]).unwrap();
        assert_eq!(rank1.to_csr().unwrap_err().kind(), ErrorKind::Shape);
    }

    #[test]
    fn test_to_dense_sums_duplicates() {
        let coo = CooTensor::new(vec![0, 1, 1, 2, 0, 1], vec![1, 2, 3], &[3, 4]).unwrap();
        let dense = coo.to_dense();
        assert_eq!(dense.get(&[0, 1]), Some(4));
        assert_eq!(dense.get(&[1, 2]), Some(2));
        assert_eq!(dense.as_slice().iter().sum::<i32>(), 6);
    }

    #[test]
    fn test_from_dense_rank3() {
        let dense =
            DenseTensor::from_vec(vec![0.0f64, 1.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0], &[2, 2, 2])
                .unwrap();
        let coo = CooTensor::from_dense(&dense).unwrap();
        assert_eq!(coo.indices(), &[0, 0, 1, 1, 1, 0]);
        assert_eq!(coo.values(), &[1.0, 2.0]);
        assert!(coo.is_canonical());
        assert_eq!(coo.to_dense(), dense);
    }
}
