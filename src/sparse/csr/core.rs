//! Core CSR implementation: struct, creation, getters

use tracing::trace;

use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::kernels::CsrView;
use crate::kernels::batch::JoinedCsr;
use crate::ops::OpKind;

use super::super::format::{SparseFormat, SparseStorage};

/// Batched CSR sparse matrix
///
/// `dense_shape` is `[rows, cols]` or `[batch, rows, cols]`. Row pointers are
/// global offsets into `col_indices`/`values`: batch `b` owns the pointer
/// slice `row_pointers[b * (rows + 1)..(b + 1) * (rows + 1)]`, which starts
/// at `batch_pointers[b]` and ends at `batch_pointers[b + 1]`.
///
/// ```text
/// dense_shape    = [2, 2, 3]
/// batch_pointers = [0, 2, 3]
/// row_pointers   = [0, 1, 2,  2, 2, 3]
/// col_indices    = [0, 2, 1]
/// values         = [a, b, c]
///
/// batch 0: [a 0 0]   batch 1: [0 0 0]
///          [0 0 b]            [0 c 0]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<T: Element> {
    pub(crate) dense_shape: Vec<usize>,
    pub(crate) batch_pointers: Vec<i64>,
    pub(crate) row_pointers: Vec<i64>,
    pub(crate) col_indices: Vec<i64>,
    pub(crate) values: Vec<T>,
}

/// The raw buffers of a [`CsrMatrix`]
#[derive(Debug, Clone, PartialEq)]
pub struct CsrParts<T> {
    /// `[rows, cols]` or `[batch, rows, cols]`
    pub dense_shape: Vec<usize>,
    /// Length `batch + 1`
    pub batch_pointers: Vec<i64>,
    /// Length `(rows + 1) * batch`, global offsets
    pub row_pointers: Vec<i64>,
    /// Column of each entry
    pub col_indices: Vec<i64>,
    /// Value of each entry
    pub values: Vec<T>,
}

impl<T: Element> CsrMatrix<T> {
    /// Create a CSR matrix from raw buffers
    ///
    /// # Errors
    ///
    /// - `InvalidRank` if `dense_shape` is not rank 2 or 3
    /// - `ShapeMismatch` if a buffer has the wrong length
    /// - `InvalidArgument` if pointers are not consistent and non-decreasing,
    ///   or a row's columns are not strictly increasing
    /// - `IndexOutOfBounds` if a column index is outside `[0, cols)`
    pub fn new(
        dense_shape: &[usize],
        batch_pointers: Vec<i64>,
        row_pointers: Vec<i64>,
        col_indices: Vec<i64>,
        values: Vec<T>,
    ) -> Result<Self> {
        let (batch, rows, cols) = split_shape(dense_shape)?;
        let nnz = values.len();

        if batch_pointers.len() != batch + 1 {
            return Err(Error::shape_mismatch(&[batch + 1], &[batch_pointers.len()]));
        }
        if row_pointers.len() != (rows + 1) * batch {
            return Err(Error::shape_mismatch(
                &[(rows + 1) * batch],
                &[row_pointers.len()],
            ));
        }
        if col_indices.len() != nnz {
            return Err(Error::shape_mismatch(&[nnz], &[col_indices.len()]));
        }

        if batch_pointers[0] != 0 {
            return Err(Error::invalid_argument(
                "batch_pointers",
                format!("must start at 0, got {}", batch_pointers[0]),
            ));
        }
        if batch_pointers[batch] != nnz as i64 {
            return Err(Error::invalid_argument(
                "batch_pointers",
                format!("must end at nnz {nnz}, got {}", batch_pointers[batch]),
            ));
        }
        if batch_pointers.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::invalid_argument(
                "batch_pointers",
                "must be non-decreasing",
            ));
        }

        for (b, ptrs) in row_pointers.chunks_exact(rows + 1).enumerate() {
            if ptrs[0] != batch_pointers[b] || ptrs[rows] != batch_pointers[b + 1] {
                return Err(Error::invalid_argument(
                    "row_pointers",
                    format!(
                        "batch {b} spans [{}, {}], expected [{}, {}]",
                        ptrs[0],
                        ptrs[rows],
                        batch_pointers[b],
                        batch_pointers[b + 1]
                    ),
                ));
            }
            if let Some(r) = ptrs.windows(2).position(|w| w[0] > w[1]) {
                return Err(Error::invalid_argument(
                    "row_pointers",
                    format!("decreasing at batch {b}, row {r}"),
                ));
            }
            for (r, w) in ptrs.windows(2).enumerate() {
                let row_cols = &col_indices[w[0] as usize..w[1] as usize];
                for (k, &c) in row_cols.iter().enumerate() {
                    if c < 0 || c as usize >= cols {
                        return Err(Error::IndexOutOfBounds {
                            index: c,
                            size: cols,
                        });
                    }
                    if k > 0 && row_cols[k - 1] >= c {
                        return Err(Error::invalid_argument(
                            "col_indices",
                            format!("not strictly increasing in batch {b}, row {r}"),
                        ));
                    }
                }
            }
        }

        trace!(?dense_shape, nnz, "validated csr matrix");
        Ok(Self {
            dense_shape: dense_shape.to_vec(),
            batch_pointers,
            row_pointers,
            col_indices,
            values,
        })
    }

    /// Create a matrix with no explicit entries
    pub fn zeros(dense_shape: &[usize]) -> Result<Self> {
        let (batch, rows, _) = split_shape(dense_shape)?;
        Ok(Self {
            dense_shape: dense_shape.to_vec(),
            batch_pointers: vec![0; batch + 1],
            row_pointers: vec![0; (rows + 1) * batch],
            col_indices: Vec::new(),
            values: Vec::new(),
        })
    }

    /// Assemble a matrix from joined kernel output
    pub(crate) fn from_joined(dense_shape: Vec<usize>, joined: JoinedCsr<T>) -> Self {
        Self {
            dense_shape,
            batch_pointers: joined.batch_pointers,
            row_pointers: joined.row_pointers,
            col_indices: joined.col_indices,
            values: joined.values,
        }
    }

    /// Logical dense shape
    #[inline]
    pub fn dense_shape(&self) -> &[usize] {
        &self.dense_shape
    }

    /// 2 for a single matrix, 3 for a batch
    #[inline]
    pub fn rank(&self) -> usize {
        self.dense_shape.len()
    }

    /// Number of matrices (1 for rank 2)
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_pointers.len() - 1
    }

    /// Rows per matrix
    #[inline]
    pub fn rows(&self) -> usize {
        self.dense_shape[self.rank() - 2]
    }

    /// Columns per matrix
    #[inline]
    pub fn cols(&self) -> usize {
        self.dense_shape[self.rank() - 1]
    }

    /// Batch pointer buffer
    #[inline]
    pub fn batch_pointers(&self) -> &[i64] {
        &self.batch_pointers
    }

    /// Row pointer buffer (global offsets)
    #[inline]
    pub fn row_pointers(&self) -> &[i64] {
        &self.row_pointers
    }

    /// Column index buffer
    #[inline]
    pub fn col_indices(&self) -> &[i64] {
        &self.col_indices
    }

    /// Value buffer
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Total number of explicit entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Explicit entries per batch
    pub fn nnz_per_batch(&self) -> Vec<i64> {
        trace!(op = OpKind::CsrNnz.name(), batch = self.batch_size());
        self.batch_pointers.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Consume the matrix, returning its buffers
    pub fn into_parts(self) -> CsrParts<T> {
        CsrParts {
            dense_shape: self.dense_shape,
            batch_pointers: self.batch_pointers,
            row_pointers: self.row_pointers,
            col_indices: self.col_indices,
            values: self.values,
        }
    }

    /// Borrow batch `b` for the kernels
    pub(crate) fn batch_view(&self, b: usize) -> CsrView<'_, T> {
        let rows = self.rows();
        CsrView {
            rows,
            cols: self.cols(),
            row_ptrs: &self.row_pointers[b * (rows + 1)..(b + 1) * (rows + 1)],
            col_indices: &self.col_indices,
            values: &self.values,
        }
    }

    /// Dense shape with the given batch, rows and cols, keeping this matrix's rank
    pub(crate) fn shape_like(&self, batch: usize, rows: usize, cols: usize) -> Vec<usize> {
        if self.rank() == 3 {
            vec![batch, rows, cols]
        } else {
            vec![rows, cols]
        }
    }
}

impl<T: Element> SparseStorage for CsrMatrix<T> {
    fn format(&self) -> SparseFormat {
        SparseFormat::Csr
    }

    fn dense_shape(&self) -> &[usize] {
        &self.dense_shape
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn memory_usage(&self) -> usize {
        let index_len =
            self.batch_pointers.len() + self.row_pointers.len() + self.col_indices.len();
        index_len * std::mem::size_of::<i64>() + self.values.len() * std::mem::size_of::<T>()
    }
}

/// Split a rank-2 or rank-3 dense shape into `(batch, rows, cols)`
pub(crate) fn split_shape(dense_shape: &[usize]) -> Result<(usize, usize, usize)> {
    match *dense_shape {
        [rows, cols] => Ok((1, rows, cols)),
        [batch, rows, cols] => Ok((batch, rows, cols)),
        _ => Err(Error::invalid_rank("dense_shape", "2 or 3", dense_shape.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn batched() -> CsrMatrix<f32> {
        CsrMatrix::new(
            &[2, 2, 3],
            vec![0, 2, 3],
            vec![0, 1, 2, 2, 2, 3],
            vec![0, 2, 1],
            vec![1.0, 2.0, 3.0],
        )
        .unwrap()
    }

    #[test]
    fn test_accessors() {
        let m = batched();
        assert_eq!(m.rank(), 3);
        assert_eq!(m.batch_size(), 2);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.nnz_per_batch(), vec![2, 1]);
        assert_eq!(m.format(), SparseFormat::Csr);
        assert_eq!(m.dtype(), DType::F32);
        assert!((m.sparsity() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_batch_view_uses_global_offsets() {
        let m = batched();
        let v = m.batch_view(1);
        assert_eq!(v.row_ptrs, &[2, 2, 3]);
        assert_eq!(v.row_range(1), 2..3);
        assert_eq!(v.nnz(), 1);
    }

    #[test]
    fn test_rejects_bad_rank() {
        let err = CsrMatrix::<f64>::new(&[4], vec![0, 0], vec![], vec![], vec![]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn test_rejects_pointer_length() {
        let err =
            CsrMatrix::<f64>::new(&[2, 2], vec![0, 0], vec![0, 0], vec![], vec![]).unwrap_err();
        assert_eq!(err, Error::shape_mismatch(&[3], &[2]));
    }

    #[test]
    fn test_rejects_unsorted_row() {
        let err = CsrMatrix::new(&[1, 3], vec![0, 2], vec![0, 2], vec![2, 1], vec![1.0, 2.0])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn test_rejects_column_out_of_range() {
        let err = CsrMatrix::new(&[1, 3], vec![0, 1], vec![0, 1], vec![3], vec![1.0]).unwrap_err();
        assert_eq!(err, Error::IndexOutOfBounds { index: 3, size: 3 });
    }

    #[test]
    fn test_rejects_local_batch_pointers() {
        // Second batch restarting at 0 is not a global offset
        let err = CsrMatrix::new(
            &[2, 1, 2],
            vec![0, 1, 2],
            vec![0, 1, 0, 1],
            vec![0, 1],
            vec![1i32, 2],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn test_zeros_and_into_parts() {
        let z = CsrMatrix::<i64>::zeros(&[3, 2, 5]).unwrap();
        let parts = z.into_parts();
        assert_eq!(parts.batch_pointers, vec![0, 0, 0, 0]);
        assert_eq!(parts.row_pointers, vec![0; 9]);
        assert!(parts.values.is_empty());
    }
}
