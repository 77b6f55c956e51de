//! Core COO implementation: struct, creation, getters

use tracing::trace;

use crate::dtype::{DType, Element};
use crate::error::{Error, Result};

use super::super::format::{SparseFormat, SparseStorage};

/// COO (Coordinate) sparse tensor of any rank
///
/// `indices` is a flat row-major `(nnz, rank)` buffer: entry `n` has
/// coordinate `indices[n * rank..(n + 1) * rank]` and value `values[n]`.
/// Duplicate coordinates are representable; operations that need a
/// canonical operand say so.
#[derive(Debug, Clone, PartialEq)]
pub struct CooTensor<T: Element> {
    pub(crate) indices: Vec<i64>,
    pub(crate) values: Vec<T>,
    pub(crate) dense_shape: Vec<usize>,
}

impl<T: Element> CooTensor<T> {
    /// Create a new COO tensor from components
    ///
    /// # Arguments
    ///
    /// * `indices` - Flat `(nnz, rank)` coordinate buffer
    /// * `values` - Value of each entry
    /// * `dense_shape` - Logical dense shape, rank at least 1
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `dense_shape` is empty (`InvalidRank`)
    /// - `indices.len() != values.len() * rank` (`ShapeMismatch`)
    /// - a coordinate component is outside its dimension (`IndexOutOfBounds`)
    pub fn new(indices: Vec<i64>, values: Vec<T>, dense_shape: &[usize]) -> Result<Self> {
        let rank = dense_shape.len();
        if rank == 0 {
            return Err(Error::invalid_rank("dense_shape", "at least 1", 0));
        }
        let nnz = values.len();
        if indices.len() != nnz * rank {
            return Err(Error::shape_mismatch(&[nnz, rank], &[indices.len()]));
        }

        for coord in indices.chunks_exact(rank) {
            for (&c, &dim) in coord.iter().zip(dense_shape) {
                if c < 0 || c as usize >= dim {
                    return Err(Error::IndexOutOfBounds { index: c, size: dim });
                }
            }
        }

        trace!(?dense_shape, nnz, "validated coo tensor");
        Ok(Self {
            indices,
            values,
            dense_shape: dense_shape.to_vec(),
        })
    }

    /// Create a tensor with no entries
    pub fn empty(dense_shape: &[usize]) -> Result<Self> {
        Self::new(Vec::new(), Vec::new(), dense_shape)
    }

    /// Wrap buffers produced by a kernel that already satisfy the invariants
    pub(crate) fn from_parts_unchecked(
        indices: Vec<i64>,
        values: Vec<T>,
        dense_shape: Vec<usize>,
    ) -> Self {
        debug_assert_eq!(indices.len(), values.len() * dense_shape.len());
        Self {
            indices,
            values,
            dense_shape,
        }
    }

    /// Flat coordinate buffer
    #[inline]
    pub fn indices(&self) -> &[i64] {
        &self.indices
    }

    /// Value buffer
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Logical dense shape
    #[inline]
    pub fn dense_shape(&self) -> &[usize] {
        &self.dense_shape
    }

    /// Number of dimensions
    #[inline]
    pub fn rank(&self) -> usize {
        self.dense_shape.len()
    }

    /// Number of explicit entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Coordinate of entry `n`
    #[inline]
    pub fn coord(&self, n: usize) -> &[i64] {
        let rank = self.rank();
        &self.indices[n * rank..(n + 1) * rank]
    }

    /// True if coordinates are strictly increasing in row-major order
    ///
    /// Canonical tensors are sorted and free of duplicates.
    pub fn is_canonical(&self) -> bool {
        (1..self.nnz()).all(|n| self.coord(n - 1) < self.coord(n))
    }

    /// Consume the tensor, returning `(indices, values, dense_shape)`
    pub fn into_parts(self) -> (Vec<i64>, Vec<T>, Vec<usize>) {
        (self.indices, self.values, self.dense_shape)
    }

    /// Row-major linear offset of entry `n` in the dense layout
    pub(crate) fn linear_offset(&self, n: usize) -> usize {
        self.coord(n)
            .iter()
            .zip(&self.dense_shape)
            .fold(0usize, |acc, (&c, &dim)| acc * dim + c as usize)
    }

    pub(crate) fn require_canonical(&self, arg: &'static str) -> Result<()> {
        if self.is_canonical() {
            Ok(())
        } else {
            Err(Error::invalid_argument(
                arg,
                "indices must be in row-major order without duplicates",
            ))
        }
    }
}

impl<T: Element> SparseStorage for CooTensor<T> {
    fn format(&self) -> SparseFormat {
        SparseFormat::Coo
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
        self.indices.len() * std::mem::size_of::<i64>()
            + self.values.len() * std::mem::size_of::<T>()
    }
}
