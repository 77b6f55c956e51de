//! Core dense tensor implementation: struct, creation, getters

use crate::dtype::{DType, Element};
use crate::error::{Error, Result};

/// Owned, contiguous, row-major n-dimensional array
#[derive(Debug, Clone, PartialEq)]
pub struct DenseTensor<T: Element> {
    data: Vec<T>,
    shape: Vec<usize>,
}

impl<T: Element> DenseTensor<T> {
    /// Create a tensor taking ownership of `data`
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if `data.len()` is not the product of `shape`.
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(Error::shape_mismatch(&[numel], &[data.len()]));
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
        })
    }

    /// Create a tensor by copying `data`
    pub fn from_slice(data: &[T], shape: &[usize]) -> Result<Self> {
        Self::from_vec(data.to_vec(), shape)
    }

    /// Create a zero-filled tensor
    pub fn zeros(shape: &[usize]) -> Self {
        let numel: usize = shape.iter().product();
        Self {
            data: vec![T::zero(); numel],
            shape: shape.to_vec(),
        }
    }

    /// Returns the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Element type tag
    #[inline]
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Borrow the row-major data
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the tensor, returning its data buffer
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Element at a multi-dimensional index, or `None` if out of range
    pub fn get(&self, index: &[usize]) -> Option<T> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0usize;
        for (&i, &dim) in index.iter().zip(&self.shape) {
            if i >= dim {
                return None;
            }
            offset = offset * dim + i;
        }
        self.data.get(offset).copied()
    }

    /// Element-wise sum of two tensors of identical shape
    pub fn add(&self, other: &Self) -> Result<Self> {
        if self.shape != other.shape {
            return Err(Error::shape_mismatch(&self.shape, &other.shape));
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| a + b)
            .collect();
        Ok(Self {
            data,
            shape: self.shape.clone(),
        })
    }

    /// Wrap a buffer whose length already matches `shape`
    pub(crate) fn from_parts(data: Vec<T>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(data.len(), shape.iter().product::<usize>());
        Self { data, shape }
    }

    /// Split a rank-2 or rank-3 shape into `(batch, rows, cols)`
    pub(crate) fn matrix_dims(&self, arg: &'static str) -> Result<(usize, usize, usize)> {
        match *self.shape.as_slice() {
            [rows, cols] => Ok((1, rows, cols)),
            [batch, rows, cols] => Ok((batch, rows, cols)),
            _ => Err(Error::invalid_rank(arg, "2 or 3", self.shape.len())),
        }
    }

    /// Swap the last two axes of a rank-2 or rank-3 tensor, optionally conjugating
    pub(crate) fn transpose_matrices(&self, conjugate: bool) -> Result<Self> {
        let (batch, rows, cols) = self.matrix_dims("dense")?;
        let mut data = vec![T::zero(); self.data.len()];
        for b in 0..batch {
            let base = b * rows * cols;
            for r in 0..rows {
                for c in 0..cols {
                    let v = self.data[base + r * cols + c];
                    data[base + c * rows + r] = if conjugate { v.conj() } else { v };
                }
            }
        }
        let mut shape = self.shape.clone();
        let n = shape.len();
        shape.swap(n - 2, n - 1);
        Ok(Self { data, shape })
    }

    /// Apply the output flags of a matrix product to its result
    pub(crate) fn finish_product(self, transpose: bool, conjugate: bool) -> Result<Self> {
        if transpose {
            self.transpose_matrices(conjugate)
        } else if conjugate {
            let data = self.data.into_iter().map(Element::conj).collect();
            Ok(Self {
                data,
                shape: self.shape,
            })
        } else {
            Ok(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Complex64;

    #[test]
    fn test_from_vec_checks_length() {
        let err = DenseTensor::from_vec(vec![1.0f32, 2.0, 3.0], &[2, 2]).unwrap_err();
        assert_eq!(err, Error::shape_mismatch(&[4], &[3]));
    }

    #[test]
    fn test_get() {
        let t = DenseTensor::from_slice(&[1i32, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        assert_eq!(t.get(&[1, 0]), Some(4));
        assert_eq!(t.get(&[0, 2]), Some(3));
        assert_eq!(t.get(&[2, 0]), None);
        assert_eq!(t.get(&[0]), None);
    }

    #[test]
    fn test_transpose_matrices_batched() {
        // Two 2x3 matrices
        let t = DenseTensor::from_slice(
            &[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0],
            &[2, 2, 3],
        )
        .unwrap();
        let tt = t.transpose_matrices(false).unwrap();
        assert_eq!(tt.shape(), &[2, 3, 2]);
        assert_eq!(
            tt.as_slice(),
            &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0, 7.0, 10.0, 8.0, 11.0, 9.0, 12.0]
        );
    }

    #[test]
    fn test_transpose_conjugates() {
        let t = DenseTensor::from_slice(&[Complex64::new(1.0, 2.0)], &[1, 1]).unwrap();
        let tt = t.transpose_matrices(true).unwrap();
        assert_eq!(tt.as_slice(), &[Complex64::new(1.0, -2.0)]);
    }

    #[test]
    fn test_matrix_dims_rejects_rank_one() {
        let t = DenseTensor::<f32>::zeros(&[4]);
        let err = t.matrix_dims("dense").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Shape);
    }
}
