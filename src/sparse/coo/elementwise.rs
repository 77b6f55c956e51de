//! COO element-wise operations and structural transforms
//!
//! Merging operations require canonical operands of the same dense shape and
//! walk both coordinate lists once. See `kernels::merge` for the closures each
//! operation plugs in.

use tracing::debug;

use super::CooTensor;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::kernels::merge::{coalesce, merge_coo, partial_min};
use crate::ops::{ConcatConfig, OpKind, SparseAddConfig, SplitConfig};
use crate::sparse::prepare;
use crate::tensor::DenseTensor;

impl<T: Element> CooTensor<T> {
    /// Add two COO tensors, dropping results whose magnitude is below `thresh`
    ///
    /// With `thresh == 0.0` every position present in either operand is kept,
    /// including sums that cancel to zero.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `thresh` is negative or not finite, or an
    ///   operand is not canonical
    /// - `ShapeMismatch` if the dense shapes differ
    pub fn add(&self, other: &Self, thresh: f64) -> Result<Self> {
        let op = prepare::<T>(OpKind::SparseAdd(SparseAddConfig { thresh }))?;
        self.check_same_shape(other)?;
        self.require_canonical("a")?;
        other.require_canonical("b")?;
        debug!(
            op = op.name(),
            shape = ?self.dense_shape,
            lhs_nnz = self.nnz(),
            rhs_nnz = other.nnz(),
            thresh
        );

        let (indices, values) = merge_coo(
            self.rank(),
            &self.indices,
            &self.values,
            &other.indices,
            &other.values,
            |a, b| a + b,
            |a| a,
            |b| b,
            |v: T| v.magnitude() >= thresh,
        );
        Ok(Self::from_parts_unchecked(
            indices,
            values,
            self.dense_shape.clone(),
        ))
    }

    /// Element-wise minimum, treating absent entries as zero
    ///
    /// Every coordinate explicit in either operand appears in the output,
    /// even when the minimum is zero.
    ///
    /// # Errors
    ///
    /// - `UnsupportedDType` for complex values
    /// - `ShapeMismatch` if ranks or dense shapes differ
    /// - `InvalidArgument` if an operand is not canonical
    pub fn minimum(&self, other: &Self) -> Result<Self> {
        let op = prepare::<T>(OpKind::SparseMinimum)?;
        self.check_same_shape(other)?;
        self.require_canonical("x1")?;
        other.require_canonical("x2")?;
        debug!(
            op = op.name(),
            shape = ?self.dense_shape,
            lhs_nnz = self.nnz(),
            rhs_nnz = other.nnz()
        );

        let zero = T::zero();
        let (indices, values) = merge_coo(
            self.rank(),
            &self.indices,
            &self.values,
            &other.indices,
            &other.values,
            partial_min,
            |a| partial_min(a, zero),
            |b| partial_min(b, zero),
            |_| true,
        );
        Ok(Self::from_parts_unchecked(
            indices,
            values,
            self.dense_shape.clone(),
        ))
    }

    /// Add this sparse tensor to a dense tensor of the same shape
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if `dense` has a different shape.
    pub fn add_dense(&self, dense: &DenseTensor<T>) -> Result<DenseTensor<T>> {
        let op = prepare::<T>(OpKind::SparseDenseAdd)?;
        if dense.shape() != self.dense_shape.as_slice() {
            return Err(Error::shape_mismatch(&self.dense_shape, dense.shape()));
        }
        debug!(op = op.name(), shape = ?self.dense_shape, nnz = self.nnz());

        let mut out = dense.clone();
        self.scatter_add(out.as_mut_slice());
        Ok(out)
    }

    /// Concatenate tensors along `dim`
    ///
    /// Negative `dim` counts from the end. Coordinates of each input are
    /// offset by the extents of the inputs before it; the result is
    /// canonical.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for fewer than two inputs or `dim` out of range
    /// - `InvalidRank` if the inputs' ranks differ
    /// - `ShapeMismatch` if any dimension other than `dim` differs
    pub fn concat(inputs: &[Self], dim: isize) -> Result<Self> {
        let op = prepare::<T>(OpKind::SparseConcat(ConcatConfig { dim }))?;
        let [first, rest @ ..] = inputs else {
            return Err(Error::invalid_argument("inputs", "expected at least 2 tensors, got 0"));
        };
        if rest.is_empty() {
            return Err(Error::invalid_argument("inputs", "expected at least 2 tensors, got 1"));
        }

        let rank = first.rank();
        let axis = normalize_dim(dim, rank)?;
        let mut out_shape = first.dense_shape.clone();
        for t in rest {
            if t.rank() != rank {
                return Err(Error::invalid_rank("inputs", "equal ranks", t.rank()));
            }
            let other_dims_match = (0..rank)
                .filter(|&d| d != axis)
                .all(|d| t.dense_shape[d] == first.dense_shape[d]);
            if !other_dims_match {
                return Err(Error::shape_mismatch(&first.dense_shape, &t.dense_shape));
            }
            out_shape[axis] += t.dense_shape[axis];
        }
        debug!(op = op.name(), inputs = inputs.len(), axis, shape = ?out_shape);

        let total: usize = inputs.iter().map(CooTensor::nnz).sum();
        let mut indices = Vec::with_capacity(total * rank);
        let mut values = Vec::with_capacity(total);
        let mut offset = 0i64;
        for t in inputs {
            for coord in t.indices.chunks_exact(rank) {
                let start = indices.len();
                indices.extend_from_slice(coord);
                indices[start + axis] += offset;
            }
            values.extend_from_slice(&t.values);
            offset += t.dense_shape[axis] as i64;
        }

        let (indices, values) = coalesce(rank, &indices, &values);
        Ok(Self::from_parts_unchecked(indices, values, out_shape))
    }

    /// Split along `dim` into `num_split` pieces
    ///
    /// When `dense_shape[dim]` is not divisible by `num_split`, the first
    /// `dense_shape[dim] % num_split` pieces are one larger. Entries keep
    /// their input order and their coordinate along `dim` is re-based.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `dim >= rank`, `num_split == 0` or
    /// `num_split > dense_shape[dim]`.
    pub fn split(&self, dim: usize, num_split: usize) -> Result<Vec<Self>> {
        let op = prepare::<T>(OpKind::SparseSplit(SplitConfig { dim, num_split }))?;
        let rank = self.rank();
        if dim >= rank {
            return Err(Error::invalid_argument(
                "dim",
                format!("{dim} is out of range for rank {rank}"),
            ));
        }
        let extent = self.dense_shape[dim];
        if num_split > extent {
            return Err(Error::invalid_argument(
                "num_split",
                format!("{num_split} exceeds dimension size {extent}"),
            ));
        }
        debug!(op = op.name(), shape = ?self.dense_shape, dim, num_split);

        let base = extent / num_split;
        let extra = extent % num_split;
        // Pieces [0, extra) have base + 1 slots, the rest have base
        let start_of = |p: usize| p * base + p.min(extra);
        let piece_of = |c: usize| {
            let big = extra * (base + 1);
            if c < big {
                c / (base + 1)
            } else {
                extra + (c - big) / base
            }
        };

        let mut pieces: Vec<(Vec<i64>, Vec<T>)> = vec![(Vec::new(), Vec::new()); num_split];
        for (coord, &v) in self.indices.chunks_exact(rank).zip(&self.values) {
            let c = coord[dim] as usize;
            let p = piece_of(c);
            let (indices, values) = &mut pieces[p];
            let start = indices.len();
            indices.extend_from_slice(coord);
            indices[start + dim] -= start_of(p) as i64;
            values.push(v);
        }

        Ok(pieces
            .into_iter()
            .enumerate()
            .map(|(p, (indices, values))| {
                let mut shape = self.dense_shape.clone();
                shape[dim] = start_of(p + 1) - start_of(p);
                Self::from_parts_unchecked(indices, values, shape)
            })
            .collect())
    }

    fn check_same_shape(&self, other: &Self) -> Result<()> {
        if self.dense_shape == other.dense_shape {
            Ok(())
        } else {
            Err(Error::shape_mismatch(&self.dense_shape, &other.dense_shape))
        }
    }
}

/// Map `dim` in `[-rank, rank)` to an axis index
fn normalize_dim(dim: isize, rank: usize) -> Result<usize> {
    let r = rank as isize;
    if dim < -r || dim >= r {
        return Err(Error::invalid_argument(
            "dim",
            format!("{dim} is out of range [-{rank}, {rank})"),
        ));
    }
    Ok(if dim < 0 { (dim + r) as usize } else { dim as usize })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Complex64;
    use crate::error::ErrorKind;

    #[test]
    fn test_add_thresh_drops_small() {
        let a = CooTensor::new(vec![0, 0, 1, 1], vec![1.0f64, 0.5], &[2, 2]).unwrap();
        let b = CooTensor::new(vec![0, 0, 1, 1], vec![-0.9, 0.0], &[2, 2]).unwrap();
        let c = a.add(&b, 0.2).unwrap();
        assert_eq!(c.indices(), &[1, 1]);
        assert_eq!(c.values(), &[0.5]);

        let all = a.add(&b, 0.0).unwrap();
        assert_eq!(all.nnz(), 2);
    }

    #[test]
    fn test_add_rejects_negative_thresh() {
        let a = CooTensor::<f32>::empty(&[2, 2]).unwrap();
        assert_eq!(a.add(&a, -0.1).unwrap_err().kind(), ErrorKind::Value);
    }

    #[test]
    fn test_minimum_rejects_complex() {
        let a = CooTensor::<Complex64>::empty(&[2]).unwrap();
        assert_eq!(a.minimum(&a).unwrap_err().kind(), ErrorKind::DType);
    }

    #[test]
    fn test_minimum_shape_mismatch() {
        let a = CooTensor::<i32>::empty(&[2, 2]).unwrap();
        let b = CooTensor::<i32>::empty(&[2, 3]).unwrap();
        assert_eq!(a.minimum(&b).unwrap_err().kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn test_add_dense() {
        let a = CooTensor::new(vec![0, 0, 0, 0], vec![1i64, 1], &[2, 2]).unwrap();
        let d = DenseTensor::from_vec(vec![1i64, 1, 1, 1], &[2, 2]).unwrap();
        assert_eq!(a.add_dense(&d).unwrap().as_slice(), &[3, 1, 1, 1]);

        let wrong = DenseTensor::<i64>::zeros(&[4]);
        assert_eq!(
            a.add_dense(&wrong).unwrap_err().kind(),
            ErrorKind::ShapeMismatch
        );
    }

    #[test]
    fn test_concat_negative_dim() {
        let a = CooTensor::new(vec![0, 1], vec![1.0f32], &[2, 2]).unwrap();
        let b = CooTensor::new(vec![1, 0], vec![2.0f32], &[2, 3]).unwrap();
        let c = CooTensor::concat(&[a, b], -1).unwrap();
        assert_eq!(c.dense_shape(), &[2, 5]);
        assert_eq!(c.indices(), &[0, 1, 1, 2]);
        assert_eq!(c.values(), &[1.0, 2.0]);
    }

    #[test]
    fn test_concat_errors() {
        let a = CooTensor::<f32>::empty(&[2, 2]).unwrap();
        let b = CooTensor::<f32>::empty(&[3, 3]).unwrap();
        let c = CooTensor::<f32>::empty(&[2]).unwrap();
        assert_eq!(
            CooTensor::concat(std::slice::from_ref(&a), 0).unwrap_err().kind(),
            ErrorKind::Value
        );
        assert_eq!(
            CooTensor::concat(&[a.clone(), a.clone()], 2).unwrap_err().kind(),
            ErrorKind::Value
        );
        assert_eq!(
            CooTensor::concat(&[a.clone(), b], 0).unwrap_err().kind(),
            ErrorKind::ShapeMismatch
        );
        assert_eq!(
            CooTensor::concat(&[a, c], 0).unwrap_err().kind(),
            ErrorKind::Shape
        );
    }

    #[test]
    fn test_split_uneven() {
        // 5 rows into 3 pieces: sizes 2, 2, 1
        let t = CooTensor::new(vec![0, 0, 2, 1, 3, 0, 4, 1], vec![1, 2, 3, 4], &[5, 2]).unwrap();
        let parts = t.split(0, 3).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].dense_shape(), &[2, 2]);
        assert_eq!(parts[1].dense_shape(), &[2, 2]);
        assert_eq!(parts[2].dense_shape(), &[1, 2]);
        assert_eq!(parts[0].indices(), &[0, 0]);
        assert_eq!(parts[1].indices(), &[0, 1, 1, 0]);
        assert_eq!(parts[1].values(), &[2, 3]);
        assert_eq!(parts[2].indices(), &[0, 1]);
    }

    #[test]
    fn test_split_errors() {
        let t = CooTensor::<f64>::empty(&[2, 2]).unwrap();
        assert_eq!(t.split(2, 1).unwrap_err().kind(), ErrorKind::Value);
        assert_eq!(t.split(0, 0).unwrap_err().kind(), ErrorKind::Value);
        assert_eq!(t.split(0, 3).unwrap_err().kind(), ErrorKind::Value);
    }
}
