//! COO matrix products: SpMM and sspaddmm

use std::borrow::Cow;

use tracing::debug;

use super::CooTensor;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::kernels::merge::coalesce;
use crate::kernels::spmm::coo_spmm;
use crate::ops::{MatMulConfig, OpKind};
use crate::sparse::prepare;
use crate::tensor::DenseTensor;

impl<T: Element> CooTensor<T> {
    /// Multiply a rank-2 COO matrix by a dense matrix: `op(self) @ op(b)`
    ///
    /// Duplicate coordinates each contribute their product.
    ///
    /// # Errors
    ///
    /// - `ConflictingFlags` if transpose and adjoint are both set for an operand
    /// - `InvalidRank` unless both operands are rank 2
    /// - `ShapeMismatch` if the inner dimensions disagree
    pub fn spmm(&self, b: &DenseTensor<T>, cfg: &MatMulConfig) -> Result<DenseTensor<T>> {
        let op = prepare::<T>(OpKind::SparseDenseMatMul(*cfg))?;
        let [rows, cols] = *self.dense_shape.as_slice() else {
            return Err(Error::invalid_rank("a", "2", self.rank()));
        };
        if b.ndim() != 2 {
            return Err(Error::invalid_rank("b", "2", b.ndim()));
        }

        let (lhs, rhs) = (cfg.lhs(), cfg.rhs());
        let b_op: Cow<'_, DenseTensor<T>> = if rhs.transpose {
            Cow::Owned(b.transpose_matrices(rhs.conjugate)?)
        } else {
            Cow::Borrowed(b)
        };
        let (_, k_b, n) = b_op.matrix_dims("b")?;
        let (m, k_a) = if lhs.transpose { (cols, rows) } else { (rows, cols) };
        if k_a != k_b {
            return Err(Error::shape_mismatch(&[k_a, n], &[k_b, n]));
        }
        debug!(op = op.name(), nnz = self.nnz(), m, k = k_a, n);

        let (row_idx, col_idx): (Vec<i64>, Vec<i64>) =
            self.indices.chunks_exact(2).map(|c| (c[0], c[1])).unzip();
        let mut out = vec![T::zero(); m * n];
        coo_spmm(
            &row_idx,
            &col_idx,
            &self.values,
            lhs,
            b_op.as_slice(),
            n,
            &mut out,
        );

        DenseTensor::from_parts(out, vec![m, n])
            .finish_product(cfg.transpose_output, cfg.conjugate_output)
    }
}

/// Compute `beta * x1 + alpha * (x2 @ x3)` as a sparse result
///
/// `x1` is `(s0, s1)`, `x2` is `(s0, s2)` and `x3` is a dense `(s2, s1)`
/// matrix. The product contributes every column of each row that holds at
/// least one entry of `x2`; other rows carry only `beta * x1`. The result is
/// canonical with coinciding coordinates summed.
///
/// # Errors
///
/// - `InvalidRank` unless all three operands are rank 2
/// - `ShapeMismatch` if the dimensions do not line up
pub fn sspaddmm<T: Element>(
    x1: &CooTensor<T>,
    x2: &CooTensor<T>,
    x3: &DenseTensor<T>,
    alpha: T,
    beta: T,
) -> Result<CooTensor<T>> {
    let op = prepare::<T>(OpKind::Sspaddmm)?;
    for (arg, rank) in [("x1", x1.rank()), ("x2", x2.rank()), ("x3", x3.ndim())] {
        if rank != 2 {
            return Err(Error::invalid_rank(arg, "2", rank));
        }
    }
    let (s0, s1) = (x1.dense_shape[0], x1.dense_shape[1]);
    let s2 = x2.dense_shape[1];
    if x2.dense_shape[0] != s0 {
        return Err(Error::shape_mismatch(&[s0, s2], &x2.dense_shape));
    }
    if x3.shape() != [s2, s1] {
        return Err(Error::shape_mismatch(&[s2, s1], x3.shape()));
    }
    debug!(
        op = op.name(),
        s0,
        s1,
        s2,
        x1_nnz = x1.nnz(),
        x2_nnz = x2.nnz()
    );

    let mut rows: Vec<i64> = x2.indices.chunks_exact(2).map(|c| c[0]).collect();
    rows.sort_unstable();
    rows.dedup();

    // Dense product rows for each row touched by x2, in `rows` order
    let mut product = vec![T::zero(); rows.len() * s1];
    let dense = x3.as_slice();
    for (coord, &v) in x2.indices.chunks_exact(2).zip(&x2.values) {
        let Ok(slot) = rows.binary_search(&coord[0]) else {
            continue;
        };
        let k = coord[1] as usize;
        let out = &mut product[slot * s1..(slot + 1) * s1];
        for (o, &d) in out.iter_mut().zip(&dense[k * s1..(k + 1) * s1]) {
            *o = *o + v * d;
        }
    }

    let total = x1.nnz() + rows.len() * s1;
    let mut indices = Vec::with_capacity(total * 2);
    let mut values = Vec::with_capacity(total);
    indices.extend_from_slice(&x1.indices);
    values.extend(x1.values.iter().map(|&v| beta * v));
    for (slot, &r) in rows.iter().enumerate() {
        for c in 0..s1 {
            indices.extend_from_slice(&[r, c as i64]);
            values.push(alpha * product[slot * s1 + c]);
        }
    }

    let (indices, values) = coalesce(2, &indices, &values);
    Ok(CooTensor::from_parts_unchecked(indices, values, vec![s0, s1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_spmm() {
        // A = [[1, 0], [0, 3], [0, 0]], B = all twos (2x2)
        let a = CooTensor::new(vec![0, 0, 1, 1], vec![1.0f32, 3.0], &[3, 2]).unwrap();
        let b = DenseTensor::from_vec(vec![2.0f32; 4], &[2, 2]).unwrap();
        let c = a.spmm(&b, &MatMulConfig::default()).unwrap();
        assert_eq!(c.shape(), &[3, 2]);
        assert_eq!(c.as_slice(), &[2.0, 2.0, 6.0, 6.0, 0.0, 0.0]);
    }

    #[test]
    fn test_spmm_transposed_a() {
        // A^T with A = [[0, 5]] gives [[0], [5]]; times [[2, 1]] -> [[0, 0], [10, 5]]
        let a = CooTensor::new(vec![0, 1], vec![5i64], &[1, 2]).unwrap();
        let b = DenseTensor::from_vec(vec![2i64, 1], &[1, 2]).unwrap();
        let c = a.spmm(&b, &MatMulConfig::new().transpose_a(true)).unwrap();
        assert_eq!(c.shape(), &[2, 2]);
        assert_eq!(c.as_slice(), &[0, 0, 10, 5]);
    }

    #[test]
    fn test_spmm_errors() {
        let a = CooTensor::<f64>::empty(&[2, 3]).unwrap();
        let b = DenseTensor::<f64>::zeros(&[2, 2]);
        assert_eq!(
            a.spmm(&b, &MatMulConfig::default()).unwrap_err().kind(),
            ErrorKind::ShapeMismatch
        );

        let rank3 = CooTensor::<f64>::empty(&[1, 2, 3]).unwrap();
        assert_eq!(
            rank3.spmm(&b, &MatMulConfig::default()).unwrap_err().kind(),
            ErrorKind::Shape
        );

        let cfg = MatMulConfig::new().transpose_b(true).adjoint_b(true);
        assert_eq!(a.spmm(&b, &cfg).unwrap_err().kind(), ErrorKind::Config);
    }

    #[test]
    fn test_sspaddmm() {
        let x1 = CooTensor::new(vec![0, 0, 1, 1], vec![1.0f64, 2.0], &[2, 3]).unwrap();
        let x2 = CooTensor::new(vec![0, 2, 1, 2], vec![3.0, 4.0], &[2, 3]).unwrap();
        let x3 = DenseTensor::from_vec(
            vec![1.0, 2.0, 3.0, 1.0, 3.0, 2.0, 3.0, 2.0, 1.0],
            &[3, 3],
        )
        .unwrap();
        let out = sspaddmm(&x1, &x2, &x3, 1.0, 1.0).unwrap();
        assert_eq!(out.indices(), &[0, 0, 0, 1, 0, 2, 1, 0, 1, 1, 1, 2]);
        assert_eq!(out.values(), &[10.0, 6.0, 3.0, 12.0, 10.0, 4.0]);
        assert!(out.is_canonical());
    }

    #[test]
    fn test_sspaddmm_untouched_rows_keep_x1() {
        let x1 = CooTensor::new(vec![1, 0], vec![7i32], &[2, 2]).unwrap();
        let x2 = CooTensor::new(vec![0, 0], vec![1], &[2, 1]).unwrap();
        let x3 = DenseTensor::from_vec(vec![1, 2], &[1, 2]).unwrap();
        let out = sspaddmm(&x1, &x2, &x3, 2, 3).unwrap();
        assert_eq!(out.indices(), &[0, 0, 0, 1, 1, 0]);
        assert_eq!(out.values(), &[2, 4, 21]);
    }

    #[test]
    fn test_sspaddmm_shape_errors() {
        let x1 = CooTensor::<f32>::empty(&[2, 3]).unwrap();
        let x2 = CooTensor::<f32>::empty(&[2, 4]).unwrap();
        let bad = DenseTensor::<f32>::zeros(&[3, 3]);
        assert_eq!(
            sspaddmm(&x1, &x2, &bad, 1.0, 1.0).unwrap_err(),
            Error::shape_mismatch(&[4, 3], &[3, 3])
        );
        let x2_rows = CooTensor::<f32>::empty(&[3, 4]).unwrap();
        let x3 = DenseTensor::<f32>::zeros(&[4, 3]);
        assert_eq!(
            sspaddmm(&x1, &x2_rows, &x3, 1.0, 1.0).unwrap_err().kind(),
            ErrorKind::ShapeMismatch
        );
    }
}
