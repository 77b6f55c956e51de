//! CSR matrix products: SpMM (CSR × dense) and SpGEMM (CSR × CSR)

use std::borrow::Cow;

use tracing::{debug, trace};

use super::CsrMatrix;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::kernels::batch::{join_blocks, map_batches};
use crate::kernels::spgemm::spgemm_block;
use crate::kernels::spmm::csr_spmm_block;
use crate::ops::{MatMulConfig, OpKind};
use crate::sparse::prepare;
use crate::tensor::DenseTensor;

impl<T: Element> CsrMatrix<T> {
    /// Multiply by a dense matrix: `op(self) @ op(b)`
    ///
    /// A rank-2 matrix takes a rank-2 `b`; a rank-3 batch takes a rank-3 `b`
    /// with the same batch count. `transpose_output` / `conjugate_output` are
    /// applied to each product matrix.
    ///
    /// # Errors
    ///
    /// - `ConflictingFlags` if transpose and adjoint are both set for an operand
    /// - `InvalidRank` if `b` has a different rank
    /// - `ShapeMismatch` if batch counts or inner dimensions disagree
    pub fn spmm(&self, b: &DenseTensor<T>, cfg: &MatMulConfig) -> Result<DenseTensor<T>> {
        let op = prepare::<T>(OpKind::CsrDenseMatMul(*cfg))?;
        if b.ndim() != self.rank() {
            return Err(Error::invalid_rank("b", rank_name(self.rank()), b.ndim()));
        }

        let (lhs, rhs) = (cfg.lhs(), cfg.rhs());
        let b_op: Cow<'_, DenseTensor<T>> = if rhs.transpose {
            Cow::Owned(b.transpose_matrices(rhs.conjugate)?)
        } else {
            Cow::Borrowed(b)
        };

        let batch = self.batch_size();
        let (b_batch, k_b, n) = b_op.matrix_dims("b")?;
        if b_batch != batch {
            return Err(Error::shape_mismatch(&[batch], &[b_batch]));
        }
        let (m, k_a) = if lhs.transpose {
            (self.cols(), self.rows())
        } else {
            (self.rows(), self.cols())
        };
        if k_a != k_b {
            return Err(Error::shape_mismatch(&[k_a, n], &[k_b, n]));
        }
        debug!(
            op = op.name(),
            shape = ?self.dense_shape,
            nnz = self.nnz(),
            m,
            k = k_a,
            n
        );

        let b_data = b_op.as_slice();
        let chunks = map_batches(batch, |bi| {
            let mut out = vec![T::zero(); m * n];
            csr_spmm_block(
                &self.batch_view(bi),
                lhs,
                &b_data[bi * k_b * n..(bi + 1) * k_b * n],
                n,
                &mut out,
            );
            out
        });
        let data: Vec<T> = chunks.into_iter().flatten().collect();
        let product = DenseTensor::from_parts(data, self.shape_like(batch, m, n));

        product.finish_product(cfg.transpose_output, cfg.conjugate_output)
    }

    /// Multiply by another CSR matrix: `op(self) @ op(b)`
    ///
    /// Runs Gustavson's algorithm per batch. Output rows are sorted; entries
    /// whose products cancel stay explicit.
    ///
    /// # Errors
    ///
    /// - `ConflictingFlags` / `UnsupportedOption` for invalid flag sets
    /// - `ShapeMismatch` if batch counts or inner dimensions disagree
    /// - `InvalidRank` if the batch counts agree but the ranks differ
    pub fn spgemm(&self, b: &CsrMatrix<T>, cfg: &MatMulConfig) -> Result<Self> {
        let op = prepare::<T>(OpKind::CsrSparseMatMul(*cfg))?;
        let batch = self.batch_size();
        if b.batch_size() != batch {
            return Err(Error::shape_mismatch(&[batch], &[b.batch_size()]));
        }
        // [1, r, c] against [r, c]: same batch count, different layout
        if b.rank() != self.rank() {
            return Err(Error::invalid_rank("b", rank_name(self.rank()), b.rank()));
        }

        let (lhs, rhs) = (cfg.lhs(), cfg.rhs());
        let a_op: Cow<'_, Self> = if lhs.transpose {
            Cow::Owned(self.transpose(lhs.conjugate))
        } else {
            Cow::Borrowed(self)
        };
        let b_op: Cow<'_, Self> = if rhs.transpose {
            Cow::Owned(b.transpose(rhs.conjugate))
        } else {
            Cow::Borrowed(b)
        };

        if a_op.cols() != b_op.rows() {
            return Err(Error::shape_mismatch(
                &[a_op.cols(), b_op.cols()],
                &[b_op.rows(), b_op.cols()],
            ));
        }
        let (m, n) = (a_op.rows(), b_op.cols());
        debug!(
            op = op.name(),
            lhs_nnz = a_op.nnz(),
            rhs_nnz = b_op.nnz(),
            batch,
            m,
            n
        );

        let blocks = map_batches(batch, |bi| {
            let block = spgemm_block(&a_op.batch_view(bi), &b_op.batch_view(bi));
            trace!(batch = bi, nnz = block.nnz(), "spgemm batch done");
            block
        });
        Ok(Self::from_joined(
            self.shape_like(batch, m, n),
            join_blocks(blocks),
        ))
    }
}

fn rank_name(rank: usize) -> &'static str {
    if rank == 3 { "3" } else { "2" }
}
