//! Group-wise set operations between two dense tensors

use tracing::{debug, trace};

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::kernels::batch::map_batches;
use crate::kernels::merge::{merge_sets, sorted_set};
use crate::ops::{OpKind, SetOperationConfig};
use crate::sparse::{CooTensor, prepare};
use crate::tensor::DenseTensor;

/// Apply a set operation to every group along the last dimension
///
/// A group is the run of values sharing the first `n - 1` coordinates. Each
/// group of `x1` and `x2` is read as a set (order and duplicates ignored)
/// and the two sets are combined with `cfg.op`. Group `g` of the output
/// holds its result sorted ascending at positions `0..len`.
///
/// The output has the leading `n - 1` dimensions of the inputs followed by
/// the largest result size over all groups, which is 0 when every result is
/// empty.
///
/// # Errors
///
/// - `InvalidRank` if either input has rank below 2
/// - `ShapeMismatch` if the leading `n - 1` dimensions differ
/// - `UnsupportedDType` for non-integer element types
///
/// # Example
///
/// ```
/// use sparsekit::prelude::*;
///
/// let x1 = DenseTensor::from_vec(vec![2i32, 2, 0, 2, 2, 1, 0, 2, 2], &[3, 3])?;
/// let x2 = DenseTensor::from_vec(vec![2i32, 2, 1, 0, 2, 0, 0, 1, 1], &[3, 3])?;
/// let y = set_operation(&x1, &x2, &SetOperationConfig::default())?;
/// assert_eq!(y.indices(), &[0, 0, 1, 0, 2, 0]);
/// assert_eq!(y.values(), &[0, 1, 2]);
/// assert_eq!(y.dense_shape(), &[3, 1]);
/// # Ok::<(), sparsekit::error::Error>(())
/// ```
pub fn set_operation<T: Element>(
    x1: &DenseTensor<T>,
    x2: &DenseTensor<T>,
    cfg: &SetOperationConfig,
) -> Result<CooTensor<T>> {
    let op = prepare::<T>(OpKind::SetOperation(*cfg))?;
    let (lead1, w1) = split_groups("x1", x1.shape())?;
    let (lead2, w2) = split_groups("x2", x2.shape())?;
    if lead1 != lead2 {
        return Err(Error::shape_mismatch(lead1, lead2));
    }

    let groups: usize = lead1.iter().product();
    debug!(
        op = op.name(),
        set_op = cfg.op.as_str(),
        groups,
        x1_width = w1,
        x2_width = w2
    );

    let (a, b) = (x1.as_slice(), x2.as_slice());
    let results = map_batches(groups, |g| {
        let lhs = sorted_set(&a[g * w1..(g + 1) * w1]);
        let rhs = sorted_set(&b[g * w2..(g + 1) * w2]);
        merge_sets(&lhs, &rhs, cfg.op)
    });

    let width = results.iter().map(Vec::len).max().unwrap_or(0);
    let nnz: usize = results.iter().map(Vec::len).sum();
    let rank = lead1.len() + 1;
    trace!(nnz, width, "set operation merged");

    let mut indices = Vec::with_capacity(nnz * rank);
    let mut values = Vec::with_capacity(nnz);
    let mut coord = vec![0i64; lead1.len()];
    for (g, set) in results.into_iter().enumerate() {
        if g > 0 {
            advance(&mut coord, lead1);
        }
        for (pos, v) in set.into_iter().enumerate() {
            indices.extend_from_slice(&coord);
            indices.push(pos as i64);
            values.push(v);
        }
    }

    let mut dense_shape = lead1.to_vec();
    dense_shape.push(width);
    Ok(CooTensor::from_parts_unchecked(indices, values, dense_shape))
}

/// Leading dimensions and set width of a rank >= 2 operand
fn split_groups<'a>(arg: &'static str, shape: &'a [usize]) -> Result<(&'a [usize], usize)> {
    match shape.split_last() {
        Some((&width, lead)) if !lead.is_empty() => Ok((lead, width)),
        _ => Err(Error::invalid_rank(arg, "at least 2", shape.len())),
    }
}

/// Step a row-major coordinate to the next position within `shape`
fn advance(coord: &mut [i64], shape: &[usize]) {
    for (c, &dim) in coord.iter_mut().zip(shape).rev() {
        *c += 1;
        if (*c as usize) < dim {
            return;
        }
        *c = 0;
    }
}
