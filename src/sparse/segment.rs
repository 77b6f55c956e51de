//! Sparse segment reduction over the rows of a dense tensor

use num_traits::Float;
use tracing::debug;

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::kernels::segment;
use crate::ops::{OpKind, SegmentConfig};
use crate::sparse::prepare;
use crate::tensor::DenseTensor;

/// Sum rows of `x` grouped by segment and scale each group by 1/sqrt(count)
///
/// Entry `n` adds row `indices[n]` of `x` into segment `segment_ids[n]`. The
/// first dimension of `x` indexes rows; the remaining dimensions form each
/// row's payload and are kept in the output, whose shape is
/// `[num_segments, x.shape[1..]]`.
///
/// Without `num_segments` the ids must cover `0..=max` with no gaps and the
/// output has `max + 1` rows (none for empty input). With `num_segments`,
/// segments that receive no rows are zero.
///
/// # Errors
///
/// - `InvalidRank` for a rank-0 `x`
/// - `ShapeMismatch` if `indices` and `segment_ids` differ in length
/// - `InvalidArgument` if ids are negative, unsorted, gapped (without
///   `num_segments`) or not below `num_segments`, or an index is not a row
///   of `x`
/// - `UnsupportedDType` for non-float element types
///
/// # Example
///
/// ```
/// use sparsekit::prelude::*;
///
/// let x = DenseTensor::from_vec(vec![1.0f32, 2.0, 3.0, 4.0], &[2, 2])?;
/// let y = segment_sqrt_n(&x, &[0, 1], &[0, 0], None)?;
/// let s = 2.0f32.sqrt();
/// assert_eq!(y.as_slice(), &[4.0 / s, 6.0 / s]);
/// # Ok::<(), sparsekit::error::Error>(())
/// ```
pub fn segment_sqrt_n<T: Element + Float>(
    x: &DenseTensor<T>,
    indices: &[i64],
    segment_ids: &[i64],
    num_segments: Option<usize>,
) -> Result<DenseTensor<T>> {
    let op = prepare::<T>(OpKind::SegmentSqrtN(SegmentConfig { num_segments }))?;
    let Some((&rows, payload)) = x.shape().split_first() else {
        return Err(Error::invalid_rank("x", "at least 1", 0));
    };
    if indices.len() != segment_ids.len() {
        return Err(Error::shape_mismatch(&[indices.len()], &[segment_ids.len()]));
    }

    if let Some(&bad) = indices.iter().find(|&&i| i < 0 || i as usize >= rows) {
        return Err(Error::invalid_argument(
            "indices",
            format!("{bad} is not a row of x (rows = {rows})"),
        ));
    }
    if let Some(&bad) = segment_ids.iter().find(|&&s| s < 0) {
        return Err(Error::invalid_argument(
            "segment_ids",
            format!("{bad} is negative"),
        ));
    }
    if let Some(pos) = segment_ids.windows(2).position(|w| w[1] < w[0]) {
        return Err(Error::invalid_argument(
            "segment_ids",
            format!("not sorted at position {}", pos + 1),
        ));
    }

    let max_id = segment_ids.last().map(|&s| s as usize);
    let out_rows = match (num_segments, max_id) {
        (Some(n), Some(max)) if max >= n => {
            return Err(Error::invalid_argument(
                "segment_ids",
                format!("{max} is not below num_segments {n}"),
            ));
        }
        (Some(n), _) => n,
        (None, None) => 0,
        (None, Some(max)) => {
            // Sorted ids are gap-free iff each step is 0 or 1 and they start at 0
            let gap = segment_ids[0] != 0 || segment_ids.windows(2).any(|w| w[1] - w[0] > 1);
            if gap {
                return Err(Error::invalid_argument(
                    "segment_ids",
                    "ids must be contiguous from 0 when num_segments is not given",
                ));
            }
            max + 1
        }
    };

    let width: usize = payload.iter().product();
    debug!(
        op = op.name(),
        rows,
        width,
        entries = indices.len(),
        segments = out_rows
    );

    let data = segment::segment_sqrt_n(x.as_slice(), width, indices, segment_ids, out_rows);
    let mut shape = Vec::with_capacity(x.ndim());
    shape.push(out_rows);
    shape.extend_from_slice(payload);
    Ok(DenseTensor::from_parts(data, shape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn x_3x4() -> DenseTensor<f32> {
        DenseTensor::from_vec(
            vec![0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0],
            &[3, 4],
        )
        .unwrap()
    }

    #[test]
    fn test_with_num_segments() {
        let y = segment_sqrt_n(&x_3x4(), &[0, 2, 1], &[0, 1, 2], Some(4)).unwrap();
        assert_eq!(y.shape(), &[4, 4]);
        assert_eq!(
            y.as_slice(),
            &[
                0.0, 1.0, 0.0, 0.0, //
                1.0, 0.0, 1.0, 0.0, //
                0.0, 1.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 0.0,
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let x = DenseTensor::<f64>::zeros(&[2, 3]);
        let y = segment_sqrt_n(&x, &[], &[], Some(3)).unwrap();
        assert_eq!(y.shape(), &[3, 3]);
        assert!(y.as_slice().iter().all(|&v| v == 0.0));

        let none = segment_sqrt_n(&x, &[], &[], None).unwrap();
        assert_eq!(none.shape(), &[0, 3]);
    }

    #[test]
    fn test_rank1_x() {
        let x = DenseTensor::from_vec(vec![3.0f64, 4.0], &[2]).unwrap();
        let y = segment_sqrt_n(&x, &[0, 1], &[0, 0], None).unwrap();
        assert_eq!(y.shape(), &[1]);
        assert!((y.as_slice()[0] - 7.0 / 2.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_validation() {
        let x = x_3x4();
        let err = segment_sqrt_n(&x, &[0, 1], &[0], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);

        for (indices, ids, n) in [
            (&[0i64, 1][..], &[1i64, 0][..], None),
            (&[0, 1], &[0, 2], None),
            (&[0, 1], &[1, 1], None),
            (&[0, 1], &[-1, 0], None),
            (&[0, 3], &[0, 0], None),
            (&[0, 1], &[0, 4], Some(4)),
        ] {
            let err = segment_sqrt_n(&x, indices, ids, n).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Value, "{indices:?} {ids:?} {n:?}");
        }

        let gapped = segment_sqrt_n(&x, &[0, 1], &[0, 2], Some(3)).unwrap();
        assert_eq!(gapped.shape(), &[3, 4]);
    }
}
