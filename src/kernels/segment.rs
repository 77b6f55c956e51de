//! Sparse segment reduction kernels

use num_traits::Float;

use crate::dtype::Element;

/// Sum gathered rows per segment and scale each segment by 1/sqrt(count)
///
/// `x` is row-major with `width` elements per row. `indices[n]` selects the
/// row of `x` added to segment `segment_ids[n]`. Ids are sorted and below
/// `num_segments`; segments with no members stay zero.
pub(crate) fn segment_sqrt_n<T: Element + Float>(
    x: &[T],
    width: usize,
    indices: &[i64],
    segment_ids: &[i64],
    num_segments: usize,
) -> Vec<T> {
    let zero = <T as Element>::zero();
    let mut out = vec![zero; num_segments * width];
    let mut counts = vec![0usize; num_segments];

    for (&idx, &seg) in indices.iter().zip(segment_ids) {
        let (seg, row) = (seg as usize, idx as usize);
        counts[seg] += 1;
        let src = &x[row * width..(row + 1) * width];
        for (o, &v) in out[seg * width..(seg + 1) * width].iter_mut().zip(src) {
            *o = *o + v;
        }
    }

    for (seg, &count) in counts.iter().enumerate() {
        if count > 1 {
            let scale = <T as Element>::from_f64(count as f64).sqrt();
            for o in &mut out[seg * width..(seg + 1) * width] {
                *o = *o / scale;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_sqrt_n() {
        // rows: [1, 2], [3, 4], [5, 6]
        let x = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        let out = segment_sqrt_n(&x, 2, &[0, 2, 1], &[0, 0, 1], 2);
        let s = 2.0f64.sqrt();
        assert_eq!(out, vec![6.0 / s, 8.0 / s, 3.0, 4.0]);
    }

    #[test]
    fn test_empty_segments_are_zero() {
        let x = [1.0f32, 1.0];
        let out = segment_sqrt_n(&x, 1, &[], &[], 3);
        assert_eq!(out, vec![0.0; 3]);
    }
}
