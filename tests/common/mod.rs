//! Common test utilities
#![allow(dead_code)]

use sparsekit::sparse::CsrMatrix;

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two f32 slices are close within tolerance
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// The 4x5 matrix used by the product tests
///
/// ```text
/// [ 1  0  0  0  0]
/// [ 0  0  0  0  0]
/// [ 0  0  0  5 -1]
/// [-2  0  0  0  0]
/// ```
pub fn csr_4x5() -> CsrMatrix<f32> {
    CsrMatrix::new(
        &[4, 5],
        vec![0, 4],
        vec![0, 1, 1, 3, 4],
        vec![0, 3, 4, 0],
        vec![1.0, 5.0, -1.0, -2.0],
    )
    .unwrap()
}
