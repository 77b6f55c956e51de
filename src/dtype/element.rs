//! Element trait for mapping Rust types to DType

use super::{Complex64, Complex128, DType};
use bytemuck::{Pod, Zeroable};
use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

/// Trait for types that can be stored in a sparse value buffer
///
/// This trait connects Rust's type system to sparsekit's runtime dtype tags.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - values move freely between batch workers
/// - `Pod + Zeroable` - buffers are plain data and can be exchanged verbatim
/// - `Add + Sub + Mul` - arithmetic used by the kernels (Output = Self)
/// - `PartialOrd` - comparison for min/max style merges
///
/// Note: `Neg` is NOT required since unsigned types don't support it.
pub trait Element:
    Copy
    + Send
    + Sync
    + Pod
    + Zeroable
    + Debug
    + PartialEq
    + PartialOrd
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64 for generic numeric operations
    ///
    /// For complex types this returns the **magnitude** (|z|), not the real part.
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type
    ///
    /// For complex types this creates a real number (imaginary part = 0).
    fn from_f64(v: f64) -> Self;

    /// Zero value
    fn zero() -> Self;

    /// One value
    fn one() -> Self;

    /// Complex conjugate; identity for real types
    #[inline]
    fn conj(self) -> Self {
        self
    }

    /// Absolute value (magnitude for complex types)
    #[inline]
    fn magnitude(self) -> f64 {
        self.to_f64().abs()
    }
}

macro_rules! impl_real_element {
    ($ty:ty, $dtype:expr, $zero:expr, $one:expr) => {
        impl Element for $ty {
            const DTYPE: DType = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $ty
            }

            #[inline]
            fn zero() -> Self {
                $zero
            }

            #[inline]
            fn one() -> Self {
                $one
            }
        }
    };
}

impl_real_element!(f64, DType::F64, 0.0, 1.0);
impl_real_element!(f32, DType::F32, 0.0, 1.0);
impl_real_element!(i64, DType::I64, 0, 1);
impl_real_element!(i32, DType::I32, 0, 1);
impl_real_element!(i16, DType::I16, 0, 1);
impl_real_element!(i8, DType::I8, 0, 1);
impl_real_element!(u8, DType::U8, 0, 1);

impl Element for Complex64 {
    const DTYPE: DType = DType::Complex64;

    #[inline]
    fn to_f64(self) -> f64 {
        self.magnitude() as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        Complex64::new(v as f32, 0.0)
    }

    #[inline]
    fn zero() -> Self {
        Complex64::ZERO
    }

    #[inline]
    fn one() -> Self {
        Complex64::ONE
    }

    #[inline]
    fn conj(self) -> Self {
        Complex64::conj(self)
    }

    #[inline]
    fn magnitude(self) -> f64 {
        Complex64::magnitude(self) as f64
    }
}

impl Element for Complex128 {
    const DTYPE: DType = DType::Complex128;

    #[inline]
    fn to_f64(self) -> f64 {
        self.magnitude()
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        Complex128::new(v, 0.0)
    }

    #[inline]
    fn zero() -> Self {
        Complex128::ZERO
    }

    #[inline]
    fn one() -> Self {
        Complex128::ONE
    }

    #[inline]
    fn conj(self) -> Self {
        Complex128::conj(self)
    }

    #[inline]
    fn magnitude(self) -> f64 {
        Complex128::magnitude(self)
    }
}
