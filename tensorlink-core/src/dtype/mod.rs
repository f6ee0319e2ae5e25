use std::{
    fmt::Debug,
    ops::{Add, Div, Mul, Sub},
};

#[cfg(feature = "bfloat")]
use half::bf16;
#[cfg(feature = "half")]
use half::f16;

use gemm::GemmDispatch;

mod gemm;

pub trait DTypeOps:
    Copy
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + GemmDispatch
{
}

/// Marker trait for tensor element types. Fixed-width floating point only;
/// every kernel accumulates in the element type's own precision so results
/// stay reproducible across runs.
pub trait DType: Debug + Clone + DTypeOps + Send + Sync + 'static {
    const ZERO: Self;
    const ONE: Self;
    const NEG_INFINITY: Self;
    const NAME: &'static str;

    fn to_f64(&self) -> f64;
    fn from_f64(x: f64) -> Self;
}

macro_rules! dtype {
    ($rt:ident) => {
        impl DTypeOps for $rt {}
        impl DType for $rt {
            const ZERO: $rt = 0.0;
            const ONE: $rt = 1.0;
            const NEG_INFINITY: $rt = $rt::NEG_INFINITY;
            const NAME: &'static str = stringify!($rt);

            fn to_f64(&self) -> f64 {
                *self as f64
            }
            fn from_f64(x: f64) -> Self {
                x as $rt
            }
        }
    };
}

dtype!(f32);
dtype!(f64);

#[cfg(feature = "half")]
impl DTypeOps for f16 {}
#[cfg(feature = "half")]
impl DType for f16 {
    const ZERO: f16 = f16::from_f64_const(0.0);
    const ONE: f16 = f16::from_f64_const(1.0);
    const NEG_INFINITY: f16 = f16::NEG_INFINITY;
    const NAME: &'static str = "f16";

    fn to_f64(&self) -> f64 {
        self.to_f64_const()
    }
    fn from_f64(x: f64) -> Self {
        Self::from_f64_const(x)
    }
}

#[cfg(feature = "bfloat")]
impl DTypeOps for bf16 {}
#[cfg(feature = "bfloat")]
impl DType for bf16 {
    const ZERO: bf16 = bf16::from_f64_const(0.0);
    const ONE: bf16 = bf16::from_f64_const(1.0);
    const NEG_INFINITY: bf16 = bf16::NEG_INFINITY;
    const NAME: &'static str = "bf16";

    fn to_f64(&self) -> f64 {
        self.to_f64_const()
    }
    fn from_f64(x: f64) -> Self {
        Self::from_f64_const(x)
    }
}
