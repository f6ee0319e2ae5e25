//! The operation engine: pure kernels over [`TensorBuffer`]s.
//!
//! Every operation takes an [`EngineContext`], reads its operands without
//! mutating them, and either returns a freshly built output buffer or an
//! error with nothing written. Output data is assembled in a local vector
//! and only wrapped into a buffer on success, so a failed call is
//! all-or-nothing by construction.
//!
//! [`TensorBuffer`]: crate::TensorBuffer
//! [`EngineContext`]: crate::EngineContext

mod elementwise;
mod matmul;
mod reduce;

pub use elementwise::{add, binary_op, div, mul, sub, BinaryOp};
pub use matmul::matmul;
pub use reduce::{max, mean, sum};
