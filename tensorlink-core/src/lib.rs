//! Tensorlink is the native compute half of a hybrid training stack: a
//! scripting environment orchestrates, this crate executes.
//!
//! It is built out of three pieces:
//! - [`TensorBuffer`]: owned or refcount-shared contiguous storage with
//!   shape/stride metadata, bounds-checked access and eager-validated
//!   views.
//! - The operation engine ([`matmul`], [`add`] and friends, [`sum`],
//!   [`mean`], [`max`]): pure kernels that never mutate their operands
//!   and never leave a partially written output behind.
//! - The bridge ([`marshal_in`], [`marshal_out`], [`share_out`]): the
//!   single crossing point where dynamically-typed external values are
//!   narrowed into buffers and engine errors are translated, kind for
//!   kind, into [`BridgeError`]s.
//!
//! ## A quick guide
//! - Construct an [`EngineContext`] where the orchestrating side
//!   initializes the engine; it owns the worker pool and the
//!   [`CancelToken`], and dropping it shuts the workers down.
//! - Marshal external data in, run operations, marshal results out. Every
//!   call is blocking and synchronous; errors surface immediately to the
//!   caller.
//!
//! ## What can you do with it?
//! ```
//! use serde_json::json;
//! use tensorlink_core::{marshal_in, marshal_out, matmul, EngineContext, TensorBuffer};
//!
//! let ctx = EngineContext::new().unwrap();
//!
//! let a: TensorBuffer<f32> = marshal_in(&json!([[1.0, 2.0], [3.0, 4.0]])).unwrap();
//! let b: TensorBuffer<f32> = marshal_in(&json!([[5.0, 6.0], [7.0, 8.0]])).unwrap();
//!
//! let c = matmul(&ctx, &a, &b).unwrap();
//!
//! assert_eq!(
//!     marshal_out(&c).unwrap(),
//!     json!([[19.0, 22.0], [43.0, 50.0]])
//! );
//! ```

mod bridge;
mod buffer;
mod context;
mod dtype;
mod error;
mod ops;
mod shape;

pub use bridge::{marshal_in, marshal_out, share_out, BridgeError, BridgeResult};
pub use buffer::TensorBuffer;
pub use context::{CancelToken, EngineContext};
pub use dtype::DType;
pub use error::{Error, Result};
pub use ops::{add, binary_op, div, matmul, max, mean, mul, sub, sum, BinaryOp};
pub use shape::{Shape, Strides};
