//! Boundary layer between the native engine and the orchestrating
//! scripting environment.
//!
//! External data arrives as dynamically-typed [`serde_json::Value`]s, the
//! scripting side's native representation of nested numeric arrays. The
//! bridge validates and narrows them into [`TensorBuffer`]s on the way in,
//! copies buffer contents back out, and is the sole point where engine
//! errors are translated for the other side, one visible kind per engine
//! kind, with the operation name and the offending shapes preserved in the
//! message.

use serde_json::Value;

use crate::{DType, Error, Result, Shape, TensorBuffer};

/// Error kinds visible to the orchestrating environment. Each engine
/// [`Error`] kind maps to exactly one variant; the conversion keeps the
/// full engine message so no distinguishing information is lost at the
/// boundary.
#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    #[error("allocation error: {0}")]
    Allocation(String),
    #[error("shape error: {0}")]
    Shape(String),
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("broadcast error: {0}")]
    Broadcast(String),
    #[error("axis error: {0}")]
    Axis(String),
    #[error("index error: {0}")]
    Index(String),
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("cancelled: {0}")]
    Cancelled(String),
}

pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

impl From<Error> for BridgeError {
    fn from(err: Error) -> Self {
        let msg = err.to_string();
        match err {
            Error::Allocation { .. } => BridgeError::Allocation(msg),
            Error::Shape { .. } => BridgeError::Shape(msg),
            Error::ShapeMismatch { .. } => BridgeError::ShapeMismatch(msg),
            Error::Broadcast { .. } => BridgeError::Broadcast(msg),
            Error::Axis { .. } => BridgeError::Axis(msg),
            Error::Index { .. } => BridgeError::Index(msg),
            Error::Conversion { .. } => BridgeError::Conversion(msg),
            Error::Cancelled { .. } => BridgeError::Cancelled(msg),
        }
    }
}

/// Narrow an external value into a tensor buffer.
///
/// The value must be a rectangular nesting of arrays whose leaves are all
/// numbers; a bare number marshals to a rank-0 buffer. Ragged nesting and
/// non-numeric leaves are rejected with the `Conversion` kind naming the
/// path of the offending element. There is no implicit coercion beyond the
/// documented element types.
pub fn marshal_in<T: DType>(value: &Value) -> BridgeResult<TensorBuffer<T>> {
    let dims = probe_shape(value);
    let mut data = Vec::new();
    collect(value, &dims, 0, "$", &mut data)?;
    Ok(TensorBuffer::from_vec(data, Shape::new(dims))?)
}

/// Copy a buffer's logical contents out as a nested external value.
///
/// Ownership of the buffer stays with the engine; the caller receives an
/// independent copy. Values that JSON cannot represent (NaN, infinities)
/// are rejected with the `Conversion` kind.
pub fn marshal_out<T: DType>(buffer: &TensorBuffer<T>) -> BridgeResult<Value> {
    let data = buffer.to_vec()?;
    Ok(build(buffer.shape().dims(), &data, "$")?)
}

/// Zero-copy export: a refcounted alias of the buffer.
///
/// The alias shares the backing store and its writer lock with the engine's
/// buffer; the store stays valid for as long as the longest-lived alias,
/// so the shared value can never dangle.
pub fn share_out<T: DType>(buffer: &TensorBuffer<T>) -> TensorBuffer<T> {
    buffer.share()
}

/// Shape implied by the first-child spine of a nested value. Rectangularity
/// against this shape is enforced separately during collection.
fn probe_shape(value: &Value) -> Vec<usize> {
    let mut dims = Vec::new();
    let mut cursor = value;
    while let Value::Array(items) = cursor {
        dims.push(items.len());
        match items.first() {
            Some(first) => cursor = first,
            None => break,
        }
    }
    dims
}

fn conversion(path: &str, reason: String) -> Error {
    Error::Conversion {
        path: path.to_string(),
        reason,
    }
}

fn collect<T: DType>(
    value: &Value,
    dims: &[usize],
    depth: usize,
    path: &str,
    out: &mut Vec<T>,
) -> Result<()> {
    if depth == dims.len() {
        return match value {
            Value::Number(n) => match n.as_f64() {
                Some(x) => {
                    out.push(T::from_f64(x));
                    Ok(())
                }
                None => Err(conversion(
                    path,
                    format!("number {n} is not representable as {}", T::NAME),
                )),
            },
            Value::Array(_) => Err(conversion(
                path,
                format!("ragged structure, expected a number at depth {depth}"),
            )),
            other => Err(conversion(
                path,
                format!("unsupported element {other}, expected a number"),
            )),
        };
    }
    match value {
        Value::Array(items) if items.len() == dims[depth] => {
            for (i, item) in items.iter().enumerate() {
                let child = format!("{path}[{i}]");
                collect(item, dims, depth + 1, &child, out)?;
            }
            Ok(())
        }
        Value::Array(items) => Err(conversion(
            path,
            format!(
                "ragged structure, expected {} elements, got {}",
                dims[depth],
                items.len()
            ),
        )),
        other => Err(conversion(
            path,
            format!("ragged structure, expected an array, got {other}"),
        )),
    }
}

fn build<T: DType>(dims: &[usize], data: &[T], path: &str) -> Result<Value> {
    match dims.split_first() {
        None => {
            let x = data[0].to_f64();
            serde_json::Number::from_f64(x)
                .map(Value::Number)
                .ok_or_else(|| conversion(path, format!("value {x} has no external representation")))
        }
        Some((&first, rest)) => {
            let chunk: usize = rest.iter().product();
            let mut items = Vec::with_capacity(first);
            for i in 0..first {
                let child = format!("{path}[{i}]");
                items.push(build(rest, &data[i * chunk..(i + 1) * chunk], &child)?);
            }
            Ok(Value::Array(items))
        }
    }
}
