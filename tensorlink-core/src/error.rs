use crate::shape::Shape;

/// Engine-side error taxonomy. Every variant indicates caller misuse or an
/// explicit cancellation, never a transient condition, so none of them are
/// retryable. A failed operation leaves its output unallocated and its
/// operands untouched.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("allocation failed: {reason}")]
    Allocation { reason: String },

    #[error("{op}: {reason}")]
    Shape { op: &'static str, reason: String },

    #[error("{op}: operand shapes {lhs} and {rhs} are incompatible")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    #[error("{op}: shapes {lhs} and {rhs} cannot be broadcast together")]
    Broadcast {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    #[error("{op}: axis {axis} is out of range for rank {rank}")]
    Axis {
        op: &'static str,
        axis: usize,
        rank: usize,
    },

    #[error("index {index:?} is out of range for shape {shape}")]
    Index { index: Vec<usize>, shape: Shape },

    #[error("conversion failed at {path}: {reason}")]
    Conversion { path: String, reason: String },

    #[error("{op}: cancelled before completion")]
    Cancelled { op: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn alloc_overflow(shape: &Shape) -> Self {
        Error::Allocation {
            reason: format!("element count of shape {shape} overflows usize"),
        }
    }
}
