use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::{
    shape::{broadcast_strides, next_index},
    DType, EngineContext, Error, Result, TensorBuffer,
};

/// Elementwise binary operator kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
        }
    }

    fn apply<T: DType>(&self, l: T, r: T) -> T {
        match self {
            BinaryOp::Add => l + r,
            BinaryOp::Sub => l - r,
            BinaryOp::Mul => l * r,
            BinaryOp::Div => l / r,
        }
    }
}

pub fn add<T: DType>(
    ctx: &EngineContext,
    a: &TensorBuffer<T>,
    b: &TensorBuffer<T>,
) -> Result<TensorBuffer<T>> {
    binary_op(ctx, BinaryOp::Add, a, b)
}

pub fn sub<T: DType>(
    ctx: &EngineContext,
    a: &TensorBuffer<T>,
    b: &TensorBuffer<T>,
) -> Result<TensorBuffer<T>> {
    binary_op(ctx, BinaryOp::Sub, a, b)
}

pub fn mul<T: DType>(
    ctx: &EngineContext,
    a: &TensorBuffer<T>,
    b: &TensorBuffer<T>,
) -> Result<TensorBuffer<T>> {
    binary_op(ctx, BinaryOp::Mul, a, b)
}

pub fn div<T: DType>(
    ctx: &EngineContext,
    a: &TensorBuffer<T>,
    b: &TensorBuffer<T>,
) -> Result<TensorBuffer<T>> {
    binary_op(ctx, BinaryOp::Div, a, b)
}

/// Elementwise binary op with broadcasting. Identically shaped operands
/// take a parallel zip over their materialized data; mixed shapes walk the
/// broadcast result with zero strides on expanded axes.
pub fn binary_op<T: DType>(
    ctx: &EngineContext,
    op: BinaryOp,
    a: &TensorBuffer<T>,
    b: &TensorBuffer<T>,
) -> Result<TensorBuffer<T>> {
    let out_shape = a
        .shape()
        .broadcast_with(b.shape())
        .ok_or_else(|| Error::Broadcast {
            op: op.name(),
            lhs: a.shape().clone(),
            rhs: b.shape().clone(),
        })?;

    if a.shape() == b.shape() {
        let lhs = a.to_vec()?;
        let rhs = b.to_vec()?;
        let out: Vec<T> = ctx.install(|| {
            lhs.par_iter()
                .zip(rhs.par_iter())
                .map(|(l, r)| op.apply(*l, *r))
                .collect()
        });
        return TensorBuffer::from_vec(out, out_shape);
    }

    let l_strides = broadcast_strides(a.shape(), a.strides(), &out_shape);
    let r_strides = broadcast_strides(b.shape(), b.strides(), &out_shape);
    let lhs = a.raw();
    let rhs = b.raw();
    let numel = out_shape.numel();
    let mut out = Vec::with_capacity(numel);
    if numel > 0 {
        let mut index = vec![0usize; out_shape.rank()];
        loop {
            let l = lhs[a.offset() + l_strides.flat_offset(&index)];
            let r = rhs[b.offset() + r_strides.flat_offset(&index)];
            out.push(op.apply(l, r));
            if !next_index(&mut index, out_shape.dims()) {
                break;
            }
        }
    }
    drop(lhs);
    drop(rhs);
    TensorBuffer::from_vec(out, out_shape)
}
