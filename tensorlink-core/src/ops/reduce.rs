use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{DType, EngineContext, Error, Result, Shape, TensorBuffer};

/// Sum along `axis`, collapsing that dimension away.
pub fn sum<T: DType>(
    ctx: &EngineContext,
    a: &TensorBuffer<T>,
    axis: usize,
) -> Result<TensorBuffer<T>> {
    reduce(ctx, "sum", a, axis, |acc, v| acc + v, T::ZERO, |acc, _| acc)
}

/// Arithmetic mean along `axis`. The division happens in `T`'s own
/// precision; a zero-length axis yields NaN, as 0/0 does.
pub fn mean<T: DType>(
    ctx: &EngineContext,
    a: &TensorBuffer<T>,
    axis: usize,
) -> Result<TensorBuffer<T>> {
    reduce(
        ctx,
        "mean",
        a,
        axis,
        |acc, v| acc + v,
        T::ZERO,
        |acc, len| acc / T::from_f64(len as f64),
    )
}

/// Maximum along `axis`. An empty axis yields negative infinity, the
/// identity of the max fold.
pub fn max<T: DType>(
    ctx: &EngineContext,
    a: &TensorBuffer<T>,
    axis: usize,
) -> Result<TensorBuffer<T>> {
    reduce(
        ctx,
        "max",
        a,
        axis,
        |acc, v| if v > acc { v } else { acc },
        T::NEG_INFINITY,
        |acc, _| acc,
    )
}

fn reduce<T: DType>(
    ctx: &EngineContext,
    op: &'static str,
    a: &TensorBuffer<T>,
    axis: usize,
    fold: impl Fn(T, T) -> T + Send + Sync,
    init: T,
    finish: impl Fn(T, usize) -> T + Send + Sync,
) -> Result<TensorBuffer<T>> {
    let rank = a.rank();
    if axis >= rank {
        return Err(Error::Axis { op, axis, rank });
    }
    let dims = a.shape().dims();
    let outer: usize = dims[..axis].iter().product();
    let axis_len = dims[axis];
    let inner: usize = dims[axis + 1..].iter().product();
    let out_dims: Vec<usize> = dims[..axis]
        .iter()
        .chain(dims[axis + 1..].iter())
        .copied()
        .collect();

    let data = a.to_vec()?;
    let out: Vec<T> = ctx.install(|| {
        (0..outer * inner)
            .into_par_iter()
            .map(|oi| {
                let o = oi / inner.max(1);
                let i = oi % inner.max(1);
                let mut acc = init;
                for j in 0..axis_len {
                    acc = fold(acc, data[(o * axis_len + j) * inner + i]);
                }
                finish(acc, axis_len)
            })
            .collect()
    });

    TensorBuffer::from_vec(out, Shape::new(out_dims))
}
