use crate::{DType, EngineContext, Error, Result, Shape, TensorBuffer};

/// Rows multiplied per chunk between cancellation checkpoints.
const ROW_BLOCK: usize = 64;

/// Matrix multiply: `a` of shape [m, k] times `b` of shape [k, n] yields a
/// fresh [m, n] buffer. Accumulation happens in `T`'s own precision.
///
/// Operands of any stride layout are accepted; non-contiguous inputs are
/// gathered into row-major order before the kernel runs. The work is split
/// into row blocks and the context's cancel token is consulted between
/// blocks, so a cancellation discards the output without a partial result
/// ever escaping.
pub fn matmul<T: DType>(
    ctx: &EngineContext,
    a: &TensorBuffer<T>,
    b: &TensorBuffer<T>,
) -> Result<TensorBuffer<T>> {
    let mismatch = || Error::ShapeMismatch {
        op: "matmul",
        lhs: a.shape().clone(),
        rhs: b.shape().clone(),
    };
    let (m, k) = match a.shape().dims() {
        &[m, k] => (m, k),
        _ => return Err(mismatch()),
    };
    let (k2, n) = match b.shape().dims() {
        &[k2, n] => (k2, n),
        _ => return Err(mismatch()),
    };
    if k != k2 {
        return Err(mismatch());
    }

    let out_elems = m.checked_mul(n).ok_or_else(|| {
        Error::alloc_overflow(&Shape::new(vec![m, n]))
    })?;

    ctx.checkpoint("matmul")?;
    let lhs = a.to_vec()?;
    let rhs = b.to_vec()?;
    let mut out = vec![T::ZERO; out_elems];

    if k > 0 && n > 0 {
        ctx.install(|| -> Result<()> {
            let mut row = 0;
            while row < m {
                ctx.checkpoint("matmul")?;
                let rows = ROW_BLOCK.min(m - row);
                let lhs_block = &lhs[row * k..(row + rows) * k];
                let out_block = &mut out[row * n..(row + rows) * n];
                T::launch_gemm(
                    lhs_block,
                    &[k, 1],
                    &rhs,
                    &[n, 1],
                    rows,
                    n,
                    k,
                    out_block,
                    &[n, 1],
                );
                row += rows;
            }
            Ok(())
        })?;
    }

    TensorBuffer::from_vec(out, vec![m, n])
}
