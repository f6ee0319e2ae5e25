use gemm::{gemm, Parallelism};

#[cfg(feature = "bfloat")]
use half::bf16;
#[cfg(feature = "half")]
use half::f16;

/// Dispatch the 2-D matrix-multiply kernel for a concrete element type.
/// f32/f64 go through the `gemm` crate; the half-precision types use a
/// naive inner-product loop to avoid half-precision SIMD assembly paths.
pub trait GemmDispatch {
    /// Matrix multiplication: (M x K) * (K x N) accumulated into `out`
    /// (M x N). `out` must be zero-filled on entry; accumulation happens in
    /// `Self`'s own precision.
    #[allow(clippy::too_many_arguments)]
    fn launch_gemm(
        lhs: &[Self],
        lhs_stride: &[usize],
        rhs: &[Self],
        rhs_stride: &[usize],
        m: usize,
        n: usize,
        k: usize,
        out: &mut [Self],
        out_stride: &[usize],
    ) where
        Self: Sized;
}

macro_rules! instantiate_gemm {
    ($rt:ident, GEMM) => {
        impl GemmDispatch for $rt {
            fn launch_gemm(
                lhs: &[Self],
                lhs_stride: &[usize],
                rhs: &[Self],
                rhs_stride: &[usize],
                m: usize,
                n: usize,
                k: usize,
                out: &mut [Self],
                out_stride: &[usize],
            ) where
                Self: Sized,
            {
                let num_threads = num_cpus::get();
                let parallelism = if num_threads > 1 {
                    Parallelism::Rayon(num_threads)
                } else {
                    Parallelism::None
                };

                debug_assert_eq!(lhs.len(), m * k);
                debug_assert_eq!(lhs_stride.len(), 2);
                debug_assert_eq!(rhs.len(), k * n);
                debug_assert_eq!(rhs_stride.len(), 2);
                debug_assert_eq!(out.len(), m * n);
                debug_assert_eq!(out_stride.len(), 2);

                // cs = stride[-1], rs = stride[-2]
                let dst_rs = out_stride[0];
                let dst_cs = out_stride[1];

                let lhs_rs = lhs_stride[0];
                let lhs_cs = lhs_stride[1];

                let rhs_rs = rhs_stride[0];
                let rhs_cs = rhs_stride[1];

                unsafe {
                    gemm(
                        /* m: usize = */ m,
                        /* n: usize = */ n,
                        /* k: usize = */ k,
                        /* dst: *mut T = */ out.as_mut_ptr(),
                        /* dst_cs: isize = */ dst_cs as isize,
                        /* dst_rs: isize = */ dst_rs as isize,
                        /* read_dst: bool = */ false,
                        /* lhs: *const T = */ lhs.as_ptr(),
                        /* lhs_cs: isize = */ lhs_cs as isize,
                        /* lhs_rs: isize = */ lhs_rs as isize,
                        /* rhs: *const T = */ rhs.as_ptr(),
                        /* rhs_cs: isize = */ rhs_cs as isize,
                        /* rhs_rs: isize = */ rhs_rs as isize,
                        /* alpha: T = */ 0.0,
                        /* beta: T = */ 1.0,
                        /* conj_dst: bool = */ false,
                        /* conj_lhs: bool = */ false,
                        /* conj_rhs: bool = */ false,
                        parallelism,
                    )
                }
            }
        }
    };

    ($rt:ident, NAIVE) => {
        impl GemmDispatch for $rt {
            fn launch_gemm(
                lhs: &[Self],
                lhs_stride: &[usize],
                rhs: &[Self],
                rhs_stride: &[usize],
                m: usize,
                n: usize,
                k: usize,
                out: &mut [Self],
                out_stride: &[usize],
            ) where
                Self: Sized,
            {
                let lhs_rs = lhs_stride[0];
                let lhs_cs = lhs_stride[1];

                let rhs_rs = rhs_stride[0];
                let rhs_cs = rhs_stride[1];

                let out_rs = out_stride[0];
                let out_cs = out_stride[1];

                for i in 0..m {
                    for j in 0..n {
                        let mut sum = <$rt>::from_f64_const(0.0);
                        for p in 0..k {
                            let lhs_val = lhs[i * lhs_rs + p * lhs_cs];
                            let rhs_val = rhs[p * rhs_rs + j * rhs_cs];
                            sum += lhs_val * rhs_val;
                        }
                        out[i * out_rs + j * out_cs] = sum;
                    }
                }
            }
        }
    };
}

instantiate_gemm!(f32, GEMM);
instantiate_gemm!(f64, GEMM);
#[cfg(feature = "half")]
// Naive loop for f16 to avoid CPU SIMD half-precision assembly requirements
instantiate_gemm!(f16, NAIVE);
#[cfg(feature = "bfloat")]
// Naive loop for bf16 to avoid CPU SIMD half-precision assembly requirements
instantiate_gemm!(bf16, NAIVE);
