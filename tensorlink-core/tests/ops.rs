use tensorlink_core::{
    add, div, matmul, max, mean, mul, sub, sum, EngineContext, Error, TensorBuffer,
};

fn ctx() -> EngineContext {
    EngineContext::with_threads(2).unwrap()
}

mod matmul_ops {
    use super::*;

    #[test]
    fn two_by_two() {
        let ctx = ctx();
        let a = TensorBuffer::from_vec(vec![1.0f32, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let b = TensorBuffer::from_vec(vec![5.0f32, 6.0, 7.0, 8.0], vec![2, 2]).unwrap();
        let c = matmul(&ctx, &a, &b).unwrap();
        assert_eq!(c.shape().dims(), &[2, 2]);
        assert_eq!(c.to_vec().unwrap(), vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn rectangular() {
        let ctx = ctx();
        // [1, 3] x [3, 2]
        let a = TensorBuffer::from_vec(vec![1.0f64, 2.0, 3.0], vec![1, 3]).unwrap();
        let b =
            TensorBuffer::from_vec(vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], vec![3, 2]).unwrap();
        let c = matmul(&ctx, &a, &b).unwrap();
        assert_eq!(c.shape().dims(), &[1, 2]);
        assert_eq!(c.to_vec().unwrap(), vec![22.0, 28.0]);
    }

    #[test]
    fn inner_dim_mismatch() {
        let ctx = ctx();
        let a = TensorBuffer::<f32>::zeros(vec![2, 3]).unwrap();
        let b = TensorBuffer::<f32>::zeros(vec![2, 3]).unwrap();
        let err = matmul(&ctx, &a, &b).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { op: "matmul", .. }));
    }

    #[test]
    fn non_matrix_operand() {
        let ctx = ctx();
        let a = TensorBuffer::<f32>::zeros(vec![2, 2, 2]).unwrap();
        let b = TensorBuffer::<f32>::zeros(vec![2, 2]).unwrap();
        assert!(matches!(
            matmul(&ctx, &a, &b),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn zero_inner_dim_yields_zeros() {
        let ctx = ctx();
        let a = TensorBuffer::<f32>::zeros(vec![2, 0]).unwrap();
        let b = TensorBuffer::<f32>::zeros(vec![0, 3]).unwrap();
        let c = matmul(&ctx, &a, &b).unwrap();
        assert_eq!(c.shape().dims(), &[2, 3]);
        assert_eq!(c.to_vec().unwrap(), vec![0.0; 6]);
    }

    #[test]
    fn strided_view_operand() {
        let ctx = ctx();
        // Take the 2x2 top-left corner of a 2x3 matrix as a strided view.
        let a =
            TensorBuffer::from_vec(vec![1.0f32, 2.0, 9.0, 3.0, 4.0, 9.0], vec![2, 3]).unwrap();
        let corner = a
            .view(vec![2, 2], tensorlink_core::Strides::new(vec![3, 1]), 0)
            .unwrap();
        let b = TensorBuffer::from_vec(vec![5.0f32, 6.0, 7.0, 8.0], vec![2, 2]).unwrap();
        let c = matmul(&ctx, &corner, &b).unwrap();
        assert_eq!(c.to_vec().unwrap(), vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn cancelled_before_start() {
        let ctx = ctx();
        ctx.cancel_token().cancel();
        let a = TensorBuffer::from_vec(vec![1.0f32, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let b = TensorBuffer::from_vec(vec![5.0f32, 6.0, 7.0, 8.0], vec![2, 2]).unwrap();
        let err = matmul(&ctx, &a, &b).unwrap_err();
        assert!(matches!(err, Error::Cancelled { op: "matmul" }));
    }

    #[test]
    fn cancel_mid_run_stops_between_row_blocks() {
        // 128 row blocks of work on two workers; the token flips from a
        // concurrent thread while the kernel is mid-flight, so the next
        // checkpoint sees it and the whole output is discarded
        let ctx = EngineContext::with_threads(2).unwrap();
        let a = TensorBuffer::<f32>::zeros(vec![8192, 512]).unwrap();
        let b = TensorBuffer::<f32>::zeros(vec![512, 512]).unwrap();
        let token = ctx.cancel_token();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(1));
            token.cancel();
        });
        let err = matmul(&ctx, &a, &b).unwrap_err();
        canceller.join().unwrap();
        assert!(matches!(err, Error::Cancelled { op: "matmul" }));
    }

    #[test]
    fn operands_untouched() {
        let ctx = ctx();
        let a = TensorBuffer::from_vec(vec![1.0f32, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let b = TensorBuffer::from_vec(vec![5.0f32, 6.0, 7.0, 8.0], vec![2, 2]).unwrap();
        matmul(&ctx, &a, &b).unwrap();
        assert_eq!(a.to_vec().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(b.to_vec().unwrap(), vec![5.0, 6.0, 7.0, 8.0]);
    }
}

mod elementwise_ops {
    use super::*;

    #[test]
    fn same_shape() {
        let ctx = ctx();
        let a = TensorBuffer::from_vec(vec![1.0f32, 2.0, 3.0], vec![3]).unwrap();
        let b = TensorBuffer::from_vec(vec![4.0f32, 5.0, 6.0], vec![3]).unwrap();
        assert_eq!(add(&ctx, &a, &b).unwrap().to_vec().unwrap(), vec![5.0, 7.0, 9.0]);
        assert_eq!(sub(&ctx, &b, &a).unwrap().to_vec().unwrap(), vec![3.0, 3.0, 3.0]);
        assert_eq!(mul(&ctx, &a, &b).unwrap().to_vec().unwrap(), vec![4.0, 10.0, 18.0]);
        assert_eq!(div(&ctx, &b, &a).unwrap().to_vec().unwrap(), vec![4.0, 2.5, 2.0]);
    }

    #[test]
    fn broadcast_row_against_matrix() {
        let ctx = ctx();
        let a =
            TensorBuffer::from_vec(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
        let row = TensorBuffer::from_vec(vec![10.0f32, 20.0, 30.0], vec![3]).unwrap();
        let c = add(&ctx, &a, &row).unwrap();
        assert_eq!(c.shape().dims(), &[2, 3]);
        assert_eq!(
            c.to_vec().unwrap(),
            vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]
        );
    }

    #[test]
    fn broadcast_column_against_row() {
        let ctx = ctx();
        let col = TensorBuffer::from_vec(vec![1.0f64, 2.0, 3.0], vec![3, 1]).unwrap();
        let row = TensorBuffer::from_vec(vec![10.0f64, 20.0], vec![1, 2]).unwrap();
        let c = mul(&ctx, &col, &row).unwrap();
        assert_eq!(c.shape().dims(), &[3, 2]);
        assert_eq!(
            c.to_vec().unwrap(),
            vec![10.0, 20.0, 20.0, 40.0, 30.0, 60.0]
        );
    }

    #[test]
    fn incompatible_shapes() {
        let ctx = ctx();
        let a = TensorBuffer::<f32>::zeros(vec![2, 3]).unwrap();
        let b = TensorBuffer::<f32>::zeros(vec![2, 4]).unwrap();
        let err = add(&ctx, &a, &b).unwrap_err();
        assert!(matches!(err, Error::Broadcast { op: "add", .. }));
    }

    #[test]
    fn scalar_operand_broadcasts_everywhere() {
        let ctx = ctx();
        let a = TensorBuffer::from_vec(vec![1.0f32, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let two = TensorBuffer::from_vec(vec![2.0f32], tensorlink_core::Shape::scalar()).unwrap();
        let c = mul(&ctx, &a, &two).unwrap();
        assert_eq!(c.to_vec().unwrap(), vec![2.0, 4.0, 6.0, 8.0]);
    }
}

mod reductions {
    use super::*;

    #[test]
    fn sum_along_each_axis() {
        let ctx = ctx();
        let a =
            TensorBuffer::from_vec(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
        let rows = sum(&ctx, &a, 0).unwrap();
        assert_eq!(rows.shape().dims(), &[3]);
        assert_eq!(rows.to_vec().unwrap(), vec![5.0, 7.0, 9.0]);

        let cols = sum(&ctx, &a, 1).unwrap();
        assert_eq!(cols.shape().dims(), &[2]);
        assert_eq!(cols.to_vec().unwrap(), vec![6.0, 15.0]);
    }

    #[test]
    fn mean_divides_in_element_precision() {
        let ctx = ctx();
        let a = TensorBuffer::from_vec(vec![1.0f32, 2.0, 4.0], vec![3]).unwrap();
        let m = mean(&ctx, &a, 0).unwrap();
        assert_eq!(m.rank(), 0);
        assert_eq!(m.to_vec().unwrap(), vec![7.0 / 3.0f32]);
    }

    #[test]
    fn max_along_axis() {
        let ctx = ctx();
        let a =
            TensorBuffer::from_vec(vec![1.0f64, 9.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
        let m = max(&ctx, &a, 1).unwrap();
        assert_eq!(m.to_vec().unwrap(), vec![9.0, 6.0]);
    }

    #[test]
    fn max_over_empty_axis_is_neg_infinity() {
        let ctx = ctx();
        let a = TensorBuffer::<f32>::zeros(vec![2, 0]).unwrap();
        let m = max(&ctx, &a, 1).unwrap();
        assert_eq!(m.to_vec().unwrap(), vec![f32::NEG_INFINITY; 2]);
    }

    #[test]
    fn axis_out_of_range() {
        let ctx = ctx();
        let a = TensorBuffer::<f32>::zeros(vec![2, 3]).unwrap();
        let err = sum(&ctx, &a, 2).unwrap_err();
        assert!(matches!(
            err,
            Error::Axis {
                op: "sum",
                axis: 2,
                rank: 2
            }
        ));
    }
}
