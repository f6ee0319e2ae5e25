use std::time::Instant;

use serde_json::json;
use tensorlink_core::{marshal_in, marshal_out, matmul, EngineContext, TensorBuffer};

fn main() {
    let ctx = EngineContext::new().unwrap();

    // Data as the scripting side would hand it over.
    let a: TensorBuffer<f32> = marshal_in(&json!([[1.0, 2.0], [3.0, 4.0]])).unwrap();
    let b: TensorBuffer<f32> = marshal_in(&json!([[5.0, 6.0], [7.0, 8.0]])).unwrap();

    let c = matmul(&ctx, &a, &b).unwrap();
    println!("2x2 result: {}", marshal_out(&c).unwrap());

    // A larger native-side run.
    const N: usize = 512;
    let a = TensorBuffer::<f32>::rand(vec![N, N]).unwrap();
    let b = TensorBuffer::<f32>::rand(vec![N, N]).unwrap();

    let start = Instant::now();
    let c = std::hint::black_box(matmul(&ctx, &a, &b).unwrap());
    println!(
        "{N}x{N} matmul on {} workers took {:?}, out shape {}",
        ctx.threads(),
        start.elapsed(),
        c.shape()
    );
}
