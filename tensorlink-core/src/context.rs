use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{Error, Result};

/// Cooperative cancellation signal shared between a caller and the engine.
///
/// Kernels consult the token between independent chunks of work (e.g. row
/// blocks of a matmul). Once cancelled, the running operation stops at the
/// next checkpoint, discards its partially built output and surfaces
/// [`Error::Cancelled`]; partial results are never observable.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Explicit, caller-constructed compute context.
///
/// Owns the worker thread pool kernels fan out on, so there is no implicit
/// process-wide state: construct one where the orchestrating environment
/// initializes the engine, drop it to shut the workers down. Every
/// operation blocks the calling thread until its result is ready.
pub struct EngineContext {
    pool: rayon::ThreadPool,
    cancel: CancelToken,
}

impl EngineContext {
    /// Build a context with one worker per available CPU.
    pub fn new() -> Result<Self> {
        Self::with_threads(num_cpus::get())
    }

    /// Build a context with an explicit worker count.
    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| Error::Allocation {
                reason: format!("could not spawn worker pool: {e}"),
            })?;
        Ok(EngineContext {
            pool,
            cancel: CancelToken::new(),
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Token observed by long-running kernels executed in this context.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run `f` inside this context's pool so rayon work lands on our
    /// workers rather than any global pool.
    pub(crate) fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        self.pool.install(f)
    }

    /// Cancellation checkpoint for `op`, called between work chunks.
    pub(crate) fn checkpoint(&self, op: &'static str) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled { op })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_flips_once() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        // clones observe the same flag
        let clone = token.clone();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn explicit_thread_count() {
        let ctx = EngineContext::with_threads(2).unwrap();
        assert_eq!(ctx.threads(), 2);
    }
}
