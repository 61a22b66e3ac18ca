//! Worker pool for the per-item slot computations.

use crate::error::ConfigError;
use std::sync::Arc;

/// Where slot sub-computations run.
///
/// Slots are short, CPU-bound digest calls, so they go to a rayon pool:
/// either the global one or a dedicated pool with a fixed thread count.
#[derive(Clone, Default)]
pub struct SlotPool {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl SlotPool {
    /// Use rayon's global pool
    pub fn global() -> Self {
        Self { pool: None }
    }

    /// Use a dedicated pool with `threads` workers
    pub fn with_threads(threads: usize) -> Result<Self, ConfigError> {
        if threads == 0 {
            return Err(ConfigError::InvalidWorkerCount { value: threads });
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("slot-worker-{index}"))
            .build()
            .map_err(|e| ConfigError::WorkerPool(e.to_string()))?;

        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }

    /// Run `op` with this pool as the target of any rayon calls inside it
    pub fn install<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Open a rayon scope whose body runs on the calling thread.
    ///
    /// Tasks spawned on the scope run on this pool; the call returns once
    /// the body and every spawned task have finished.
    pub fn in_place_scope<'scope, OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce(&rayon::Scope<'scope>) -> R,
    {
        match &self.pool {
            Some(pool) => pool.in_place_scope(op),
            None => rayon::in_place_scope(op),
        }
    }

    /// Number of worker threads available to slots
    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl std::fmt::Debug for SlotPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotPool")
            .field("dedicated", &self.pool.is_some())
            .field("threads", &self.threads())
            .finish()
    }
}
