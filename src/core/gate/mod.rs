//! # Gate Module
//!
//! The process-wide lock that serializes the expensive digest.
//!
//! Every call of the slow primitive, from any stage, item, or slot, runs
//! inside [`SerializationGate::run`]. The lock covers the slow call only;
//! work done on its result (the dependent fast digest) happens after the
//! lock is released.

use crate::core::digest::{DigestAlgorithm, DigestKind};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// A mutual-exclusion lock with no state of its own
#[derive(Debug, Default)]
pub struct SerializationGate {
    lock: Mutex<()>,
}

impl SerializationGate {
    /// Create a gate independent of the process-wide one
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(()),
        }
    }

    /// The process-wide gate, created on first use and never torn down
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<SerializationGate>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(SerializationGate::new())))
    }

    /// Run `op` while holding the gate
    pub fn run<R>(&self, op: impl FnOnce() -> R) -> R {
        // The mutex guards no data, so a panic in an earlier holder
        // leaves nothing inconsistent behind.
        let _held = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        op()
    }
}

/// A digest whose every call passes through a gate.
///
/// Wrapping the slow primitive here is the only way stages reach it, so
/// no code path can call it without holding the lock.
#[derive(Debug, Clone)]
pub struct GatedDigest<D> {
    inner: D,
    gate: Arc<SerializationGate>,
}

impl<D: DigestAlgorithm> GatedDigest<D> {
    pub fn new(inner: D, gate: Arc<SerializationGate>) -> Self {
        Self { inner, gate }
    }

    /// The gate this digest is serialized on
    pub fn gate(&self) -> &Arc<SerializationGate> {
        &self.gate
    }
}

impl<D: DigestAlgorithm> DigestAlgorithm for GatedDigest<D> {
    fn digest(&self, data: &str) -> String {
        self.gate.run(|| self.inner.digest(data))
    }

    fn kind(&self) -> DigestKind {
        self.inner.kind()
    }
}
