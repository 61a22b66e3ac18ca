//! Artificial per-call cost for digest primitives.

use super::{DigestAlgorithm, DigestKind};
use std::thread;
use std::time::Duration;

/// Wraps a primitive and sleeps for a fixed duration before every call.
///
/// Real CRC-32 and MD5 are far too fast to show the pipeline's scheduling.
/// Adding latency makes the gate visible: with a slow-side delay `d` and
/// `n` items, a run takes at least `n * d` no matter how many threads exist.
#[derive(Debug, Clone)]
pub struct SimulatedLatency<D> {
    inner: D,
    delay: Duration,
}

impl<D: DigestAlgorithm> SimulatedLatency<D> {
    pub fn new(inner: D, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// The delay added to each call
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<D: DigestAlgorithm> DigestAlgorithm for SimulatedLatency<D> {
    fn digest(&self, data: &str) -> String {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.inner.digest(data)
    }

    fn kind(&self) -> DigestKind {
        self.inner.kind()
    }
}
