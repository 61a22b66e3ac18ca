//! Configuration for the signer pipeline.

use super::SignerPipeline;
use crate::core::digest::{ContentionProbe, DigestAlgorithm, DigestConfig, DigestKind};
use crate::core::gate::SerializationGate;
use crate::core::stage::SlotPool;
use crate::error::ConfigError;
use std::sync::Arc;
use std::time::Duration;

/// Builder for [`SignerPipeline`]
#[derive(Debug, Clone)]
pub struct SignerConfig {
    /// Primitive used for every parallel hash
    pub fast: DigestKind,
    /// Primitive that must never run twice at once
    pub slow: DigestKind,
    /// Artificial cost of each fast call
    pub fast_latency: Duration,
    /// Artificial cost of each slow call, paid while holding the gate
    pub slow_latency: Duration,
    /// Dedicated slot pool size; `None` uses rayon's global pool
    pub worker_threads: Option<usize>,
    /// Wrap the slow primitive in a [`ContentionProbe`]
    pub probe_slow: bool,
    gate: Option<Arc<SerializationGate>>,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            fast: DigestKind::Crc32,
            slow: DigestKind::Md5,
            fast_latency: Duration::ZERO,
            slow_latency: Duration::ZERO,
            worker_threads: None,
            probe_slow: false,
            gate: None,
        }
    }
}

impl SignerConfig {
    /// Create a configuration with defaults (CRC-32 fast, MD5 slow)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fast primitive
    pub fn fast(mut self, kind: DigestKind) -> Self {
        self.fast = kind;
        self
    }

    /// Set the slow primitive
    pub fn slow(mut self, kind: DigestKind) -> Self {
        self.slow = kind;
        self
    }

    /// Add a fixed delay to every fast call
    pub fn fast_latency(mut self, latency: Duration) -> Self {
        self.fast_latency = latency;
        self
    }

    /// Add a fixed delay to every slow call
    pub fn slow_latency(mut self, latency: Duration) -> Self {
        self.slow_latency = latency;
        self
    }

    /// Run slots on a dedicated pool of `threads` workers
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Count overlapping slow calls
    pub fn probe_slow(mut self, probe: bool) -> Self {
        self.probe_slow = probe;
        self
    }

    /// Serialize slow calls on `gate` instead of the process-wide gate
    pub fn gate(mut self, gate: Arc<SerializationGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<SignerPipeline, ConfigError> {
        let slots = match self.worker_threads {
            Some(threads) => SlotPool::with_threads(threads)?,
            None => SlotPool::global(),
        };

        let fast = DigestConfig::new(self.fast)
            .latency(self.fast_latency)
            .build()?;
        let slow = DigestConfig::new(self.slow)
            .latency(self.slow_latency)
            .build()?;

        let (slow, probe) = if self.probe_slow {
            let probe = Arc::new(ContentionProbe::new(slow));
            (Arc::clone(&probe) as Arc<dyn DigestAlgorithm>, Some(probe))
        } else {
            (slow, None)
        };

        let gate = self.gate.unwrap_or_else(SerializationGate::global);

        let mut pipeline = SignerPipeline::new(fast, slow, gate, slots);
        pipeline.probe = probe;
        Ok(pipeline)
    }
}
