//! Instrumented wrapper that measures how many calls overlap.

use super::{DigestAlgorithm, DigestKind};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Counters collected by a [`ContentionProbe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProbeStats {
    /// Total number of calls
    pub calls: usize,
    /// Highest number of calls observed running at the same instant
    pub peak_concurrency: usize,
    /// Number of calls that started while another was still running
    pub overlaps: usize,
}

/// Wraps a primitive and records concurrent entries.
///
/// Placed around the expensive primitive, inside the gate, it proves the
/// gate works: `peak_concurrency` must stay at 1.
#[derive(Debug)]
pub struct ContentionProbe<D> {
    inner: D,
    active: AtomicUsize,
    calls: AtomicUsize,
    peak: AtomicUsize,
    overlaps: AtomicUsize,
}

/// Decrements the active count even if the wrapped call unwinds.
struct ActiveCall<'a>(&'a AtomicUsize);

impl Drop for ActiveCall<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<D: DigestAlgorithm> ContentionProbe<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            active: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            overlaps: AtomicUsize::new(0),
        }
    }

    /// Snapshot of the counters so far
    pub fn stats(&self) -> ProbeStats {
        ProbeStats {
            calls: self.calls.load(Ordering::SeqCst),
            peak_concurrency: self.peak.load(Ordering::SeqCst),
            overlaps: self.overlaps.load(Ordering::SeqCst),
        }
    }
}

impl<D: DigestAlgorithm> DigestAlgorithm for ContentionProbe<D> {
    fn digest(&self, data: &str) -> String {
        let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _active = ActiveCall(&self.active);

        self.calls.fetch_add(1, Ordering::SeqCst);
        self.peak.fetch_max(running, Ordering::SeqCst);
        if running > 1 {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
            warn!(
                kind = %self.inner.kind(),
                running,
                "digest entered while another call was still running"
            );
        }

        self.inner.digest(data)
    }

    fn kind(&self) -> DigestKind {
        self.inner.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::digest::{FnDigest, SimulatedLatency};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn sequential_calls_never_overlap() {
        let probe = ContentionProbe::new(FnDigest::new(|x| x.to_string()));
        for i in 0..5 {
            probe.digest(&i.to_string());
        }

        let stats = probe.stats();
        assert_eq!(stats.calls, 5);
        assert_eq!(stats.peak_concurrency, 1);
        assert_eq!(stats.overlaps, 0);
    }

    #[test]
    fn concurrent_calls_are_detected() {
        let probe = Arc::new(ContentionProbe::new(SimulatedLatency::new(
            FnDigest::new(|x| x.to_string()),
            Duration::from_millis(50),
        )));
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let probe = Arc::clone(&probe);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    probe.digest(&i.to_string())
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = probe.stats();
        assert_eq!(stats.calls, 4);
        assert!(stats.peak_concurrency > 1);
        assert!(stats.overlaps > 0);
    }

    #[test]
    fn probe_passes_the_digest_through() {
        let probe = ContentionProbe::new(FnDigest::new(|x| format!("S({x})")));
        assert_eq!(probe.digest("0"), "S(0)");
        assert_eq!(probe.kind(), DigestKind::Custom);
    }
}
