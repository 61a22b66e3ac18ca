//! Dual-hash composition stage.

use super::{for_each_item_concurrently, SlotPool, Stage};
use crate::core::digest::DigestAlgorithm;
use crate::core::gate::{GatedDigest, SerializationGate};
use crate::core::queue::{QueueReceiver, QueueSender};
use std::sync::Arc;

/// Joins the two slot results of a single item
pub const SINGLE_HASH_SEPARATOR: &str = "~";

/// For each item `v` emits `Fast(v) ~ Fast(Slow(v))`.
///
/// The two slots run in parallel. Only the `Slow(v)` call in slot 1 holds
/// the gate; the `Fast` call on its result runs after the gate is released.
pub struct SingleHashStage {
    fast: Arc<dyn DigestAlgorithm>,
    slow: GatedDigest<Arc<dyn DigestAlgorithm>>,
    slots: SlotPool,
}

impl SingleHashStage {
    pub const NAME: &'static str = "single-hash";

    /// Build the stage; `slow` is only ever called through `gate`
    pub fn new(
        fast: Arc<dyn DigestAlgorithm>,
        slow: Arc<dyn DigestAlgorithm>,
        gate: Arc<SerializationGate>,
    ) -> Self {
        Self {
            fast,
            slow: GatedDigest::new(slow, gate),
            slots: SlotPool::global(),
        }
    }

    /// Run slot computations on `slots` instead of rayon's global pool
    pub fn with_slots(mut self, slots: SlotPool) -> Self {
        self.slots = slots;
        self
    }

    /// Hash one item: the fan-out for a single input value
    pub fn hash(&self, data: &str) -> String {
        let (direct, chained) = self.slots.install(|| {
            rayon::join(
                || self.fast.digest(data),
                || {
                    let slow = self.slow.digest(data);
                    self.fast.digest(&slow)
                },
            )
        });

        format!("{direct}{SINGLE_HASH_SEPARATOR}{chained}")
    }
}

impl Stage<String, String> for SingleHashStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, input: QueueReceiver<String>, output: QueueSender<String>) {
        for_each_item_concurrently(&self.slots, input, output, |item| self.hash(&item));
    }
}
