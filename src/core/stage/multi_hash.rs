//! Indexed fan-out composition stage.

use super::{for_each_item_concurrently, SlotPool, Stage};
use crate::core::digest::DigestAlgorithm;
use crate::core::queue::{QueueReceiver, QueueSender};
use rayon::prelude::*;
use std::sync::Arc;

/// Number of slots each item fans out to
pub const MULTI_HASH_FAN_OUT: usize = 6;

/// For each item `v` emits `Fast("0"+v) ++ Fast("1"+v) ++ ... ++ Fast("5"+v)`.
///
/// The six slots run in parallel and are joined by slot index, so the
/// order in which they finish never shows up in the output.
pub struct MultiHashStage {
    fast: Arc<dyn DigestAlgorithm>,
    slots: SlotPool,
}

impl MultiHashStage {
    pub const NAME: &'static str = "multi-hash";

    pub fn new(fast: Arc<dyn DigestAlgorithm>) -> Self {
        Self {
            fast,
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
        let results: Vec<String> = self.slots.install(|| {
            (0..MULTI_HASH_FAN_OUT)
                .into_par_iter()
                .map(|slot| self.fast.digest(&format!("{slot}{data}")))
                .collect()
        });

        results.concat()
    }
}

impl Stage<String, String> for MultiHashStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, input: QueueReceiver<String>, output: QueueSender<String>) {
        for_each_item_concurrently(&self.slots, input, output, |item| self.hash(&item));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::digest::{Crc32Digest, FnDigest};
    use crate::core::queue;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn concatenates_slots_in_index_order() {
        let stage = MultiHashStage::new(Arc::new(FnDigest::new(|x| format!("F({x})"))));

        assert_eq!(
            stage.hash("F(0)~F(S(0))"),
            "F(0F(0)~F(S(0)))F(1F(0)~F(S(0)))F(2F(0)~F(S(0)))\
             F(3F(0)~F(S(0)))F(4F(0)~F(S(0)))F(5F(0)~F(S(0)))"
        );
    }

    #[test]
    fn completion_order_does_not_affect_output() {
        // Slot 0 finishes last, slot 5 first.
        let delayed = FnDigest::new(|x| {
            let slot = x[..1].parse::<u64>().unwrap_or(0);
            thread::sleep(Duration::from_millis((5 - slot) * 15));
            format!("<{x}>")
        });
        let stage = MultiHashStage::new(Arc::new(delayed))
            .with_slots(SlotPool::with_threads(MULTI_HASH_FAN_OUT).unwrap());

        assert_eq!(stage.hash("v"), "<0v><1v><2v><3v><4v><5v>");
    }

    #[test]
    fn matches_reference_digests() {
        let stage = MultiHashStage::new(Arc::new(Crc32Digest::new()));

        assert_eq!(
            stage.hash("4108050209~502633748"),
            "29568666068035183841425683795340791879727309630931025356555"
        );
    }

    #[test]
    fn run_emits_one_item_per_input() {
        let stage = MultiHashStage::new(Arc::new(FnDigest::new(|x| x.to_string())));

        let (feed, input) = queue::channel();
        feed.send("a".to_string());
        feed.send("b".to_string());
        drop(feed);
        let (output, results) = queue::channel();

        stage.run(input, output);

        let mut results = results.drain();
        results.sort();
        assert_eq!(results, vec!["0a1a2a3a4a5a", "0b1b2b3b4b5b"]);
    }
}
