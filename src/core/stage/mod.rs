//! # Stage Module
//!
//! The units of pipeline work.
//!
//! ## Stages
//! - `SingleHashStage` - `Fast(v) ~ Fast(Slow(v))`, two slots per item
//! - `MultiHashStage` - six indexed `Fast` slots per item, joined in order
//! - `CombineResultsStage` - sorts everything and emits one joined item
//!
//! ## Concurrency
//! Fan-out stages start one rayon task per input item as soon as it arrives,
//! so many items are in flight at once while the thread count stays that of
//! the slot pool. Each task runs its slots on the same pool, waits for all of
//! them, and assembles the result by slot index.

mod combine;
mod multi_hash;
mod single_hash;
mod slots;
mod traits;

pub use combine::{CombineResultsStage, COMBINE_SEPARATOR};
pub use multi_hash::{MultiHashStage, MULTI_HASH_FAN_OUT};
pub use single_hash::{SingleHashStage, SINGLE_HASH_SEPARATOR};
pub use slots::SlotPool;
pub use traits::{stage_fn, FnStage, Stage};

use crate::core::queue::{QueueReceiver, QueueSender};

/// Process every item of `input` as its own task on `slots` and send each result to `output`.
///
/// The calling thread only reads `input` and spawns; tasks queue on the pool,
/// so a backlog costs memory rather than threads. Returns once the input is
/// closed and every task has finished, then drops `output`, which closes the
/// queue. A panicking task is re-raised here after the rest have finished.
pub fn for_each_item_concurrently<I, O, F>(
    slots: &SlotPool,
    input: QueueReceiver<I>,
    output: QueueSender<O>,
    process: F,
) where
    I: Send,
    O: Send,
    F: Fn(I) -> O + Sync,
{
    let process = &process;
    let output = &output;
    slots.in_place_scope(|scope| {
        for item in input {
            scope.spawn(move |_| output.send(process(item)));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::queue;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn items_are_processed_concurrently() {
        let slots = SlotPool::with_threads(8).unwrap();
        let (feed, input) = queue::channel();
        for i in 0..8u64 {
            feed.send(i);
        }
        drop(feed);
        let (output, results) = queue::channel();

        let start = Instant::now();
        for_each_item_concurrently(&slots, input, output, |item| {
            thread::sleep(Duration::from_millis(100));
            item * 10
        });

        // Eight sequential sleeps would take 800ms.
        assert!(start.elapsed() < Duration::from_millis(600));
        let mut results = results.drain();
        results.sort_unstable();
        assert_eq!(results, vec![0, 10, 20, 30, 40, 50, 60, 70]);
    }

    #[test]
    fn large_backlog_stays_on_the_pool_threads() {
        let slots = SlotPool::with_threads(2).unwrap();
        let (feed, input) = queue::channel();
        for i in 0..20_000u32 {
            feed.send(i);
        }
        drop(feed);
        let (output, results) = queue::channel();
        let threads = Mutex::new(HashSet::new());

        for_each_item_concurrently(&slots, input, output, |item| {
            threads.lock().unwrap().insert(thread::current().id());
            item
        });

        assert_eq!(results.drain().len(), 20_000);
        assert!(threads.into_inner().unwrap().len() <= 2);
    }

    #[test]
    fn output_closes_after_empty_input() {
        let (feed, input) = queue::channel::<u32>();
        drop(feed);
        let (output, results) = queue::channel::<u32>();

        for_each_item_concurrently(&SlotPool::global(), input, output, |item| item);

        assert!(results.drain().is_empty());
    }
}
