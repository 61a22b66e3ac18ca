//! # Queue Module
//!
//! Unbounded conduits between stages, built on crossbeam-channel.
//!
//! A queue is closed when its last [`QueueSender`] is dropped. A stage
//! receives its output sender by value, and per-item tasks hold clones of
//! it, so the queue closes exactly once: after the stage has read its
//! whole input and every item task has finished. Closing is end-of-stream,
//! never an error.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Create a new unbounded queue
pub fn channel<T>() -> (QueueSender<T>, QueueReceiver<T>) {
    let (sender, receiver) = unbounded();
    (
        QueueSender {
            inner: sender,
            sent: Arc::new(AtomicUsize::new(0)),
        },
        QueueReceiver { inner: receiver },
    )
}

/// Producer side of a queue.
///
/// Clones share one sent-item counter.
pub struct QueueSender<T> {
    inner: Sender<T>,
    sent: Arc<AtomicUsize>,
}

impl<T> QueueSender<T> {
    /// Send an item.
    ///
    /// If the consumer is gone the item is dropped; the producer keeps
    /// draining its own input so the stages upstream can still finish.
    pub fn send(&self, item: T) {
        if self.inner.send(item).is_ok() {
            self.sent.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Number of items delivered through this sender and its clones
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    /// Shares the sent counter without keeping the queue open.
    pub(crate) fn sent_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.sent)
    }
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            sent: Arc::clone(&self.sent),
        }
    }
}

/// Consumer side of a queue
pub struct QueueReceiver<T> {
    inner: Receiver<T>,
}

impl<T> QueueReceiver<T> {
    /// Block until the next item arrives; `None` once the queue is closed and empty
    pub fn recv(&self) -> Option<T> {
        self.inner.recv().ok()
    }

    /// Take an item if one is ready
    pub fn try_recv(&self) -> Option<T> {
        self.inner.try_recv().ok()
    }

    /// Iterate until the queue is closed and empty
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.inner.iter()
    }

    /// Read every remaining item, blocking until the queue closes
    pub fn drain(self) -> Vec<T> {
        self.inner.into_iter().collect()
    }
}

impl<T> IntoIterator for QueueReceiver<T> {
    type Item = T;
    type IntoIter = crossbeam_channel::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn dropping_the_sender_closes_the_queue() {
        let (sender, receiver) = channel();
        sender.send("a".to_string());
        sender.send("b".to_string());
        drop(sender);

        assert_eq!(receiver.drain(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn queue_stays_open_while_a_clone_lives() {
        let (sender, receiver) = channel::<u32>();
        let clone = sender.clone();
        drop(sender);

        assert!(receiver.try_recv().is_none());
        clone.send(7);
        drop(clone);

        assert_eq!(receiver.recv(), Some(7));
        assert_eq!(receiver.recv(), None);
    }

    #[test]
    fn clones_share_the_sent_counter() {
        let (sender, receiver) = channel();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sender = sender.clone();
                thread::spawn(move || sender.send(i))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(sender.sent(), 4);
        drop(sender);
        let mut items = receiver.drain();
        items.sort_unstable();
        assert_eq!(items, vec![0, 1, 2, 3]);
    }

    #[test]
    fn sending_to_a_dropped_receiver_is_not_counted() {
        let (sender, receiver) = channel();
        drop(receiver);
        sender.send(1);
        assert_eq!(sender.sent(), 0);
    }

    #[test]
    fn counter_does_not_keep_the_queue_open() {
        let (sender, receiver) = channel();
        let counter = sender.sent_counter();
        sender.send(1);
        drop(sender);

        assert_eq!(receiver.into_iter().count(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
