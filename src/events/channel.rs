//! Progress channel between a running pipeline and its listener.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Handle stage threads use to report progress.
///
/// Cloned into every stage thread. A sender made by [`null_sender`] has no
/// channel behind it, so reporting costs nothing when nobody listens.
#[derive(Clone)]
pub struct EventSender {
    inner: Option<Sender<Event>>,
}

impl EventSender {
    /// Report `event`; never blocks and never fails the pipeline
    pub fn send(&self, event: Event) {
        if let Some(inner) = &self.inner {
            // The listener may have gone away; the run carries on regardless
            let _ = inner.send(event);
        }
    }

    /// Whether a listener is attached
    pub fn is_listening(&self) -> bool {
        self.inner.is_some()
    }
}

/// Listener side of an [`EventChannel`].
///
/// Consumed by iteration, which blocks between events and ends once every
/// [`EventSender`] clone is dropped, after the last stage thread finishes.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl IntoIterator for EventReceiver {
    type Item = Event;
    type IntoIter = crossbeam_channel::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

/// Factory for sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Create an unbounded channel, so stage threads never wait on the listener
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender {
                inner: Some(sender),
            },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender with no listener; events are dropped on the spot
pub fn null_sender() -> EventSender {
    EventSender { inner: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PipelineEvent, StageEvent};
    use std::thread;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::Stage(StageEvent::Started {
                index: 2,
                name: "combine-results".to_string(),
            }));
        });

        handle.join().unwrap();

        match receiver.into_iter().next() {
            Some(Event::Stage(StageEvent::Started { index, name })) => {
                assert_eq!(index, 2);
                assert_eq!(name, "combine-results");
            }
            other => panic!("Wrong event type: {other:?}"),
        }
    }

    #[test]
    fn null_sender_discards_events() {
        let sender = null_sender();
        assert!(!sender.is_listening());
        sender.send(Event::Pipeline(PipelineEvent::Started { stages: vec![] }));
    }

    #[test]
    fn send_after_listener_dropped_is_ignored() {
        let (sender, receiver) = EventChannel::new();
        drop(receiver);

        assert!(sender.is_listening());
        sender.send(Event::Pipeline(PipelineEvent::Started { stages: vec![] }));
    }

    #[test]
    fn receiver_iteration_ends_when_senders_drop() {
        let (sender, receiver) = EventChannel::new();
        let stage_sender = sender.clone();
        sender.send(Event::Pipeline(PipelineEvent::Started { stages: vec![] }));
        stage_sender.send(Event::Pipeline(PipelineEvent::Failed {
            message: "boom".to_string(),
        }));
        drop(sender);
        drop(stage_sender);

        assert_eq!(receiver.into_iter().count(), 2);
    }
}
