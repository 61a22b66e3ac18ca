//! Trait definitions for pipeline stages.

use crate::core::queue::{QueueReceiver, QueueSender};
use std::sync::Arc;

/// One concurrent step of a pipeline.
///
/// A stage reads `input` until it is closed and empty, sends its results on
/// `output`, and returns. Dropping `output` (directly, or by returning)
/// closes the queue for the next stage. A stage never closes its input;
/// that belongs to whoever feeds it.
pub trait Stage<I, O>: Send + Sync {
    /// Name used in logs, events and thread names
    fn name(&self) -> &str;

    /// Drain `input` and produce into `output`
    fn run(&self, input: QueueReceiver<I>, output: QueueSender<O>);
}

impl<I, O, S: Stage<I, O> + ?Sized> Stage<I, O> for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&self, input: QueueReceiver<I>, output: QueueSender<O>) {
        (**self).run(input, output)
    }
}

/// A stage backed by a closure
pub struct FnStage<F> {
    name: String,
    function: F,
}

/// Turn a closure into a named stage.
///
/// ```rust,ignore
/// let upper = stage_fn("upper", |input: QueueReceiver<String>, output: QueueSender<String>| {
///     for item in input {
///         output.send(item.to_uppercase());
///     }
/// });
/// ```
pub fn stage_fn<F>(name: impl Into<String>, function: F) -> FnStage<F> {
    FnStage {
        name: name.into(),
        function,
    }
}

impl<I, O, F> Stage<I, O> for FnStage<F>
where
    F: Fn(QueueReceiver<I>, QueueSender<O>) + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, input: QueueReceiver<I>, output: QueueSender<O>) {
        (self.function)(input, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::queue;

    #[test]
    fn fn_stage_runs_closure_and_closes_output() {
        let stage = stage_fn(
            "double",
            |input: QueueReceiver<u32>, output: QueueSender<u32>| {
                for item in input {
                    output.send(item * 2);
                }
            },
        );
        assert_eq!(stage.name(), "double");

        let (feed, input) = queue::channel();
        feed.send(1);
        feed.send(2);
        drop(feed);
        let (output, results) = queue::channel();

        stage.run(input, output);

        assert_eq!(results.drain(), vec![2, 4]);
    }

    #[test]
    fn shared_stage_delegates() {
        let stage: Arc<dyn Stage<u32, u32>> = Arc::new(stage_fn(
            "noop",
            |_input: QueueReceiver<u32>, _output: QueueSender<u32>| {},
        ));
        assert_eq!(Stage::name(&stage), "noop");
    }
}
