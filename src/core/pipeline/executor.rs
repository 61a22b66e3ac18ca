//! Pipeline execution implementation.

use crate::core::queue::{self, QueueReceiver};
use crate::core::stage::Stage;
use crate::error::PipelineError;
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelineSummary, StageEvent, StageReport,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Result of driving items through a pipeline
#[derive(Debug)]
pub struct PipelineResult<O> {
    /// Identifier of this run, also carried by the completion event
    pub run_id: Uuid,
    /// Everything left on the final queue
    pub outputs: Vec<O>,
    /// Items pushed into the first queue
    pub items_in: usize,
    /// One report per stage, in chain order
    pub stages: Vec<StageReport>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// A fully drained chain whose final queue is ready to read
pub struct PipelineRun<O> {
    /// Queue after the last stage, already closed
    pub output: QueueReceiver<O>,
    /// One report per stage, in chain order
    pub stages: Vec<StageReport>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

struct LaunchedStage {
    name: String,
    handle: JoinHandle<StageReport>,
}

/// Starts stage threads and keeps their handles for joining
struct StageLauncher {
    events: EventSender,
    launched: Vec<LaunchedStage>,
    #[cfg(test)]
    spawn_limit: Option<usize>,
}

impl StageLauncher {
    fn new(events: &EventSender, capacity: usize) -> Self {
        Self {
            events: events.clone(),
            launched: Vec::with_capacity(capacity),
            #[cfg(test)]
            spawn_limit: None,
        }
    }

    /// Launch `stage` on its own thread, reading `input`, and return its output queue
    fn launch<A, B>(
        &mut self,
        stage: Arc<dyn Stage<A, B>>,
        input: QueueReceiver<A>,
    ) -> Result<QueueReceiver<B>, PipelineError>
    where
        A: Send + 'static,
        B: Send + 'static,
    {
        let index = self.launched.len();
        let name = stage.name().to_string();
        let (output, next_input) = queue::channel();
        let emitted = output.sent_counter();
        let events = self.events.clone();
        let report_name = name.clone();

        #[cfg(test)]
        if self.spawn_limit.is_some_and(|limit| index >= limit) {
            return Err(PipelineError::StageSpawn {
                stage: name,
                source: std::io::Error::new(
                    std::io::ErrorKind::WouldBlock,
                    "thread limit reached",
                ),
            });
        }

        let handle = thread::Builder::new()
            .name(format!("stage-{index}-{name}"))
            .spawn(move || {
                events.send(Event::Stage(StageEvent::Started {
                    index,
                    name: report_name.clone(),
                }));
                debug!(stage = %report_name, index, "stage started");

                let started = Instant::now();
                // `output` moves into the stage; the queue closes when it returns
                stage.run(input, output);

                let report = StageReport {
                    index,
                    name: report_name,
                    items_emitted: emitted.load(Ordering::SeqCst),
                    duration_ms: started.elapsed().as_millis() as u64,
                };
                debug!(
                    stage = %report.name,
                    index,
                    items = report.items_emitted,
                    "stage finished"
                );
                if events.is_listening() {
                    events.send(Event::Stage(StageEvent::Completed(report.clone())));
                }
                report
            })
            .map_err(|source| PipelineError::StageSpawn {
                stage: name.clone(),
                source,
            })?;

        self.launched.push(LaunchedStage { name, handle });
        Ok(next_input)
    }

    /// Wait for every launched stage, keeping the first panic
    fn join_all(self) -> (Vec<StageReport>, Option<PipelineError>) {
        let mut reports = Vec::with_capacity(self.launched.len());
        let mut failure = None;
        for stage in self.launched {
            match stage.handle.join() {
                Ok(report) => reports.push(report),
                Err(_) => {
                    error!(stage = %stage.name, "stage panicked");
                    failure.get_or_insert(PipelineError::StagePanicked { stage: stage.name });
                }
            }
        }
        (reports, failure)
    }
}

type Chain<I, O> = Arc<
    dyn Fn(QueueReceiver<I>, &mut StageLauncher) -> Result<QueueReceiver<O>, PipelineError>
        + Send
        + Sync,
>;

/// Builder for a typed chain of stages.
///
/// Each stage's output type must match the next stage's input type;
/// mismatches are compile errors.
pub struct PipelineBuilder<I, O> {
    stage_names: Vec<String>,
    chain: Chain<I, O>,
}

impl<I, O> PipelineBuilder<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn start(first: Arc<dyn Stage<I, O>>) -> Self {
        let stage_names = vec![first.name().to_string()];
        let chain: Chain<I, O> = Arc::new(
            move |input: QueueReceiver<I>, launcher: &mut StageLauncher| {
                launcher.launch(Arc::clone(&first), input)
            },
        );

        Self { stage_names, chain }
    }

    /// Append a stage reading this chain's output
    pub fn then<N, S>(self, stage: S) -> PipelineBuilder<I, N>
    where
        N: Send + 'static,
        S: Stage<O, N> + 'static,
    {
        self.then_shared(Arc::new(stage))
    }

    /// Append a stage that may be shared with other pipelines
    pub fn then_shared<N>(self, stage: Arc<dyn Stage<O, N>>) -> PipelineBuilder<I, N>
    where
        N: Send + 'static,
    {
        let mut stage_names = self.stage_names;
        stage_names.push(stage.name().to_string());

        let previous = self.chain;
        let chain: Chain<I, N> = Arc::new(
            move |input: QueueReceiver<I>, launcher: &mut StageLauncher| {
                let intermediate = previous(input, launcher)?;
                launcher.launch(Arc::clone(&stage), intermediate)
            },
        );

        PipelineBuilder { stage_names, chain }
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline<I, O> {
        Pipeline {
            stage_names: self.stage_names,
            chain: self.chain,
        }
    }
}

/// A linear chain of concurrently running stages.
///
/// A pipeline can be executed any number of times; every execution gets
/// fresh queues and fresh stage threads.
pub struct Pipeline<I, O> {
    stage_names: Vec<String>,
    chain: Chain<I, O>,
}

impl<I, O> Pipeline<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Start a pipeline with its first stage
    pub fn builder<S>(first: S) -> PipelineBuilder<I, O>
    where
        S: Stage<I, O> + 'static,
    {
        PipelineBuilder::start(Arc::new(first))
    }

    /// Names of the stages, in chain order
    pub fn stage_names(&self) -> &[String] {
        &self.stage_names
    }

    /// Run the chain over a queue the caller populates and closes
    pub fn execute(&self, input: QueueReceiver<I>) -> Result<PipelineRun<O>, PipelineError> {
        self.execute_with_events(input, &null_sender())
    }

    /// Run the chain over a queue the caller populates and closes, reporting progress.
    ///
    /// Returns after every stage thread has terminated. Blocks forever if
    /// the caller never closes `input`.
    pub fn execute_with_events(
        &self,
        input: QueueReceiver<I>,
        events: &EventSender,
    ) -> Result<PipelineRun<O>, PipelineError> {
        let launcher = StageLauncher::new(events, self.stage_names.len());
        self.execute_with_launcher(input, events, launcher)
    }

    fn execute_with_launcher(
        &self,
        input: QueueReceiver<I>,
        events: &EventSender,
        mut launcher: StageLauncher,
    ) -> Result<PipelineRun<O>, PipelineError> {
        let start_time = Instant::now();

        events.send(Event::Pipeline(PipelineEvent::Started {
            stages: self.stage_names.clone(),
        }));
        info!(stages = ?self.stage_names, "pipeline started");

        // A failed launch drops the queue it would have read, so the stages
        // already running still drain and can be joined
        let chained = (self.chain)(input, &mut launcher);
        let (reports, panicked) = launcher.join_all();

        let output = match (chained, panicked) {
            (Ok(output), None) => output,
            (Err(err), _) | (Ok(_), Some(err)) => {
                error!(%err, "pipeline failed");
                events.send(Event::Pipeline(PipelineEvent::Failed {
                    message: err.to_string(),
                }));
                return Err(err);
            }
        };

        Ok(PipelineRun {
            output,
            stages: reports,
            duration_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    /// Push `items` through the pipeline and collect the final queue
    pub fn run(
        &self,
        items: impl IntoIterator<Item = I>,
    ) -> Result<PipelineResult<O>, PipelineError> {
        self.run_with_events(items, &null_sender())
    }

    /// Push `items` through the pipeline with event reporting
    pub fn run_with_events(
        &self,
        items: impl IntoIterator<Item = I>,
        events: &EventSender,
    ) -> Result<PipelineResult<O>, PipelineError> {
        let run_id = Uuid::new_v4();

        let (feed, input) = queue::channel();
        for item in items {
            feed.send(item);
        }
        let items_in = feed.sent();
        drop(feed);

        let run = self.execute_with_events(input, events)?;
        let outputs = run.output.drain();

        info!(
            %run_id,
            items_in,
            items_out = outputs.len(),
            duration_ms = run.duration_ms,
            "pipeline completed"
        );
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                run_id,
                stages: run.stages.len(),
                items_in,
                items_out: outputs.len(),
                duration_ms: run.duration_ms,
            },
        }));

        Ok(PipelineResult {
            run_id,
            outputs,
            items_in,
            stages: run.stages,
            duration_ms: run.duration_ms,
        })
    }
}

impl<T> Pipeline<T, T>
where
    T: Send + 'static,
{
    /// Build a chain from a runtime list of same-typed stages.
    ///
    /// Fails with [`PipelineError::NoStages`] if `stages` is empty.
    pub fn from_stages(stages: Vec<Arc<dyn Stage<T, T>>>) -> Result<Self, PipelineError> {
        let mut stages = stages.into_iter();
        let first = stages.next().ok_or(PipelineError::NoStages)?;

        Ok(stages
            .fold(PipelineBuilder::start(first), |builder, stage| {
                builder.then_shared(stage)
            })
            .build())
    }
}
