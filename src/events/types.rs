//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All events emitted by a running pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Pipeline-level events
    Pipeline(PipelineEvent),
    /// Per-stage lifecycle events
    Stage(StageEvent),
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// All stages have been launched
    Started { stages: Vec<String> },
    /// Every stage drained and terminated
    Completed { summary: PipelineSummary },
    /// A stage failed; the remaining stages were still drained
    Failed { message: String },
}

/// Events emitted by the executor for each stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageEvent {
    /// The stage thread began reading its input queue
    Started { index: usize, name: String },
    /// The stage closed its output queue
    Completed(StageReport),
}

/// What a single stage did during one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Position of the stage in the chain (0 = first)
    pub index: usize,
    /// Stage name
    pub name: String,
    /// Number of items sent on the stage's output queue
    pub items_emitted: usize,
    /// Wall time between the stage starting and closing its output
    pub duration_ms: u64,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Unique identifier of this run
    pub run_id: Uuid,
    /// Number of stages in the chain
    pub stages: usize,
    /// Items the driver pushed into the first queue
    pub items_in: usize,
    /// Items left on the final queue
    pub items_out: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for StageReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} ({} items, {}ms)",
            self.index, self.name, self.items_emitted, self.duration_ms
        )
    }
}
