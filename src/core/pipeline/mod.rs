//! # Pipeline Module
//!
//! Wires stages into a chain of unbounded queues and runs them.
//!
//! ## Execution
//! 1. For each stage, allocate a fresh output queue
//! 2. Launch the stage on its own thread, reading the previous queue
//! 3. Join every stage thread
//! 4. Hand back the last queue, closed and ready to drain
//!
//! ## Parallelism
//! Stages run concurrently with each other. Fan-out stages additionally run
//! one task per in-flight item and spread each item's slots over rayon.

mod executor;

pub use executor::{Pipeline, PipelineBuilder, PipelineResult, PipelineRun};
