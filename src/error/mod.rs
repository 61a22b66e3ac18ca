//! # Error Module
//!
//! Error types for the signer pipeline.
//!
//! ## Design Principles
//! - **Digests are total** - there is no per-item error channel
//! - **Contract violations surface as values** - an empty stage list or a
//!   panicking stage becomes a `PipelineError` instead of a hung process
//! - **Include context** - stage names, offending values, file paths

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum SignerError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read items from {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while building or executing a pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("A pipeline needs at least one stage")]
    NoStages,

    #[error("Failed to spawn thread for stage '{stage}': {source}")]
    StageSpawn {
        stage: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stage '{stage}' panicked before draining its input")]
    StagePanicked { stage: String },

    #[error("Expected {expected} output item(s) from the final stage, got {actual}")]
    UnexpectedOutputCount { expected: usize, actual: usize },
}

/// Errors in pipeline configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid worker thread count: {value} (must be at least 1)")]
    InvalidWorkerCount { value: usize },

    #[error("Failed to build slot worker pool: {0}")]
    WorkerPool(String),

    #[error("Digest '{kind}' has no built-in implementation")]
    UnsupportedDigest { kind: String },

    #[error("Invalid input item: {value:?}")]
    InvalidItem { value: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, SignerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_panic_names_the_stage() {
        let error = PipelineError::StagePanicked {
            stage: "multi-hash".to_string(),
        };
        assert!(error.to_string().contains("multi-hash"));
    }

    #[test]
    fn input_error_includes_path() {
        let error = SignerError::Input {
            path: PathBuf::from("/data/items.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let message = error.to_string();
        assert!(message.contains("/data/items.txt"));
        assert!(message.contains("missing"));
    }

    #[test]
    fn pipeline_errors_convert_to_top_level() {
        let error: SignerError = PipelineError::NoStages.into();
        assert!(matches!(error, SignerError::Pipeline(PipelineError::NoStages)));
    }

    #[test]
    fn output_count_error_reports_both_counts() {
        let error = PipelineError::UnexpectedOutputCount {
            expected: 1,
            actual: 3,
        };
        let message = error.to_string();
        assert!(message.contains('1'));
        assert!(message.contains('3'));
    }
}
