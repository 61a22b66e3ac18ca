//! # Core Module
//!
//! The pipeline engine, independent of any front end.
//!
//! ## Modules
//! - `digest` - Fast and slow hash primitives
//! - `gate` - Process-wide lock serializing the slow primitive
//! - `queue` - Unbounded queues between stages
//! - `stage` - Stage trait and the three hashing stages
//! - `pipeline` - Wires stages together and runs them
//! - `signer` - The assembled single-hash, multi-hash, combine chain

pub mod digest;
pub mod gate;
pub mod pipeline;
pub mod queue;
pub mod signer;
pub mod stage;

// Re-export commonly used types
pub use digest::{DigestAlgorithm, DigestKind};
pub use gate::SerializationGate;
pub use pipeline::{Pipeline, PipelineResult};
pub use signer::{SignatureReport, SignerConfig, SignerPipeline};
pub use stage::Stage;
