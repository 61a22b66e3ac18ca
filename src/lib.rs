//! # Signer Pipeline
//!
//! A concurrent hashing pipeline: stages joined by unbounded queues, each
//! item fanned out to parallel slot computations, and one expensive digest
//! serialized across the whole process.
//!
//! ## Guarantees
//! - **Slot order, not completion order** - fan-out results are assembled by index
//! - **One slow call at a time** - every slow digest passes a global gate
//! - **Full drain** - every stage reads its input to the end before closing its output
//!
//! ## Architecture
//! - `core` - Digests, gate, queues, stages, pipeline executor
//! - `events` - Progress events over channels
//! - `error` - Error types
//! - `cli` - Command-line driver (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, SignerError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
