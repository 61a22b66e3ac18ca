//! # Digest Module
//!
//! The leaf primitives the pipeline hashes with.
//!
//! ## Primitives
//! - **Fast** (default CRC-32) - cheap, called freely from any thread
//! - **Slow** (default MD5) - expensive, every call must pass the
//!   process-wide gate
//!
//! ## Wrappers
//! - `SimulatedLatency` adds a fixed cost per call
//! - `ContentionProbe` counts overlapping calls
//!
//! ## Example
//! ```rust,ignore
//! use signer_pipeline::core::digest::{DigestConfig, DigestKind};
//!
//! let slow = DigestConfig::new(DigestKind::Md5)
//!     .latency(Duration::from_millis(10))
//!     .build()?;
//! let digest = slow.digest("0");
//! ```

mod algorithms;
mod latency;
mod probe;
mod traits;

pub use algorithms::{Crc32Digest, FnDigest, Md5Digest};
pub use latency::SimulatedLatency;
pub use probe::{ContentionProbe, ProbeStats};
pub use traits::{DigestAlgorithm, DigestKind};

use crate::error::ConfigError;
use std::sync::Arc;
use std::time::Duration;

/// Configuration builder for digest primitives
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Primitive to use
    kind: DigestKind,
    /// Artificial cost added to every call
    latency: Duration,
}

impl DigestConfig {
    /// Create a configuration for the given primitive with no added latency
    pub fn new(kind: DigestKind) -> Self {
        Self {
            kind,
            latency: Duration::ZERO,
        }
    }

    /// Add a fixed delay to every call
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Build the primitive
    ///
    /// `DigestKind::Custom` has no built-in implementation; construct a
    /// [`FnDigest`] directly instead.
    pub fn build(self) -> Result<Arc<dyn DigestAlgorithm>, ConfigError> {
        let base: Arc<dyn DigestAlgorithm> = match self.kind {
            DigestKind::Crc32 => Arc::new(Crc32Digest::new()),
            DigestKind::Md5 => Arc::new(Md5Digest::new()),
            DigestKind::Custom => {
                return Err(ConfigError::UnsupportedDigest {
                    kind: self.kind.to_string(),
                })
            }
        };

        if self.latency.is_zero() {
            Ok(base)
        } else {
            Ok(Arc::new(SimulatedLatency::new(base, self.latency)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builds_requested_kind() {
        let crc = DigestConfig::new(DigestKind::Crc32).build().unwrap();
        assert_eq!(crc.kind(), DigestKind::Crc32);

        let md5 = DigestConfig::new(DigestKind::Md5)
            .latency(Duration::from_millis(1))
            .build()
            .unwrap();
        assert_eq!(md5.kind(), DigestKind::Md5);
        assert_eq!(md5.digest("0"), "cfcd208495d565ef66e7dff9f98764da");
    }

    #[test]
    fn custom_kind_cannot_be_built_from_config() {
        let result = DigestConfig::new(DigestKind::Custom).build();
        assert!(matches!(result, Err(ConfigError::UnsupportedDigest { .. })));
    }
}
