//! Trait definitions for digest primitives.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Available digest primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestKind {
    /// CRC-32 (IEEE), rendered as an unsigned decimal number
    Crc32,
    /// MD5, rendered as 32 lowercase hex characters
    Md5,
    /// A caller-supplied function
    Custom,
}

impl DigestKind {
    /// Get a human-readable description of the primitive
    pub fn description(&self) -> &'static str {
        match self {
            DigestKind::Crc32 => "CRC-32 (IEEE) - cheap checksum, safe to run in parallel",
            DigestKind::Md5 => "MD5 - expensive digest, every call goes through the gate",
            DigestKind::Custom => "Custom function supplied by the caller",
        }
    }
}

impl std::fmt::Display for DigestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DigestKind::Crc32 => write!(f, "crc32"),
            DigestKind::Md5 => write!(f, "md5"),
            DigestKind::Custom => write!(f, "custom"),
        }
    }
}

/// A deterministic, total `text -> digest` function.
///
/// Implementations must be pure and callable from many threads at once.
/// Whether a call must additionally be serialized is the caller's concern,
/// see [`crate::core::gate::GatedDigest`].
pub trait DigestAlgorithm: Send + Sync {
    /// Compute the digest of `data`
    fn digest(&self, data: &str) -> String;

    /// Get the primitive kind
    fn kind(&self) -> DigestKind;
}

impl<D: DigestAlgorithm + ?Sized> DigestAlgorithm for Arc<D> {
    fn digest(&self, data: &str) -> String {
        (**self).digest(data)
    }

    fn kind(&self) -> DigestKind {
        (**self).kind()
    }
}

impl<D: DigestAlgorithm + ?Sized> DigestAlgorithm for Box<D> {
    fn digest(&self, data: &str) -> String {
        (**self).digest(data)
    }

    fn kind(&self) -> DigestKind {
        (**self).kind()
    }
}
