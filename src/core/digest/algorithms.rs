//! Concrete digest primitives.

use super::{DigestAlgorithm, DigestKind};
use md5::{Digest as _, Md5};

/// CRC-32 checksum, rendered as a decimal string.
///
/// This is the cheap primitive: it may run on any number of threads at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Digest;

impl Crc32Digest {
    pub fn new() -> Self {
        Self
    }
}

impl DigestAlgorithm for Crc32Digest {
    fn digest(&self, data: &str) -> String {
        crc32fast::hash(data.as_bytes()).to_string()
    }

    fn kind(&self) -> DigestKind {
        DigestKind::Crc32
    }
}

/// MD5 digest, rendered as lowercase hex.
///
/// This is the expensive primitive. It is itself thread-safe, but the
/// pipeline treats it as a resource that must never be entered twice
/// at the same time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Digest;

impl Md5Digest {
    pub fn new() -> Self {
        Self
    }
}

impl DigestAlgorithm for Md5Digest {
    fn digest(&self, data: &str) -> String {
        format!("{:x}", Md5::digest(data.as_bytes()))
    }

    fn kind(&self) -> DigestKind {
        DigestKind::Md5
    }
}

/// Adapts a closure into a digest primitive.
///
/// ```rust,ignore
/// let fast = FnDigest::new(|x| format!("F({x})"));
/// assert_eq!(fast.digest("0"), "F(0)");
/// ```
pub struct FnDigest {
    function: Box<dyn Fn(&str) -> String + Send + Sync>,
}

impl FnDigest {
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            function: Box::new(function),
        }
    }
}

impl DigestAlgorithm for FnDigest {
    fn digest(&self, data: &str) -> String {
        (self.function)(data)
    }

    fn kind(&self) -> DigestKind {
        DigestKind::Custom
    }
}

impl std::fmt::Debug for FnDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnDigest").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_renders_decimal() {
        let crc = Crc32Digest::new();
        assert_eq!(crc.digest("0"), "4108050209");
        assert_eq!(crc.digest("1"), "2212294583");
    }

    #[test]
    fn md5_renders_lowercase_hex() {
        let md5 = Md5Digest::new();
        assert_eq!(md5.digest("0"), "cfcd208495d565ef66e7dff9f98764da");
        assert_eq!(md5.digest("1"), "c4ca4238a0b923820dcc509a6f75849b");
    }

    #[test]
    fn crc32_of_md5_matches_reference() {
        let crc = Crc32Digest::new();
        let md5 = Md5Digest::new();
        assert_eq!(crc.digest(&md5.digest("0")), "502633748");
        assert_eq!(crc.digest(&md5.digest("1")), "709660146");
    }

    #[test]
    fn fn_digest_calls_closure() {
        let fast = FnDigest::new(|x| format!("F({x})"));
        assert_eq!(fast.digest("0"), "F(0)");
        assert_eq!(fast.kind(), DigestKind::Custom);
    }

    #[test]
    fn digests_are_deterministic() {
        let crc = Crc32Digest::new();
        assert_eq!(crc.digest("pipeline"), crc.digest("pipeline"));
        assert_ne!(crc.digest("pipeline"), crc.digest("pipelinE"));
    }
}
