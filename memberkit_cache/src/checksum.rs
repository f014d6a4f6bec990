//! Content checksums for the cache checksum gate.

use std::fmt;

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest describing the content a cached value was
/// derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Checksum(String);

impl Checksum {
    /// Digest arbitrary bytes.
    pub fn of(content: impl AsRef<[u8]>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_ref());
        Checksum(format!("{:x}", hasher.finalize()))
    }

    /// Digest several parts, separated so that `["ab", "c"]` and `["a", "bc"]` differ.
    pub fn of_parts<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_ref());
            hasher.update(b"\n--\n");
        }
        Checksum(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Checksum {
    fn from(value: String) -> Self {
        Checksum(value)
    }
}

impl From<&str> for Checksum {
    fn from(value: &str) -> Self {
        Checksum(value.to_string())
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
