use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::GuardError;

/// Content-hash algorithm a manifest is expressed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    /// MD5, the format of the WordPress core checksum API
    #[default]
    Md5,
    /// SHA-256
    Sha256,
}

impl ChecksumAlgorithm {
    /// Length of a hex-encoded digest
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha256 => 64,
        }
    }

    /// Returns true if `digest` looks like a hex digest of this algorithm
    #[must_use]
    pub fn is_valid_digest(self, digest: &str) -> bool {
        digest.len() == self.hex_len() && digest.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(GuardError::Config(format!(
                "unknown checksum algorithm: {other} (expected md5 or sha256)"
            ))),
        }
    }
}

impl std::fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Md5 => write!(f, "md5"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}
