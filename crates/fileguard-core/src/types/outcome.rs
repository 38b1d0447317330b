use serde::{Deserialize, Serialize};

/// Result of one attempt to restore a file from the authoritative source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RestorationOutcome {
    /// Content replaced and verified against the manifest
    Restored,
    /// Remote content could not be obtained; local file untouched
    FetchFailed {
        /// HTTP status or transport failure
        reason: String,
    },
    /// Content replaced but does not hash to the manifest value
    VerificationFailed {
        /// Checksum the manifest expects
        expected: String,
        /// Checksum of the file after replacement
        actual: String,
    },
    /// Local write or rename failed; local file untouched
    WriteFailed {
        /// Underlying IO failure
        reason: String,
    },
    /// File already matches the manifest; nothing written
    SkippedNotModified,
}

impl RestorationOutcome {
    /// Returns true if the outcome needs manual attention
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. } | Self::VerificationFailed { .. } | Self::WriteFailed { .. }
        )
    }

    /// Human-readable failure reason, `None` for successful outcomes
    #[must_use]
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::FetchFailed { reason } => Some(format!("fetch failed: {reason}")),
            Self::VerificationFailed { expected, actual } => Some(format!(
                "verification failed: expected {expected}, got {actual}"
            )),
            Self::WriteFailed { reason } => Some(format!("write failed: {reason}")),
            Self::Restored | Self::SkippedNotModified => None,
        }
    }
}

impl std::fmt::Display for RestorationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Restored => write!(f, "restored"),
            Self::SkippedNotModified => write!(f, "not modified"),
            other => write!(f, "{}", other.failure_reason().unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_classification() {
        assert!(!RestorationOutcome::Restored.is_failure());
        assert!(!RestorationOutcome::SkippedNotModified.is_failure());
        let failed = RestorationOutcome::VerificationFailed {
            expected: "abc123".into(),
            actual: "qqq111".into(),
        };
        assert!(failed.is_failure());
        assert_eq!(
            failed.failure_reason().as_deref(),
            Some("verification failed: expected abc123, got qqq111")
        );
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(RestorationOutcome::FetchFailed {
            reason: "HTTP 404".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "fetch_failed");
        assert_eq!(json["reason"], "HTTP 404");
    }
}
