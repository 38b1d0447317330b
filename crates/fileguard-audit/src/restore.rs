//! Replacement of modified files with authoritative content.

use fileguard_core::{ChecksumAlgorithm, ContentSource, GuardError, RestorationOutcome};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::atomic::write_atomic;
use crate::hash::checksum_file;
use crate::paths::resolve_within;

/// Restores files for one distribution version under one root.
#[derive(Clone)]
pub struct Restorer {
    content: Arc<dyn ContentSource>,
    root: PathBuf,
    version: String,
    algorithm: ChecksumAlgorithm,
    timeout: Duration,
}

impl Restorer {
    /// Create a restorer. `root` must already be canonical.
    pub fn new(
        content: Arc<dyn ContentSource>,
        root: impl Into<PathBuf>,
        version: impl Into<String>,
        algorithm: ChecksumAlgorithm,
        timeout: Duration,
    ) -> Self {
        Self {
            content,
            root: root.into(),
            version: version.into(),
            algorithm,
            timeout,
        }
    }

    /// Restore `rel` so that it hashes to `expected`.
    ///
    /// Never fails as a whole: every problem becomes a non-success outcome.
    /// The local file is only replaced once the fetched bytes are fully on
    /// disk, and it is verified against `expected` rather than against the
    /// fetched bytes.
    pub async fn restore(&self, rel: &str, expected: &str) -> RestorationOutcome {
        let path = match resolve_within(&self.root, rel) {
            Ok(path) => path,
            Err(e) => {
                warn!(path = %rel, error = %e, "refusing to restore");
                return RestorationOutcome::WriteFailed {
                    reason: e.to_string(),
                };
            }
        };

        if let Ok(current) = checksum_file(&path, self.algorithm).await {
            if current.eq_ignore_ascii_case(expected) {
                debug!(path = %rel, "already intact, nothing to restore");
                return RestorationOutcome::SkippedNotModified;
            }
        }

        let fetched = tokio::time::timeout(self.timeout, self.content.fetch_file(&self.version, rel));
        let bytes = match fetched.await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                warn!(path = %rel, error = %e, "fetch failed");
                return RestorationOutcome::FetchFailed {
                    reason: fetch_reason(e),
                };
            }
            Err(_) => {
                warn!(path = %rel, timeout_secs = self.timeout.as_secs(), "fetch timed out");
                return RestorationOutcome::FetchFailed {
                    reason: GuardError::Timeout(self.timeout.as_secs()).to_string(),
                };
            }
        };

        if let Err(e) = write_atomic(&path, &bytes).await {
            warn!(path = %rel, error = %e, "write failed");
            return RestorationOutcome::WriteFailed {
                reason: e.to_string(),
            };
        }

        match checksum_file(&path, self.algorithm).await {
            Ok(actual) if actual.eq_ignore_ascii_case(expected) => {
                info!(path = %rel, "restored");
                RestorationOutcome::Restored
            }
            Ok(actual) => {
                warn!(path = %rel, expected, actual = %actual, "restored content does not verify");
                RestorationOutcome::VerificationFailed {
                    expected: expected.to_ascii_lowercase(),
                    actual,
                }
            }
            Err(e) => {
                warn!(path = %rel, error = %e, "cannot re-read restored file");
                RestorationOutcome::VerificationFailed {
                    expected: expected.to_ascii_lowercase(),
                    actual: format!("unreadable ({e})"),
                }
            }
        }
    }
}

fn fetch_reason(err: GuardError) -> String {
    match err {
        GuardError::FetchFailed { reason, .. } => reason,
        other => other.to_string(),
    }
}
