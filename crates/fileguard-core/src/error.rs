use thiserror::Error;

/// Result type alias for fileguard operations
pub type Result<T> = std::result::Result<T, GuardError>;

/// Errors that can occur while checking or repairing a tree
#[derive(Error, Debug)]
pub enum GuardError {
    /// The reference manifest could not be fetched or parsed
    #[error("manifest unavailable for {version} ({locale}): {reason}")]
    ManifestUnavailable {
        /// Distribution version that was requested
        version: String,
        /// Locale that was requested
        locale: String,
        /// Why the manifest is unavailable
        reason: String,
    },

    /// A directory entry could not be read during traversal
    #[error("cannot read {path}: {reason}")]
    ScanIo {
        /// Path of the unreadable entry
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// Authoritative content could not be fetched
    #[error("fetch failed for {path}: {reason}")]
    FetchFailed {
        /// Relative path that was requested
        path: String,
        /// HTTP status or transport failure
        reason: String,
    },

    /// Restored content does not hash to the manifest value
    #[error("verification failed for {path}: expected {expected}, got {actual}")]
    VerificationFailed {
        /// Relative path of the restored file
        path: String,
        /// Checksum the manifest expects
        expected: String,
        /// Checksum of the file on disk after replacement
        actual: String,
    },

    /// A file could not be deleted
    #[error("cannot delete {path}: {reason}")]
    DeletionFailed {
        /// Relative path that was requested
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// A path resolves outside the scanned root
    #[error("path escapes root: {path}")]
    PathTraversalRejected {
        /// The offending path, as supplied
        path: String,
    },

    /// Filesystem error on a specific path
    #[error("io error on {path}: {source}")]
    Io {
        /// Path being accessed
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl GuardError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if a later run could reasonably succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ManifestUnavailable { .. }
                | Self::FetchFailed { .. }
                | Self::Http(_)
                | Self::Timeout(_)
        )
    }

    /// Returns true if the error is a rejected directory traversal
    #[must_use]
    pub const fn is_traversal(&self) -> bool {
        matches!(self, Self::PathTraversalRejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_is_not_retryable() {
        let err = GuardError::PathTraversalRejected {
            path: "../../etc/passwd".into(),
        };
        assert!(err.is_traversal());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "path escapes root: ../../etc/passwd");
    }

    #[test]
    fn network_errors_are_retryable() {
        assert!(GuardError::Timeout(30).is_retryable());
        assert!(GuardError::FetchFailed {
            path: "index.php".into(),
            reason: "HTTP 503".into(),
        }
        .is_retryable());
    }
}
