//! Typed check configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::{
    ChecksumAlgorithm, ExclusionSet, WORDPRESS_EXCLUDED_SUBTREES, WORDPRESS_WHITELIST,
};
use crate::{GuardError, Result};

/// Every option recognised by an integrity check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    /// Compare distribution files against the manifest
    pub check_core: bool,

    /// Report files that are not part of the distribution
    pub check_unknown: bool,

    /// Restore modified files from the authoritative source
    pub restore_modified: bool,

    /// Basenames and path prefixes never reported as unknown
    pub exclusions: Vec<String>,

    /// Subtrees skipped entirely when scanning for unknown files
    pub excluded_subtrees: Vec<String>,

    /// Distribution version; detected from the tree when unset
    pub version: Option<String>,

    /// Manifest locale
    pub locale: String,

    /// Checksum algorithm the manifest uses
    pub algorithm: ChecksumAlgorithm,

    /// Concurrent checksum computations
    pub workers: usize,

    /// Concurrent restorations
    pub restore_concurrency: usize,

    /// Timeout for each network request (seconds)
    pub request_timeout_secs: u64,

    /// Deadline for the scan/classify/restore phase (seconds, 0 = none)
    pub run_timeout_secs: u64,

    /// How long a fetched manifest may be reused (seconds)
    pub manifest_cache_ttl_secs: u64,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            check_core: true,
            check_unknown: true,
            restore_modified: true,
            exclusions: WORDPRESS_WHITELIST.iter().map(ToString::to_string).collect(),
            excluded_subtrees: WORDPRESS_EXCLUDED_SUBTREES
                .iter()
                .map(ToString::to_string)
                .collect(),
            version: None,
            locale: String::from("en_US"),
            algorithm: ChecksumAlgorithm::Md5,
            workers: 8,
            restore_concurrency: 4,
            request_timeout_secs: 30,
            run_timeout_secs: 900,
            manifest_cache_ttl_secs: 300,
        }
    }
}

impl CheckOptions {
    /// Build the exclusion set described by these options
    #[must_use]
    pub fn exclusion_set(&self) -> ExclusionSet {
        ExclusionSet::new(&self.exclusions, &self.excluded_subtrees)
    }

    /// Per-request network timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Deadline for one run, if any
    #[must_use]
    pub const fn run_timeout(&self) -> Option<Duration> {
        if self.run_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.run_timeout_secs))
        }
    }

    /// Manifest cache lifetime
    #[must_use]
    pub const fn manifest_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.manifest_cache_ttl_secs)
    }

    /// Reject option combinations a run cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(GuardError::Config("workers must be at least 1".into()));
        }
        if self.restore_concurrency == 0 {
            return Err(GuardError::Config(
                "restore_concurrency must be at least 1".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(GuardError::Config(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        if self.locale.trim().is_empty() {
            return Err(GuardError::Config("locale must not be empty".into()));
        }
        Ok(())
    }
}

/// Settings for the notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationOptions {
    /// Where notifications go (address, file path, ...)
    pub recipient: Option<String>,

    /// Subject template
    pub subject: String,

    /// Body template
    pub template: String,

    /// Value substituted for `{site_name}`
    pub site_name: String,
}

impl Default for NotificationOptions {
    fn default() -> Self {
        Self {
            recipient: None,
            subject: String::from("[{site_name}] File Integrity Check Report"),
            template: String::from(
                "File Integrity Check Report for {site_name}\n\n\
                 Modified Files:\n{modified_files}\n\n\
                 Unknown Files:\n{unknown_files}\n\n\
                 Restored Files:\n{restored_files}",
            ),
            site_name: String::from("WordPress"),
        }
    }
}
