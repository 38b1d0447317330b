//! Integrity check reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use super::RestorationOutcome;

/// A path paired with the reason an operation on it failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathFailure {
    /// Relative path
    pub path: String,
    /// Why the operation failed
    pub reason: String,
}

impl PathFailure {
    /// Create a new failure entry
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Outcome of one integrity check run.
///
/// Created once per run and never mutated afterwards; the next run
/// replaces it rather than merging into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// When the run finished
    pub timestamp: DateTime<Utc>,
    /// Root directory that was checked
    pub root: String,
    /// Distribution version checked against
    pub version: String,
    /// Locale checked against
    pub locale: String,
    /// Files whose content differs from the manifest
    pub modified_files: Vec<String>,
    /// Files absent from the manifest and not excluded
    pub unknown_files: Vec<String>,
    /// Modified files that were restored and verified
    pub restored_files: Vec<String>,
    /// Restoration attempts that need manual attention
    pub restoration_failures: Vec<PathFailure>,
    /// Entries that could not be read during the scan
    #[serde(default)]
    pub scan_errors: Vec<PathFailure>,
    /// Set when the manifest could not be obtained
    #[serde(default)]
    pub manifest_error: Option<String>,
    /// Set when the run deadline expired before all work completed
    #[serde(default)]
    pub timed_out: bool,
    /// Wall-clock duration of the run
    #[serde(default)]
    pub duration_ms: u64,
}

impl Report {
    /// Returns true if anything worth notifying about was found
    #[must_use]
    pub fn has_findings(&self) -> bool {
        !self.modified_files.is_empty()
            || !self.unknown_files.is_empty()
            || !self.restored_files.is_empty()
            || !self.restoration_failures.is_empty()
    }

    /// Returns true if the run hit a manifest outage, scan errors or the deadline
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.manifest_error.is_some() || !self.scan_errors.is_empty() || self.timed_out
    }
}

/// Accumulates per-file results into a [`Report`].
///
/// Enforces the report invariants as results arrive: a path is never both
/// modified and unknown, and only modified paths can be restored.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    root: String,
    version: String,
    locale: String,
    modified: BTreeSet<String>,
    unknown: BTreeSet<String>,
    restored: BTreeSet<String>,
    failures: BTreeMap<String, String>,
    scan_errors: Vec<PathFailure>,
    manifest_error: Option<String>,
}

impl ReportBuilder {
    /// Start a report for one run
    pub fn new(
        root: impl Into<String>,
        version: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            version: version.into(),
            locale: locale.into(),
            modified: BTreeSet::new(),
            unknown: BTreeSet::new(),
            restored: BTreeSet::new(),
            failures: BTreeMap::new(),
            scan_errors: Vec::new(),
            manifest_error: None,
        }
    }

    /// Record a file whose content differs from the manifest
    pub fn record_modified(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.unknown.remove(&path);
        self.modified.insert(path);
    }

    /// Record a file that is not part of the distribution.
    ///
    /// Ignored if the path was already recorded as modified.
    pub fn record_unknown(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.modified.contains(&path) {
            self.unknown.insert(path);
        }
    }

    /// Record the outcome of a restoration attempt.
    ///
    /// Returns false (and records nothing) if `path` was never recorded as
    /// modified.
    pub fn record_restoration(&mut self, path: &str, outcome: &RestorationOutcome) -> bool {
        if !self.modified.contains(path) {
            return false;
        }
        match outcome {
            RestorationOutcome::Restored => {
                self.failures.remove(path);
                self.restored.insert(path.to_string());
            }
            RestorationOutcome::SkippedNotModified => {}
            failed => {
                if let Some(reason) = failed.failure_reason() {
                    self.restored.remove(path);
                    self.failures.insert(path.to_string(), reason);
                }
            }
        }
        true
    }

    /// Record an entry that could not be read
    pub fn record_scan_error(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.scan_errors.push(PathFailure::new(path, reason));
    }

    /// Record that the manifest could not be obtained
    pub fn record_manifest_error(&mut self, reason: impl Into<String>) {
        self.manifest_error = Some(reason.into());
    }

    /// Paths recorded as modified so far, in path order
    pub fn modified(&self) -> impl Iterator<Item = &str> {
        self.modified.iter().map(String::as_str)
    }

    /// Freeze the accumulated results into a report
    #[must_use]
    pub fn finish(self, elapsed: Duration, timed_out: bool) -> Report {
        let mut scan_errors = self.scan_errors;
        scan_errors.sort_by(|a, b| a.path.cmp(&b.path));

        Report {
            timestamp: Utc::now(),
            root: self.root,
            version: self.version,
            locale: self.locale,
            modified_files: self.modified.into_iter().collect(),
            unknown_files: self.unknown.into_iter().collect(),
            restored_files: self.restored.into_iter().collect(),
            restoration_failures: self
                .failures
                .into_iter()
                .map(|(path, reason)| PathFailure { path, reason })
                .collect(),
            scan_errors,
            manifest_error: self.manifest_error,
            timed_out,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ReportBuilder {
        ReportBuilder::new("/site", "6.4.2", "en_US")
    }

    #[test]
    fn modified_and_unknown_are_disjoint() {
        let mut b = builder();
        b.record_unknown("index.php");
        b.record_modified("index.php");
        b.record_unknown("index.php");
        b.record_unknown("shell.php");

        let report = b.finish(Duration::ZERO, false);
        assert_eq!(report.modified_files, vec!["index.php"]);
        assert_eq!(report.unknown_files, vec!["shell.php"]);
    }

    #[test]
    fn restored_must_be_modified() {
        let mut b = builder();
        b.record_modified("index.php");
        assert!(b.record_restoration("index.php", &RestorationOutcome::Restored));
        assert!(!b.record_restoration("other.php", &RestorationOutcome::Restored));

        let report = b.finish(Duration::ZERO, false);
        assert_eq!(report.restored_files, vec!["index.php"]);
        assert!(report.restoration_failures.is_empty());
    }

    #[test]
    fn failed_restoration_is_reported() {
        let mut b = builder();
        b.record_modified("index.php");
        b.record_restoration(
            "index.php",
            &RestorationOutcome::VerificationFailed {
                expected: "abc123".into(),
                actual: "qqq111".into(),
            },
        );

        let report = b.finish(Duration::from_millis(1500), false);
        assert!(report.restored_files.is_empty());
        assert_eq!(report.restoration_failures.len(), 1);
        assert_eq!(report.restoration_failures[0].path, "index.php");
        assert_eq!(report.duration_ms, 1500);
        assert!(report.has_findings());
    }

    #[test]
    fn empty_report_has_no_findings() {
        let mut b = builder();
        b.record_manifest_error("HTTP 503");
        let report = b.finish(Duration::ZERO, false);
        assert!(!report.has_findings());
        assert!(report.has_errors());
    }

    #[test]
    fn serializes_contract_field_names() {
        let report = builder().finish(Duration::ZERO, true);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("modifiedFiles").is_some());
        assert!(json.get("unknownFiles").is_some());
        assert!(json.get("restoredFiles").is_some());
        assert!(json.get("restorationFailures").is_some());
        assert_eq!(json["timedOut"], true);
    }
}
