//! One integrity check run, end to end.
//!
//! ```text
//! FetchingManifest -> Scanning -> Classifying -> Restoring -> Reporting -> Idle
//! ```
//!
//! Per-file failures are recorded in the report and never abort the run.
//! A manifest outage skips only the core comparison. Manifests are cached
//! for the duration of one run only.
//!
//! The run deadline cancels detection wherever it is. Restorations are
//! never cancelled mid-write: the deadline is checked before each one
//! starts, and every restoration that started is recorded.

use fileguard_core::{
    CheckOptions, ContentSource, GuardError, Manifest, ManifestSource, Report, ReportBuilder,
    Result,
};
use futures_util::future;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant as Deadline;
use tracing::{debug, info, warn};

use crate::compare::{classify, is_unknown, Classification};
use crate::notify::Notifier;
use crate::provider::ManifestProvider;
use crate::restore::Restorer;
use crate::scanner::TreeScanner;
use crate::store::{MemoryReportStore, ReportStore};

/// Entries walked between cooperative yields, so the deadline can fire.
const YIELD_EVERY: usize = 256;

/// Stage a runner is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No run in progress
    Idle,
    /// Obtaining the reference manifest
    FetchingManifest,
    /// Walking the tree for unknown files
    Scanning,
    /// Hashing manifest-listed files
    Classifying,
    /// Replacing modified files
    Restoring,
    /// Persisting and notifying
    Reporting,
}

/// What to check: a root and the distribution it should match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Installation root
    pub root: PathBuf,
    /// Distribution version
    pub version: String,
    /// Manifest locale
    pub locale: String,
}

impl Target {
    /// Describe a target
    pub fn new(
        root: impl Into<PathBuf>,
        version: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            version: version.into(),
            locale: locale.into(),
        }
    }
}

/// Runs integrity checks with a fixed configuration.
///
/// Runs on one runner are serialised: a second caller waits for the first
/// run to finish rather than racing it over the same tree.
pub struct CheckRunner {
    options: CheckOptions,
    manifests: ManifestProvider,
    content: Arc<dyn ContentSource>,
    store: Arc<dyn ReportStore>,
    notifier: Option<Arc<dyn Notifier>>,
    state: watch::Sender<RunState>,
    running: Mutex<()>,
}

impl CheckRunner {
    /// Create a runner that keeps reports in memory and never notifies
    pub fn new(
        options: CheckOptions,
        manifests: Arc<dyn ManifestSource>,
        content: Arc<dyn ContentSource>,
    ) -> Self {
        let ttl = options.manifest_cache_ttl();
        let (state, _) = watch::channel(RunState::Idle);
        Self {
            options,
            manifests: ManifestProvider::new(manifests, ttl),
            content,
            store: Arc::new(MemoryReportStore::new()),
            notifier: None,
            state,
            running: Mutex::new(()),
        }
    }

    /// Persist reports to `store`
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ReportStore>) -> Self {
        self.store = store;
        self
    }

    /// Notify `notifier` about runs with findings
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Options this runner was built with
    #[must_use]
    pub const fn options(&self) -> &CheckOptions {
        &self.options
    }

    /// Where reports are persisted
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ReportStore> {
        &self.store
    }

    /// Manifest cache, cleared at the start of every run
    #[must_use]
    pub const fn manifests(&self) -> &ManifestProvider {
        &self.manifests
    }

    /// Current stage
    #[must_use]
    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Watch stage transitions
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Check `target` and return the report.
    ///
    /// The report is saved to the store before it is returned; the
    /// notifier is called only when the report has findings. Store and
    /// notifier failures are logged, not returned.
    ///
    /// # Errors
    ///
    /// Fails only if the options are invalid or the root is not a readable
    /// directory.
    pub async fn run(&self, target: &Target) -> Result<Report> {
        self.options.validate()?;
        let _running = self.running.lock().await;

        let started = Instant::now();
        let deadline = self.options.run_timeout().map(|limit| Deadline::now() + limit);
        self.manifests.invalidate().await;
        let scanner = TreeScanner::new(&target.root, self.options.exclusion_set())?;
        info!(
            root = %scanner.root().display(),
            version = %target.version,
            locale = %target.locale,
            "integrity check started"
        );

        let mut builder = ReportBuilder::new(
            scanner.root().display().to_string(),
            &target.version,
            &target.locale,
        );

        let timed_out = self.execute(&scanner, target, &mut builder, deadline).await;
        if timed_out {
            warn!(
                timeout_secs = self.options.run_timeout_secs,
                "run deadline expired, reporting partial results"
            );
        }

        self.set_state(RunState::Reporting);
        let report = builder.finish(started.elapsed(), timed_out);
        info!(
            modified = report.modified_files.len(),
            unknown = report.unknown_files.len(),
            restored = report.restored_files.len(),
            failures = report.restoration_failures.len(),
            scan_errors = report.scan_errors.len(),
            duration_ms = report.duration_ms,
            "integrity check finished"
        );

        if let Err(e) = self.store.save(&report).await {
            warn!(error = %e, "failed to persist report");
        }
        if report.has_findings() {
            if let Some(notifier) = &self.notifier {
                if let Err(e) = notifier.notify(&report).await {
                    warn!(error = %e, "notification failed");
                }
            }
        }

        self.set_state(RunState::Idle);
        Ok(report)
    }

    /// Run every enabled stage; returns true if the deadline cut it short.
    async fn execute(
        &self,
        scanner: &TreeScanner,
        target: &Target,
        builder: &mut ReportBuilder,
        deadline: Option<Deadline>,
    ) -> bool {
        if !self.options.check_core && !self.options.check_unknown {
            return false;
        }

        let detection = self.detect(scanner, target, builder);
        let detected = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, detection).await.ok(),
            None => Some(detection.await),
        };
        let Some((manifest, have_manifest)) = detected else {
            return true;
        };

        if self.options.check_core && self.options.restore_modified && have_manifest {
            return self
                .restore_modified(scanner, target, &manifest, builder, deadline)
                .await;
        }
        false
    }

    /// Fetch the manifest, then find unknown and modified files.
    async fn detect(
        &self,
        scanner: &TreeScanner,
        target: &Target,
        builder: &mut ReportBuilder,
    ) -> (Arc<Manifest>, bool) {
        self.set_state(RunState::FetchingManifest);
        let (manifest, have_manifest) = match self
            .manifests
            .get_manifest(&target.version, &target.locale)
            .await
        {
            Ok(manifest) => (manifest, true),
            Err(e) => {
                warn!(error = %e, "manifest unavailable, skipping core comparison");
                builder.record_manifest_error(e.to_string());
                let empty = Manifest::empty(&target.version, &target.locale, self.options.algorithm);
                (Arc::new(empty), false)
            }
        };

        if self.options.check_unknown {
            self.scan_unknown(scanner, &manifest, builder).await;
        }
        if self.options.check_core && have_manifest {
            self.classify_core(scanner, &manifest, builder).await;
        }
        (manifest, have_manifest)
    }

    async fn classify_core(
        &self,
        scanner: &TreeScanner,
        manifest: &Manifest,
        builder: &mut ReportBuilder,
    ) {
        self.set_state(RunState::Classifying);

        let mut results = stream::iter(manifest.iter().map(|(rel, _)| rel.to_string()))
            .map(move |rel| async move {
                let result = classify_entry(scanner, manifest, &rel).await;
                (rel, result)
            })
            .buffer_unordered(self.options.workers);

        while let Some((rel, result)) = results.next().await {
            match result {
                Ok(Some(Classification::Modified { expected, actual })) => {
                    info!(path = %rel, %expected, %actual, "modified");
                    builder.record_modified(rel);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %rel, error = %e, "cannot check file");
                    builder.record_scan_error(rel, e.to_string());
                }
            }
        }
    }

    async fn scan_unknown(
        &self,
        scanner: &TreeScanner,
        manifest: &Manifest,
        builder: &mut ReportBuilder,
    ) {
        self.set_state(RunState::Scanning);

        for (i, item) in scanner.scan().enumerate() {
            match item {
                Ok(record) => {
                    if is_unknown(&record.relative_path, manifest, scanner.exclusions()) {
                        debug!(path = %record.relative_path, "unknown");
                        builder.record_unknown(record.relative_path);
                    }
                }
                Err(GuardError::ScanIo { path, reason }) => {
                    warn!(path = %path, error = %reason, "unreadable entry skipped");
                    builder.record_scan_error(path, reason);
                }
                Err(e) => {
                    warn!(error = %e, "scan error");
                    builder.record_scan_error(String::new(), e.to_string());
                }
            }
            if (i + 1) % YIELD_EVERY == 0 {
                tokio::task::yield_now().await;
            }
        }
    }

    /// Restore modified files; returns true if the deadline left some untried.
    async fn restore_modified(
        &self,
        scanner: &TreeScanner,
        target: &Target,
        manifest: &Manifest,
        builder: &mut ReportBuilder,
        deadline: Option<Deadline>,
    ) -> bool {
        let pending: Vec<(String, String)> = builder
            .modified()
            .filter_map(|rel| {
                manifest
                    .expected(rel)
                    .map(|expected| (rel.to_string(), expected.to_string()))
            })
            .collect();
        if pending.is_empty() {
            return false;
        }
        let total = pending.len();

        self.set_state(RunState::Restoring);
        info!(files = pending.len(), "restoring modified files");

        let restorer = Restorer::new(
            Arc::clone(&self.content),
            scanner.root(),
            &target.version,
            manifest.algorithm(),
            self.options.request_timeout(),
        );
        let restorer = &restorer;
        let expired = move || deadline.is_some_and(|d| Deadline::now() >= d);

        let mut outcomes = stream::iter(pending)
            .take_while(move |_| future::ready(!expired()))
            .map(move |(rel, expected)| async move {
                let outcome = restorer.restore(&rel, &expected).await;
                (rel, outcome)
            })
            .buffer_unordered(self.options.restore_concurrency);

        let mut attempted = 0;
        while let Some((rel, outcome)) = outcomes.next().await {
            attempted += 1;
            builder.record_restoration(&rel, &outcome);
        }

        if attempted < total {
            warn!(
                attempted,
                skipped = total - attempted,
                "run deadline reached, remaining restorations not started"
            );
            return true;
        }
        false
    }

    fn set_state(&self, state: RunState) {
        debug!(?state, "run state");
        self.state.send_replace(state);
    }
}

/// Hash one manifest entry; `Ok(None)` if it is missing on disk.
async fn classify_entry(
    scanner: &TreeScanner,
    manifest: &Manifest,
    rel: &str,
) -> Result<Option<Classification>> {
    let Some(record) = scanner.record_at(rel)? else {
        debug!(path = %rel, "listed in manifest but not on disk");
        return Ok(None);
    };
    let result = classify(record, manifest, scanner.exclusions()).await?;
    Ok(Some(result.classification))
}
