//! # fileguard-audit
//!
//! File integrity verification and remediation.
//!
//! A run compares an installation against the reference manifest for its
//! exact version and locale, replaces tampered distribution files with
//! authoritative copies, and lists files that do not belong.
//!
//! ## Data Flow
//!
//! ```text
//! Stage 1: Manifest (network, cached for one run)
//!   ManifestProvider::get_manifest(version, locale)
//!   -> Arc<Manifest>, or manifest_error on the report
//!
//! Stage 2: Unknown files (local walk)
//!   TreeScanner::scan() with root-anchored directory pruning -> is_unknown()
//!   -> Unknown paths
//!
//! Stage 3: Core comparison (local, bounded pool)
//!   for each manifest entry: TreeScanner::record_at() -> classify()
//!   -> Modified paths
//!
//! Stage 4: Restoration (network + atomic replace, bounded pool)
//!   Restorer::restore(path, expected) for each Modified path,
//!   none started once the run deadline has passed
//!   -> RestorationOutcome per path
//!
//! Stage 5: Report
//!   ReportBuilder::finish() -> ReportStore::save() -> Notifier (findings only)
//! ```

pub mod compare;
pub mod delete;
pub mod hash;
pub mod notify;
pub mod paths;
pub mod provider;
pub mod restore;
pub mod runner;
pub mod scanner;
pub mod store;
pub mod version;

mod atomic;

pub use compare::{classify, compare_checksums, Classification, ClassificationResult};
pub use delete::{delete_files, DeletionReport};
pub use fileguard_core::{GuardError, Result};
pub use notify::Notifier;
pub use provider::ManifestProvider;
pub use restore::Restorer;
pub use runner::{CheckRunner, RunState, Target};
pub use scanner::{FileRecord, TreeScanner};
pub use store::{JsonFileReportStore, MemoryReportStore, ReportStore};
pub use version::detect_version;

use fileguard_core::{ExclusionSet, Manifest};
use std::path::Path;
use tracing::warn;

/// List files under `root` that are neither in `manifest` nor excluded.
///
/// Independent of a full check run: nothing is hashed, restored or
/// persisted. Unreadable entries are logged and skipped. The result is
/// ordered by relative path.
///
/// # Errors
///
/// Returns an error if `root` is not a readable directory.
pub fn list_unknown_files(
    root: &Path,
    manifest: &Manifest,
    exclusions: &ExclusionSet,
) -> Result<Vec<FileRecord>> {
    let scanner = TreeScanner::new(root, exclusions.clone())?;
    let mut unknown = Vec::new();

    for item in scanner.scan() {
        match item {
            Ok(record) if compare::is_unknown(&record.relative_path, manifest, exclusions) => {
                unknown.push(record);
            }
            Ok(_) => {}
            Err(GuardError::ScanIo { path, reason }) => {
                warn!(path = %path, error = %reason, "unreadable entry skipped");
            }
            Err(e) => warn!(error = %e, "scan error"),
        }
    }

    unknown.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(unknown)
}
