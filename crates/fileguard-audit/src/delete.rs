//! Batch removal of files below a root.

use fileguard_core::{GuardError, PathFailure, Result};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

use crate::paths::{canonical_root, resolve_within};

/// Per-path result of [`delete_files`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    /// Paths that were removed
    pub deleted: Vec<String>,
    /// Paths that were not removed, with the reason
    pub failed: Vec<PathFailure>,
}

impl DeletionReport {
    /// Failed paths without their reasons
    pub fn failed_paths(&self) -> impl Iterator<Item = &str> {
        self.failed.iter().map(|f| f.path.as_str())
    }
}

/// Delete each of `paths` (relative to `root`).
///
/// Every path is checked for containment first; anything that resolves
/// outside `root` is refused. Failures are collected per path and the batch
/// always runs to the end. Only an unusable `root` fails the whole call.
pub fn delete_files<S: AsRef<str>>(root: &Path, paths: &[S]) -> Result<DeletionReport> {
    let root = canonical_root(root)?;
    let mut report = DeletionReport::default();

    for rel in paths {
        let rel = rel.as_ref();
        match delete_one(&root, rel) {
            Ok(()) => {
                info!(path = %rel, "deleted");
                report.deleted.push(rel.to_string());
            }
            Err(e) => {
                warn!(path = %rel, error = %e, "not deleted");
                report.failed.push(PathFailure::new(rel, e.to_string()));
            }
        }
    }

    Ok(report)
}

fn delete_one(root: &Path, rel: &str) -> Result<()> {
    let path = resolve_within(root, rel)?;
    let failed = |reason: String| GuardError::DeletionFailed {
        path: rel.to_string(),
        reason,
    };

    let meta = std::fs::symlink_metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => failed("no such file".into()),
        _ => failed(e.to_string()),
    })?;
    if meta.is_dir() {
        return Err(failed("is a directory".into()));
    }

    std::fs::remove_file(&path).map_err(|e| failed(e.to_string()))
}
