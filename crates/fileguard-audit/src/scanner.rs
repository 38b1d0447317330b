//! Tree traversal with exclusion rules.

use chrono::{DateTime, Utc};
use fileguard_core::{ChecksumAlgorithm, ExclusionSet, GuardError, Result};
use serde::Serialize;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::hash::checksum_file;
use crate::paths::{canonical_root, relative_to, resolve_within};

/// A file found during a scan.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    /// Path relative to the scanned root, `/`-separated
    pub relative_path: String,
    /// Absolute path on disk
    pub absolute_path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: DateTime<Utc>,
    /// Content checksum, computed on first request
    #[serde(skip)]
    checksum: OnceCell<(ChecksumAlgorithm, String)>,
}

impl FileRecord {
    /// Build a record from already-fetched metadata
    pub fn from_metadata(
        relative_path: impl Into<String>,
        absolute_path: impl Into<PathBuf>,
        meta: &Metadata,
    ) -> Self {
        let modified = meta.modified().map_or_else(|_| Utc::now(), DateTime::<Utc>::from);
        Self {
            relative_path: relative_path.into(),
            absolute_path: absolute_path.into(),
            size: meta.len(),
            modified,
            checksum: OnceCell::new(),
        }
    }

    /// Content checksum in `algorithm`.
    ///
    /// The first computed digest is cached on the record; asking for a
    /// different algorithm afterwards hashes the file again.
    pub async fn checksum(&self, algorithm: ChecksumAlgorithm) -> Result<String> {
        let path = &self.absolute_path;
        let (cached_algorithm, digest) = self
            .checksum
            .get_or_try_init(|| async move {
                let digest = checksum_file(path, algorithm).await?;
                Ok::<_, GuardError>((algorithm, digest))
            })
            .await?;

        if *cached_algorithm == algorithm {
            Ok(digest.clone())
        } else {
            checksum_file(&self.absolute_path, algorithm).await
        }
    }
}

/// Walks a root directory, skipping excluded entries.
///
/// The root is canonicalised once at construction. Symlinks are followed
/// only while their target stays inside the root; cycles are skipped.
#[derive(Debug, Clone)]
pub struct TreeScanner {
    root: PathBuf,
    exclusions: ExclusionSet,
}

impl TreeScanner {
    /// Create a scanner for `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` does not exist or is not a directory.
    pub fn new(root: &Path, exclusions: ExclusionSet) -> Result<Self> {
        Ok(Self {
            root: canonical_root(root)?,
            exclusions,
        })
    }

    /// Canonical root being scanned
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Exclusion rules applied while scanning
    #[must_use]
    pub const fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// Start a fresh depth-first walk.
    ///
    /// The returned iterator is lazy; calling `scan` again re-walks the tree.
    /// Unreadable entries surface as `GuardError::ScanIo` items and the walk
    /// continues past them.
    #[must_use]
    pub fn scan(&self) -> Scan<'_> {
        let root: &Path = &self.root;
        let exclusions = &self.exclusions;

        let keep = move |entry: &DirEntry| {
            if entry.depth() == 0 {
                return true;
            }
            let Some(rel) = relative_to(root, entry.path()) else {
                return false;
            };
            let excluded = if entry.file_type().is_dir() {
                exclusions.prunes_directory(&rel)
            } else {
                exclusions.is_excluded(&rel)
            };
            if excluded {
                debug!(path = %rel, "excluded");
                return false;
            }
            if entry.path_is_symlink() && !stays_within(root, entry.path()) {
                debug!(path = %rel, "symlink leaves root, skipping");
                return false;
            }
            true
        };

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(Box::new(keep) as EntryFilter<'_>);

        Scan { root, walker }
    }

    /// Stat a single relative path without walking.
    ///
    /// Returns `Ok(None)` if nothing exists there or it is not a regular
    /// file; fails with `PathTraversalRejected` if the path leaves the root.
    pub fn record_at(&self, rel: &str) -> Result<Option<FileRecord>> {
        let path = resolve_within(&self.root, rel)?;
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(Some(FileRecord::from_metadata(rel, path, &meta))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GuardError::ScanIo {
                path: rel.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

type EntryFilter<'a> = Box<dyn FnMut(&DirEntry) -> bool + Send + 'a>;

/// Lazy sequence of files produced by [`TreeScanner::scan`].
pub struct Scan<'a> {
    root: &'a Path,
    walker: walkdir::FilterEntry<walkdir::IntoIter, EntryFilter<'a>>,
}

impl Iterator for Scan<'_> {
    type Item = Result<FileRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    if err.loop_ancestor().is_some() {
                        debug!(error = %err, "symlink cycle, skipping");
                        continue;
                    }
                    let path = err
                        .path()
                        .and_then(|p| relative_to(self.root, p))
                        .unwrap_or_else(|| self.root.display().to_string());
                    return Some(Err(GuardError::ScanIo {
                        path,
                        reason: err.to_string(),
                    }));
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            let Some(rel) = relative_to(self.root, entry.path()) else {
                continue;
            };

            return Some(match entry.metadata() {
                Ok(meta) => Ok(FileRecord::from_metadata(rel, entry.path(), &meta)),
                Err(err) => Err(GuardError::ScanIo {
                    path: rel,
                    reason: err.to_string(),
                }),
            });
        }
    }
}

fn stays_within(root: &Path, path: &Path) -> bool {
    std::fs::canonicalize(path).is_ok_and(|real| real.starts_with(root) && real != root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "index.php", "<?php");
        write(dir.path(), "wp-admin/about.php", "<?php about");
        write(dir.path(), "wp-config.php", "<?php define");
        write(dir.path(), "wp-content/uploads/cat.png", "png");
        write(dir.path(), ".well-known/acme-challenge/token", "tok");
        write(dir.path(), "shell.php", "<?php eval");
        dir
    }

    fn paths(scanner: &TreeScanner) -> Vec<String> {
        scanner
            .scan()
            .map(|r| r.unwrap().relative_path)
            .collect()
    }

    #[test]
    fn walks_tree_and_applies_exclusions() {
        let dir = site();
        let scanner = TreeScanner::new(dir.path(), ExclusionSet::wordpress_defaults()).unwrap();
        assert_eq!(
            paths(&scanner),
            vec!["index.php", "shell.php", "wp-admin/about.php"]
        );
    }

    #[test]
    fn whitelisted_names_do_not_hide_nested_directories() {
        let dir = site();
        write(dir.path(), "wp-admin/.well-known/shell.php", "<?php");
        write(dir.path(), "wp-includes/error_log/backdoor.php", "<?php");
        write(dir.path(), "wp-admin/.htaccess/x.php", "<?php");
        write(dir.path(), "wp-admin/.htaccess.bak", "deny");

        let scanner = TreeScanner::new(dir.path(), ExclusionSet::wordpress_defaults()).unwrap();
        let found = paths(&scanner);
        assert!(found.contains(&"wp-admin/.well-known/shell.php".to_string()));
        assert!(found.contains(&"wp-includes/error_log/backdoor.php".to_string()));
        assert!(found.contains(&"wp-admin/.htaccess/x.php".to_string()));
        assert!(found.contains(&"wp-admin/.htaccess.bak".to_string()));
        assert!(!found.iter().any(|p| p.starts_with(".well-known/")));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_reported_and_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = site();
        write(dir.path(), "wp-admin/locked/inner.php", "<?php");
        let locked = dir.path().join("wp-admin/locked");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::read_dir(&locked).is_ok() {
            // Privileged user: permissions are not enforced.
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let scanner = TreeScanner::new(dir.path(), ExclusionSet::wordpress_defaults()).unwrap();
        let (ok, errors): (Vec<_>, Vec<_>) = scanner.scan().partition(Result::is_ok);
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        let found: Vec<String> = ok.into_iter().map(|r| r.unwrap().relative_path).collect();
        assert_eq!(found, vec!["index.php", "shell.php", "wp-admin/about.php"]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors.into_iter().next().unwrap(),
            Err(GuardError::ScanIo { path, .. }) if path == "wp-admin/locked"
        ));
    }

    #[test]
    fn scan_is_restartable() {
        let dir = site();
        let scanner = TreeScanner::new(dir.path(), ExclusionSet::default()).unwrap();
        let first = paths(&scanner);
        write(dir.path(), "new.php", "<?php");
        let second = paths(&scanner);
        assert_eq!(first.len() + 1, second.len());
        assert!(second.contains(&"new.php".to_string()));
    }

    #[test]
    fn records_carry_metadata() {
        let dir = site();
        let scanner = TreeScanner::new(dir.path(), ExclusionSet::default()).unwrap();
        let record = scanner.record_at("wp-admin/about.php").unwrap().unwrap();
        assert_eq!(record.size, 11);
        assert_eq!(record.relative_path, "wp-admin/about.php");
        assert!(record.absolute_path.is_absolute());
        assert!(scanner.record_at("missing.php").unwrap().is_none());
        assert!(scanner.record_at("wp-admin").unwrap().is_none());
        assert!(scanner.record_at("../outside").unwrap_err().is_traversal());
    }

    #[tokio::test]
    async fn checksum_is_lazy_and_cached() {
        let dir = site();
        let scanner = TreeScanner::new(dir.path(), ExclusionSet::default()).unwrap();
        let record = scanner.record_at("index.php").unwrap().unwrap();
        let first = record.checksum(ChecksumAlgorithm::Md5).await.unwrap();
        std::fs::write(dir.path().join("index.php"), "changed").unwrap();
        let second = record.checksum(ChecksumAlgorithm::Md5).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(TreeScanner::new(Path::new("/nonexistent/fileguard"), ExclusionSet::default()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_outside_root_and_cycles_are_skipped() {
        let dir = site();
        let outside = TempDir::new().unwrap();
        write(outside.path(), "secret.php", "<?php");
        std::os::unix::fs::symlink(outside.path(), dir.path().join("escape")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("wp-admin"), dir.path().join("wp-admin/loop"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("index.php"), dir.path().join("alias.php"))
            .unwrap();

        let scanner = TreeScanner::new(dir.path(), ExclusionSet::wordpress_defaults()).unwrap();
        let found = paths(&scanner);
        assert!(!found.iter().any(|p| p.starts_with("escape")));
        assert!(found.contains(&"alias.php".to_string()));
        assert!(found.contains(&"wp-admin/about.php".to_string()));
    }
}
