//! Root containment checks.
//!
//! Every path the engine touches on behalf of a caller or a remote manifest
//! goes through [`resolve_within`]; nothing outside the canonical root is
//! ever read, replaced or deleted.

use fileguard_core::{normalize_relative_path, GuardError, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Canonicalise a root directory.
pub fn canonical_root(root: &Path) -> Result<PathBuf> {
    let canonical =
        std::fs::canonicalize(root).map_err(|e| GuardError::io(root.display().to_string(), e))?;
    if !canonical.is_dir() {
        return Err(GuardError::Config(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    Ok(canonical)
}

/// Resolve `rel` beneath `root` (which must already be canonical).
///
/// Rejects absolute paths and `..` segments outright, then resolves symlinks:
/// the real location must lie strictly below `root`. For paths that do not
/// exist yet, the deepest existing ancestor must lie within `root`.
///
/// Returns the joined, non-canonical path so that operations act on the
/// link itself rather than its target.
pub fn resolve_within(root: &Path, rel: &str) -> Result<PathBuf> {
    let rejected = || GuardError::PathTraversalRejected {
        path: rel.to_string(),
    };

    let normalized = normalize_relative_path(rel).ok_or_else(rejected)?;
    let joined = normalized
        .split('/')
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment));

    match std::fs::canonicalize(&joined) {
        Ok(real) if real.starts_with(root) && real != root => Ok(joined),
        Ok(_) => Err(rejected()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            for ancestor in joined.ancestors().skip(1) {
                if let Ok(real) = std::fs::canonicalize(ancestor) {
                    return if real.starts_with(root) {
                        Ok(joined)
                    } else {
                        Err(rejected())
                    };
                }
            }
            Err(rejected())
        }
        Err(e) => Err(GuardError::io(joined.display().to_string(), e)),
    }
}

/// Express `path` relative to `root` with `/` separators.
///
/// Returns `None` when `path` is not below `root`.
pub fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let stripped = path.strip_prefix(root).ok()?;
    let mut segments = Vec::new();
    for component in stripped.components() {
        match component {
            Component::Normal(name) => segments.push(name.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}
