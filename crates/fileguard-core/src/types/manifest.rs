//! Reference checksum manifests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ChecksumAlgorithm;
use crate::{GuardError, Result};

/// Expected checksums for one distribution version and locale.
///
/// Paths are relative to the distribution root and always use `/` as the
/// separator, so comparisons never depend on where the tree is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    version: String,
    locale: String,
    algorithm: ChecksumAlgorithm,
    entries: BTreeMap<String, String>,
}

impl Manifest {
    /// Build a manifest from `(path, checksum)` pairs.
    ///
    /// Paths are normalised with [`normalize_relative_path`] and checksums
    /// are lower-cased. A path that is absolute or climbs out of the root
    /// makes the whole manifest unusable.
    pub fn new<I, P, C>(
        version: impl Into<String>,
        locale: impl Into<String>,
        algorithm: ChecksumAlgorithm,
        entries: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: AsRef<str>,
    {
        let version = version.into();
        let locale = locale.into();

        let mut map = BTreeMap::new();
        for (path, checksum) in entries {
            let Some(normalized) = normalize_relative_path(path.as_ref()) else {
                return Err(GuardError::ManifestUnavailable {
                    version,
                    locale,
                    reason: format!("unsafe manifest path: {}", path.as_ref()),
                });
            };
            map.insert(normalized, checksum.as_ref().trim().to_ascii_lowercase());
        }

        Ok(Self {
            version,
            locale,
            algorithm,
            entries: map,
        })
    }

    /// A manifest listing no files
    pub fn empty(
        version: impl Into<String>,
        locale: impl Into<String>,
        algorithm: ChecksumAlgorithm,
    ) -> Self {
        Self {
            version: version.into(),
            locale: locale.into(),
            algorithm,
            entries: BTreeMap::new(),
        }
    }

    /// Distribution version this manifest describes
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Locale this manifest describes
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Algorithm the checksums are expressed in
    #[must_use]
    pub const fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    /// Expected checksum for `path`, if the path is part of the distribution
    #[must_use]
    pub fn expected(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Returns true if `path` is part of the distribution
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of files in the manifest
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the manifest lists no files
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(path, checksum)` pairs in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }
}

/// Normalise a relative path to the manifest form.
///
/// Backslashes become `/`, empty and `.` segments are dropped. Returns `None`
/// for absolute paths, drive prefixes, `..` segments or an empty result.
#[must_use]
pub fn normalize_relative_path(path: &str) -> Option<String> {
    let unified = path.replace('\\', "/");
    if unified.starts_with('/') {
        return None;
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s if s.contains(':') => return None,
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators_and_dots() {
        assert_eq!(
            normalize_relative_path("wp-admin\\includes\\file.php").as_deref(),
            Some("wp-admin/includes/file.php")
        );
        assert_eq!(
            normalize_relative_path("./wp-includes//version.php").as_deref(),
            Some("wp-includes/version.php")
        );
    }

    #[test]
    fn rejects_escaping_paths() {
        assert_eq!(normalize_relative_path("../../etc/passwd"), None);
        assert_eq!(normalize_relative_path("wp-admin/../../x"), None);
        assert_eq!(normalize_relative_path("/etc/passwd"), None);
        assert_eq!(normalize_relative_path("C:\\Windows"), None);
        assert_eq!(normalize_relative_path(""), None);
    }

    #[test]
    fn lookups_use_normalized_paths() {
        let manifest = Manifest::new(
            "6.4.2",
            "en_US",
            ChecksumAlgorithm::Md5,
            [("index.php", "ABC123"), ("wp-admin\\about.php", "def456")],
        )
        .unwrap();

        assert_eq!(manifest.expected("index.php"), Some("abc123"));
        assert!(manifest.contains("wp-admin/about.php"));
        assert!(!manifest.contains("wp-admin\\about.php"));
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.version(), "6.4.2");
    }

    #[test]
    fn unsafe_entry_poisons_manifest() {
        let err = Manifest::new(
            "6.4.2",
            "en_US",
            ChecksumAlgorithm::Md5,
            [("../wp-config.php", "abc123")],
        )
        .unwrap_err();
        assert!(matches!(err, GuardError::ManifestUnavailable { .. }));
    }
}
