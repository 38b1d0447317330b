//! Classification of files against a manifest.
//!
//! Exact checksum equality is the only test: a file whose bytes hash to the
//! manifest value is intact no matter when it was last touched.

use fileguard_core::{ExclusionSet, Manifest, Result};
use serde::Serialize;

use crate::scanner::FileRecord;

/// How a file relates to the reference manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Classification {
    /// Matches the manifest, or is an expected customisation
    Intact,
    /// Listed in the manifest with different content
    Modified {
        /// Checksum the manifest expects
        expected: String,
        /// Checksum of the file on disk
        actual: String,
    },
    /// Not part of the distribution and not excluded
    Unknown,
}

/// A classification tagged with the record it describes.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    /// The file that was classified
    pub record: FileRecord,
    /// Its classification
    pub classification: Classification,
}

/// Classify one file.
///
/// Only files listed in the manifest are hashed.
pub async fn classify(
    record: FileRecord,
    manifest: &Manifest,
    exclusions: &ExclusionSet,
) -> Result<ClassificationResult> {
    let classification = match manifest.expected(&record.relative_path) {
        Some(expected) => {
            let actual = record.checksum(manifest.algorithm()).await?;
            compare_checksums(expected, &actual)
        }
        None if exclusions.is_excluded(&record.relative_path) => Classification::Intact,
        None => Classification::Unknown,
    };

    Ok(ClassificationResult {
        record,
        classification,
    })
}

/// Compare an expected and an actual checksum.
#[must_use]
pub fn compare_checksums(expected: &str, actual: &str) -> Classification {
    if expected.eq_ignore_ascii_case(actual) {
        Classification::Intact
    } else {
        Classification::Modified {
            expected: expected.to_ascii_lowercase(),
            actual: actual.to_ascii_lowercase(),
        }
    }
}

/// Returns true if `rel` would classify as unknown, without touching disk.
#[must_use]
pub fn is_unknown(rel: &str, manifest: &Manifest, exclusions: &ExclusionSet) -> bool {
    !manifest.contains(rel) && !exclusions.is_excluded(rel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::checksum_bytes;
    use crate::scanner::TreeScanner;
    use fileguard_core::ChecksumAlgorithm;
    use tempfile::TempDir;

    fn manifest(entries: &[(&str, &str)]) -> Manifest {
        Manifest::new(
            "6.4.2",
            "en_US",
            ChecksumAlgorithm::Md5,
            entries.iter().copied(),
        )
        .unwrap()
    }

    async fn classify_file(
        contents: &str,
        rel: &str,
        manifest: &Manifest,
        exclusions: &ExclusionSet,
    ) -> Classification {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        let scanner = TreeScanner::new(dir.path(), ExclusionSet::default()).unwrap();
        let record = scanner.record_at(rel).unwrap().unwrap();
        classify(record, manifest, exclusions)
            .await
            .unwrap()
            .classification
    }

    #[tokio::test]
    async fn matching_checksum_is_intact() {
        let digest = checksum_bytes(b"<?php // index", ChecksumAlgorithm::Md5);
        let manifest = manifest(&[("index.php", digest.as_str())]);
        let result =
            classify_file("<?php // index", "index.php", &manifest, &ExclusionSet::default()).await;
        assert_eq!(result, Classification::Intact);
    }

    #[tokio::test]
    async fn differing_checksum_is_modified() {
        let expected = checksum_bytes(b"<?php // index", ChecksumAlgorithm::Md5);
        let manifest = manifest(&[("index.php", expected.as_str())]);
        let result =
            classify_file("<?php eval($_GET['x']);", "index.php", &manifest, &ExclusionSet::default())
                .await;
        match result {
            Classification::Modified { expected: e, actual } => {
                assert_eq!(e, expected);
                assert_eq!(
                    actual,
                    checksum_bytes(b"<?php eval($_GET['x']);", ChecksumAlgorithm::Md5)
                );
            }
            other => panic!("expected modified, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn manifest_wins_over_exclusions() {
        let expected = checksum_bytes(b"original", ChecksumAlgorithm::Md5);
        let manifest = manifest(&[("wp-content/index.php", expected.as_str())]);
        let result = classify_file(
            "tampered",
            "wp-content/index.php",
            &manifest,
            &ExclusionSet::wordpress_defaults(),
        )
        .await;
        assert!(matches!(result, Classification::Modified { .. }));
    }

    #[tokio::test]
    async fn absent_and_not_excluded_is_unknown() {
        let manifest = manifest(&[("index.php", "abc123")]);
        let result =
            classify_file("<?php", "shell.php", &manifest, &ExclusionSet::wordpress_defaults())
                .await;
        assert_eq!(result, Classification::Unknown);
    }

    #[tokio::test]
    async fn absent_but_excluded_is_intact() {
        let manifest = manifest(&[("index.php", "abc123")]);
        let result =
            classify_file("<?php", "wp-config.php", &manifest, &ExclusionSet::wordpress_defaults())
                .await;
        assert_eq!(result, Classification::Intact);
    }

    #[test]
    fn checksum_comparison_ignores_case() {
        assert_eq!(compare_checksums("ABC123", "abc123"), Classification::Intact);
        assert_eq!(
            compare_checksums("abc123", "zzz999"),
            Classification::Modified {
                expected: "abc123".into(),
                actual: "zzz999".into(),
            }
        );
    }

    #[test]
    fn unknown_predicate_needs_no_disk() {
        let manifest = manifest(&[("index.php", "abc123")]);
        let exclusions = ExclusionSet::wordpress_defaults();
        assert!(!is_unknown("index.php", &manifest, &exclusions));
        assert!(!is_unknown(".htaccess", &manifest, &exclusions));
        assert!(is_unknown("wp-admin/shell.php", &manifest, &exclusions));
    }
}
