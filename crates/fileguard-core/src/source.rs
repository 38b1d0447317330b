//! Transport seams between the engine and the authoritative remote.

use async_trait::async_trait;

use crate::types::Manifest;
use crate::Result;

/// Supplies reference manifests.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Fetch the manifest for an exact version/locale pair.
    ///
    /// Fails with `GuardError::ManifestUnavailable` when the remote is
    /// unreachable, answers with a non-success status or returns something
    /// that is not a path→checksum mapping.
    async fn fetch_manifest(&self, version: &str, locale: &str) -> Result<Manifest>;
}

/// Supplies authoritative file content.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the bytes of `path` as shipped in `version`.
    async fn fetch_file(&self, version: &str, path: &str) -> Result<Vec<u8>>;
}
