//! Checksum manifest endpoint.

use crate::GuardClient;
use async_trait::async_trait;
use fileguard_core::{ChecksumAlgorithm, GuardError, Manifest, ManifestSource, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Checksum manifest endpoint
pub struct ChecksumsApi<'a> {
    client: &'a GuardClient,
}

/// Response body of the checksum API.
///
/// `checksums` is an object of `path -> digest` for a published version and
/// `false` for an unknown one.
#[derive(Debug, Deserialize)]
struct ChecksumsResponse {
    #[serde(default)]
    checksums: Value,
}

impl<'a> ChecksumsApi<'a> {
    pub(crate) fn new(client: &'a GuardClient) -> Self {
        Self { client }
    }

    /// Fetch the manifest for an exact version and locale
    pub async fn fetch(&self, version: &str, locale: &str) -> Result<Manifest> {
        let unavailable = |reason: String| GuardError::ManifestUnavailable {
            version: version.to_string(),
            locale: locale.to_string(),
            reason,
        };

        let mut url = self.client.checksums_url().clone();
        url.query_pairs_mut()
            .append_pair("version", version)
            .append_pair("locale", locale);

        let body = self
            .client
            .get_bytes(url)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let response: ChecksumsResponse =
            serde_json::from_slice(&body).map_err(|e| unavailable(format!("invalid JSON: {e}")))?;

        let manifest = parse_checksums(version, locale, self.client.algorithm(), response.checksums)?;
        debug!(version, locale, files = manifest.len(), "manifest fetched");
        Ok(manifest)
    }
}

fn parse_checksums(
    version: &str,
    locale: &str,
    algorithm: ChecksumAlgorithm,
    checksums: Value,
) -> Result<Manifest> {
    let unavailable = |reason: String| GuardError::ManifestUnavailable {
        version: version.to_string(),
        locale: locale.to_string(),
        reason,
    };

    let entries = match checksums {
        Value::Object(map) => map,
        Value::Bool(false) | Value::Null => {
            return Err(unavailable("no checksums published for this version".into()));
        }
        other => {
            return Err(unavailable(format!("unexpected checksums payload: {other}")));
        }
    };

    if entries.is_empty() {
        return Err(unavailable("manifest is empty".into()));
    }

    let mut pairs = Vec::with_capacity(entries.len());
    for (path, digest) in entries {
        let Value::String(digest) = digest else {
            warn!(path = %path, "manifest entry is not a string");
            return Err(unavailable(format!("malformed entry for {path}")));
        };
        if !algorithm.is_valid_digest(&digest) {
            return Err(unavailable(format!("invalid {algorithm} digest for {path}")));
        }
        pairs.push((path, digest));
    }

    Manifest::new(version, locale, algorithm, pairs)
}

#[async_trait]
impl ManifestSource for GuardClient {
    async fn fetch_manifest(&self, version: &str, locale: &str) -> Result<Manifest> {
        self.checksums().fetch(version, locale).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_published_manifest() {
        let manifest = parse_checksums(
            "6.4.2",
            "en_US",
            ChecksumAlgorithm::Md5,
            json!({
                "index.php": "926DD0F95DF723F9ED934EB058882CC8",
                "wp-admin/about.php": "e3a1bdfa3b7ab5c7dde6f0ae4d7b8f2c"
            }),
        )
        .unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(
            manifest.expected("index.php"),
            Some("926dd0f95df723f9ed934eb058882cc8")
        );
    }

    #[test]
    fn unpublished_version_is_unavailable() {
        let err = parse_checksums("9.9.9", "en_US", ChecksumAlgorithm::Md5, json!(false))
            .unwrap_err();
        assert!(matches!(err, GuardError::ManifestUnavailable { .. }));
    }

    #[test]
    fn malformed_digest_is_unavailable() {
        let err = parse_checksums(
            "6.4.2",
            "en_US",
            ChecksumAlgorithm::Md5,
            json!({ "index.php": "not-a-digest" }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid md5 digest"));
    }

    #[test]
    fn traversal_entry_is_unavailable() {
        let err = parse_checksums(
            "6.4.2",
            "en_US",
            ChecksumAlgorithm::Md5,
            json!({ "../index.php": "926dd0f95df723f9ed934eb058882cc8" }),
        )
        .unwrap_err();
        assert!(matches!(err, GuardError::ManifestUnavailable { .. }));
    }
}
