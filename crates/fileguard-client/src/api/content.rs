//! Authoritative file content endpoint.

use crate::GuardClient;
use async_trait::async_trait;
use fileguard_core::{normalize_relative_path, ContentSource, GuardError, Result};
use tracing::debug;
use url::Url;

/// File content endpoint
pub struct ContentApi<'a> {
    client: &'a GuardClient,
}

impl<'a> ContentApi<'a> {
    pub(crate) fn new(client: &'a GuardClient) -> Self {
        Self { client }
    }

    /// URL of `path` as shipped in `version`
    pub fn url_for(&self, version: &str, path: &str) -> Result<Url> {
        let fetch_failed = |reason: &str| GuardError::FetchFailed {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let rel = normalize_relative_path(path).ok_or_else(|| GuardError::PathTraversalRejected {
            path: path.to_string(),
        })?;
        if version.is_empty() || version.contains('/') || version.contains("..") {
            return Err(fetch_failed("invalid version"));
        }

        let mut url = self.client.content_url().clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| fetch_failed("content URL cannot be a base"))?;
            segments.pop_if_empty();
            segments.push(version);
            segments.extend(rel.split('/'));
        }
        Ok(url)
    }

    /// Fetch the bytes of `path` as shipped in `version`
    pub async fn file(&self, version: &str, path: &str) -> Result<Vec<u8>> {
        let url = self.url_for(version, path)?;
        let body = self
            .client
            .get_bytes(url)
            .await
            .map_err(|e| GuardError::FetchFailed {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        debug!(path, bytes = body.len(), "content fetched");
        Ok(body)
    }
}

#[async_trait]
impl ContentSource for GuardClient {
    async fn fetch_file(&self, version: &str, path: &str) -> Result<Vec<u8>> {
        self.content().file(version, path).await
    }
}
