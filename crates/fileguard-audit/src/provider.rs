//! Manifest acquisition with a short-lived in-memory cache.

use fileguard_core::{Manifest, ManifestSource, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

struct CachedManifest {
    manifest: Arc<Manifest>,
    fetched_at: Instant,
}

/// Fetches manifests from a [`ManifestSource`], reusing recent results.
///
/// Entries are keyed by the exact `(version, locale)` pair and expire after
/// the configured TTL. Failures are never cached and nothing is persisted.
pub struct ManifestProvider {
    source: Arc<dyn ManifestSource>,
    ttl: Duration,
    cache: Mutex<HashMap<(String, String), CachedManifest>>,
}

impl ManifestProvider {
    /// Wrap `source` with a cache of lifetime `ttl`
    pub fn new(source: Arc<dyn ManifestSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Get the manifest for `version`/`locale`, fetching it if needed.
    ///
    /// Concurrent callers for a cold key wait for one fetch instead of
    /// issuing their own.
    pub async fn get_manifest(&self, version: &str, locale: &str) -> Result<Arc<Manifest>> {
        let key = (version.to_string(), locale.to_string());
        let mut cache = self.cache.lock().await;

        if let Some(entry) = cache.get(&key) {
            if entry.fetched_at.elapsed() < self.ttl {
                debug!(version, locale, "manifest served from cache");
                return Ok(Arc::clone(&entry.manifest));
            }
        }

        let manifest = Arc::new(self.source.fetch_manifest(version, locale).await?);
        info!(version, locale, files = manifest.len(), "manifest fetched");

        cache.insert(
            key,
            CachedManifest {
                manifest: Arc::clone(&manifest),
                fetched_at: Instant::now(),
            },
        );
        Ok(manifest)
    }

    /// Drop every cached manifest
    pub async fn invalidate(&self) {
        self.cache.lock().await.clear();
    }
}
