//! Persistence of the most recent report.
//!
//! Stores hold exactly one report; saving replaces whatever was there.

use async_trait::async_trait;
use fileguard_core::{GuardError, Report, Result};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use crate::atomic::write_atomic;

/// Sink for the latest report.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist `report`, replacing the previous one
    async fn save(&self, report: &Report) -> Result<()>;

    /// Load the last saved report, if any
    async fn load(&self) -> Result<Option<Report>>;
}

/// Keeps the latest report as pretty-printed JSON in one file.
#[derive(Debug, Clone)]
pub struct JsonFileReportStore {
    path: PathBuf,
}

impl JsonFileReportStore {
    /// Store reports at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the report file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportStore for JsonFileReportStore {
    async fn save(&self, report: &Report) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GuardError::io(parent.display().to_string(), e))?;
        }
        let json = serde_json::to_vec_pretty(report)?;
        write_atomic(&self.path, &json).await?;
        debug!(path = %self.path.display(), "report saved");
        Ok(())
    }

    async fn load(&self) -> Result<Option<Report>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GuardError::io(self.path.display().to_string(), e)),
        }
    }
}

/// In-process store, useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    latest: Mutex<Option<Report>>,
}

impl MemoryReportStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn save(&self, report: &Report) -> Result<()> {
        *self.latest.lock().await = Some(report.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Report>> {
        Ok(self.latest.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileguard_core::ReportBuilder;
    use std::time::Duration;
    use tempfile::TempDir;

    fn report(modified: &str) -> Report {
        let mut builder = ReportBuilder::new("/site", "6.4.2", "en_US");
        builder.record_modified(modified);
        builder.finish(Duration::from_millis(12), false)
    }

    #[tokio::test]
    async fn file_store_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileReportStore::new(dir.path().join("state/last-report.json"));
        assert!(store.load().await.unwrap().is_none());

        store.save(&report("index.php")).await.unwrap();
        store.save(&report("wp-login.php")).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.modified_files, vec!["wp-login.php"]);
        assert_eq!(loaded.duration_ms, 12);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last-report.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileReportStore::new(path);
        assert!(matches!(store.load().await, Err(GuardError::Json(_))));
    }

    #[tokio::test]
    async fn memory_store_keeps_latest() {
        let store = MemoryReportStore::new();
        store.save(&report("index.php")).await.unwrap();
        store.save(&report("xmlrpc.php")).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.modified_files, vec!["xmlrpc.php"]);
    }
}
