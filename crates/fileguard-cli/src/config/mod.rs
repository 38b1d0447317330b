//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use fileguard_core::{CheckOptions, NotificationOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Checksum API endpoint override.
    pub checksums_url: Option<String>,

    /// Release content endpoint override.
    pub content_url: Option<String>,

    /// Where the latest report is kept.
    pub report_path: Option<String>,

    /// Integrity check options.
    #[serde(default)]
    pub check: CheckOptions,

    /// Notification settings.
    #[serde(default)]
    pub notification: NotificationOptions,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "fileguard", "fileguard")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Load configuration from `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Resolved location of the latest report.
    pub fn report_path(&self) -> Result<PathBuf> {
        match &self.report_path {
            Some(path) => Ok(PathBuf::from(shellexpand::tilde(path).into_owned())),
            None => Ok(project_dirs()?.data_dir().join("last-report.json")),
        }
    }

    /// Set a single value by key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let check = &mut self.check;
        let notification = &mut self.notification;

        match key {
            "output_format" | "output" => self.output_format = Some(value.parse()?),
            "checksums_url" => self.checksums_url = non_empty(value),
            "content_url" => self.content_url = non_empty(value),
            "report_path" => self.report_path = non_empty(value),
            "check_core" => check.check_core = parse_bool(key, value)?,
            "check_unknown" => check.check_unknown = parse_bool(key, value)?,
            "restore_modified" => check.restore_modified = parse_bool(key, value)?,
            "exclusions" => check.exclusions = parse_list(value),
            "excluded_subtrees" => check.excluded_subtrees = parse_list(value),
            "version" => check.version = non_empty(value),
            "locale" => check.locale = value.to_string(),
            "algorithm" => check.algorithm = value.parse()?,
            "workers" => check.workers = parse_num(key, value)?,
            "restore_concurrency" => check.restore_concurrency = parse_num(key, value)?,
            "request_timeout_secs" => check.request_timeout_secs = parse_num(key, value)?,
            "run_timeout_secs" => check.run_timeout_secs = parse_num(key, value)?,
            "manifest_cache_ttl_secs" => check.manifest_cache_ttl_secs = parse_num(key, value)?,
            "notification.recipient" | "recipient" => notification.recipient = non_empty(value),
            "notification.subject" => notification.subject = value.to_string(),
            "notification.template" => notification.template = value.to_string(),
            "notification.site_name" | "site_name" => notification.site_name = value.to_string(),
            _ => {
                anyhow::bail!(
                    "Unknown config key: {}\n\n\
                     Available keys:\n  \
                     output_format            - Default output format (pretty/json/csv/yaml)\n  \
                     checksums_url            - Checksum API endpoint\n  \
                     content_url              - Release content endpoint\n  \
                     report_path              - Where the latest report is kept\n  \
                     check_core               - Compare core files (true/false)\n  \
                     check_unknown            - Scan for unknown files (true/false)\n  \
                     restore_modified         - Restore modified files (true/false)\n  \
                     exclusions               - Ignored names/prefixes (comma-separated)\n  \
                     excluded_subtrees        - Subtrees never scanned (comma-separated)\n  \
                     version                  - Release version (empty = detect)\n  \
                     locale                   - Manifest locale\n  \
                     algorithm                - md5 or sha256\n  \
                     workers                  - Concurrent checksum computations\n  \
                     restore_concurrency      - Concurrent restorations\n  \
                     request_timeout_secs     - Per-request timeout\n  \
                     run_timeout_secs         - Run deadline (0 = none)\n  \
                     manifest_cache_ttl_secs  - Manifest cache lifetime\n  \
                     notification.recipient   - Notification file (or '-' for stderr)\n  \
                     notification.subject     - Subject template\n  \
                     notification.template    - Body template\n  \
                     notification.site_name   - Value for {{site_name}}",
                    key
                );
            }
        }

        self.check.validate()?;
        Ok(())
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value
        .parse()
        .with_context(|| format!("{key} expects true or false, got {value:?}"))
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("{key} expects a number, got {value:?}"))
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileguard_core::ChecksumAlgorithm;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.set("locale", "de_DE").unwrap();
        config.set("exclusions", "wp-config.php, .htaccess").unwrap();
        config.set("run_timeout_secs", "0").unwrap();
        config.set("notification.recipient", "/var/log/fileguard.log").unwrap();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.check.locale, "de_DE");
        assert_eq!(loaded.check.exclusions, vec!["wp-config.php", ".htaccess"]);
        assert_eq!(loaded.check.run_timeout(), None);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            "report_path = \"/tmp/r.json\"\n\n[check]\nworkers = 2\nalgorithm = \"sha256\"\n",
        )
        .unwrap();
        assert_eq!(config.check.workers, 2);
        assert_eq!(config.check.algorithm, ChecksumAlgorithm::Sha256);
        assert!(config.check.check_core);
        assert_eq!(config.notification.site_name, "WordPress");
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("workers", "many").is_err());
        assert!(config.set("workers", "0").is_err());
        assert!(config.set("check_core", "yes please").is_err());
        assert!(config.set("algorithm", "crc32").is_err());
        assert!(config.set("api_key", "x").is_err());
    }

    #[test]
    fn explicit_report_path_is_used() {
        let config = Config {
            report_path: Some("/srv/fileguard/report.json".into()),
            ..Config::default()
        };
        assert_eq!(
            config.report_path().unwrap(),
            PathBuf::from("/srv/fileguard/report.json")
        );
    }
}
