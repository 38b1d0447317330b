//! Command implementations.

pub mod check;
pub mod config;
pub mod delete;
pub mod report;
pub mod unknown;

use anyhow::Result;
use fileguard_audit::{detect_version, JsonFileReportStore};
use fileguard_client::GuardClient;
use fileguard_core::CheckOptions;
use std::path::PathBuf;

use crate::cli::args::ReleaseArgs;
use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration
    pub config: Config,

    /// Where the configuration lives
    pub config_path: PathBuf,

    /// Output format
    pub output_format: OutputFormat,

    /// Verbose output
    pub verbose: bool,
}

impl Context {
    /// Create an HTTP client from the configured endpoints.
    pub fn client(&self) -> Result<GuardClient> {
        let options = &self.config.check;
        let mut builder = GuardClient::builder()
            .timeout(options.request_timeout())
            .algorithm(options.algorithm)
            .user_agent(concat!("fileguard/", env!("CARGO_PKG_VERSION")));

        if let Some(url) = &self.config.checksums_url {
            builder = builder.checksums_url(url);
        }
        if let Some(url) = &self.config.content_url {
            builder = builder.content_url(url);
        }

        Ok(builder.build()?)
    }

    /// The report store at the configured location.
    pub fn report_store(&self) -> Result<JsonFileReportStore> {
        Ok(JsonFileReportStore::new(self.config.report_path()?))
    }

    /// Check options with per-invocation overrides applied.
    pub fn check_options(&self, release: &ReleaseArgs) -> CheckOptions {
        let mut options = self.config.check.clone();
        if let Some(version) = &release.version {
            options.version = Some(version.clone());
        }
        if let Some(locale) = &release.locale {
            options.locale.clone_from(locale);
        }
        options.exclusions.extend(release.exclude.iter().cloned());
        options
    }
}

/// Expand `~` and environment variables in a root argument.
pub fn expand_root(root: &str) -> Result<PathBuf> {
    Ok(PathBuf::from(shellexpand::full(root)?.into_owned()))
}

/// Configured version, or the one declared by the installation.
pub fn resolve_version(options: &CheckOptions, root: &std::path::Path) -> Result<String> {
    match &options.version {
        Some(version) => Ok(version.clone()),
        None => detect_version(root).map_err(|e| {
            anyhow::anyhow!(
                "Could not determine the installed version: {e}\n\n\
                 Pass --release <VERSION> or run: fileguard config set version <VERSION>"
            )
        }),
    }
}
