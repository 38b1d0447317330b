//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// File integrity checker for WordPress installations
///
/// Compares every core file against the official checksums for its
/// release, restores modified files from the matching release, and lists
/// files that are not part of it.
#[derive(Parser, Debug)]
#[command(name = "fileguard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, env = "FILEGUARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full integrity check
    Check(CheckArgs),

    /// List files that are not part of the release
    Unknown(UnknownArgs),

    /// Delete files below a root
    Delete(DeleteArgs),

    /// Show the most recent report
    Report(ReportArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

/// Release selection shared by commands that need a manifest.
#[derive(Args, Debug, Clone)]
pub struct ReleaseArgs {
    /// Release version (detected from wp-includes/version.php if omitted)
    #[arg(id = "release", long = "release", value_name = "VERSION")]
    pub version: Option<String>,

    /// Manifest locale (e.g., en_US, de_DE)
    #[arg(short, long)]
    pub locale: Option<String>,

    /// Extra basenames or path prefixes to ignore (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,
}

// ============================================================================
// Check command
// ============================================================================

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Installation root
    pub root: String,

    #[command(flatten)]
    pub release: ReleaseArgs,

    /// Skip the core file comparison
    #[arg(long)]
    pub no_core: bool,

    /// Skip the unknown file scan
    #[arg(long)]
    pub no_unknown: bool,

    /// Report modified files without restoring them
    #[arg(long)]
    pub no_restore: bool,

    /// Run deadline in seconds (0 disables it)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Do not send a notification even if something was found
    #[arg(long)]
    pub no_notify: bool,
}

// ============================================================================
// Unknown command
// ============================================================================

#[derive(Args, Debug)]
pub struct UnknownArgs {
    /// Installation root
    pub root: String,

    #[command(flatten)]
    pub release: ReleaseArgs,
}

// ============================================================================
// Delete command
// ============================================================================

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Installation root
    pub root: String,

    /// Paths relative to the root
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

// ============================================================================
// Report command
// ============================================================================

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Print the notification message instead of the report
    #[arg(long)]
    pub render: bool,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Key to set (e.g., locale, workers, notification.recipient)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show config file path
    Path,
}
