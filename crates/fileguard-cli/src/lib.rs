//! # fileguard-cli
//!
//! Command-line front end for the fileguard integrity engine.
//!
//! ## Features
//!
//! - **Integrity checks**: compare a tree against its release manifest and
//!   restore modified files
//! - **Unknown files**: list files that are not part of the release
//! - **Cleanup**: delete selected files with root containment checks
//! - **Reports**: keep the latest report and render notification messages
//! - **Multiple output formats**: Pretty tables, JSON, CSV, YAML

pub mod cli;
pub mod config;
pub mod notify;
pub mod output;

pub use cli::run;
