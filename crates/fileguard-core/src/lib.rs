//! Core types and traits for the fileguard integrity engine.
//!
//! This crate provides the foundational pieces shared by the transport,
//! engine and CLI crates:
//!
//! - **Types**: [`Manifest`], [`ExclusionSet`], [`RestorationOutcome`], [`Report`]
//! - **Errors**: the full failure taxonomy in [`GuardError`]
//! - **Options**: the typed [`CheckOptions`] replacing loose option maps
//! - **Sources**: the [`ManifestSource`] / [`ContentSource`] transport traits
//! - **Templates**: [`render`] for turning a report into a notification body
//!
//! # Example
//!
//! ```rust,ignore
//! use fileguard_core::{ExclusionSet, Manifest};
//!
//! let exclusions = ExclusionSet::wordpress_defaults();
//! assert!(exclusions.is_excluded("wp-config.php"));
//! assert!(exclusions.is_excluded("wp-content/uploads/cat.png"));
//! ```

#![doc(html_root_url = "https://docs.rs/fileguard-core/0.1.0")]

mod error;
pub mod options;
pub mod source;
pub mod template;
pub mod types;

pub use error::{GuardError, Result};
pub use options::{CheckOptions, NotificationOptions};
pub use source::{ContentSource, ManifestSource};
pub use template::render;
pub use types::*;
