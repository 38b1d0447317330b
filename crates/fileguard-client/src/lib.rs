//! HTTP transport for fileguard.
//!
//! This crate provides [`GuardClient`], which fetches reference manifests
//! from the WordPress checksum API and authoritative file content from the
//! versioned source mirror. It implements the
//! [`ManifestSource`](fileguard_core::ManifestSource) and
//! [`ContentSource`](fileguard_core::ContentSource) seams the engine consumes.

#![doc(html_root_url = "https://docs.rs/fileguard-client/0.1.0")]

mod client;
pub mod api;

pub use client::{GuardClient, GuardClientBuilder, DEFAULT_CHECKSUMS_URL, DEFAULT_CONTENT_URL};
pub use fileguard_core::{GuardError, Result};
