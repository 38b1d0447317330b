//! Domain types shared by every fileguard crate.

mod checksum;
mod exclusion;
mod manifest;
mod outcome;
mod report;

pub use checksum::ChecksumAlgorithm;
pub use exclusion::{ExclusionSet, WORDPRESS_EXCLUDED_SUBTREES, WORDPRESS_WHITELIST};
pub use manifest::{normalize_relative_path, Manifest};
pub use outcome::RestorationOutcome;
pub use report::{PathFailure, Report, ReportBuilder};
