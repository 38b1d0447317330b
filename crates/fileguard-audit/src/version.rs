//! Installed version detection.

use fileguard_core::{GuardError, Result};
use std::path::Path;

/// File that declares the installed version, relative to the root
pub const VERSION_FILE: &str = "wp-includes/version.php";

/// Read the installed version from [`VERSION_FILE`] under `root`.
pub fn detect_version(root: &Path) -> Result<String> {
    let path = root.join(VERSION_FILE);
    let source = std::fs::read_to_string(&path)
        .map_err(|e| GuardError::io(path.display().to_string(), e))?;
    parse_version_php(&source).ok_or_else(|| {
        GuardError::Config(format!(
            "no $wp_version assignment in {}",
            path.display()
        ))
    })
}

/// Extract the value of `$wp_version = '...';` from PHP source.
#[must_use]
pub fn parse_version_php(source: &str) -> Option<String> {
    source.lines().find_map(|line| {
        let rest = line.trim_start().strip_prefix("$wp_version")?;
        let rest = rest.trim_start().strip_prefix('=')?.trim_start();
        let quote = rest.chars().next().filter(|c| *c == '\'' || *c == '"')?;
        let value = &rest[1..];
        let end = value.find(quote)?;
        let version = value[..end].trim();
        let valid = !version.is_empty()
            && version
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        valid.then(|| version.to_string())
    })
}
