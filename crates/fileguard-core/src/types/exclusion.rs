//! Exclusion rules for paths that are expected to differ from a manifest.

use serde::{Deserialize, Serialize};

/// Files commonly customised on a WordPress install.
pub const WORDPRESS_WHITELIST: &[&str] = &[
    ".htaccess",
    "php.ini",
    "wp-config.php",
    "robots.txt",
    "favicon.ico",
    ".user.ini",
    "web.config",
    ".well-known",
    "sitemap.xml",
    "humans.txt",
    "error_log",
    "php_errorlog",
];

/// Subtrees holding user content; never scanned for unknown files.
pub const WORDPRESS_EXCLUDED_SUBTREES: &[&str] = &["wp-content"];

/// Ordered set of path patterns that are never reported as unknown.
///
/// A pattern matches a relative path when it equals the path's basename,
/// equals the whole path, or is a leading directory of it. Subtrees match
/// the subtree root itself and everything below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSet {
    patterns: Vec<String>,
    subtrees: Vec<String>,
}

impl ExclusionSet {
    /// Build a set from patterns and excluded subtree prefixes
    pub fn new<P, S>(patterns: P, subtrees: S) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self {
            patterns: clean(patterns),
            subtrees: clean(subtrees),
        }
    }

    /// The stock WordPress whitelist plus `wp-content`
    #[must_use]
    pub fn wordpress_defaults() -> Self {
        Self::new(WORDPRESS_WHITELIST, WORDPRESS_EXCLUDED_SUBTREES)
    }

    /// Whitelist patterns in configured order
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Excluded subtree prefixes in configured order
    #[must_use]
    pub fn subtrees(&self) -> &[String] {
        &self.subtrees
    }

    /// Returns true if `rel` (relative, `/`-separated) is covered.
    #[must_use]
    pub fn is_excluded(&self, rel: &str) -> bool {
        let basename = rel.rsplit('/').next().unwrap_or(rel);

        self.patterns
            .iter()
            .any(|p| basename == p || is_same_or_below(rel, p))
            || self.subtrees.iter().any(|s| is_same_or_below(rel, s))
    }

    /// Returns true if the directory `rel` can be skipped as a whole.
    ///
    /// Only root-anchored rules prune: a directory that merely shares a
    /// whitelisted basename still has its contents checked file by file.
    #[must_use]
    pub fn prunes_directory(&self, rel: &str) -> bool {
        self.patterns
            .iter()
            .chain(&self.subtrees)
            .any(|p| is_same_or_below(rel, p))
    }
}

fn is_same_or_below(rel: &str, prefix: &str) -> bool {
    rel.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn clean<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let trimmed = item.as_ref().replace('\\', "/");
        let trimmed = trimmed.trim().trim_matches('/');
        if !trimmed.is_empty() && !out.iter().any(|o| o == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}
