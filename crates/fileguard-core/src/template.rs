//! Placeholder substitution for report notifications.
//!
//! Recognised placeholders: `{site_name}`, `{modified_files}`,
//! `{unknown_files}`, `{restored_files}`, `{restoration_failures}` and
//! `{check_time}`. List placeholders expand to one path per line. Unknown
//! placeholders are left as written.

use crate::types::Report;

/// Render `template` against `report`.
///
/// Substitution is single-pass: text inserted for one placeholder is never
/// scanned for further placeholders, so a file named `{site_name}` is
/// reported verbatim.
#[must_use]
pub fn render(template: &str, report: &Report, site_name: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];

        match candidate.find('}') {
            Some(close) => {
                let key = &candidate[1..close];
                match expand(key, report, site_name) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&candidate[..=close]),
                }
                rest = &candidate[close + 1..];
            }
            None => {
                out.push_str(candidate);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn expand(key: &str, report: &Report, site_name: &str) -> Option<String> {
    let value = match key {
        "site_name" => site_name.to_string(),
        "modified_files" => report.modified_files.join("\n"),
        "unknown_files" => report.unknown_files.join("\n"),
        "restored_files" => report.restored_files.join("\n"),
        "restoration_failures" => report
            .restoration_failures
            .iter()
            .map(|f| format!("{}: {}", f.path, f.reason))
            .collect::<Vec<_>>()
            .join("\n"),
        "check_time" => report.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => return None,
    };
    Some(value)
}
