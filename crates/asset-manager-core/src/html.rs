//! # Markup Helpers
//!
//! Escaping, query-string and class helpers shared by the renderers, plus
//! the local-file check that guards inline sources.

use std::path::{Component, Path, PathBuf};

/// Escape text for use inside a double-quoted attribute or element body.
#[must_use]
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// Escape text for a double-quoted JavaScript string literal.
#[must_use]
pub fn escape_js(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '<' => out.push_str("\\x3C"),
            other => out.push(other),
        }
    }
    out
}

/// Append `key=value` to a URL, before any `#fragment`.
#[must_use]
pub fn add_query_arg(url: &str, key: &str, value: &str) -> String {
    let (base, fragment) = match url.find('#') {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    };
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{key}={value}{fragment}")
}

/// Append `ver=<version>` when a version is set.
#[must_use]
pub fn versioned(url: &str, version: Option<&str>) -> String {
    match version {
        Some(version) if !version.is_empty() => add_query_arg(url, "ver", version),
        _ => url.to_string(),
    }
}

/// Space-separated class list: defaults followed by the asset handle.
#[must_use]
pub fn class_list(defaults: &[String], handle: &str) -> String {
    let mut classes: Vec<&str> = defaults
        .iter()
        .map(String::as_str)
        .filter(|class| !class.is_empty())
        .collect();
    if !handle.is_empty() {
        classes.push(handle);
    }
    escape(&classes.join(" "))
}

/// Resolve an inline source to a readable local file.
///
/// Rejects remote URIs, protocol-relative paths and `..` components.
/// Relative paths resolve against `root`; every path, absolute or not,
/// must stay inside it after symlinks are resolved.
#[must_use]
pub fn resolve_local_file(src: &str, root: &Path) -> Option<PathBuf> {
    if src.is_empty() || src.contains("://") || src.starts_with("//") {
        return None;
    }
    let path = Path::new(src);
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return None;
    }

    let root = root.canonicalize().ok()?;
    let resolved = root.join(path).canonicalize().ok()?;
    (resolved.starts_with(&root) && resolved.is_file()).then_some(resolved)
}

// =============================================================================
// TESTS
// =============================================================================
