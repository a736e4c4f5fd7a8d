//! # Script Tag Adapter
//!
//! Host-printed `<script>` tags for async/defer scripts get their loading
//! attribute injected before `src=`, unless the tag already carries it.
//! Flagged scripts are also excluded from host-side concatenation.

use crate::family::Scripts;
use crate::registry::AssetRegistry;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

// The attribute as a standalone word, not part of `data-async` or `x_defer`.
static ASYNC_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new("[^-_]async[^-_]").ok());
static DEFER_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new("[^-_]defer[^-_]").ok());
static ASYNC_DEFER_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new("[^-_]async defer[^-_]").ok());

/// Compiled presence check for a script loading attribute.
fn attribute_pattern(attribute: &str) -> Option<&'static Regex> {
    let pattern = match attribute {
        "async" => &ASYNC_PATTERN,
        "defer" => &DEFER_PATTERN,
        "async defer" => &ASYNC_DEFER_PATTERN,
        _ => return None,
    };
    LazyLock::force(pattern).as_ref()
}

impl AssetRegistry<Scripts> {
    /// Rewrite a host `<script>` tag for `handle`. Unflagged tags pass through.
    #[must_use]
    pub fn filter_script_tag(&self, tag: &str, handle: &str) -> String {
        if !self.family().is_flagged(handle) {
            return tag.to_string();
        }
        let Some(attribute) = self
            .get(handle)
            .and_then(|asset| asset.load_method.script_attribute())
        else {
            return tag.to_string();
        };

        match attribute_pattern(attribute) {
            Some(present) if !present.is_match(tag) => {
                debug!(handle, attribute, "script tag rewritten");
                tag.replacen("src=", &format!("{attribute} src="), 1)
            }
            _ => tag.to_string(),
        }
    }

    /// Whether the host may concatenate this script with others.
    #[must_use]
    pub fn allow_concat(&self, handle: &str) -> bool {
        !self.family().is_flagged(handle)
    }
}

// =============================================================================
// TESTS
// =============================================================================
