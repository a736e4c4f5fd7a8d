//! # Preloads
//!
//! `<link rel="preload">` hints. Always engine-rendered, never later than
//! the head point. A missing `as`/`type` is inferred from the file
//! extension during validation; fonts always get `crossorigin`.

use super::{Companion, Family};
use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::html::{class_list, escape, versioned};
use crate::registry::AssetTable;
use crate::types::{Asset, AssetKind, LoadMethod};
use std::path::Path;

/// Values the browser accepts for a preload's `as` attribute.
pub const PRELOAD_AS: [&str; 12] = [
    "audio", "document", "embed", "fetch", "font", "image", "object", "script", "style", "track",
    "worker", "video",
];

/// `(as, mime type)` for a file extension.
#[must_use]
pub fn extension_types(extension: &str) -> Option<(&'static str, &'static str)> {
    let types = match extension.to_ascii_lowercase().as_str() {
        "css" => ("style", "text/css"),
        "js" | "mjs" => ("script", "text/javascript"),
        "woff" => ("font", "font/woff"),
        "woff2" => ("font", "font/woff2"),
        "ttf" => ("font", "font/ttf"),
        "otf" => ("font", "font/otf"),
        "png" => ("image", "image/png"),
        "jpg" | "jpeg" => ("image", "image/jpeg"),
        "gif" => ("image", "image/gif"),
        "webp" => ("image", "image/webp"),
        "avif" => ("image", "image/avif"),
        "svg" => ("image", "image/svg+xml"),
        _ => return None,
    };
    Some(types)
}

/// Extension of a URI path, ignoring query and fragment.
fn src_extension(src: &str) -> Option<&str> {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    Path::new(path).extension().and_then(|ext| ext.to_str())
}

#[must_use]
pub fn is_valid_as(as_type: &str) -> bool {
    PRELOAD_AS.contains(&as_type)
}

#[derive(Debug, Default)]
pub struct Preloads;

impl Family for Preloads {
    const KIND: AssetKind = AssetKind::Preload;
    const LOAD_METHODS: &'static [LoadMethod] = &[LoadMethod::Preload];
    const HOST_METHODS: &'static [LoadMethod] = &[];
    const DEFAULT_METHOD: LoadMethod = LoadMethod::Preload;
    const USES_MEDIA: bool = true;

    fn pre_add(&mut self, asset: &mut Asset, config: &EngineConfig) -> Vec<Companion> {
        asset.load_method = LoadMethod::Preload;
        asset.in_footer = false;

        let head = config.position(&config.head_point);
        let hook = config.position(&asset.load_hook);
        let too_late = match (hook, head) {
            (Some(hook), Some(head)) => hook > head,
            _ => true,
        };
        if too_late {
            asset.load_hook = config.head_point.clone();
        }
        Vec::new()
    }

    fn post_validate(&mut self, asset: &mut Asset, _peers: &AssetTable<'_>) -> Vec<Diagnostic> {
        let as_valid = asset.as_type.as_deref().is_some_and(is_valid_as);
        if !as_valid || asset.mime_type.is_none() {
            if let Some((as_type, mime_type)) = asset.src_uri().and_then(src_extension).and_then(extension_types) {
                if !as_valid {
                    asset.as_type = Some(as_type.to_string());
                }
                if asset.mime_type.is_none() {
                    asset.mime_type = Some(mime_type.to_string());
                }
            }
        }

        if asset.as_type.as_deref() == Some("font") {
            asset.crossorigin = true;
        }
        Vec::new()
    }

    fn render(
        &self,
        asset: &Asset,
        config: &EngineConfig,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        let Some(as_type) = asset.as_type.as_deref().filter(|a| is_valid_as(a)) else {
            diagnostics.raise(Diagnostic::invalid_preload_as(asset));
            return Some(String::new());
        };

        let href = versioned(asset.src_uri().unwrap_or_default(), asset.version.as_deref());
        let mut tag = format!(
            "<link rel=\"preload\" href=\"{}\" class=\"{}\" as=\"{}\"",
            escape(&href),
            class_list(&config.default_classes, &asset.handle),
            escape(as_type),
        );
        if let Some(media) = &asset.media {
            tag.push_str(&format!(" media=\"{}\"", escape(media)));
        }
        if let Some(mime_type) = &asset.mime_type {
            tag.push_str(&format!(" type=\"{}\"", escape(mime_type)));
        }
        if asset.crossorigin {
            tag.push_str(" crossorigin");
        }
        tag.push_str(" />");
        Some(tag)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;
    use crate::registry::tests::Harness;
    use crate::registry::AssetRegistry;
    use crate::types::AssetSpec;

    #[test]
    fn extension_lookup() {
        assert_eq!(extension_types("woff2"), Some(("font", "font/woff2")));
        assert_eq!(extension_types("CSS"), Some(("style", "text/css")));
        assert_eq!(extension_types("mp3"), None);
        assert_eq!(src_extension("fonts/a.woff2?v=3#x"), Some("woff2"));
        assert_eq!(src_extension("noext"), None);
    }

    #[test]
    fn footer_hook_is_clamped_to_head() {
        let mut harness = Harness::new();
        let mut preloads = AssetRegistry::<Preloads>::new();
        preloads.add(
            AssetSpec::new("font", "font.woff2").load_hook("footer"),
            &mut harness.ctx(),
        );
        preloads.add(
            AssetSpec::new("critical-font", "crit.woff2").load_hook("critical"),
            &mut harness.ctx(),
        );

        assert!(preloads.get("font").is_some_and(|a| a.load_hook == "head" && !a.in_footer));
        assert!(preloads.get("critical-font").is_some_and(|a| a.load_hook == "critical"));
    }

    #[test]
    fn font_types_are_inferred() {
        let mut harness = Harness::new();
        let mut preloads = AssetRegistry::<Preloads>::new();
        preloads.add(
            AssetSpec::new("preload-basic", "client/css/test.css")
                .as_type("style")
                .media("(min-width: 768px)")
                .mime_type("text/css")
                .crossorigin(false),
            &mut harness.ctx(),
        );
        preloads.add(AssetSpec::new("font", "font.woff2"), &mut harness.ctx());
        preloads.validate(&mut harness.ctx());

        let asset = preloads.get("font");
        assert!(asset.is_some_and(|a| a.as_type.as_deref() == Some("font")
            && a.mime_type.as_deref() == Some("font/woff2")
            && a.crossorigin));
        assert!(preloads.get("preload-basic").is_some_and(|a| !a.crossorigin));

        let output = preloads.load_assets("head", &mut harness.ctx());
        let basic = "<link rel=\"preload\" href=\"client/css/test.css\" class=\"asset-manager preload-basic\" as=\"style\" media=\"(min-width: 768px)\" type=\"text/css\" />";
        let font = "<link rel=\"preload\" href=\"font.woff2\" class=\"asset-manager font\" as=\"font\" media=\"all\" type=\"font/woff2\" crossorigin />";
        assert_eq!(output, format!("{basic}{font}"));
        assert!(harness.diagnostics.is_empty());
    }

    #[test]
    fn explicit_as_is_kept() {
        let mut harness = Harness::new();
        let mut preloads = AssetRegistry::<Preloads>::new();
        preloads.add(
            AssetSpec::new("data", "data/feed.json").as_type("fetch").crossorigin(true),
            &mut harness.ctx(),
        );
        preloads.validate(&mut harness.ctx());

        let output = preloads.load_assets("head", &mut harness.ctx());
        assert_eq!(
            output,
            "<link rel=\"preload\" href=\"data/feed.json\" class=\"asset-manager data\" as=\"fetch\" media=\"all\" crossorigin />"
        );
    }

    #[test]
    fn unknown_extension_without_as_is_reported_at_render() {
        let mut harness = Harness::new();
        let mut preloads = AssetRegistry::<Preloads>::new();
        preloads.add(AssetSpec::new("track", "audio/song.mp3"), &mut harness.ctx());
        preloads.validate(&mut harness.ctx());
        assert!(harness.diagnostics.is_empty());

        let output = preloads.load_assets("head", &mut harness.ctx());
        assert!(!output.contains("rel=\"preload\""));
        assert!(harness.diagnostics.has(DiagnosticCode::InvalidPreloadAsAttribute));
    }

    #[test]
    fn invalid_as_is_replaced_by_extension() {
        let mut harness = Harness::new();
        let mut preloads = AssetRegistry::<Preloads>::new();
        preloads.add(
            AssetSpec::new("main", "css/main.css").as_type("stylesheet"),
            &mut harness.ctx(),
        );
        preloads.validate(&mut harness.ctx());
        assert!(preloads.get("main").is_some_and(|a| a.as_type.as_deref() == Some("style")
            && a.mime_type.as_deref() == Some("text/css")
            && !a.crossorigin));
    }
}
