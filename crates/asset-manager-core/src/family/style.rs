//! # Styles
//!
//! Sync stylesheets go to the host. Async, defer and inline stylesheets are
//! rendered by the engine:
//!
//! - async: `media="print"` link that swaps to the real media on load
//! - defer: loadCSS call on `DOMContentLoaded` (the shim is registered once
//!   as an inline script at the earliest load point)
//! - inline: file contents in a `<style>` element
//!
//! The deprecated `preload` method becomes `sync` plus a preload hint.

use super::{read_inline, Companion, Family};
use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::html::{class_list, escape, escape_js, versioned};
use crate::registry::AssetTable;
use crate::types::{Asset, AssetKind, AssetSpec, LoadMethod};
use tracing::debug;

/// Handle of the loadCSS shim script.
pub const LOADCSS_HANDLE: &str = "loadCSS";

#[derive(Debug, Default)]
pub struct Styles {
    loadcss_requested: bool,
}

impl Styles {
    fn loadcss_companion(config: &EngineConfig) -> Companion {
        Companion::Script(
            AssetSpec::new(LOADCSS_HANDLE, config.loadcss_src.as_str())
                .load_method(LoadMethod::Inline)
                .load_hook(config.earliest_point()),
        )
    }

    fn render_async(asset: &Asset, href: &str, classes: &str) -> String {
        let media = asset.media.as_deref().unwrap_or("all");
        let noscript_media = match asset.media.as_deref() {
            Some(media) => format!("media=\"{}\" ", escape(media)),
            None => String::new(),
        };
        format!(
            "<link rel=\"stylesheet\" class=\"{classes}\" href=\"{href}\" media=\"print\" onload=\"this.onload=null;this.media='{}'\" /><noscript><link rel=\"stylesheet\" href=\"{href}\" {noscript_media}class=\"{classes}\" /></noscript>",
            escape(&escape_js(media)),
        )
    }

    fn render_defer(href_raw: &str, href: &str, classes: &str) -> String {
        format!(
            "<script class=\"{classes}\" type=\"text/javascript\">document.addEventListener(\"DOMContentLoaded\",function(){{loadCSS(\"{}\");}});</script><noscript><link rel=\"stylesheet\" href=\"{href}\" class=\"{classes}\" /></noscript>",
            escape_js(href_raw),
        )
    }
}

impl Family for Styles {
    const KIND: AssetKind = AssetKind::Style;
    const LOAD_METHODS: &'static [LoadMethod] = &[
        LoadMethod::Sync,
        LoadMethod::Async,
        LoadMethod::Defer,
        LoadMethod::Inline,
        LoadMethod::Preload,
    ];
    const HOST_METHODS: &'static [LoadMethod] = &[LoadMethod::Sync];
    const USES_MEDIA: bool = true;

    fn pre_add(&mut self, asset: &mut Asset, config: &EngineConfig) -> Vec<Companion> {
        let mut companions = Vec::new();
        match asset.load_method {
            LoadMethod::Preload => {
                debug!(handle = %asset.handle, "style preload converted to sync with preload hint");
                let mut hint = asset.to_spec();
                hint.load_method = None;
                hint.as_type = Some("style".to_string());
                hint.mime_type = Some("text/css".to_string());
                hint.load_hook = Some(config.head_point.clone());
                hint.in_footer = Some(false);
                companions.push(Companion::Preload(hint));
                asset.load_method = LoadMethod::Sync;
            }
            LoadMethod::Defer if !self.loadcss_requested => {
                self.loadcss_requested = true;
                companions.push(Self::loadcss_companion(config));
            }
            _ => {}
        }
        companions
    }

    fn post_validate(&mut self, asset: &mut Asset, peers: &AssetTable<'_>) -> Vec<Diagnostic> {
        if !matches!(asset.load_method, LoadMethod::Async | LoadMethod::Defer) {
            return Vec::new();
        }
        asset
            .dependents
            .first()
            .and_then(|handle| peers.get(handle))
            .map(|dependent| Diagnostic::unsafe_load_method(asset, dependent))
            .into_iter()
            .collect()
    }

    fn render(
        &self,
        asset: &Asset,
        config: &EngineConfig,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        let classes = class_list(&config.default_classes, &asset.handle);
        let src = asset.src_uri().unwrap_or_default();
        let href_raw = versioned(src, asset.version.as_deref());
        let href = escape(&href_raw);

        match asset.load_method {
            LoadMethod::Async => Some(Self::render_async(asset, &href, &classes)),
            LoadMethod::Defer => Some(Self::render_defer(&href_raw, &href, &classes)),
            LoadMethod::Inline => match read_inline(asset, config) {
                Some(contents) => Some(format!(
                    "<style class=\"{classes}\" type=\"text/css\">{contents}</style>"
                )),
                None => {
                    diagnostics.raise(Diagnostic::unsafe_inline(asset));
                    Some(String::new())
                }
            },
            _ => None,
        }
    }

    fn reset(&mut self) {
        self.loadcss_requested = false;
    }
}

// =============================================================================
// TESTS
// =============================================================================
