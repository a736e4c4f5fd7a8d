//! # Host Page Pipeline
//!
//! The engine cooperates with a host that has its own asset table and its
//! own enqueue functions. Sync assets are handed to the host; host-native
//! assets named as dependencies are bridged into the engine's registries.
//!
//! [`StaticHost`] is an in-memory host used by the CLI and tests.

use crate::error::HostError;
use crate::html::{escape, versioned};
use crate::types::AssetKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

// =============================================================================
// HOST TYPES
// =============================================================================

/// An asset known to the host's own registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeAsset {
    pub handle: String,
    pub src: String,
    pub deps: Vec<String>,
    pub in_footer: bool,
    pub enqueued: bool,
    pub version: Option<String>,
}

impl NativeAsset {
    #[must_use]
    pub fn new(handle: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            src: src.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn in_footer(mut self, in_footer: bool) -> Self {
        self.in_footer = in_footer;
        self
    }

    #[must_use]
    pub fn enqueued(mut self, enqueued: bool) -> Self {
        self.enqueued = enqueued;
        self
    }
}

/// Where the host should place an enqueued asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Scripts: head or footer.
    InFooter(bool),
    /// Stylesheets: media query.
    Media(String),
}

/// Arguments for a host enqueue call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueueRequest<'a> {
    pub kind: AssetKind,
    pub handle: &'a str,
    pub src: &'a str,
    pub deps: &'a [String],
    pub version: Option<&'a str>,
    pub placement: Placement,
}

/// The host page pipeline.
pub trait HostPipeline {
    /// Look up an asset in the host's own registry.
    fn native_asset(&self, kind: AssetKind, handle: &str) -> Option<NativeAsset>;

    /// Hand an asset to the host for native emission.
    fn enqueue(&mut self, request: EnqueueRequest<'_>) -> Result<(), HostError>;
}

// =============================================================================
// STATIC HOST
// =============================================================================

/// An asset accepted by [`StaticHost::enqueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueuedAsset {
    pub kind: AssetKind,
    pub handle: String,
    pub src: String,
    pub deps: Vec<String>,
    pub version: Option<String>,
    pub placement: Placement,
}

/// In-memory host with a native asset table and a print queue.
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    native: BTreeMap<(AssetKind, String), NativeAsset>,
    queue: Vec<EnqueuedAsset>,
    unavailable: BTreeSet<AssetKind>,
}

impl StaticHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset to the native table.
    pub fn register(&mut self, kind: AssetKind, asset: NativeAsset) -> &mut Self {
        self.native.insert((kind, asset.handle.clone()), asset);
        self
    }

    #[must_use]
    pub fn with_native(mut self, kind: AssetKind, asset: NativeAsset) -> Self {
        self.register(kind, asset);
        self
    }

    /// Make enqueue calls for a family fail as if the function did not exist.
    pub fn disable_enqueue(&mut self, kind: AssetKind) -> &mut Self {
        self.unavailable.insert(kind);
        self
    }

    #[must_use]
    pub fn enqueued(&self) -> &[EnqueuedAsset] {
        &self.queue
    }

    #[must_use]
    pub fn is_enqueued(&self, kind: AssetKind, handle: &str) -> bool {
        self.queue.iter().any(|a| a.kind == kind && a.handle == handle)
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    /// Script tags for the head (`in_footer == false`) or footer.
    ///
    /// `filter` receives each tag and its handle and returns the final tag.
    pub fn print_scripts<F>(&self, in_footer: bool, filter: F) -> String
    where
        F: Fn(&str, &str) -> String,
    {
        self.queue
            .iter()
            .filter(|a| a.kind == AssetKind::Script)
            .filter(|a| a.placement == Placement::InFooter(in_footer))
            .map(|a| {
                let tag = format!(
                    "<script type=\"text/javascript\" src=\"{}\"></script>\n",
                    escape(&versioned(&a.src, a.version.as_deref()))
                );
                filter(&tag, &a.handle)
            })
            .collect()
    }

    /// Stylesheet links, all printed in the head.
    #[must_use]
    pub fn print_styles(&self) -> String {
        self.queue
            .iter()
            .filter(|a| a.kind == AssetKind::Style)
            .map(|a| {
                let media = match &a.placement {
                    Placement::Media(media) => media.as_str(),
                    Placement::InFooter(_) => "all",
                };
                format!(
                    "<link rel=\"stylesheet\" id=\"{}-css\" href=\"{}\" media=\"{}\" />\n",
                    escape(&a.handle),
                    escape(&versioned(&a.src, a.version.as_deref())),
                    escape(media),
                )
            })
            .collect()
    }
}

impl HostPipeline for StaticHost {
    fn native_asset(&self, kind: AssetKind, handle: &str) -> Option<NativeAsset> {
        let mut asset = self.native.get(&(kind, handle.to_string()))?.clone();
        asset.enqueued = asset.enqueued || self.is_enqueued(kind, handle);
        Some(asset)
    }

    fn enqueue(&mut self, request: EnqueueRequest<'_>) -> Result<(), HostError> {
        if self.unavailable.contains(&request.kind) {
            return Err(HostError::MissingEnqueueFunction {
                function: request.kind.enqueue_function(),
            });
        }
        if self.is_enqueued(request.kind, request.handle) {
            return Ok(());
        }

        debug!(kind = %request.kind, handle = request.handle, "host enqueue");
        self.queue.push(EnqueuedAsset {
            kind: request.kind,
            handle: request.handle.to_string(),
            src: request.src.to_string(),
            deps: request.deps.to_vec(),
            version: request.version.map(str::to_string),
            placement: request.placement,
        });
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(kind: AssetKind, handle: &'a str, deps: &'a [String]) -> EnqueueRequest<'a> {
        EnqueueRequest {
            kind,
            handle,
            src: "js/app.js",
            deps,
            version: Some("1.0"),
            placement: Placement::InFooter(false),
        }
    }

    #[test]
    fn native_lookup_reflects_queue() {
        let mut host = StaticHost::new().with_native(
            AssetKind::Script,
            NativeAsset::new("jquery", "/wp-includes/jquery.js").in_footer(true),
        );

        let native = host.native_asset(AssetKind::Script, "jquery");
        assert!(native.as_ref().is_some_and(|a| a.in_footer && !a.enqueued));
        assert!(host.native_asset(AssetKind::Style, "jquery").is_none());

        assert!(host.enqueue(request(AssetKind::Script, "jquery", &[])).is_ok());
        let native = host.native_asset(AssetKind::Script, "jquery");
        assert!(native.is_some_and(|a| a.enqueued));
    }

    #[test]
    fn enqueue_is_idempotent() {
        let mut host = StaticHost::new();
        assert!(host.enqueue(request(AssetKind::Script, "app", &[])).is_ok());
        assert!(host.enqueue(request(AssetKind::Script, "app", &[])).is_ok());
        assert_eq!(host.enqueued().len(), 1);
    }

    #[test]
    fn disabled_family_reports_missing_function() {
        let mut host = StaticHost::new();
        host.disable_enqueue(AssetKind::Style);
        let result = host.enqueue(request(AssetKind::Style, "main", &[]));
        assert_eq!(
            result,
            Err(HostError::MissingEnqueueFunction {
                function: "enqueue_style".to_string()
            })
        );
        assert!(host.enqueued().is_empty());
    }

    #[test]
    fn print_scripts_by_placement() {
        let mut host = StaticHost::new();
        let _ = host.enqueue(request(AssetKind::Script, "head-js", &[]));
        let _ = host.enqueue(EnqueueRequest {
            placement: Placement::InFooter(true),
            ..request(AssetKind::Script, "foot-js", &[])
        });

        let head = host.print_scripts(false, |tag, _| tag.to_string());
        assert_eq!(
            head,
            "<script type=\"text/javascript\" src=\"js/app.js?ver=1.0\"></script>\n"
        );
        let footer = host.print_scripts(true, |tag, handle| format!("<!-- {handle} -->{tag}"));
        assert!(footer.starts_with("<!-- foot-js -->"));
    }

    #[test]
    fn print_styles_uses_media() {
        let mut host = StaticHost::new();
        let _ = host.enqueue(EnqueueRequest {
            kind: AssetKind::Style,
            handle: "main",
            src: "css/main.css",
            deps: &[],
            version: None,
            placement: Placement::Media("screen".to_string()),
        });
        assert_eq!(
            host.print_styles(),
            "<link rel=\"stylesheet\" id=\"main-css\" href=\"css/main.css\" media=\"screen\" />\n"
        );
    }
}
