//! # Scripts
//!
//! Inline scripts are rendered by the engine. Everything else goes to the
//! host, and async/defer scripts are flagged so the host's `<script>` tag
//! can be rewritten (see [`crate::tags`]).

use super::{read_inline, Family};
use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::html::{class_list, escape};
use crate::registry::{AssetRegistry, AssetTable, Context};
use crate::types::{Asset, AssetKind, AssetSource, LoadMethod};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Default)]
pub struct Scripts {
    /// Handles whose host tag needs an async/defer attribute.
    deferred: BTreeSet<String>,
}

impl Scripts {
    #[must_use]
    pub fn is_flagged(&self, handle: &str) -> bool {
        self.deferred.contains(handle)
    }

    pub fn flagged(&self) -> impl Iterator<Item = &str> {
        self.deferred.iter().map(String::as_str)
    }

    /// Dependents that cannot rely on `asset` given its load method.
    fn unsafe_dependents<'a>(asset: &Asset, peers: &AssetTable<'a>) -> Vec<&'a Asset> {
        let dependents = asset.dependents.iter().filter_map(|handle| peers.get(handle));
        match asset.load_method {
            LoadMethod::Defer => dependents
                .filter(|dependent| dependent.load_method != LoadMethod::Defer)
                .collect(),
            LoadMethod::Async | LoadMethod::AsyncDefer => dependents.collect(),
            _ => Vec::new(),
        }
    }
}

impl Family for Scripts {
    const KIND: AssetKind = AssetKind::Script;
    const LOAD_METHODS: &'static [LoadMethod] = &[
        LoadMethod::Inline,
        LoadMethod::Sync,
        LoadMethod::Async,
        LoadMethod::Defer,
        LoadMethod::AsyncDefer,
    ];
    const HOST_METHODS: &'static [LoadMethod] = &[
        LoadMethod::Sync,
        LoadMethod::Async,
        LoadMethod::Defer,
        LoadMethod::AsyncDefer,
    ];

    fn post_validate(&mut self, asset: &mut Asset, peers: &AssetTable<'_>) -> Vec<Diagnostic> {
        if !asset.load_method.is_deferred() {
            return Vec::new();
        }
        self.deferred.insert(asset.handle.clone());
        Self::unsafe_dependents(asset, peers)
            .first()
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
        if asset.load_method != LoadMethod::Inline {
            return None;
        }
        let classes = class_list(&config.default_classes, &asset.handle);

        if let Some(AssetSource::Data(value)) = &asset.src {
            let namespace = &config.inline_script_context;
            let payload = serde_json::to_string(value)
                .unwrap_or_else(|_| "null".to_string())
                .replace("</", "<\\/");
            return Some(format!(
                "<script class=\"{classes}\" type=\"text/javascript\">window.{namespace} = window.{namespace} || {{}}; window.{namespace}[\"{}\"] = {payload}</script>",
                escape(&asset.handle),
            ));
        }

        match read_inline(asset, config) {
            Some(contents) => Some(format!(
                "<script class=\"{classes}\" type=\"text/javascript\">{contents}</script>"
            )),
            None => {
                diagnostics.raise(Diagnostic::unsafe_inline(asset));
                Some(String::new())
            }
        }
    }

    fn reset(&mut self) {
        self.deferred.clear();
    }
}

impl AssetRegistry<Scripts> {
    /// Change a registered script's load method.
    ///
    /// A script already handed to the host keeps its host tag; switching to
    /// a deferred method flags it for tag rewriting. Returns false when the
    /// handle is unknown or the method is not a script method.
    pub fn modify_load_method(&mut self, handle: &str, method: LoadMethod, ctx: &mut Context<'_>) -> bool {
        if !Scripts::LOAD_METHODS.contains(&method) {
            return false;
        }
        self.add_core_asset(handle, LoadMethod::Sync, ctx);
        if !self.set_load_method(handle, method) {
            return false;
        }
        debug!(handle, load_method = %method, "script load method modified");

        let Some(asset) = self.get(handle).cloned() else {
            return false;
        };
        if method.is_deferred() {
            self.family.deferred.insert(asset.handle.clone());
        } else {
            self.family.deferred.remove(&asset.handle);
        }

        if Scripts::HOST_METHODS.contains(&method) && !asset.loaded {
            let mut asset = asset;
            Self::delegate(&mut asset, ctx);
            if let Some(slot) = self.index.get(handle).and_then(|&idx| self.assets.get_mut(idx)) {
                *slot = asset;
            }
        }
        true
    }
}

// =============================================================================
// TESTS
// =============================================================================
