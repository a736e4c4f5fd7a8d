//! # Asset Families
//!
//! Per-family behavior plugged into [`crate::registry::AssetRegistry`]:
//! allowed load methods, host delegation, pre-add and post-validation
//! hooks, and markup rendering.
//!
//! | Family     | Methods                               | Host methods                   |
//! |------------|---------------------------------------|--------------------------------|
//! | [`Scripts`]  | inline, sync, async, defer, async-defer | sync, async, defer, async-defer |
//! | [`Styles`]   | sync, async, defer, inline, preload   | sync                           |
//! | [`Preloads`] | preload                               | none                           |

pub mod preload;
pub mod script;
pub mod style;

pub use preload::Preloads;
pub use script::Scripts;
pub use style::Styles;

use crate::config::{EngineConfig, BUNDLED_LOADCSS, LOADCSS_SHIM};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::html::resolve_local_file;
use crate::registry::AssetTable;
use crate::types::{Asset, AssetKind, AssetSpec, LoadMethod};
use std::fmt;

/// An asset a family asks the manager to register in another registry.
#[derive(Debug, Clone, PartialEq)]
pub enum Companion {
    Script(AssetSpec),
    Preload(AssetSpec),
}

/// Family-specific behavior of a registry.
pub trait Family: fmt::Debug + Default {
    const KIND: AssetKind;

    /// Methods accepted at registration.
    const LOAD_METHODS: &'static [LoadMethod];

    /// Methods handed to the host's native enqueue.
    const HOST_METHODS: &'static [LoadMethod];

    /// Used when the requested method is missing or not in `LOAD_METHODS`.
    const DEFAULT_METHOD: LoadMethod = LoadMethod::Sync;

    /// Whether records default `media` to `all`.
    const USES_MEDIA: bool = false;

    /// Adjust a normalized record before it is stored. May request companions.
    fn pre_add(&mut self, _asset: &mut Asset, _config: &EngineConfig) -> Vec<Companion> {
        Vec::new()
    }

    /// Family checks after dependency validation. May run again for a
    /// record that gained dependents; the registry drops repeated reports.
    fn post_validate(&mut self, _asset: &mut Asset, _peers: &AssetTable<'_>) -> Vec<Diagnostic> {
        Vec::new()
    }

    /// Markup for an eligible record. `None` means no renderer exists for
    /// this method; the registry reports that as `cannot_print`.
    fn render(
        &self,
        asset: &Asset,
        config: &EngineConfig,
        diagnostics: &mut Diagnostics,
    ) -> Option<String>;

    /// Forget per-cycle state.
    fn reset(&mut self) {}
}

/// Contents of a local inline source, if it is safe to read.
pub(crate) fn read_inline(asset: &Asset, config: &EngineConfig) -> Option<String> {
    let src = asset.src_uri()?;
    if asset.kind == AssetKind::Script && src == BUNDLED_LOADCSS {
        return Some(LOADCSS_SHIM.to_string());
    }
    let path = resolve_local_file(src, &config.asset_root)?;
    std::fs::read_to_string(path).ok()
}
