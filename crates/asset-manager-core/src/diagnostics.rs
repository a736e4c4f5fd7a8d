//! # Diagnostics
//!
//! Structured reports for dependency and configuration problems.
//!
//! Diagnostics never abort processing. Each one is logged through
//! `tracing`, kept in the [`Diagnostics`] sink, and (unless muted)
//! rendered as an inline error block in the page output:
//!
//! ```text
//! <div class="enqueue-error"><strong>ENQUEUE ERROR</strong>: <em>CODE</em> - MESSAGE Bad asset: <br><pre>ASSET</pre></div>
//! ```

use crate::html::escape;
use crate::types::Asset;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

// =============================================================================
// CODES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// Asset names a load point that is not configured.
    InvalidLoadHook,
    /// A dependency is registered nowhere.
    Missing,
    /// A dependency is emitted after an asset that needs it.
    UnsafeLoadHook,
    /// Two assets list each other as dependencies.
    CircularDependency,
    /// The host has no enqueue function for the family.
    InvalidEnqueueFunction,
    /// A non-blocking dependency cannot be relied on by its dependent.
    UnsafeLoadMethod,
    /// Inline source is remote, unsafe or missing.
    UnsafeInline,
    /// Preload `as` is missing or not allowed.
    InvalidPreloadAsAttribute,
    /// No renderer exists for the asset's family and method.
    CannotPrint,
}

impl DiagnosticCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidLoadHook => "invalid_load_hook",
            Self::Missing => "missing",
            Self::UnsafeLoadHook => "unsafe_load_hook",
            Self::CircularDependency => "circular_dependency",
            Self::InvalidEnqueueFunction => "invalid_enqueue_function",
            Self::UnsafeLoadMethod => "unsafe_load_method",
            Self::UnsafeInline => "unsafe_inline",
            Self::InvalidPreloadAsAttribute => "invalid_preload_as_attribute",
            Self::CannotPrint => "cannot_print",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// DIAGNOSTIC
// =============================================================================

fn strong(text: &str) -> String {
    format!("<strong>{}</strong>", escape(text))
}

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    /// Handle of the offending asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    /// The other asset or name involved (dependency, dependent, function).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
    /// Human-readable message. May contain `<strong>` emphasis.
    pub message: String,
    /// Snapshot of the offending asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<Asset>,
}

impl Diagnostic {
    fn new(code: DiagnosticCode, asset: &Asset, related: Option<&str>, message: String) -> Self {
        Self {
            code,
            handle: Some(asset.handle.clone()),
            related: related.map(str::to_string),
            message,
            asset: Some(asset.clone()),
        }
    }

    #[must_use]
    pub fn invalid_load_hook(asset: &Asset) -> Self {
        let message = format!(
            "Asset {} is using an invalid load_hook. The asset is configured to load on hook {}, but this hook does not exist.",
            strong(&asset.handle),
            strong(&asset.load_hook),
        );
        Self::new(DiagnosticCode::InvalidLoadHook, asset, None, message)
    }

    #[must_use]
    pub fn missing(asset: &Asset, dependency: &str) -> Self {
        let message = format!(
            "A dependency you listed for this asset is invalid. {} lists {} as a dependency, but that asset is not configured to load on this page.",
            strong(&asset.handle),
            strong(dependency),
        );
        Self::new(DiagnosticCode::Missing, asset, Some(dependency), message)
    }

    /// `dependency` loads later than `dependent`, which needs it.
    #[must_use]
    pub fn unsafe_load_hook(dependency: &Asset, dependent: &Asset) -> Self {
        let message = format!(
            "Asset {}, configured to load on hook {}, is loading after an asset that depends on it: {}, configured to load on hook {}",
            strong(&dependency.handle),
            strong(&dependency.load_hook),
            strong(&dependent.handle),
            strong(&dependent.load_hook),
        );
        Self::new(
            DiagnosticCode::UnsafeLoadHook,
            dependency,
            Some(&dependent.handle),
            message,
        )
    }

    #[must_use]
    pub fn circular_dependency(asset: &Asset, other: &str) -> Self {
        let message = format!(
            "You have a circular dependency in your enqueues. {} and {} require each other as dependencies.",
            strong(&asset.handle),
            strong(other),
        );
        Self::new(DiagnosticCode::CircularDependency, asset, Some(other), message)
    }

    #[must_use]
    pub fn invalid_enqueue_function(asset: &Asset, function: &str) -> Self {
        let message = format!(
            "You attempted to enqueue an asset with function {}, which does not exist.",
            escape(function)
        );
        Self::new(
            DiagnosticCode::InvalidEnqueueFunction,
            asset,
            Some(function),
            message,
        )
    }

    /// `asset` loads non-blocking, so `dependent` cannot rely on it.
    #[must_use]
    pub fn unsafe_load_method(asset: &Asset, dependent: &Asset) -> Self {
        let message = format!(
            "Asset {} uses the {} load method, meaning there is no guarantee it will be available for its dependent asset {}, using {} load method.",
            strong(&asset.handle),
            strong(asset.load_method.as_str()),
            strong(&dependent.handle),
            strong(dependent.load_method.as_str()),
        );
        Self::new(
            DiagnosticCode::UnsafeLoadMethod,
            asset,
            Some(&dependent.handle),
            message,
        )
    }

    #[must_use]
    pub fn unsafe_inline(asset: &Asset) -> Self {
        let message = format!(
            "You attempted to load {} using the \"inline\" load method, but it is an external asset or the asset does not exist.",
            strong(asset.src_uri().unwrap_or_default()),
        );
        Self::new(DiagnosticCode::UnsafeInline, asset, None, message)
    }

    #[must_use]
    pub fn invalid_preload_as(asset: &Asset) -> Self {
        let message = format!(
            "You attempted to preload {} with a missing or invalid {} attribute. The `as` attribute helps the browser prioritize and accept the preloaded asset.",
            strong(asset.src_uri().unwrap_or_default()),
            strong("as"),
        );
        Self::new(
            DiagnosticCode::InvalidPreloadAsAttribute,
            asset,
            asset.as_type.as_deref(),
            message,
        )
    }

    #[must_use]
    pub fn cannot_print(asset: &Asset) -> Self {
        let message = format!(
            "Asset of type {} with load method {} has no renderer configured.",
            strong(asset.kind.as_str()),
            strong(asset.load_method.as_str()),
        );
        Self::new(DiagnosticCode::CannotPrint, asset, None, message)
    }

    /// Message with emphasis tags removed.
    #[must_use]
    pub fn plain_message(&self) -> String {
        self.message.replace("<strong>", "").replace("</strong>", "")
    }

    /// The inline error block.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let data = self
            .asset
            .as_ref()
            .and_then(|asset| serde_json::to_string_pretty(asset).ok())
            .unwrap_or_default();
        format!(
            "<div class=\"enqueue-error\"><strong>ENQUEUE ERROR</strong>: <em>{}</em> - {} Bad asset: <br><pre>{}</pre></div>",
            self.code,
            self.message,
            escape(&data),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.plain_message())
    }
}

// =============================================================================
// SINK
// =============================================================================

/// Collects diagnostics for one render cycle.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
    flushed: usize,
    quiet: bool,
    visible: bool,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(false, true)
    }
}

impl Diagnostics {
    /// `quiet` mutes markup; `visible` is whether the viewer may see it.
    #[must_use]
    pub fn new(quiet: bool, visible: bool) -> Self {
        Self {
            records: Vec::new(),
            flushed: 0,
            quiet,
            visible,
        }
    }

    pub fn raise(&mut self, diagnostic: Diagnostic) {
        warn!(
            code = %diagnostic.code,
            handle = diagnostic.handle.as_deref().unwrap_or_default(),
            "{}",
            diagnostic.plain_message()
        );
        self.records.push(diagnostic);
    }

    #[must_use]
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn count(&self, code: DiagnosticCode) -> usize {
        self.records.iter().filter(|d| d.code == code).count()
    }

    #[must_use]
    pub fn has(&self, code: DiagnosticCode) -> bool {
        self.records.iter().any(|d| d.code == code)
    }

    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.quiet || !self.visible
    }

    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Markup for every diagnostic raised since the last call.
    /// Empty when muted; the records are kept either way.
    pub fn take_markup(&mut self) -> String {
        let pending = &self.records[self.flushed..];
        self.flushed = self.records.len();
        if self.is_muted() {
            return String::new();
        }
        pending.iter().map(Diagnostic::to_markup).collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.flushed = 0;
    }
}

// =============================================================================
// TESTS
// =============================================================================
