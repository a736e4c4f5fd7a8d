//! # Asset Registry
//!
//! Ordered storage for one asset family plus the registration path:
//!
//! ```text
//! AssetSpec ─► should_add ─► normalize ─► Family::pre_add ─► host enqueue? ─► append
//! ```
//!
//! Handles are unique per registry; the first registration wins. Records
//! keep insertion order, which is also emission order within a load point.

use crate::conditions::ConditionSet;
use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::error::HostError;
use crate::family::{Companion, Family};
use crate::host::{EnqueueRequest, HostPipeline, Placement};
use crate::types::{Asset, AssetKind, AssetSpec, LoadMethod, Stage};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Caller-supplied veto over registrations.
pub type AddFilter = dyn Fn(AssetKind, &AssetSpec) -> bool;

// =============================================================================
// CONTEXT
// =============================================================================

/// Everything a registry borrows from the manager during one operation.
pub struct Context<'a> {
    pub config: &'a EngineConfig,
    pub conditions: &'a ConditionSet,
    pub host: &'a mut dyn HostPipeline,
    pub diagnostics: &'a mut Diagnostics,
    pub filter: Option<&'a AddFilter>,
}

// =============================================================================
// ASSET TABLE
// =============================================================================

/// Read-only view of a registry's records, keyed by handle.
#[derive(Debug, Clone, Copy)]
pub struct AssetTable<'a> {
    assets: &'a [Asset],
    index: &'a BTreeMap<String, usize>,
}

impl<'a> AssetTable<'a> {
    #[must_use]
    pub fn new(assets: &'a [Asset], index: &'a BTreeMap<String, usize>) -> Self {
        Self { assets, index }
    }

    #[must_use]
    pub fn get(&self, handle: &str) -> Option<&'a Asset> {
        self.index.get(handle).and_then(|&idx| self.assets.get(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Asset> {
        self.assets.iter()
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

#[derive(Debug, Default)]
pub struct AssetRegistry<F: Family> {
    pub(crate) family: F,
    pub(crate) assets: Vec<Asset>,
    pub(crate) index: BTreeMap<String, usize>,
    /// Records before this index have been through validation.
    pub(crate) validated: usize,
    /// Circular pairs already reported, as (smaller, larger) handles.
    pub(crate) reported_cycles: BTreeSet<(String, String)>,
    /// Family diagnostics already raised, as (code, handle, related).
    pub(crate) reported: BTreeSet<(DiagnosticCode, Option<String>, Option<String>)>,
}

impl<F: Family> AssetRegistry<F> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn kind(&self) -> AssetKind {
        F::KIND
    }

    #[must_use]
    pub fn family(&self) -> &F {
        &self.family
    }

    #[must_use]
    pub fn get(&self, handle: &str) -> Option<&Asset> {
        self.index.get(handle).and_then(|&idx| self.assets.get(idx))
    }

    #[must_use]
    pub fn contains(&self, handle: &str) -> bool {
        self.index.contains_key(handle)
    }

    /// Records in registration order.
    #[must_use]
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn handles(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(|asset| asset.handle.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    #[must_use]
    pub fn table(&self) -> AssetTable<'_> {
        AssetTable::new(&self.assets, &self.index)
    }

    /// Drop every record and per-cycle family state.
    pub fn clear(&mut self) {
        self.assets.clear();
        self.index.clear();
        self.validated = 0;
        self.reported_cycles.clear();
        self.reported.clear();
        self.family.reset();
    }

    /// Register an asset. Rejected specs are dropped silently.
    ///
    /// Returns companion assets the family wants registered elsewhere.
    pub fn add(&mut self, spec: AssetSpec, ctx: &mut Context<'_>) -> Vec<Companion> {
        if !self.should_add(&spec, ctx) {
            debug!(kind = %F::KIND, handle = %spec.handle, "asset not added");
            return Vec::new();
        }

        let mut asset = Self::normalize(spec, ctx.config);
        let companions = self.family.pre_add(&mut asset, ctx.config);

        if F::HOST_METHODS.contains(&asset.load_method) && !asset.loaded {
            Self::delegate(&mut asset, ctx);
        }

        debug!(
            kind = %F::KIND,
            handle = %asset.handle,
            load_method = %asset.load_method,
            load_hook = %asset.load_hook,
            loaded = asset.loaded,
            "asset added"
        );
        self.index.insert(asset.handle.clone(), self.assets.len());
        self.assets.push(asset);
        companions
    }

    fn should_add(&self, spec: &AssetSpec, ctx: &Context<'_>) -> bool {
        if spec.handle.is_empty() || self.contains(&spec.handle) {
            return false;
        }
        if let Some(filter) = ctx.filter {
            if !filter(F::KIND, spec) {
                return false;
            }
        }
        ctx.conditions.should_include(spec.condition.as_ref())
    }

    /// Apply defaulting rules to a spec.
    fn normalize(spec: AssetSpec, config: &EngineConfig) -> Asset {
        let load_method = spec
            .load_method
            .as_deref()
            .and_then(|name| name.parse::<LoadMethod>().ok())
            .filter(|method| F::LOAD_METHODS.contains(method))
            .unwrap_or(F::DEFAULT_METHOD);

        let requested_hook = spec.load_hook.filter(|hook| !hook.is_empty());
        let in_footer = spec.in_footer.unwrap_or(false)
            || requested_hook
                .as_deref()
                .is_some_and(|hook| config.is_footer_phase(hook));
        let load_hook = requested_hook.unwrap_or_else(|| config.point_for(in_footer).to_string());

        let media = match spec.media {
            Some(media) if !media.is_empty() => Some(media),
            _ if F::USES_MEDIA => Some("all".to_string()),
            _ => None,
        };

        Asset {
            handle: spec.handle,
            kind: F::KIND,
            src: spec.src,
            deps: spec.deps,
            condition: spec.condition,
            load_method,
            load_hook,
            in_footer,
            version: spec.version.filter(|v| !v.is_empty()),
            media,
            as_type: spec.as_type.filter(|v| !v.is_empty()),
            mime_type: spec.mime_type.filter(|v| !v.is_empty()),
            crossorigin: spec.crossorigin.unwrap_or(false),
            loaded: spec.loaded,
            stage: Stage::Registered,
            dependents: Vec::new(),
        }
    }

    /// Hand a record to the host's native enqueue.
    pub(crate) fn delegate(asset: &mut Asset, ctx: &mut Context<'_>) {
        let placement = if F::USES_MEDIA {
            Placement::Media(asset.media.clone().unwrap_or_else(|| "all".to_string()))
        } else {
            Placement::InFooter(asset.in_footer)
        };
        let request = EnqueueRequest {
            kind: F::KIND,
            handle: &asset.handle,
            src: asset.src_uri().unwrap_or_default(),
            deps: &asset.deps,
            version: asset.version.as_deref(),
            placement,
        };

        match ctx.host.enqueue(request) {
            Ok(()) => asset.loaded = true,
            Err(HostError::MissingEnqueueFunction { function }) => {
                ctx.diagnostics
                    .raise(Diagnostic::invalid_enqueue_function(asset, &function));
            }
        }
    }

    /// Replace a record's load method. Returns false for unknown handles.
    pub(crate) fn set_load_method(&mut self, handle: &str, method: LoadMethod) -> bool {
        match self.index.get(handle).and_then(|&idx| self.assets.get_mut(idx)) {
            Some(asset) => {
                asset.load_method = method;
                true
            }
            None => false,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
