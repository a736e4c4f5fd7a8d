//! # Dependency Validation
//!
//! Runs once per render cycle for every record in a registry. Records added
//! after a pass (by bridging or late registration) are validated by the next
//! pass. An earlier record that gains dependents gets its dependents list
//! recomputed and its family checks re-run; a family diagnostic is raised
//! at most once per record and counterpart.
//!
//! For each record, in insertion order:
//!
//! 1. collect dependents
//! 2. bridge host-native dependencies into the registry
//! 3. reject an unknown load point (`invalid_load_hook`)
//! 4. per dependency: `missing`, `unsafe_load_hook`, `circular_dependency`
//! 5. family post-validation
//!
//! Only direct mutual pairs are detected as cycles. Each pair is reported once.

use crate::diagnostics::Diagnostic;
use crate::family::{Companion, Family};
use crate::registry::{AssetRegistry, AssetTable, Context};
use crate::types::{Asset, AssetSource, AssetSpec, LoadMethod, Stage};
use tracing::debug;

impl<F: Family> AssetRegistry<F> {
    /// Handles of records that list `handle` as a dependency, in insertion order.
    #[must_use]
    pub fn find_dependents(&self, handle: &str) -> Vec<String> {
        self.assets
            .iter()
            .filter(|asset| asset.depends_on(handle))
            .map(|asset| asset.handle.clone())
            .collect()
    }

    /// Whether every record has been through a validation pass.
    #[must_use]
    pub fn is_validated(&self) -> bool {
        self.validated >= self.assets.len()
    }

    /// Validate every record not yet validated this cycle.
    pub fn validate(&mut self, ctx: &mut Context<'_>) -> Vec<Companion> {
        let mut companions = Vec::new();
        let mut idx = self.validated;
        while idx < self.assets.len() {
            companions.extend(self.validate_at(idx, ctx));
            idx += 1;
        }
        self.validated = self.assets.len();
        self.revisit_dependencies(ctx);
        debug!(kind = %F::KIND, assets = self.assets.len(), "validation pass complete");
        companions
    }

    /// Refresh records whose dependents changed since they were validated.
    fn revisit_dependencies(&mut self, ctx: &mut Context<'_>) {
        for idx in 0..self.assets.len() {
            let Some(asset) = self.assets.get(idx) else {
                continue;
            };
            let dependents = self.find_dependents(&asset.handle);
            if asset.stage == Stage::Registered || asset.dependents == dependents {
                continue;
            }

            let mut asset = asset.clone();
            debug!(kind = %F::KIND, handle = %asset.handle, "dependents changed, revalidating");
            asset.dependents = dependents;
            if ctx.config.is_configured(&asset.load_hook) {
                self.run_family_checks(&mut asset, ctx);
            }
            if let Some(slot) = self.assets.get_mut(idx) {
                *slot = asset;
            }
        }
    }

    fn run_family_checks(&mut self, asset: &mut Asset, ctx: &mut Context<'_>) {
        let peers = AssetTable::new(&self.assets, &self.index);
        let diagnostics = self.family.post_validate(asset, &peers);
        for diagnostic in diagnostics {
            let key = (diagnostic.code, diagnostic.handle.clone(), diagnostic.related.clone());
            if self.reported.insert(key) {
                ctx.diagnostics.raise(diagnostic);
            }
        }
    }

    fn validate_at(&mut self, idx: usize, ctx: &mut Context<'_>) -> Vec<Companion> {
        let Some(mut asset) = self.assets.get(idx).cloned() else {
            return Vec::new();
        };
        let mut companions = Vec::new();
        for dep in &asset.deps {
            companions.extend(self.add_core_asset(dep, asset.load_method, ctx));
        }
        asset.dependents = self.find_dependents(&asset.handle);

        let Some(position) = ctx.config.position(&asset.load_hook) else {
            ctx.diagnostics.raise(Diagnostic::invalid_load_hook(&asset));
            self.store_validated(idx, asset);
            return companions;
        };

        for dep in &asset.deps {
            let Some(dependency) = self.get(dep) else {
                ctx.diagnostics.raise(Diagnostic::missing(&asset, dep));
                continue;
            };

            let loads_later = ctx
                .config
                .position(&dependency.load_hook)
                .is_some_and(|dep_position| dep_position > position);
            if loads_later {
                ctx.diagnostics
                    .raise(Diagnostic::unsafe_load_hook(dependency, &asset));
            }

            if dependency.depends_on(&asset.handle) {
                let pair = if asset.handle <= dependency.handle {
                    (asset.handle.clone(), dependency.handle.clone())
                } else {
                    (dependency.handle.clone(), asset.handle.clone())
                };
                if self.reported_cycles.insert(pair) {
                    ctx.diagnostics
                        .raise(Diagnostic::circular_dependency(&asset, dep));
                }
            }
        }

        self.run_family_checks(&mut asset, ctx);
        self.store_validated(idx, asset);
        companions
    }

    fn store_validated(&mut self, idx: usize, mut asset: Asset) {
        if asset.stage == Stage::Registered {
            asset.stage = Stage::Validated;
        }
        if let Some(slot) = self.assets.get_mut(idx) {
            *slot = asset;
        }
    }

    /// Bridge a host-native asset into this registry.
    ///
    /// Does nothing when the handle is already registered or the host does
    /// not know it. A host asset that is not yet enqueued inherits the
    /// dependent's load method.
    pub fn add_core_asset(
        &mut self,
        handle: &str,
        dependent_method: LoadMethod,
        ctx: &mut Context<'_>,
    ) -> Vec<Companion> {
        if self.contains(handle) {
            return Vec::new();
        }
        let Some(native) = ctx.host.native_asset(F::KIND, handle) else {
            return Vec::new();
        };

        debug!(kind = %F::KIND, handle, enqueued = native.enqueued, "bridging host asset");
        let load_method = if native.enqueued {
            LoadMethod::Sync
        } else {
            dependent_method
        };
        let spec = AssetSpec {
            handle: native.handle,
            src: Some(AssetSource::Uri(native.src)),
            deps: native.deps,
            load_method: Some(load_method.as_str().to_string()),
            load_hook: Some(ctx.config.point_for(native.in_footer).to_string()),
            in_footer: Some(native.in_footer),
            version: native.version,
            loaded: native.enqueued,
            ..AssetSpec::default()
        };
        self.add(spec, ctx)
    }
}

// =============================================================================
// TESTS
// =============================================================================
