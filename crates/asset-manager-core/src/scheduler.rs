//! # Load Scheduling
//!
//! At each load point, a registry emits every record that is due and not
//! yet loaded, in insertion order. Emission marks the record loaded, so an
//! asset is printed at most once per cycle.
//!
//! A record is due at point `P` when its own point is at or before `P`, or
//! when its point is not configured at all (it is emitted as early as
//! possible; validation reports the bad point separately).
//!
//! Records whose method belongs to the host are never rendered here. If the
//! host enqueue failed, the failure was already reported at registration;
//! the record is marked loaded and skipped.

use crate::config::EngineConfig;
use crate::diagnostics::Diagnostic;
use crate::family::Family;
use crate::registry::{AssetRegistry, Context};
use crate::types::{Asset, Stage};
use tracing::debug;

/// Whether `asset` should be emitted at `current_point`.
#[must_use]
pub fn should_load(asset: &Asset, current_point: &str, config: &EngineConfig) -> bool {
    if asset.loaded || asset.load_hook.is_empty() || !asset.has_src() {
        return false;
    }
    match (config.position(&asset.load_hook), config.position(current_point)) {
        (None, _) => true,
        (Some(target), Some(current)) => target <= current,
        (Some(_), None) => false,
    }
}

impl<F: Family> AssetRegistry<F> {
    /// Render every record due at `point`. Diagnostic markup raised while
    /// rendering a record precedes that record's markup.
    pub fn load_assets(&mut self, point: &str, ctx: &mut Context<'_>) -> String {
        let mut output = String::new();
        for idx in 0..self.assets.len() {
            let Some(asset) = self.assets.get(idx) else {
                continue;
            };
            if !should_load(asset, point, ctx.config) {
                continue;
            }
            if F::HOST_METHODS.contains(&asset.load_method) {
                debug!(kind = %F::KIND, handle = %asset.handle, "host-owned asset skipped");
                if let Some(asset) = self.assets.get_mut(idx) {
                    asset.loaded = true;
                }
                continue;
            }

            let markup = self.family.render(asset, ctx.config, ctx.diagnostics);
            if markup.is_none() {
                ctx.diagnostics.raise(Diagnostic::cannot_print(asset));
            }
            output.push_str(&ctx.diagnostics.take_markup());
            output.push_str(&markup.unwrap_or_default());

            if let Some(asset) = self.assets.get_mut(idx) {
                asset.loaded = true;
                asset.stage = Stage::Emitted;
                debug!(kind = %F::KIND, handle = %asset.handle, point, "asset emitted");
            }
        }
        output
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticCode, Diagnostics};
    use crate::family::{Scripts, Styles};
    use crate::registry::tests::Harness;
    use crate::types::{AssetKind, AssetSource, AssetSpec, LoadMethod};
    use serde_json::json;

    /// A family with no renderer for its only method.
    #[derive(Debug, Default)]
    struct Unprintable;

    impl Family for Unprintable {
        const KIND: AssetKind = AssetKind::Preload;
        const LOAD_METHODS: &'static [LoadMethod] = &[LoadMethod::Preload];
        const HOST_METHODS: &'static [LoadMethod] = &[];
        const DEFAULT_METHOD: LoadMethod = LoadMethod::Preload;

        fn render(&self, _: &Asset, _: &EngineConfig, _: &mut Diagnostics) -> Option<String> {
            None
        }
    }

    fn inline_data(handle: &str, hook: &str) -> AssetSpec {
        let mut spec = AssetSpec::new(handle, "").load_method(LoadMethod::Inline).load_hook(hook);
        spec.src = Some(AssetSource::Data(json!({ "handle": handle })));
        spec
    }

    #[test]
    fn due_at_same_or_later_point() {
        let mut harness = Harness::new();
        let mut scripts = AssetRegistry::<Scripts>::new();
        scripts.add(inline_data("a", "head"), &mut harness.ctx());
        let config = EngineConfig::default();
        let asset = scripts.get("a");

        assert!(asset.is_some_and(|a| !should_load(a, "critical", &config)));
        assert!(asset.is_some_and(|a| should_load(a, "head", &config)));
        assert!(asset.is_some_and(|a| should_load(a, "footer", &config)));
        assert!(asset.is_some_and(|a| !should_load(a, "unknown", &config)));
    }

    #[test]
    fn unconfigured_hook_loads_immediately() {
        let mut harness = Harness::new();
        let mut scripts = AssetRegistry::<Scripts>::new();
        scripts.add(inline_data("a", "body_open"), &mut harness.ctx());

        let output = scripts.load_assets("critical", &mut harness.ctx());
        assert!(output.contains("window.amScripts[\"a\"]"));
    }

    #[test]
    fn each_asset_emitted_exactly_once() {
        let mut harness = Harness::new();
        let mut scripts = AssetRegistry::<Scripts>::new();
        scripts.add(inline_data("a", "head"), &mut harness.ctx());
        scripts.add(inline_data("b", "footer"), &mut harness.ctx());

        let critical = scripts.load_assets("critical", &mut harness.ctx());
        let head = scripts.load_assets("head", &mut harness.ctx());
        let footer = scripts.load_assets("footer", &mut harness.ctx());

        assert!(critical.is_empty());
        assert_eq!(head.matches("<script").count(), 1);
        assert!(head.contains("window.amScripts[\"a\"]"));
        assert_eq!(footer.matches("<script").count(), 1);
        assert!(footer.contains("window.amScripts[\"b\"]"));
        assert!(scripts.assets().iter().all(|a| a.loaded && a.stage == Stage::Emitted));
    }

    #[test]
    fn emission_follows_insertion_order() {
        let mut harness = Harness::new();
        let mut scripts = AssetRegistry::<Scripts>::new();
        scripts.add(inline_data("second-point", "head"), &mut harness.ctx());
        scripts.add(inline_data("first-point", "critical"), &mut harness.ctx());

        let output = scripts.load_assets("head", &mut harness.ctx());
        let second = output.find("second-point");
        let first = output.find("first-point");
        assert!(matches!((second, first), (Some(s), Some(f)) if s < f));
    }

    #[test]
    fn loaded_and_sourceless_assets_skipped() {
        let mut harness = Harness::new();
        let mut scripts = AssetRegistry::<Scripts>::new();
        scripts.add(AssetSpec::new("host", "js/host.js"), &mut harness.ctx());
        scripts.add(
            AssetSpec::new("empty", "").load_method(LoadMethod::Inline),
            &mut harness.ctx(),
        );

        let output = scripts.load_assets("footer", &mut harness.ctx());
        assert!(output.is_empty());
        assert!(harness.diagnostics.is_empty());
    }

    #[test]
    fn failed_host_enqueue_reported_once() {
        let mut harness = Harness::new();
        harness.host.disable_enqueue(AssetKind::Style);
        let mut styles = AssetRegistry::<Styles>::new();
        styles.add(AssetSpec::new("main", "css/main.css"), &mut harness.ctx());
        styles.validate(&mut harness.ctx());

        let output = styles.load_assets("head", &mut harness.ctx());
        assert_eq!(harness.diagnostics.len(), 1);
        assert!(harness.diagnostics.has(DiagnosticCode::InvalidEnqueueFunction));
        assert!(!harness.diagnostics.has(DiagnosticCode::CannotPrint));
        assert!(!output.contains("<link"));
        assert!(styles.get("main").is_some_and(|a| a.loaded));
    }

    #[test]
    fn unrenderable_method_reports_cannot_print() {
        let mut harness = Harness::new();
        let mut registry = AssetRegistry::<Unprintable>::new();
        registry.add(AssetSpec::new("hint", "img/hero.png"), &mut harness.ctx());

        let output = registry.load_assets("head", &mut harness.ctx());
        assert!(harness.diagnostics.has(DiagnosticCode::CannotPrint));
        assert!(output.contains("<em>cannot_print</em>"));
        assert!(registry.get("hint").is_some_and(|a| a.loaded));
    }
}
