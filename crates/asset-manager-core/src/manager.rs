//! # Asset Manager
//!
//! One render cycle: three registries, the sprite, the diagnostic sink and
//! the host pipeline, driven by a hook schedule.
//!
//! ```text
//! for point in load points (document order):
//!     for (family, action) sorted by priority at that point:
//!         validate  -> AssetRegistry::validate   (new records, then changed dependents)
//!         load      -> AssetRegistry::load_assets
//! ```
//!
//! Companion assets requested by a family (the loadCSS shim, preload hints
//! for deprecated style preloads) are routed to their registry here.

use crate::conditions::ConditionSet;
use crate::config::EngineConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{ConfigError, SpriteError};
use crate::family::{Companion, Preloads, Scripts, Styles};
use crate::host::HostPipeline;
use crate::registry::{AddFilter, AssetRegistry, Context};
use crate::sprite::{SvgSprite, SymbolSpec};
use crate::types::{AssetKind, AssetSpec, LoadMethod};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info};

// =============================================================================
// HOOK SCHEDULE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HookAction {
    Validate,
    Load,
}

/// One callback in the render cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookCallback {
    pub point: String,
    pub kind: AssetKind,
    pub action: HookAction,
    pub priority: i32,
}

// =============================================================================
// REGISTRIES
// =============================================================================

#[derive(Debug, Default)]
pub struct Registries {
    pub scripts: AssetRegistry<Scripts>,
    pub styles: AssetRegistry<Styles>,
    pub preloads: AssetRegistry<Preloads>,
}

impl Registries {
    fn add(&mut self, kind: AssetKind, spec: AssetSpec, ctx: &mut Context<'_>) -> Vec<Companion> {
        match kind {
            AssetKind::Script => self.scripts.add(spec, ctx),
            AssetKind::Style => self.styles.add(spec, ctx),
            AssetKind::Preload => self.preloads.add(spec, ctx),
        }
    }

    /// Register companions until none are left.
    fn dispatch(&mut self, companions: Vec<Companion>, ctx: &mut Context<'_>) {
        let mut queue: VecDeque<Companion> = companions.into();
        while let Some(companion) = queue.pop_front() {
            let (kind, spec) = match companion {
                Companion::Script(spec) => (AssetKind::Script, spec),
                Companion::Preload(spec) => (AssetKind::Preload, spec),
            };
            debug!(kind = %kind, handle = %spec.handle, "registering companion");
            queue.extend(self.add(kind, spec, ctx));
        }
    }

    fn clear(&mut self) {
        self.scripts.clear();
        self.styles.clear();
        self.preloads.clear();
    }
}

// =============================================================================
// MANAGER
// =============================================================================

pub struct AssetManager<H: HostPipeline> {
    config: EngineConfig,
    conditions: ConditionSet,
    host: H,
    registries: Registries,
    sprite: SvgSprite,
    diagnostics: Diagnostics,
    filter: Option<Box<AddFilter>>,
}

impl<H: HostPipeline + fmt::Debug> fmt::Debug for AssetManager<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetManager")
            .field("config", &self.config)
            .field("conditions", &self.conditions)
            .field("host", &self.host)
            .field("registries", &self.registries)
            .field("sprite", &self.sprite)
            .field("diagnostics", &self.diagnostics)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

impl<H: HostPipeline> AssetManager<H> {
    /// Build a manager. Fails on an invalid load point configuration.
    pub fn new(config: EngineConfig, host: H) -> Result<Self, ConfigError> {
        config.validate()?;
        let diagnostics = Diagnostics::new(config.quiet, config.show_diagnostics);
        let sprite = SvgSprite::new(config.svg_directory.clone(), config.svg_attributes.clone());
        info!(
            load_points = config.load_points.len(),
            quiet = config.quiet,
            "asset manager ready"
        );
        Ok(Self {
            config,
            conditions: ConditionSet::new(),
            host,
            registries: Registries::default(),
            sprite,
            diagnostics,
            filter: None,
        })
    }

    #[must_use]
    pub fn with_conditions(mut self, conditions: ConditionSet) -> Self {
        self.conditions = conditions;
        self
    }

    /// Veto registrations. The filter sees the family and the raw spec.
    pub fn set_add_filter<F>(&mut self, filter: F)
    where
        F: Fn(AssetKind, &AssetSpec) -> bool + 'static,
    {
        self.filter = Some(Box::new(filter));
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn conditions(&self) -> &ConditionSet {
        &self.conditions
    }

    pub fn conditions_mut(&mut self) -> &mut ConditionSet {
        &mut self.conditions
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn scripts(&self) -> &AssetRegistry<Scripts> {
        &self.registries.scripts
    }

    #[must_use]
    pub fn styles(&self) -> &AssetRegistry<Styles> {
        &self.registries.styles
    }

    #[must_use]
    pub fn preloads(&self) -> &AssetRegistry<Preloads> {
        &self.registries.preloads
    }

    #[must_use]
    pub fn sprite(&self) -> &SvgSprite {
        &self.sprite
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn parts(&mut self) -> (&mut Registries, Context<'_>) {
        (
            &mut self.registries,
            Context {
                config: &self.config,
                conditions: &self.conditions,
                host: &mut self.host,
                diagnostics: &mut self.diagnostics,
                filter: self.filter.as_deref(),
            },
        )
    }

    fn add(&mut self, kind: AssetKind, spec: AssetSpec) {
        let (registries, mut ctx) = self.parts();
        let companions = registries.add(kind, spec, &mut ctx);
        registries.dispatch(companions, &mut ctx);
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    pub fn enqueue_script(&mut self, spec: AssetSpec) {
        self.add(AssetKind::Script, spec);
    }

    pub fn enqueue_style(&mut self, spec: AssetSpec) {
        self.add(AssetKind::Style, spec);
    }

    pub fn preload(&mut self, spec: AssetSpec) {
        self.add(AssetKind::Preload, spec);
    }

    /// Change a registered script's load method.
    pub fn modify_load_method(&mut self, handle: &str, method: LoadMethod) -> bool {
        let (registries, mut ctx) = self.parts();
        registries.scripts.modify_load_method(handle, method, &mut ctx)
    }

    // -------------------------------------------------------------------------
    // Script tag adapter
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn filter_script_tag(&self, tag: &str, handle: &str) -> String {
        self.registries.scripts.filter_script_tag(tag, handle)
    }

    #[must_use]
    pub fn allow_concat(&self, handle: &str) -> bool {
        self.registries.scripts.allow_concat(handle)
    }

    // -------------------------------------------------------------------------
    // Symbols
    // -------------------------------------------------------------------------

    pub fn register_symbol(&mut self, spec: SymbolSpec) -> Result<bool, SpriteError> {
        self.sprite.register(spec, &self.conditions)
    }

    pub fn deregister_symbol(&mut self, handle: &str) -> bool {
        self.sprite.remove(handle)
    }

    #[must_use]
    pub fn symbol_is_registered(&self, handle: &str) -> bool {
        self.sprite.is_registered(handle)
    }

    #[must_use]
    pub fn get_symbol(&self, handle: &str, attrs: &IndexMap<String, serde_json::Value>) -> String {
        self.sprite.get_reference(handle, attrs)
    }

    #[must_use]
    pub fn sprite_sheet(&self) -> String {
        self.sprite.sheet()
    }

    // -------------------------------------------------------------------------
    // Render cycle
    // -------------------------------------------------------------------------

    /// Every validate and load callback, by load point then priority.
    #[must_use]
    pub fn hook_schedule(&self) -> Vec<HookCallback> {
        let mut schedule = Vec::new();
        for point in &self.config.load_points {
            let mut callbacks: Vec<HookCallback> = AssetKind::ALL
                .iter()
                .flat_map(|&kind| {
                    [
                        HookCallback {
                            point: point.name.clone(),
                            kind,
                            action: HookAction::Validate,
                            priority: point.validate_priority,
                        },
                        HookCallback {
                            point: point.name.clone(),
                            kind,
                            action: HookAction::Load,
                            priority: point.load_priority,
                        },
                    ]
                })
                .collect();
            callbacks.sort_by_key(|callback| callback.priority);
            schedule.extend(callbacks);
        }
        schedule
    }

    /// Run one callback. Returns its markup, including pending diagnostics.
    pub fn run_hook(&mut self, point: &str, kind: AssetKind, action: HookAction) -> String {
        let (registries, mut ctx) = self.parts();
        let mut output = ctx.diagnostics.take_markup();

        match action {
            HookAction::Validate => {
                let companions = match kind {
                    AssetKind::Script => registries.scripts.validate(&mut ctx),
                    AssetKind::Style => registries.styles.validate(&mut ctx),
                    AssetKind::Preload => registries.preloads.validate(&mut ctx),
                };
                registries.dispatch(companions, &mut ctx);
            }
            HookAction::Load => {
                let markup = match kind {
                    AssetKind::Script => registries.scripts.load_assets(point, &mut ctx),
                    AssetKind::Style => registries.styles.load_assets(point, &mut ctx),
                    AssetKind::Preload => registries.preloads.load_assets(point, &mut ctx),
                };
                output.push_str(&markup);
            }
        }

        output.push_str(&ctx.diagnostics.take_markup());
        output
    }

    /// Run every callback scheduled at `point`.
    pub fn render_point(&mut self, point: &str) -> String {
        let callbacks: Vec<HookCallback> = self
            .hook_schedule()
            .into_iter()
            .filter(|callback| callback.point == point)
            .collect();
        callbacks
            .iter()
            .map(|callback| self.run_hook(&callback.point, callback.kind, callback.action))
            .collect()
    }

    /// Start a new render cycle.
    pub fn reset(&mut self) {
        self.registries.clear();
        self.sprite.clear();
        self.diagnostics.clear();
        debug!("render cycle reset");
    }
}

// =============================================================================
// TESTS
// =============================================================================
