//! # Manifest
//!
//! A JSON description of one page render: engine configuration, request
//! conditions, the host's native asset table and every registration.
//!
//! ```json
//! {
//!   "config": { "asset_root": "assets" },
//!   "conditions": { "single": true },
//!   "host": { "scripts": [{ "handle": "jquery", "src": "/js/jquery.js" }] },
//!   "scripts": [{ "handle": "app", "src": "js/app.js", "deps": ["jquery"] }],
//!   "styles": [],
//!   "preloads": [],
//!   "symbols": [{ "handle": "logo", "src": "logo.svg" }],
//!   "load_methods": { "app": "defer" }
//! }
//! ```
//!
//! Relative `asset_root` and `svg_directory` resolve against the
//! manifest's own directory.

use crate::cli::CliError;
use asset_manager_core::{
    AssetKind, AssetManager, AssetSpec, ConditionSet, EngineConfig, LoadMethod, NativeAsset,
    StaticHost, SymbolSpec,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The host's own asset table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostManifest {
    pub scripts: Vec<NativeAsset>,
    pub styles: Vec<NativeAsset>,
    /// Families whose enqueue function is missing.
    pub unavailable: Vec<AssetKind>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub config: EngineConfig,
    /// Overlaid on the default condition set.
    pub conditions: BTreeMap<String, bool>,
    pub host: HostManifest,
    pub scripts: Vec<AssetSpec>,
    pub styles: Vec<AssetSpec>,
    pub preloads: Vec<AssetSpec>,
    pub symbols: Vec<SymbolSpec>,
    /// Script load method changes applied after registration.
    pub load_methods: IndexMap<String, LoadMethod>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Manifest {
    /// Read a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest: Self =
            serde_json::from_str(&content).map_err(|source| CliError::Manifest {
                path: path.to_path_buf(),
                source,
            })?;
        manifest.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        debug!(path = %path.display(), "manifest loaded");
        Ok(manifest)
    }

    /// Parse a manifest from a string. Relative paths resolve against `base_dir`.
    pub fn from_json(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self, CliError> {
        let mut manifest: Self = serde_json::from_str(content)?;
        manifest.base_dir = base_dir.into();
        Ok(manifest)
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Engine configuration with relative directories resolved.
    #[must_use]
    pub fn resolved_config(&self, quiet: bool) -> EngineConfig {
        let mut config = self.config.clone();
        config.quiet = config.quiet || quiet;
        if config.asset_root.is_relative() {
            config.asset_root = self.base_dir.join(&config.asset_root);
        }
        if config.svg_directory.is_relative() {
            config.svg_directory = self.base_dir.join(&config.svg_directory);
        }
        config
    }

    #[must_use]
    pub fn host(&self) -> StaticHost {
        let mut host = StaticHost::new();
        for asset in &self.host.scripts {
            host.register(AssetKind::Script, asset.clone());
        }
        for asset in &self.host.styles {
            host.register(AssetKind::Style, asset.clone());
        }
        for &kind in &self.host.unavailable {
            host.disable_enqueue(kind);
        }
        host
    }

    /// Build a manager and run every registration in manifest order.
    pub fn build(&self, quiet: bool) -> Result<AssetManager<StaticHost>, CliError> {
        let mut conditions = ConditionSet::new();
        conditions.extend(self.conditions.iter().map(|(name, &value)| (name.as_str(), value)));

        let mut manager =
            AssetManager::new(self.resolved_config(quiet), self.host())?.with_conditions(conditions);

        for spec in &self.scripts {
            manager.enqueue_script(spec.clone());
        }
        for spec in &self.styles {
            manager.enqueue_style(spec.clone());
        }
        for spec in &self.preloads {
            manager.preload(spec.clone());
        }
        for (handle, &method) in &self.load_methods {
            if !manager.modify_load_method(handle, method) {
                debug!(handle = %handle, method = %method, "load method change rejected");
            }
        }
        for spec in &self.symbols {
            manager.register_symbol(spec.clone())?;
        }

        info!(
            scripts = manager.scripts().len(),
            styles = manager.styles().len(),
            preloads = manager.preloads().len(),
            symbols = manager.sprite().len(),
            "manifest registered"
        );
        Ok(manager)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manifest_uses_defaults() -> Result<(), CliError> {
        let manifest = Manifest::from_json("{}", "/srv/site")?;
        assert_eq!(manifest.config, EngineConfig::default());
        assert!(manifest.scripts.is_empty());

        let config = manifest.resolved_config(false);
        assert_eq!(config.asset_root, Path::new("/srv/site").join("."));
        assert!(!config.quiet);
        Ok(())
    }

    #[test]
    fn quiet_flag_overrides_config() -> Result<(), CliError> {
        let manifest = Manifest::from_json("{\"config\": {\"quiet\": false}}", ".")?;
        assert!(manifest.resolved_config(true).quiet);
        Ok(())
    }

    #[test]
    fn absolute_directories_are_kept() -> Result<(), CliError> {
        let manifest = Manifest::from_json(
            "{\"config\": {\"asset_root\": \"/var/www\", \"svg_directory\": \"icons\"}}",
            "/srv/site",
        )?;
        let config = manifest.resolved_config(false);
        assert_eq!(config.asset_root, PathBuf::from("/var/www"));
        assert_eq!(config.svg_directory, PathBuf::from("/srv/site/icons"));
        Ok(())
    }

    #[test]
    fn build_registers_everything() -> Result<(), CliError> {
        let manifest = Manifest::from_json(
            r#"{
                "conditions": { "single": true },
                "host": { "scripts": [{ "handle": "jquery", "src": "/js/jquery.js" }] },
                "scripts": [
                    { "handle": "app", "src": "js/app.js", "deps": ["jquery"] },
                    { "handle": "post", "src": "js/post.js", "condition": "single" },
                    { "handle": "search", "src": "js/search.js", "condition": "search" }
                ],
                "styles": [{ "handle": "main", "src": "css/main.css" }],
                "load_methods": { "app": "defer" }
            }"#,
            ".",
        )?;
        let manager = manifest.build(false)?;

        assert!(manager.scripts().contains("app"));
        assert!(manager.scripts().contains("post"));
        assert!(!manager.scripts().contains("search"));
        assert!(manager.styles().contains("main"));
        assert!(manager.scripts().get("app").is_some_and(|a| a.load_method == LoadMethod::Defer));
        Ok(())
    }

    #[test]
    fn unavailable_family_is_disabled() -> Result<(), CliError> {
        let manifest = Manifest::from_json(
            r#"{ "host": { "unavailable": ["style"] }, "styles": [{ "handle": "main", "src": "css/main.css" }] }"#,
            ".",
        )?;
        let manager = manifest.build(false)?;
        assert!(!manager.host().is_enqueued(AssetKind::Style, "main"));
        assert_eq!(manager.diagnostics().len(), 1);
        Ok(())
    }
}
