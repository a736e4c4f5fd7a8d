//! # Engine Configuration
//!
//! The ordered load points, diagnostic switches and local paths the engine
//! runs with. Deserializable so a manifest can override any field; missing
//! fields keep their defaults.
//!
//! ```text
//! critical (validate 15, load 20) ─► head (1, 5) ─► footer (12, 15)
//! ```

use crate::error::ConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Source name of the bundled loadCSS shim. The only inline source that
/// is not read from under `asset_root`.
pub const BUNDLED_LOADCSS: &str = "bundled:loadCSS.min.js";

/// The bundled loadCSS shim.
pub const LOADCSS_SHIM: &str = include_str!("../js/loadCSS.min.js");

/// Default class on every emitted tag.
pub const DEFAULT_CLASS: &str = "asset-manager";

/// Default global namespace for inline script data.
pub const DEFAULT_INLINE_CONTEXT: &str = "amScripts";

// =============================================================================
// LOAD POINT
// =============================================================================

/// A named point in page rendering where assets may be emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadPoint {
    pub name: String,
    /// Priority of the validation callback at this point (lower runs first).
    pub validate_priority: i32,
    /// Priority of the emission callback at this point.
    pub load_priority: i32,
}

impl LoadPoint {
    #[must_use]
    pub fn new(name: impl Into<String>, validate_priority: i32, load_priority: i32) -> Self {
        Self {
            name: name.into(),
            validate_priority,
            load_priority,
        }
    }
}

// =============================================================================
// ENGINE CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Load points in document order.
    pub load_points: Vec<LoadPoint>,
    /// Default point for assets not placed in the footer.
    pub head_point: String,
    /// Default point for footer assets. Anything at or after it is footer phase.
    pub footer_point: String,
    /// Classes added to every emitted tag, before the asset handle.
    pub default_classes: Vec<String>,
    /// Suppress diagnostic markup. Diagnostics are still recorded and logged.
    pub quiet: bool,
    /// Whether the viewer may see diagnostic markup.
    pub show_diagnostics: bool,
    /// Global object that receives inline script data.
    pub inline_script_context: String,
    /// Root directory inline sources must resolve inside.
    pub asset_root: PathBuf,
    /// Source of the loadCSS shim: [`BUNDLED_LOADCSS`] or a path under `asset_root`.
    pub loadcss_src: String,
    /// Base directory for relative symbol paths.
    pub svg_directory: PathBuf,
    /// Attributes applied to every symbol reference.
    pub svg_attributes: IndexMap<String, serde_json::Value>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            load_points: vec![
                LoadPoint::new("critical", 15, 20),
                LoadPoint::new("head", 1, 5),
                LoadPoint::new("footer", 12, 15),
            ],
            head_point: "head".to_string(),
            footer_point: "footer".to_string(),
            default_classes: vec![DEFAULT_CLASS.to_string()],
            quiet: false,
            show_diagnostics: true,
            inline_script_context: DEFAULT_INLINE_CONTEXT.to_string(),
            asset_root: PathBuf::from("."),
            loadcss_src: BUNDLED_LOADCSS.to_string(),
            svg_directory: PathBuf::from("."),
            svg_attributes: IndexMap::new(),
        }
    }
}

impl EngineConfig {
    /// Check load point names and ordering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.load_points.is_empty() {
            return Err(ConfigError::NoLoadPoints);
        }

        let mut seen = BTreeSet::new();
        for point in &self.load_points {
            if point.name.is_empty() {
                return Err(ConfigError::EmptyLoadPoint);
            }
            if !seen.insert(point.name.as_str()) {
                return Err(ConfigError::DuplicateLoadPoint(point.name.clone()));
            }
        }

        let head = self.position(&self.head_point).ok_or_else(|| ConfigError::UnknownPoint {
            role: "head",
            name: self.head_point.clone(),
        })?;
        let footer = self.position(&self.footer_point).ok_or_else(|| ConfigError::UnknownPoint {
            role: "footer",
            name: self.footer_point.clone(),
        })?;
        if footer < head {
            return Err(ConfigError::FooterBeforeHead {
                head: self.head_point.clone(),
                footer: self.footer_point.clone(),
            });
        }
        Ok(())
    }

    /// Index of a load point in document order.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.load_points.iter().position(|point| point.name == name)
    }

    #[must_use]
    pub fn load_point(&self, name: &str) -> Option<&LoadPoint> {
        self.load_points.iter().find(|point| point.name == name)
    }

    #[must_use]
    pub fn is_configured(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// The first configured load point.
    #[must_use]
    pub fn earliest_point(&self) -> &str {
        self.load_points
            .first()
            .map(|point| point.name.as_str())
            .unwrap_or(self.head_point.as_str())
    }

    /// True when `name` is the footer point or ordered after it.
    #[must_use]
    pub fn is_footer_phase(&self, name: &str) -> bool {
        match (self.position(name), self.position(&self.footer_point)) {
            (Some(point), Some(footer)) => point >= footer,
            _ => false,
        }
    }

    /// Default load point for an asset's footer flag.
    #[must_use]
    pub fn point_for(&self, in_footer: bool) -> &str {
        if in_footer {
            &self.footer_point
        } else {
            &self.head_point
        }
    }

    /// Whether diagnostic markup may be emitted.
    #[must_use]
    pub fn diagnostics_visible(&self) -> bool {
        self.show_diagnostics && !self.quiet
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_validate() {
        let config = EngineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.position("critical"), Some(0));
        assert_eq!(config.position("footer"), Some(2));
        assert_eq!(config.earliest_point(), "critical");
    }

    #[test]
    fn footer_phase() {
        let mut config = EngineConfig::default();
        config.load_points.push(LoadPoint::new("late", 20, 25));
        assert!(config.is_footer_phase("footer"));
        assert!(config.is_footer_phase("late"));
        assert!(!config.is_footer_phase("head"));
        assert!(!config.is_footer_phase("unknown"));
    }

    #[test]
    fn point_for_footer_flag() {
        let config = EngineConfig::default();
        assert_eq!(config.point_for(true), "footer");
        assert_eq!(config.point_for(false), "head");
    }

    #[test]
    fn rejects_empty_points() {
        let config = EngineConfig {
            load_points: Vec::new(),
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoLoadPoints));
    }

    #[test]
    fn rejects_duplicate_points() {
        let mut config = EngineConfig::default();
        config.load_points.push(LoadPoint::new("head", 2, 6));
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateLoadPoint("head".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_head_point() {
        let config = EngineConfig {
            head_point: "body".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownPoint { role: "head", .. })
        ));
    }

    #[test]
    fn rejects_footer_before_head() {
        let config = EngineConfig {
            head_point: "footer".to_string(),
            footer_point: "head".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FooterBeforeHead { .. })
        ));
    }

    #[test]
    fn partial_override_keeps_defaults() -> Result<(), serde_json::Error> {
        let config: EngineConfig = serde_json::from_value(json!({
            "quiet": true,
            "inline_script_context": "siteData"
        }))?;
        assert!(config.quiet);
        assert!(!config.diagnostics_visible());
        assert_eq!(config.inline_script_context, "siteData");
        assert_eq!(config.load_points.len(), 3);
        assert_eq!(config.default_classes, vec![DEFAULT_CLASS.to_string()]);
        Ok(())
    }
}
