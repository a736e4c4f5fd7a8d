//! # Asset Types
//!
//! Caller-facing asset configuration ([`AssetSpec`]) and the normalized
//! record stored by a registry ([`Asset`]).
//!
//! `AssetSpec` keeps every field optional; the registry applies the
//! defaulting rules when it turns a spec into an `Asset`.

use crate::conditions::Condition;
use crate::error::UnknownLoadMethod;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// ASSET FAMILY
// =============================================================================

/// The family an asset belongs to. Assigned by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Script,
    Style,
    Preload,
}

impl AssetKind {
    /// All registry-backed families, in hook registration order.
    pub const ALL: [AssetKind; 3] = [AssetKind::Script, AssetKind::Style, AssetKind::Preload];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Style => "style",
            Self::Preload => "preload",
        }
    }

    /// Name of the host enqueue function this family delegates to.
    #[must_use]
    pub fn enqueue_function(self) -> String {
        format!("enqueue_{}", self.as_str())
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// LOAD METHOD
// =============================================================================

/// In-document loading strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadMethod {
    Sync,
    Async,
    Defer,
    AsyncDefer,
    Inline,
    Preload,
}

impl LoadMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Async => "async",
            Self::Defer => "defer",
            Self::AsyncDefer => "async-defer",
            Self::Inline => "inline",
            Self::Preload => "preload",
        }
    }

    /// Boolean HTML attribute(s) carried by a `<script src>` tag loaded this way.
    #[must_use]
    pub fn script_attribute(self) -> Option<&'static str> {
        match self {
            Self::Async => Some("async"),
            Self::Defer => Some("defer"),
            Self::AsyncDefer => Some("async defer"),
            _ => None,
        }
    }

    /// True for async, defer and async-defer.
    #[must_use]
    pub fn is_deferred(self) -> bool {
        self.script_attribute().is_some()
    }
}

impl fmt::Display for LoadMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadMethod {
    type Err = UnknownLoadMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sync" => Ok(Self::Sync),
            "async" => Ok(Self::Async),
            "defer" => Ok(Self::Defer),
            "async-defer" => Ok(Self::AsyncDefer),
            "inline" => Ok(Self::Inline),
            "preload" => Ok(Self::Preload),
            other => Err(UnknownLoadMethod(other.to_string())),
        }
    }
}

// =============================================================================
// SOURCE
// =============================================================================

/// Where an asset comes from.
///
/// A JSON string is a URI or local path. Any other JSON value is an inline
/// payload exposed to the page as a global variable (scripts only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetSource {
    Uri(String),
    Data(serde_json::Value),
}

impl AssetSource {
    /// Empty strings, `null`, `false`, `0` and empty containers count as no source.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Uri(uri) => uri.is_empty(),
            Self::Data(value) => match value {
                serde_json::Value::Null => true,
                serde_json::Value::Bool(b) => !b,
                serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
                serde_json::Value::String(s) => s.is_empty(),
                serde_json::Value::Array(items) => items.is_empty(),
                serde_json::Value::Object(map) => map.is_empty(),
            },
        }
    }

    #[must_use]
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Self::Uri(uri) => Some(uri),
            Self::Data(_) => None,
        }
    }
}

impl From<&str> for AssetSource {
    fn from(uri: &str) -> Self {
        Self::Uri(uri.to_string())
    }
}

impl From<String> for AssetSource {
    fn from(uri: String) -> Self {
        Self::Uri(uri)
    }
}

impl From<serde_json::Value> for AssetSource {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(uri) => Self::Uri(uri),
            other => Self::Data(other),
        }
    }
}

// =============================================================================
// ASSET SPEC (caller input)
// =============================================================================

/// Registration arguments for one asset.
///
/// `load_method` is kept as a string: an unknown or disallowed method is
/// not an error, it falls back to the family default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSpec {
    pub handle: String,
    pub src: Option<AssetSource>,
    pub deps: Vec<String>,
    pub condition: Option<Condition>,
    pub load_method: Option<String>,
    pub load_hook: Option<String>,
    pub in_footer: Option<bool>,
    pub version: Option<String>,
    pub media: Option<String>,
    #[serde(rename = "as")]
    pub as_type: Option<String>,
    pub mime_type: Option<String>,
    pub crossorigin: Option<bool>,
    pub loaded: bool,
}

impl AssetSpec {
    #[must_use]
    pub fn new(handle: impl Into<String>, src: impl Into<AssetSource>) -> Self {
        Self {
            handle: handle.into(),
            src: Some(src.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deps = deps.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn load_method(mut self, method: LoadMethod) -> Self {
        self.load_method = Some(method.as_str().to_string());
        self
    }

    #[must_use]
    pub fn load_hook(mut self, hook: impl Into<String>) -> Self {
        self.load_hook = Some(hook.into());
        self
    }

    #[must_use]
    pub fn in_footer(mut self, in_footer: bool) -> Self {
        self.in_footer = Some(in_footer);
        self
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
    }

    #[must_use]
    pub fn as_type(mut self, as_type: impl Into<String>) -> Self {
        self.as_type = Some(as_type.into());
        self
    }

    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    #[must_use]
    pub fn crossorigin(mut self, crossorigin: bool) -> Self {
        self.crossorigin = Some(crossorigin);
        self
    }

    #[must_use]
    pub fn loaded(mut self, loaded: bool) -> Self {
        self.loaded = loaded;
        self
    }
}

// =============================================================================
// ASSET RECORD
// =============================================================================

/// Lifecycle stage of a registered asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Registered,
    Validated,
    Emitted,
}

/// A normalized asset as stored in a registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    pub handle: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<AssetSource>,
    pub deps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    pub load_method: LoadMethod,
    pub load_hook: String,
    pub in_footer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub crossorigin: bool,
    pub loaded: bool,
    pub stage: Stage,
    /// Handles that list this asset in their `deps`. Filled during validation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependents: Vec<String>,
}

impl Asset {
    #[must_use]
    pub fn has_src(&self) -> bool {
        self.src.as_ref().is_some_and(|src| !src.is_empty())
    }

    #[must_use]
    pub fn src_uri(&self) -> Option<&str> {
        self.src.as_ref().and_then(AssetSource::as_uri)
    }

    #[must_use]
    pub fn depends_on(&self, handle: &str) -> bool {
        self.deps.iter().any(|dep| dep == handle)
    }

    /// Rebuild the registration arguments that would produce this record.
    #[must_use]
    pub fn to_spec(&self) -> AssetSpec {
        AssetSpec {
            handle: self.handle.clone(),
            src: self.src.clone(),
            deps: self.deps.clone(),
            condition: self.condition.clone(),
            load_method: Some(self.load_method.as_str().to_string()),
            load_hook: Some(self.load_hook.clone()),
            in_footer: Some(self.in_footer),
            version: self.version.clone(),
            media: self.media.clone(),
            as_type: self.as_type.clone(),
            mime_type: self.mime_type.clone(),
            crossorigin: Some(self.crossorigin),
            loaded: false,
        }
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
    fn load_method_parses_known_names() {
        assert_eq!("async-defer".parse::<LoadMethod>(), Ok(LoadMethod::AsyncDefer));
        assert_eq!("inline".parse::<LoadMethod>(), Ok(LoadMethod::Inline));
        assert!("lazy".parse::<LoadMethod>().is_err());
    }

    #[test]
    fn script_attribute_only_for_deferred_methods() {
        assert_eq!(LoadMethod::AsyncDefer.script_attribute(), Some("async defer"));
        assert_eq!(LoadMethod::Defer.script_attribute(), Some("defer"));
        assert!(LoadMethod::Sync.script_attribute().is_none());
        assert!(!LoadMethod::Inline.is_deferred());
    }

    #[test]
    fn source_deserializes_string_as_uri() -> Result<(), serde_json::Error> {
        let src: AssetSource = serde_json::from_value(json!("js/app.js"))?;
        assert_eq!(src, AssetSource::Uri("js/app.js".to_string()));

        let data: AssetSource = serde_json::from_value(json!({"flag": true}))?;
        assert!(matches!(data, AssetSource::Data(_)));
        Ok(())
    }

    #[test]
    fn empty_sources() {
        assert!(AssetSource::from("").is_empty());
        assert!(AssetSource::Data(json!({})).is_empty());
        assert!(AssetSource::Data(json!(null)).is_empty());
        assert!(!AssetSource::Data(json!({"a": 1})).is_empty());
    }

    #[test]
    fn spec_builder_sets_fields() {
        let spec = AssetSpec::new("app", "js/app.js")
            .deps(["jquery"])
            .load_method(LoadMethod::Defer)
            .load_hook("footer")
            .version("2.0");

        assert_eq!(spec.deps, vec!["jquery".to_string()]);
        assert_eq!(spec.load_method.as_deref(), Some("defer"));
        assert_eq!(spec.load_hook.as_deref(), Some("footer"));
        assert_eq!(spec.version.as_deref(), Some("2.0"));
    }

    #[test]
    fn spec_deserializes_as_field() -> Result<(), serde_json::Error> {
        let spec: AssetSpec = serde_json::from_value(json!({
            "handle": "font",
            "src": "font.woff2",
            "as": "font"
        }))?;
        assert_eq!(spec.as_type.as_deref(), Some("font"));
        assert!(!spec.loaded);
        Ok(())
    }
}
