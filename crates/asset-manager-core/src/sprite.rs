//! # SVG Sprite
//!
//! Collects SVG files as `<symbol>` definitions in one hidden sprite sheet
//! and renders `<svg><use href="#am-symbol-HANDLE"></use></svg>` references.
//!
//! ## Symbol import
//!
//! - the `<svg>` root's `viewBox` is copied to the `<symbol>`
//! - element children are copied; `<script>` elements and `on*` event
//!   attributes are dropped
//! - default dimensions come from the registered attributes, then the
//!   root's `width`/`height`, then the `viewBox`
//!
//! ## Reference attributes
//!
//! Merged in order: sprite-wide attributes, symbol attributes, call
//! attributes. A `null` or `false` value removes the attribute. When the
//! symbol knows both dimensions and the call gives only one, the other is
//! derived from the symbol's aspect ratio (truncated to 2 decimals).

use crate::conditions::{Condition, ConditionSet};
use crate::error::SpriteError;
use crate::html::escape;
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Prefix of every symbol id.
pub const SYMBOL_ID_PREFIX: &str = "am-symbol-";

/// Opening tag of the hidden sprite sheet.
pub const SPRITE_OPEN: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" focusable=\"false\" height=\"0\" role=\"none\" style=\"left:-9999px;overflow:hidden;position:absolute\" viewBox=\"0 0 0 0\" width=\"0\">";

const DIMENSION_PRECISION: f64 = 100.0;

/// Attributes always allowed on a reference `<svg>`.
const BASE_ALLOWED_ATTRIBUTES: [&str; 3] = ["class", "height", "width"];

#[must_use]
pub fn symbol_id(handle: &str) -> String {
    format!("{SYMBOL_ID_PREFIX}{handle}")
}

// =============================================================================
// TYPES
// =============================================================================

/// Registration arguments for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolSpec {
    pub handle: String,
    /// Absolute path, or relative to the sprite directory.
    pub src: String,
    pub condition: Option<Condition>,
    /// Attributes for references to this symbol.
    pub attributes: IndexMap<String, Value>,
}

impl SymbolSpec {
    #[must_use]
    pub fn new(handle: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            src: src.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// A registered symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub handle: String,
    pub path: PathBuf,
    /// Registered attributes plus inferred `width`/`height`.
    pub attributes: IndexMap<String, Value>,
    /// The `<symbol>` element.
    pub markup: String,
}

/// Root attributes and filtered children of an SVG document.
#[derive(Debug, Default)]
struct ParsedSvg {
    view_box: Option<String>,
    width: Option<String>,
    height: Option<String>,
    children: String,
}

// =============================================================================
// SPRITE
// =============================================================================

#[derive(Debug, Clone)]
pub struct SvgSprite {
    directory: PathBuf,
    global_attributes: IndexMap<String, Value>,
    symbols: IndexMap<String, Symbol>,
    allowed_attributes: BTreeSet<String>,
}

impl SvgSprite {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, global_attributes: IndexMap<String, Value>) -> Self {
        let mut allowed_attributes: BTreeSet<String> =
            BASE_ALLOWED_ATTRIBUTES.iter().map(|a| (*a).to_string()).collect();
        allowed_attributes.extend(global_attributes.keys().cloned());
        Self {
            directory: directory.into(),
            global_attributes,
            symbols: IndexMap::new(),
            allowed_attributes,
        }
    }

    /// Register a symbol, replacing any symbol with the same handle.
    ///
    /// Returns `Ok(false)` when the handle is empty or the condition excludes it.
    pub fn register(&mut self, spec: SymbolSpec, conditions: &ConditionSet) -> Result<bool, SpriteError> {
        if spec.handle.is_empty() || !conditions.should_include(spec.condition.as_ref()) {
            debug!(handle = %spec.handle, "symbol not added");
            return Ok(false);
        }

        let path = self.resolve_path(&spec.src)?;
        let source = std::fs::read_to_string(&path).map_err(|source| SpriteError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed = parse_svg(&source, &path)?;

        let mut attributes = spec.attributes;
        if let Some((width, height)) = default_dimensions(&attributes, &parsed) {
            attributes.insert("width".to_string(), Value::from(width));
            attributes.insert("height".to_string(), Value::from(height));
        }
        self.allowed_attributes.extend(attributes.keys().cloned());

        let view_box = parsed
            .view_box
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(|v| format!(" viewBox=\"{}\"", escape(v)))
            .unwrap_or_default();
        let markup = format!(
            "<symbol id=\"{}\"{view_box}>{}</symbol>",
            escape(&symbol_id(&spec.handle)),
            parsed.children,
        );

        debug!(handle = %spec.handle, path = %path.display(), "symbol registered");
        self.symbols.shift_remove(&spec.handle);
        self.symbols.insert(
            spec.handle.clone(),
            Symbol {
                handle: spec.handle,
                path,
                attributes,
                markup,
            },
        );
        Ok(true)
    }

    /// Remove a symbol. Idempotent; always returns true.
    pub fn remove(&mut self, handle: &str) -> bool {
        if self.symbols.shift_remove(handle).is_some() {
            debug!(handle, "symbol removed");
        }
        true
    }

    #[must_use]
    pub fn is_registered(&self, handle: &str) -> bool {
        self.symbols.contains_key(handle)
    }

    #[must_use]
    pub fn get(&self, handle: &str) -> Option<&Symbol> {
        self.symbols.get(handle)
    }

    pub fn handles(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Attribute names seen on references so far.
    #[must_use]
    pub fn allowed_attributes(&self) -> &BTreeSet<String> {
        &self.allowed_attributes
    }

    /// Reference markup for a symbol, or an empty string if it is not registered.
    #[must_use]
    pub fn get_reference(&self, handle: &str, attrs: &IndexMap<String, Value>) -> String {
        let Some(symbol) = self.symbols.get(handle) else {
            return String::new();
        };

        let mut call = attrs.clone();
        let known_width = symbol.attributes.get("width").and_then(positive_number);
        let known_height = symbol.attributes.get("height").and_then(positive_number);
        if let (Some(width), Some(height)) = (known_width, known_height) {
            let ratio = width / height;
            let call_width = attrs.get("width").and_then(positive_number);
            let call_height = attrs.get("height").and_then(positive_number);
            match (call_width, call_height) {
                (None, Some(h)) => {
                    call.insert("width".to_string(), Value::from(format_dimension(ratio * h)));
                }
                (Some(w), None) => {
                    call.insert("height".to_string(), Value::from(format_dimension(w / ratio)));
                }
                _ => {}
            }
        }

        let mut merged = self.global_attributes.clone();
        for (name, value) in symbol.attributes.iter().chain(call.iter()) {
            merged.insert(name.clone(), value.clone());
        }

        let rendered: Vec<String> = merged
            .iter()
            .filter_map(|(name, value)| {
                attribute_text(value).map(|text| format!("{}=\"{}\"", escape(name), escape(&text)))
            })
            .collect();
        let open = if rendered.is_empty() {
            "<svg>".to_string()
        } else {
            format!("<svg {}>", rendered.join(" "))
        };
        format!(
            "{open}<use href=\"#{}\"></use></svg>",
            escape(&symbol_id(handle))
        )
    }

    /// The hidden sprite sheet with every registered symbol.
    #[must_use]
    pub fn sheet(&self) -> String {
        let symbols: String = self.symbols.values().map(|s| s.markup.as_str()).collect();
        format!("{SPRITE_OPEN}{symbols}</svg>")
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
        self.allowed_attributes = BASE_ALLOWED_ATTRIBUTES.iter().map(|a| (*a).to_string()).collect();
        self.allowed_attributes.extend(self.global_attributes.keys().cloned());
    }

    fn resolve_path(&self, src: &str) -> Result<PathBuf, SpriteError> {
        let path = Path::new(src);
        if src.is_empty() || path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(SpriteError::UnsafePath(path.to_path_buf()));
        }
        Ok(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.directory.join(path)
        })
    }
}

// =============================================================================
// ATTRIBUTE VALUES
// =============================================================================

/// Text of an attribute value. `None` removes the attribute.
fn attribute_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Leading numeric part of a string, like `24` in `24px`.
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(text.len(), |(i, _)| i);
    text.get(..end)?.parse::<f64>().ok()
}

fn positive_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s),
        _ => None,
    }?;
    (number > 0.0).then_some(number)
}

/// Truncate to two decimals and print without a trailing `.0`.
fn format_dimension(value: f64) -> String {
    let truncated = (value * DIMENSION_PRECISION).trunc() / DIMENSION_PRECISION;
    format!("{truncated}")
}

fn default_dimensions(attributes: &IndexMap<String, Value>, svg: &ParsedSvg) -> Option<(i64, i64)> {
    let whole = |n: f64| n.trunc() as i64;

    let explicit = (
        attributes.get("width").and_then(positive_number),
        attributes.get("height").and_then(positive_number),
    );
    if let (Some(width), Some(height)) = explicit {
        return Some((whole(width), whole(height)));
    }

    let root = (
        svg.width.as_deref().and_then(leading_number).map(whole),
        svg.height.as_deref().and_then(leading_number).map(whole),
    );
    if let (Some(width), Some(height)) = root {
        if width > 0 && height > 0 {
            return Some((width, height));
        }
    }

    let view_box: Vec<f64> = svg
        .view_box
        .as_deref()?
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .filter_map(leading_number)
        .collect();
    match (view_box.get(2), view_box.get(3)) {
        (Some(&width), Some(&height)) if whole(width) > 0 && whole(height) > 0 => {
            Some((whole(width), whole(height)))
        }
        _ => None,
    }
}

// =============================================================================
// SVG PARSING
// =============================================================================

fn xml_error(path: &Path, message: impl ToString) -> SpriteError {
    SpriteError::Xml {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn is_script(name: &str) -> bool {
    name.rsplit(':').next().is_some_and(|local| local.eq_ignore_ascii_case("script"))
}

/// Write an element's start tag, minus event handlers and namespace declarations.
fn write_start(
    out: &mut String,
    reader: &Reader<&[u8]>,
    element: &BytesStart<'_>,
    name: &str,
    path: &Path,
) -> Result<(), SpriteError> {
    let mut attributes = Vec::new();
    for attr in element.attributes().flatten() {
        let key = reader
            .decoder()
            .decode(attr.key.as_ref())
            .map_err(|err| xml_error(path, err))?
            .into_owned();
        let lowered = key.to_ascii_lowercase();
        if lowered.starts_with("on") || lowered == "xmlns" || lowered.starts_with("xmlns:") {
            continue;
        }
        let raw = reader
            .decoder()
            .decode(&attr.value)
            .map_err(|err| xml_error(path, err))?;
        let value = quick_xml::escape::unescape(&raw).map_err(|err| xml_error(path, err))?;
        attributes.push((key, value.into_owned()));
    }
    attributes.sort();

    out.push('<');
    out.push_str(name);
    for (key, value) in attributes {
        out.push_str(&format!(" {key}=\"{}\"", escape(&value)));
    }
    out.push('>');
    Ok(())
}

fn parse_svg(source: &str, path: &Path) -> Result<ParsedSvg, SpriteError> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(true);

    let mut parsed: Option<ParsedSvg> = None;
    let mut depth = 0usize;
    let mut skip_from: Option<usize> = None;

    loop {
        let event = reader.read_event().map_err(|err| xml_error(path, err))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = reader
                    .decoder()
                    .decode(e.name().as_ref())
                    .map_err(|err| xml_error(path, err))?
                    .into_owned();

                if parsed.is_none() {
                    if name.rsplit(':').next() != Some("svg") {
                        return Err(SpriteError::MissingRoot(path.to_path_buf()));
                    }
                    parsed = Some(read_root(&reader, e, path)?);
                    if is_empty {
                        break;
                    }
                    depth = 1;
                    continue;
                }

                if !is_empty {
                    depth += 1;
                }
                if skip_from.is_some() {
                    continue;
                }
                if is_script(&name) {
                    if !is_empty {
                        skip_from = Some(depth);
                    }
                    continue;
                }

                if let Some(svg) = parsed.as_mut() {
                    write_start(&mut svg.children, &reader, e, &name, path)?;
                    if is_empty {
                        svg.children.push_str(&format!("</{name}>"));
                    }
                }
            }
            Event::End(ref e) => {
                if depth <= 1 {
                    break;
                }
                if skip_from.is_none() {
                    let qname = e.name();
                    let name = reader
                        .decoder()
                        .decode(qname.as_ref())
                        .map_err(|err| xml_error(path, err))?;
                    if let Some(svg) = parsed.as_mut() {
                        svg.children.push_str(&format!("</{name}>"));
                    }
                } else if skip_from == Some(depth) {
                    skip_from = None;
                }
                depth -= 1;
            }
            Event::Text(ref t) if depth > 1 && skip_from.is_none() => {
                let text = reader.decoder().decode(t).map_err(|err| xml_error(path, err))?;
                if let Some(svg) = parsed.as_mut() {
                    svg.children.push_str(&text);
                }
            }
            Event::CData(ref c) if depth > 1 && skip_from.is_none() => {
                let text = reader.decoder().decode(c).map_err(|err| xml_error(path, err))?;
                if let Some(svg) = parsed.as_mut() {
                    svg.children.push_str(&escape(&text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    parsed.ok_or_else(|| SpriteError::MissingRoot(path.to_path_buf()))
}

fn read_root(reader: &Reader<&[u8]>, root: &BytesStart<'_>, path: &Path) -> Result<ParsedSvg, SpriteError> {
    let mut parsed = ParsedSvg::default();
    for attr in root.attributes().flatten() {
        let key = reader
            .decoder()
            .decode(attr.key.as_ref())
            .map_err(|err| xml_error(path, err))?;
        let value = reader
            .decoder()
            .decode(&attr.value)
            .map_err(|err| xml_error(path, err))?
            .into_owned();
        match key.as_ref() {
            "viewBox" => parsed.view_box = Some(value),
            "width" => parsed.width = Some(value),
            "height" => parsed.height = Some(value),
            _ => {}
        }
    }
    Ok(parsed)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    const SIZED: &str = r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="48" height="24" viewBox="0 0 48 24"><path d="M0 0h48v24H0z" onclick="alert(1)"/><script>alert(2)</script><g><title>Logo</title></g></svg>"#;
    const VIEWBOX_ONLY: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><circle cx="12" cy="12" r="10"/></svg>"#;

    fn sprite_dir() -> std::io::Result<TempDir> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("sized.svg"), SIZED)?;
        fs::write(dir.path().join("viewbox.svg"), VIEWBOX_ONLY)?;
        fs::write(dir.path().join("broken.svg"), "<svg><g></svg>")?;
        fs::write(dir.path().join("not-svg.svg"), "<html></html>")?;
        Ok(dir)
    }

    fn attrs(value: Value) -> IndexMap<String, Value> {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => IndexMap::new(),
        }
    }

    #[test]
    fn symbol_markup_filters_scripts_and_handlers() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sprite_dir()?;
        let mut sprite = SvgSprite::new(dir.path(), IndexMap::new());
        assert!(sprite.register(SymbolSpec::new("logo", "sized.svg"), &ConditionSet::new())?);

        let markup = sprite.get("logo").map(|s| s.markup.clone()).unwrap_or_default();
        assert_eq!(
            markup,
            "<symbol id=\"am-symbol-logo\" viewBox=\"0 0 48 24\"><path d=\"M0 0h48v24H0z\"></path><g><title>Logo</title></g></symbol>"
        );
        Ok(())
    }

    #[test]
    fn sheet_wraps_symbols() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sprite_dir()?;
        let mut sprite = SvgSprite::new(dir.path(), IndexMap::new());
        assert_eq!(sprite.sheet(), format!("{SPRITE_OPEN}</svg>"));

        sprite.register(SymbolSpec::new("icon", "viewbox.svg"), &ConditionSet::new())?;
        let sheet = sprite.sheet();
        assert!(sheet.starts_with(SPRITE_OPEN));
        assert!(sheet.contains(
            "<symbol id=\"am-symbol-icon\" viewBox=\"0 0 24 24\"><circle cx=\"12\" cy=\"12\" r=\"10\"></circle></symbol>"
        ));
        assert!(sheet.ends_with("</symbol></svg>"));
        Ok(())
    }

    #[test]
    fn dimensions_from_root_then_viewbox() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sprite_dir()?;
        let mut sprite = SvgSprite::new(dir.path(), IndexMap::new());
        sprite.register(SymbolSpec::new("logo", "sized.svg"), &ConditionSet::new())?;
        sprite.register(SymbolSpec::new("icon", "viewbox.svg"), &ConditionSet::new())?;

        let logo = sprite.get("logo").map(|s| s.attributes.clone()).unwrap_or_default();
        assert_eq!(logo.get("width"), Some(&json!(48)));
        assert_eq!(logo.get("height"), Some(&json!(24)));
        let icon = sprite.get("icon").map(|s| s.attributes.clone()).unwrap_or_default();
        assert_eq!(icon.get("width"), Some(&json!(24)));
        Ok(())
    }

    #[test]
    fn reference_merges_attributes_in_order() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sprite_dir()?;
        let global = attrs(json!({ "focusable": "false", "aria-hidden": "true" }));
        let mut sprite = SvgSprite::new(dir.path(), global);
        sprite.register(
            SymbolSpec::new("icon", "viewbox.svg")
                .attribute("id", "define-symbol")
                .attribute("data-test", "no-dimensions")
                .attribute("focusable", Value::Null),
            &ConditionSet::new(),
        )?;

        assert_eq!(
            sprite.get_reference("icon", &IndexMap::new()),
            "<svg aria-hidden=\"true\" id=\"define-symbol\" data-test=\"no-dimensions\" width=\"24\" height=\"24\"><use href=\"#am-symbol-icon\"></use></svg>"
        );

        let call = attrs(json!({ "aria-hidden": false, "id": null, "class": "big" }));
        assert_eq!(
            sprite.get_reference("icon", &call),
            "<svg data-test=\"no-dimensions\" width=\"24\" height=\"24\" class=\"big\"><use href=\"#am-symbol-icon\"></use></svg>"
        );
        Ok(())
    }

    #[test]
    fn reference_derives_missing_dimension() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sprite_dir()?;
        let mut sprite = SvgSprite::new(dir.path(), IndexMap::new());
        sprite.register(SymbolSpec::new("logo", "sized.svg"), &ConditionSet::new())?;

        let by_height = sprite.get_reference("logo", &attrs(json!({ "height": 12 })));
        assert!(by_height.starts_with("<svg width=\"24\" height=\"12\">"));

        let by_width = sprite.get_reference("logo", &attrs(json!({ "width": "25" })));
        assert!(by_width.starts_with("<svg width=\"25\" height=\"12.5\">"));

        let odd = sprite.get_reference("logo", &attrs(json!({ "width": 10 })));
        assert!(odd.starts_with("<svg width=\"10\" height=\"5\">"));
        Ok(())
    }

    #[test]
    fn format_dimension_truncates() {
        assert_eq!(format_dimension(33.3333), "33.33");
        assert_eq!(format_dimension(12.0), "12");
        assert_eq!(format_dimension(0.129), "0.12");
    }

    #[test]
    fn explicit_dimensions_win() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sprite_dir()?;
        let mut sprite = SvgSprite::new(dir.path(), IndexMap::new());
        sprite.register(
            SymbolSpec::new("logo", "sized.svg")
                .attribute("width", "100")
                .attribute("height", 10),
            &ConditionSet::new(),
        )?;
        let reference = sprite.get_reference("logo", &attrs(json!({ "height": 20 })));
        assert!(reference.starts_with("<svg width=\"200\" height=\"20\">"));
        Ok(())
    }

    #[test]
    fn remove_is_idempotent_and_restores_empty_sheet() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sprite_dir()?;
        let mut sprite = SvgSprite::new(dir.path(), IndexMap::new());
        let empty = sprite.sheet();

        sprite.register(SymbolSpec::new("icon", "viewbox.svg"), &ConditionSet::new())?;
        assert!(sprite.is_registered("icon"));
        assert!(sprite.remove("icon"));
        assert!(sprite.remove("icon"));
        assert!(!sprite.is_registered("icon"));
        assert_eq!(sprite.sheet(), empty);
        assert!(sprite.get_reference("icon", &IndexMap::new()).is_empty());
        Ok(())
    }

    #[test]
    fn re_registering_replaces() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sprite_dir()?;
        let mut sprite = SvgSprite::new(dir.path(), IndexMap::new());
        sprite.register(SymbolSpec::new("icon", "viewbox.svg"), &ConditionSet::new())?;
        sprite.register(SymbolSpec::new("icon", "sized.svg"), &ConditionSet::new())?;

        assert_eq!(sprite.len(), 1);
        assert_eq!(sprite.sheet().matches("<symbol").count(), 1);
        assert!(sprite.sheet().contains("viewBox=\"0 0 48 24\""));
        Ok(())
    }

    #[test]
    fn condition_and_empty_handle_skip() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sprite_dir()?;
        let mut sprite = SvgSprite::new(dir.path(), IndexMap::new());
        let skipped = sprite.register(
            SymbolSpec::new("icon", "viewbox.svg").condition(Condition::named("single")),
            &ConditionSet::new(),
        )?;
        assert!(!skipped);
        assert!(!sprite.register(SymbolSpec::new("", "viewbox.svg"), &ConditionSet::new())?);
        assert!(sprite.is_empty());
        Ok(())
    }

    #[test]
    fn bad_sources_are_errors() -> std::io::Result<()> {
        let dir = sprite_dir()?;
        let mut sprite = SvgSprite::new(dir.path(), IndexMap::new());
        let conditions = ConditionSet::new();

        assert!(matches!(
            sprite.register(SymbolSpec::new("a", "missing.svg"), &conditions),
            Err(SpriteError::Io { .. })
        ));
        assert!(matches!(
            sprite.register(SymbolSpec::new("b", "../escape.svg"), &conditions),
            Err(SpriteError::UnsafePath(_))
        ));
        assert!(matches!(
            sprite.register(SymbolSpec::new("c", "broken.svg"), &conditions),
            Err(SpriteError::Xml { .. })
        ));
        assert!(matches!(
            sprite.register(SymbolSpec::new("d", "not-svg.svg"), &conditions),
            Err(SpriteError::MissingRoot(_))
        ));
        assert!(sprite.is_empty());
        Ok(())
    }

    #[test]
    fn allowed_attributes_track_registrations() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sprite_dir()?;
        let mut sprite = SvgSprite::new(dir.path(), attrs(json!({ "role": "img" })));
        sprite.register(
            SymbolSpec::new("icon", "viewbox.svg").attribute("data-icon", "x"),
            &ConditionSet::new(),
        )?;
        let allowed = sprite.allowed_attributes();
        for name in ["class", "width", "height", "role", "data-icon"] {
            assert!(allowed.contains(name));
        }
        Ok(())
    }

    #[test]
    fn leading_number_parsing() {
        assert_eq!(leading_number("24px"), Some(24.0));
        assert_eq!(leading_number(" 1.5em"), Some(1.5));
        assert_eq!(leading_number("auto"), None);
    }
}
