//! # CLI Commands
//!
//! Each command loads a manifest, runs one render cycle against the
//! in-memory host and returns its report as a string. `main.rs` decides
//! where the string goes.

use crate::manifest::Manifest;
use asset_manager_core::{AssetManager, ConfigError, HookAction, SpriteError, StaticHost};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("symbol registration failed: {0}")]
    Sprite(#[from] SpriteError),
}

// =============================================================================
// DOCUMENT RENDERING
// =============================================================================

/// Run every load point and assemble a full HTML document.
///
/// Points up to the head point render inside `<head>`, followed by the
/// host's stylesheets and head scripts. The sprite sheet opens `<body>`.
/// Host footer scripts follow the footer point's markup.
pub fn render_document(manager: &mut AssetManager<StaticHost>) -> String {
    let config = manager.config().clone();
    let head_position = config.position(&config.head_point).unwrap_or(0);

    let mut head = String::new();
    let mut body = String::new();
    for (position, point) in config.load_points.iter().enumerate() {
        let markup = manager.render_point(&point.name);
        let target = if position <= head_position { &mut head } else { &mut body };
        push_line(target, &markup);

        if point.name == config.head_point {
            let styles = manager.host().print_styles();
            let scripts = host_scripts(manager, false);
            push_line(&mut head, &styles);
            push_line(&mut head, &scripts);
        }
        if point.name == config.footer_point {
            let scripts = host_scripts(manager, true);
            push_line(&mut body, &scripts);
        }
    }

    let mut document = String::from("<!DOCTYPE html>\n<html>\n<head>\n");
    document.push_str(&head);
    document.push_str("</head>\n<body>\n");
    push_line(&mut document, &manager.sprite_sheet());
    document.push_str(&body);
    document.push_str("</body>\n</html>\n");
    document
}

/// Host script tags, routed through the engine's tag filter.
fn host_scripts(manager: &AssetManager<StaticHost>, in_footer: bool) -> String {
    manager
        .host()
        .print_scripts(in_footer, |tag, handle| manager.filter_script_tag(tag, handle))
}

fn push_line(target: &mut String, markup: &str) {
    if markup.is_empty() {
        return;
    }
    target.push_str(markup);
    if !markup.ends_with('\n') {
        target.push('\n');
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// `render`: the full HTML document for a manifest.
pub fn cmd_render(manifest_path: &Path, quiet: bool) -> Result<String, CliError> {
    let manifest = Manifest::load(manifest_path)?;
    let mut manager = manifest.build(quiet)?;
    let document = render_document(&mut manager);
    debug!(bytes = document.len(), "document rendered");
    Ok(document)
}

/// `check`: every diagnostic raised during a render cycle.
pub fn cmd_check(manifest_path: &Path, json: bool, quiet: bool) -> Result<String, CliError> {
    let manifest = Manifest::load(manifest_path)?;
    let mut manager = manifest.build(quiet)?;
    render_document(&mut manager);

    let records = manager.diagnostics().records();
    if json {
        return Ok(serde_json::to_string_pretty(records)?);
    }

    if records.is_empty() {
        return Ok("No diagnostics.\n".to_string());
    }
    let mut report = String::new();
    for diagnostic in records {
        report.push_str(&format!(
            "[{}] {}: {}\n",
            diagnostic.code,
            diagnostic.handle.as_deref().unwrap_or("-"),
            diagnostic.plain_message()
        ));
    }
    report.push_str(&format!("{} diagnostic(s)\n", records.len()));
    Ok(report)
}

/// `schedule`: the validate/load callbacks in execution order.
pub fn cmd_schedule(manifest_path: &Path, json: bool) -> Result<String, CliError> {
    let manifest = Manifest::load(manifest_path)?;
    let manager = AssetManager::new(manifest.resolved_config(false), manifest.host())?;
    let schedule = manager.hook_schedule();
    if json {
        return Ok(serde_json::to_string_pretty(&schedule)?);
    }

    let mut report = String::new();
    for callback in &schedule {
        let action = match callback.action {
            HookAction::Validate => "validate",
            HookAction::Load => "load",
        };
        report.push_str(&format!(
            "{:<12} {:>4}  {:<8} {}\n",
            callback.point,
            callback.priority,
            callback.kind.as_str(),
            action
        ));
    }
    Ok(report)
}
