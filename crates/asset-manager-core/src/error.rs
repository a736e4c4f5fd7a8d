//! # Errors
//!
//! Hard failures only. Dependency and configuration problems found while
//! processing assets are reported as [`crate::diagnostics::Diagnostic`]s
//! and never abort a render cycle.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid engine configuration, rejected when the manager is built.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no load points configured")]
    NoLoadPoints,

    #[error("load point configured twice: {0}")]
    DuplicateLoadPoint(String),

    #[error("load point name is empty")]
    EmptyLoadPoint,

    #[error("{role} load point '{name}' is not configured")]
    UnknownPoint { role: &'static str, name: String },

    #[error("footer load point '{footer}' is ordered before head load point '{head}'")]
    FooterBeforeHead { head: String, footer: String },
}

/// Failure reported by the host page pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("enqueue function {function} does not exist")]
    MissingEnqueueFunction { function: String },
}

/// SVG symbol registration failure.
#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("unsafe symbol path: {}", .0.display())]
    UnsafePath(PathBuf),

    #[error("cannot read symbol source {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed svg in {}: {message}", path.display())]
    Xml { path: PathBuf, message: String },

    #[error("no <svg> root element in {}", .0.display())]
    MissingRoot(PathBuf),
}

/// A load method name that is not one of the known methods.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown load method: {0}")]
pub struct UnknownLoadMethod(pub String);
