//! # Asset Manager Core
//!
//! Dependency-aware registration, validation and emission of front-end
//! assets (scripts, stylesheets, preload hints and SVG sprite symbols).
//!
//! ## Pipeline
//!
//! ```text
//! register ──► normalize ──► validate (once per cycle) ──► load point 1 ──► ... ──► load point N
//!  (Registry)   (Family)       (Validator)                   (Scheduler + Family renderer)
//! ```
//!
//! - [`registry::AssetRegistry`] is generic over a [`family::Family`]
//!   (scripts, styles, preloads) and owns one family's ordered records.
//! - [`validator`] computes dependents, bridges host-native dependencies
//!   and raises [`diagnostics::Diagnostic`]s. It never stops processing.
//! - [`scheduler`] decides, per load point, which records are emitted.
//! - [`sprite::SvgSprite`] accumulates `<symbol>` definitions.
//! - [`manager::AssetManager`] ties one render cycle together.
//!
//! The host page pipeline (native asset table, native enqueue) is reached
//! only through [`host::HostPipeline`].

#![deny(unsafe_code)]

pub mod conditions;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod family;
pub mod host;
pub mod html;
pub mod manager;
pub mod registry;
pub mod scheduler;
pub mod sprite;
pub mod tags;
pub mod types;
pub mod validator;

pub use conditions::{Condition, ConditionRules, ConditionSet};
pub use config::{EngineConfig, LoadPoint};
pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
pub use error::{ConfigError, HostError, SpriteError, UnknownLoadMethod};
pub use family::{Companion, Family, Preloads, Scripts, Styles};
pub use host::{EnqueueRequest, EnqueuedAsset, HostPipeline, NativeAsset, Placement, StaticHost};
pub use manager::{AssetManager, HookAction, HookCallback};
pub use registry::{AssetRegistry, AssetTable, Context};
pub use sprite::{SvgSprite, SymbolSpec};
pub use types::{Asset, AssetKind, AssetSource, AssetSpec, LoadMethod, Stage};
