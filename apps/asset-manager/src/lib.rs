//! # Asset Manager Library
//!
//! This library exposes the CLI modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;
pub mod manifest;

// Re-export asset_manager_core for convenience
pub use asset_manager_core;
