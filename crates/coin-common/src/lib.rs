//! Common infrastructure shared by the coin crates.
//!
//! This crate provides:
//! - **Diagnostics** - posted read errors and warnings, collected per reader/writer
//!   and forwarded to the `log` facade
//! - **Warning System** - deduplicated colored terminal output for one-off notices
//! - **Errors** - the [`ReadError`] type returned by every parse operation
//! - **Configuration** - [`StateConfig`], the explicit replacement for
//!   environment-driven behavior toggles

/// Traversal state configuration.
pub mod config;
/// Posted diagnostics and the per-stream sink that collects them.
pub mod diagnostics;
/// Error types.
pub mod error;
/// Deduplicated terminal warnings.
pub mod warning;

pub use config::StateConfig;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::ReadError;
pub use warning::{clear_warnings, warn_once};
