//! # fc-core
//!
//! Core types and error definitions for fiscal-calendar.
//!
//! This crate provides the building blocks shared across the other crates in
//! the workspace: the error hierarchy, the `ensure!` macro, the
//! process-wide `Settings` (evaluation date), and the logging bootstrap.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` macro.
pub mod errors;

/// `tracing` subscriber setup for binaries and tests.
pub mod logging;

/// Global settings (evaluation date override).
pub mod settings;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
pub use settings::{ScopedEvaluationDate, Settings};
