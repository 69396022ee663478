//! # tc-core
//!
//! Core types shared by the tradeclock crates: the error hierarchy, the
//! `ensure!` / `fail!` macros, and the engine settings value.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `fail!` macros.
pub mod errors;

/// Engine settings (scan ceiling, DST reference instant).
pub mod settings;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// A count of whole seconds.
pub type Seconds = i64;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
pub use settings::{DstReference, EngineSettings, DEFAULT_MAX_SCAN_DAYS};
