//! # Error Types
//!
//! Validation errors for the foundational types. Higher layers define their
//! own error enums (`LifecycleError`, `StoreError`, ...) and convert where
//! needed; this crate only reports construction-time validation failures.

use thiserror::Error;

/// Errors raised by `sfy-core` type constructors.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A value failed domain validation (bad timestamp, negative price,
    /// malformed identifier, arithmetic overflow).
    #[error("validation error: {0}")]
    Validation(String),
}
