//! Base error type.
//!
//! Sub-crates define their own error enums; this one covers configuration
//! problems detected before a run starts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `gtu-core`.
pub type CoreResult<T> = Result<T, CoreError>;
