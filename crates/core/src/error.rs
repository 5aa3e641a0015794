//! Core error model.

use thiserror::Error;

/// Result type used across the core crate.
pub type CoreResult<T> = Result<T, CoreError>;

/// Failure while normalizing an object-storage URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AvatarUrlError {
    /// The input is not a syntactically valid absolute URL.
    #[error("invalid avatar url: {0}")]
    Parse(String),

    /// The configured storage host cannot be used as a URL host.
    #[error("invalid storage host '{0}'")]
    InvalidStorageHost(String),
}

/// Core-level error.
///
/// Deterministic failures only (malformed values). Transport and backend
/// failures are modelled by the crates that own those concerns.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A value failed validation (e.g. an empty upload).
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    AvatarUrl(#[from] AvatarUrlError),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
