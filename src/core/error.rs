//! Error taxonomy for the routing core
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Usage, missing-option and malformed-path errors

use thiserror::Error;

/// Errors raised by the routing core itself.
///
/// Handler failures are not represented here: handlers return `anyhow::Result` and
/// their errors travel back through the dispatcher untouched. Unknown commands are
/// not errors either, see `DispatchOutcome::UnknownCommand`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouterError {
    /// A context was constructed without exactly one invocation source.
    #[error("usage error: {0}")]
    Usage(String),

    /// A getter marked as required found no usable value.
    #[error("option '{name}' is required but was not provided")]
    MissingOption { name: String },

    /// Composite command path text did not have one to three non-empty segments.
    #[error("invalid command path '{0}'")]
    InvalidPath(String),
}

impl RouterError {
    pub fn missing(name: impl Into<String>) -> Self {
        RouterError::MissingOption { name: name.into() }
    }
}
