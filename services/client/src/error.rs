//! services/client/src/error.rs
//!
//! Defines the primary error type for the entire client application.

use crate::config::ConfigError;
use crate::session::SessionError;
use todo_core::ports::ApiError;

/// The primary error type for the `client` crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from a backend operation.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Represents a failure while persisting or clearing the session.
    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),
}
