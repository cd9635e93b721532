//! crates/todo_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific backend implementations - the real
//! remote API or the in-memory stand-in.

use async_trait::async_trait;

use crate::domain::{AuthToken, RegisteredUser, Task, TaskChange};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error taxonomy every backend operation resolves into.
///
/// Each variant carries a human-readable message suitable for direct display.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad credentials, or a rejected/expired token.
    #[error("{0}")]
    Auth(String),
    /// A resource that must be unique already exists.
    #[error("{0}")]
    Conflict(String),
    /// The referenced item does not exist.
    #[error("{0}")]
    NotFound(String),
    /// A required field was missing or malformed; raised before any
    /// network call.
    #[error("{0}")]
    Validation(String),
    /// No response was received at all.
    #[error("Network error: {0}")]
    Transport(String),
    /// The backend answered with a non-success status and a body.
    #[error("Server error: {0}")]
    Server(String),
}

/// A convenience type alias for `Result<T, ApiError>`.
pub type ApiResult<T> = Result<T, ApiError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Authentication operations.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchanges a username/password pair for a bearer token.
    async fn login(&self, username: &str, password: &str) -> ApiResult<AuthToken>;

    /// Creates a new account. Does not authenticate the new user.
    async fn register(&self, username: &str, password: &str) -> ApiResult<RegisteredUser>;
}

/// Task CRUD operations.
#[async_trait]
pub trait TodoService: Send + Sync {
    /// Returns every task owned by the caller, oldest first.
    async fn get_all(&self) -> ApiResult<Vec<Task>>;

    /// Creates a task; the backend assigns `id` and both timestamps.
    async fn create(&self, title: &str, description: &str) -> ApiResult<Task>;

    /// Rewrites `title` and `description` of an existing task and bumps its
    /// `updated_at`.
    async fn update(&self, id: &str, title: &str, description: &str) -> ApiResult<TaskChange>;

    /// Removes a task. Deleting an id that is already absent is `NotFound`.
    async fn delete(&self, id: &str) -> ApiResult<()>;
}

/// A complete backend: both operation groups behind one object.
pub trait BackendService: AuthService + TodoService {}

impl<T: AuthService + TodoService> BackendService for T {}

/// Read access to the current bearer token.
///
/// Handed to backends at construction so token lookup is an explicit
/// capability rather than ambient state.
pub trait TokenProvider: Send + Sync {
    /// Returns the current token, or `None` when unauthenticated.
    fn token(&self) -> Option<String>;
}
