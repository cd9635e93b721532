//! crates/todo_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any wire format or storage layout;
//! serializable twins live in the adapters that need them.

use chrono::{DateTime, Utc};

/// The user a task belongs to, as embedded in every task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: String,
    pub username: String,
}

/// A single to-do record.
///
/// `id` is opaque, unique within a backend's collection, and immutable once
/// assigned. `updated_at` is never earlier than `created_at`.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_by: Owner,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The authenticated identity plus bearer token held by the running
/// application. Absent when unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub token: String,
}

// Only used as login/register request input - contains sensitive data,
// never persisted.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// A successful login payload.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub username: String,
    pub access_token: String,
}

/// The created-user representation returned by registration.
///
/// `password` is the backend's opaque hash; the client never interprets it.
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields a successful update reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChange {
    pub title: String,
    pub description: String,
}
