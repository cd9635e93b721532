//! services/client/src/adapters/mock.rs
//!
//! This module contains the mock adapter, a deterministic in-memory
//! implementation of the backend ports. It serves the demo mode: no network,
//! a fixed seed user and task list, and an artificial delay on every
//! operation to exercise loading-state paths.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use todo_core::domain::{AuthToken, Credential, Owner, RegisteredUser, Task, TaskChange};
use todo_core::ports::{ApiError, ApiResult, AuthService, TodoService};

/// Latency applied to every mock operation.
const MOCK_LATENCY: Duration = Duration::from_millis(800);

/// The one account the mock knows at startup.
const SEED_USER_ID: &str = "mock-user-1";
const SEED_USERNAME: &str = "testuser";
const SEED_PASSWORD: &str = "password123";

/// Stand-in for a server-side password hash. Opaque to the client.
const MOCK_PASSWORD_HASH: &str = "$2b$10$zPdGv5lNMPiozRF5OES5.OeBA9fTOy30Zsu5QtnlEXP2zVCi6vySi";

//=========================================================================================
// In-memory State
//=========================================================================================

struct MockAccount {
    id: String,
    credential: Credential,
}

struct MockState {
    accounts: Vec<MockAccount>,
    tasks: Vec<Task>,
}

fn seed_owner() -> Owner {
    Owner {
        id: SEED_USER_ID.to_string(),
        username: SEED_USERNAME.to_string(),
    }
}

fn seed_task(id: &str, title: &str, description: &str, at: DateTime<Utc>) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        created_by: seed_owner(),
        created_at: at,
        updated_at: at,
    }
}

impl MockState {
    fn seeded() -> Self {
        let accounts = vec![MockAccount {
            id: SEED_USER_ID.to_string(),
            credential: Credential {
                username: SEED_USERNAME.to_string(),
                password: SEED_PASSWORD.to_string(),
            },
        }];
        let tasks = vec![
            seed_task(
                "mock-todo-1",
                "Complete project",
                "Finish the client project by Friday",
                Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap(),
            ),
            seed_task(
                "mock-todo-2",
                "Learn Rust",
                "Work through the async chapter of the book",
                Utc.with_ymd_and_hms(2025, 4, 2, 14, 30, 0).unwrap(),
            ),
            seed_task(
                "mock-todo-3",
                "Buy groceries",
                "Milk, eggs, bread, and vegetables",
                Utc.with_ymd_and_hms(2025, 4, 3, 9, 15, 0).unwrap(),
            ),
        ];
        Self { accounts, tasks }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An in-memory adapter that implements the backend ports.
pub struct MockBackend {
    delay: Duration,
    state: Mutex<MockState>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Creates a seeded mock with the standard ~800 ms latency.
    pub fn new() -> Self {
        Self::with_delay(MOCK_LATENCY)
    }

    /// Creates a seeded mock with a custom latency. Tests shrink it.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            state: Mutex::new(MockState::seeded()),
        }
    }

    /// Runs `f` against the shared state after the simulated delay.
    ///
    /// The lock is taken before sleeping and held across it, so concurrent
    /// operations apply strictly in the order they arrived at the backend.
    async fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        let mut state = self.state.lock().await;
        tokio::time::sleep(self.delay).await;
        f(&mut state)
    }
}

//=========================================================================================
// `AuthService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthService for MockBackend {
    async fn login(&self, username: &str, password: &str) -> ApiResult<AuthToken> {
        self.with_state(|state| {
            let known = state.accounts.iter().any(|a| {
                a.credential.username == username && a.credential.password == password
            });
            if !known {
                return Err(ApiError::Auth("Invalid username or password".to_string()));
            }
            Ok(AuthToken {
                username: username.to_string(),
                access_token: format!("mock-jwt-token-for-{}", username),
            })
        })
        .await
    }

    async fn register(&self, username: &str, password: &str) -> ApiResult<RegisteredUser> {
        self.with_state(|state| {
            if state
                .accounts
                .iter()
                .any(|a| a.credential.username == username)
            {
                return Err(ApiError::Conflict("Username already exists".to_string()));
            }
            let account = MockAccount {
                id: format!("mock-user-{}", Uuid::new_v4()),
                credential: Credential {
                    username: username.to_string(),
                    password: password.to_string(),
                },
            };
            let now = Utc::now();
            let registered = RegisteredUser {
                id: account.id.clone(),
                username: account.credential.username.clone(),
                password: MOCK_PASSWORD_HASH.to_string(),
                created_at: now,
                updated_at: now,
            };
            state.accounts.push(account);
            Ok(registered)
        })
        .await
    }
}

//=========================================================================================
// `TodoService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TodoService for MockBackend {
    async fn get_all(&self) -> ApiResult<Vec<Task>> {
        self.with_state(|state| Ok(state.tasks.clone())).await
    }

    async fn create(&self, title: &str, description: &str) -> ApiResult<Task> {
        self.with_state(|state| {
            let now = Utc::now();
            let task = Task {
                id: format!("mock-todo-{}", Uuid::new_v4()),
                title: title.to_string(),
                description: description.to_string(),
                created_by: seed_owner(),
                created_at: now,
                updated_at: now,
            };
            state.tasks.push(task.clone());
            Ok(task)
        })
        .await
    }

    async fn update(&self, id: &str, title: &str, description: &str) -> ApiResult<TaskChange> {
        self.with_state(|state| {
            let task = state
                .tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))?;
            task.title = title.to_string();
            task.description = description.to_string();
            task.updated_at = Utc::now();
            Ok(TaskChange {
                title: task.title.clone(),
                description: task.description.clone(),
            })
        })
        .await
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.with_state(|state| {
            let index = state
                .tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))?;
            state.tasks.remove(index);
            Ok(())
        })
        .await
    }
}
