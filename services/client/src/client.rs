//! services/client/src/client.rs
//!
//! The API client facade the views talk to. It owns one instance of each
//! backend and an explicit mode value selecting between them per call;
//! switching the mode never transfers state from one backend to the other.

use std::sync::Arc;

use tracing::info;

use todo_core::domain::{AuthToken, RegisteredUser, Task, TaskChange};
use todo_core::ports::{ApiError, ApiResult, BackendService, TokenProvider};

use crate::adapters::{HttpBackend, MockBackend};
use crate::config::{ApiMode, Config};

/// Constructs requests against the selected backend and surfaces results in
/// the shared error taxonomy. Operation groups are exposed through
/// [`ApiClient::auth`] and [`ApiClient::tasks`].
pub struct ApiClient {
    mode: ApiMode,
    mock: Arc<dyn BackendService>,
    real: Arc<dyn BackendService>,
}

impl ApiClient {
    /// Builds the standard pair of backends from configuration.
    ///
    /// The token capability is an explicit constructor argument; the client
    /// has no ambient access to the session.
    pub fn new(config: &Config, tokens: Arc<dyn TokenProvider>) -> Self {
        if config.enable_api_logs {
            info!(mode = %config.mode, "Using {} API service", config.mode);
        }
        let mock = Arc::new(MockBackend::new());
        let real = Arc::new(HttpBackend::new(
            config.base_url.clone(),
            tokens,
            config.enable_api_logs,
        ));
        Self::with_backends(config.mode, mock, real)
    }

    /// Builds a client over caller-supplied backends. Tests use this to
    /// inject fast or fake implementations.
    pub fn with_backends(
        mode: ApiMode,
        mock: Arc<dyn BackendService>,
        real: Arc<dyn BackendService>,
    ) -> Self {
        Self { mode, mock, real }
    }

    pub fn mode(&self) -> ApiMode {
        self.mode
    }

    /// Selects the backend for subsequent calls.
    pub fn set_mode(&mut self, mode: ApiMode) {
        if mode != self.mode {
            info!(%mode, "Switched API mode");
            self.mode = mode;
        }
    }

    fn backend(&self) -> &dyn BackendService {
        match self.mode {
            ApiMode::Mock => self.mock.as_ref(),
            ApiMode::Real => self.real.as_ref(),
        }
    }

    /// The authentication operation group.
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    /// The task operation group.
    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi { client: self }
    }
}

/// Rejects a blank required field before any backend dispatch.
fn require(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

//=========================================================================================
// Operation Groups
//=========================================================================================

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl AuthApi<'_> {
    /// Exchanges credentials for a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<AuthToken> {
        require("Username", username)?;
        require("Password", password)?;
        self.client.backend().login(username, password).await
    }

    /// Creates a new account. Never authenticates the new user.
    pub async fn register(&self, username: &str, password: &str) -> ApiResult<RegisteredUser> {
        require("Username", username)?;
        require("Password", password)?;
        if username.trim().chars().count() < 5 {
            return Err(ApiError::Validation(
                "Username must be at least 5 characters".to_string(),
            ));
        }
        if password.chars().count() < 6 {
            return Err(ApiError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        self.client.backend().register(username, password).await
    }
}

pub struct TasksApi<'a> {
    client: &'a ApiClient,
}

impl TasksApi<'_> {
    /// Returns every task, oldest first.
    pub async fn get_all(&self) -> ApiResult<Vec<Task>> {
        self.client.backend().get_all().await
    }

    pub async fn create(&self, title: &str, description: &str) -> ApiResult<Task> {
        require("Title", title)?;
        require("Description", description)?;
        self.client.backend().create(title, description).await
    }

    pub async fn update(&self, id: &str, title: &str, description: &str) -> ApiResult<TaskChange> {
        require("Title", title)?;
        require("Description", description)?;
        self.client.backend().update(id, title, description).await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client.backend().delete(id).await
    }
}
