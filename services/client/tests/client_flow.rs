//! End-to-end flows through the API client, the mock backend, and the
//! session store, mirroring how the views wire them together.

use std::sync::Arc;
use std::time::Duration;

use client_lib::adapters::MockBackend;
use client_lib::client::ApiClient;
use client_lib::config::ApiMode;
use client_lib::session::SessionStore;
use todo_core::ports::{ApiError, TodoService};

fn fast_client(mode: ApiMode) -> ApiClient {
    let fast = Duration::from_millis(1);
    ApiClient::with_backends(
        mode,
        Arc::new(MockBackend::with_delay(fast)),
        Arc::new(MockBackend::with_delay(fast)),
    )
}

#[tokio::test]
async fn login_stores_a_session_that_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let client = fast_client(ApiMode::Mock);
    let token = client.auth().login("testuser", "password123").await.unwrap();
    assert_eq!(token.access_token, "mock-jwt-token-for-testuser");

    let store = SessionStore::new(path.clone());
    store.restore();
    assert!(!store.is_authenticated());
    store.login(&token.username, &token.access_token).unwrap();

    // A fresh process restores the same identity.
    let restarted = SessionStore::new(path);
    restarted.restore();
    assert!(restarted.is_authenticated());
    assert_eq!(restarted.current().unwrap().username, "testuser");
}

#[tokio::test]
async fn wrong_credentials_surface_the_backend_message() {
    let client = fast_client(ApiMode::Mock);
    let err = client.auth().login("testuser", "nope-nope").await.unwrap_err();
    assert!(matches!(err, ApiError::Auth(msg) if msg == "Invalid username or password"));
}

#[tokio::test]
async fn registration_succeeds_without_authenticating() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    store.restore();

    let client = fast_client(ApiMode::Mock);
    let err = client.auth().register("testuser", "password123").await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(msg) if msg == "Username already exists"));

    let user = client.auth().register("newuser", "secret123").await.unwrap();
    assert_eq!(user.username, "newuser");
    // Registration never creates a session.
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn task_lifecycle_through_the_client() {
    let client = fast_client(ApiMode::Mock);

    let created = client
        .tasks()
        .create("Plan the week", "Outline Monday through Friday")
        .await
        .unwrap();
    assert_eq!(created.created_at, created.updated_at);

    let tasks = client.tasks().get_all().await.unwrap();
    assert_eq!(
        tasks.iter().filter(|t| t.id == created.id).count(),
        1,
        "create must add exactly one task"
    );

    let change = client
        .tasks()
        .update(&created.id, "Plan the month", "Outline all four weeks")
        .await
        .unwrap();
    assert_eq!(change.title, "Plan the month");

    let tasks = client.tasks().get_all().await.unwrap();
    let updated = tasks.iter().find(|t| t.id == created.id).unwrap();
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    client.tasks().delete(&created.id).await.unwrap();
    let err = client.tasks().delete(&created.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test(start_paused = true)]
async fn mock_operations_simulate_latency() {
    let mock = MockBackend::new();
    let started = tokio::time::Instant::now();
    mock.get_all().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(800));
}
