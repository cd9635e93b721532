//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, the concrete implementation of the
//! backend ports against the real remote API. It builds JSON requests,
//! injects the bearer token supplied by the `TokenProvider` capability, and
//! normalizes every response into the shared error taxonomy.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use todo_core::domain::{AuthToken, Owner, RegisteredUser, Task, TaskChange};
use todo_core::ports::{ApiError, ApiResult, AuthService, TodoService, TokenProvider};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A backend adapter that talks to the remote API over HTTP.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
    log_requests: bool,
}

impl HttpBackend {
    /// Creates an adapter rooted at `base_url`.
    ///
    /// `tokens` supplies the bearer token per request; `log_requests` raises
    /// per-request logging from `debug` to `info`.
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
        log_requests: bool,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            log_requests,
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.tokens.token() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    /// Sends one request and normalizes the outcome.
    ///
    /// A response that never arrives is a `Transport` error; a non-success
    /// status becomes the taxonomy error for that status, carrying the
    /// backend's message.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<Payload> {
        let url = format!("{}{}", self.base_url, path);
        if self.log_requests {
            info!(%method, %url, "API request");
        } else {
            debug!(%method, %url, "API request");
        }

        let mut builder = self.http.request(method, &url).headers(self.headers());
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(|e| {
            error!("API request failed: {e}");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        let is_json = is_json_response(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let body = response.text().await.map_err(|e| {
            error!("Failed to read API response body: {e}");
            ApiError::Transport(e.to_string())
        })?;

        if !status.is_success() {
            return Err(error_for_status(status, &body));
        }

        if is_json {
            let value = serde_json::from_str(&body)
                .map_err(|e| ApiError::Server(format!("Malformed JSON response: {e}")))?;
            Ok(Payload::Json(value))
        } else {
            Ok(Payload::Text(body))
        }
    }
}

//=========================================================================================
// Response Normalization
//=========================================================================================

/// A successful response body: structured when the content type said so,
/// raw text otherwise.
enum Payload {
    Json(serde_json::Value),
    Text(String),
}

impl Payload {
    /// Decodes the payload into `T`, naming `what` in mismatch errors.
    ///
    /// The real backend's response schema is treated as unverified: anything
    /// that does not match the expected shape fails loudly as a `Server`
    /// error instead of being trusted.
    fn decode<T: serde::de::DeserializeOwned>(self, what: &str) -> ApiResult<T> {
        match self {
            Payload::Json(value) => serde_json::from_value(value)
                .map_err(|e| ApiError::Server(format!("Unexpected {what} response shape: {e}"))),
            Payload::Text(_) => Err(ApiError::Server(format!(
                "Expected a JSON {what} response"
            ))),
        }
    }
}

fn is_json_response(content_type: Option<&str>) -> bool {
    content_type.map_or(false, |ct| ct.contains("application/json"))
}

/// Extracts a display message from an error body: the `message` field of a
/// JSON object when present, the raw body otherwise, or the status line when
/// the body is empty.
fn error_message(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status.to_string();
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }
    body.trim().to_string()
}

fn error_for_status(status: StatusCode, body: &str) -> ApiError {
    let message = error_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::CONFLICT => ApiError::Conflict(message),
        _ => ApiError::Server(message),
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

/// The `{isSuccess, data}` envelope the todo endpoints wrap their payloads in.
#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(rename = "isSuccess")]
    is_success: bool,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self, what: &str) -> ApiResult<T> {
        if !self.is_success {
            return Err(ApiError::Server(format!("Backend reported {what} failure")));
        }
        self.data
            .ok_or_else(|| ApiError::Server(format!("Backend returned no {what} data")))
    }
}

#[derive(Deserialize)]
struct OwnerRecord {
    id: String,
    username: String,
}

#[derive(Deserialize)]
struct TaskRecord {
    id: String,
    title: String,
    description: String,
    created_by: OwnerRecord,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRecord {
    fn to_domain(self) -> Task {
        Task {
            id: self.id,
            title: self.title,
            description: self.description,
            created_by: Owner {
                id: self.created_by.id,
                username: self.created_by.username,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Deserialize)]
struct TaskChangeRecord {
    title: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct LoginRecord {
    username: String,
    access_token: String,
}

#[derive(Deserialize)]
struct RegisteredRecord {
    id: String,
    username: String,
    password: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RegisteredRecord {
    fn to_domain(self) -> RegisteredUser {
        RegisteredUser {
            id: self.id,
            username: self.username,
            password: self.password,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

//=========================================================================================
// `AuthService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthService for HttpBackend {
    async fn login(&self, username: &str, password: &str) -> ApiResult<AuthToken> {
        let payload = self
            .request(
                Method::POST,
                "/auth/login",
                Some(json!({ "username": username, "password": password })),
            )
            .await?;
        let record: LoginRecord = payload.decode("login")?;
        Ok(AuthToken {
            username: record.username,
            access_token: record.access_token,
        })
    }

    async fn register(&self, username: &str, password: &str) -> ApiResult<RegisteredUser> {
        let payload = self
            .request(
                Method::POST,
                "/users",
                Some(json!({ "username": username, "password": password })),
            )
            .await?;
        let record: RegisteredRecord = payload.decode("registration")?;
        Ok(record.to_domain())
    }
}

//=========================================================================================
// `TodoService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TodoService for HttpBackend {
    async fn get_all(&self) -> ApiResult<Vec<Task>> {
        let payload = self.request(Method::GET, "/todo/all", None).await?;
        let envelope: Envelope<Vec<TaskRecord>> = payload.decode("task list")?;
        let records = envelope.into_data("task list")?;
        Ok(records.into_iter().map(TaskRecord::to_domain).collect())
    }

    async fn create(&self, title: &str, description: &str) -> ApiResult<Task> {
        let payload = self
            .request(
                Method::POST,
                "/todo",
                Some(json!({ "title": title, "description": description })),
            )
            .await?;
        let envelope: Envelope<TaskRecord> = payload.decode("task")?;
        Ok(envelope.into_data("task")?.to_domain())
    }

    async fn update(&self, id: &str, title: &str, description: &str) -> ApiResult<TaskChange> {
        let payload = self
            .request(
                Method::PATCH,
                &format!("/todo/{}", id),
                Some(json!({ "title": title, "description": description })),
            )
            .await?;
        let envelope: Envelope<TaskChangeRecord> = payload.decode("task update")?;
        let record = envelope.into_data("task update")?;
        Ok(TaskChange {
            title: record.title,
            description: record.description,
        })
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        let payload = self
            .request(Method::DELETE, &format!("/todo/{}", id), None)
            .await?;
        let envelope: Envelope<serde_json::Value> = payload.decode("task delete")?;
        if !envelope.is_success {
            return Err(ApiError::Server(
                "Backend reported task delete failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_detection_follows_the_content_type() {
        assert!(is_json_response(Some("application/json")));
        assert!(is_json_response(Some("application/json; charset=utf-8")));
        assert!(!is_json_response(Some("text/plain")));
        assert!(!is_json_response(None));
    }

    #[test]
    fn error_message_prefers_the_json_message_field() {
        let msg = error_message(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Invalid username or password","statusCode":401}"#,
        );
        assert_eq!(msg, "Invalid username or password");
    }

    #[test]
    fn error_message_falls_back_to_the_raw_body() {
        let msg = error_message(StatusCode::BAD_GATEWAY, "upstream unavailable");
        assert_eq!(msg, "upstream unavailable");
    }

    #[test]
    fn error_message_uses_the_status_line_for_empty_bodies() {
        let msg = error_message(StatusCode::NOT_FOUND, "  ");
        assert_eq!(msg, "404 Not Found");
    }

    #[test]
    fn statuses_map_onto_the_error_taxonomy() {
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Auth(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::FORBIDDEN, ""),
            ApiError::Auth(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::CONFLICT, ""),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ApiError::Server(msg) if msg == "boom"
        ));
    }

    #[test]
    fn envelope_success_yields_its_data() {
        let envelope: Envelope<Vec<String>> =
            serde_json::from_str(r#"{"isSuccess":true,"data":["a"]}"#).unwrap();
        assert_eq!(envelope.into_data("test").unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn envelope_failure_or_missing_data_is_a_server_error() {
        let envelope: Envelope<Vec<String>> =
            serde_json::from_str(r#"{"isSuccess":false}"#).unwrap();
        assert!(matches!(
            envelope.into_data("test").unwrap_err(),
            ApiError::Server(_)
        ));

        let envelope: Envelope<Vec<String>> =
            serde_json::from_str(r#"{"isSuccess":true}"#).unwrap();
        assert!(matches!(
            envelope.into_data("test").unwrap_err(),
            ApiError::Server(_)
        ));
    }

    #[test]
    fn task_records_decode_and_convert() {
        let record: TaskRecord = serde_json::from_str(
            r#"{
                "id": "todo-9",
                "title": "Ship it",
                "description": "Cut the release",
                "created_by": {"id": "u-1", "username": "testuser"},
                "created_at": "2025-04-01T10:00:00.000Z",
                "updated_at": "2025-04-02T11:30:00.000Z"
            }"#,
        )
        .unwrap();
        let task = record.to_domain();
        assert_eq!(task.id, "todo-9");
        assert_eq!(task.created_by.username, "testuser");
        assert!(task.updated_at > task.created_at);
    }

    #[test]
    fn non_json_payloads_refuse_typed_decoding() {
        let payload = Payload::Text("<html>maintenance</html>".to_string());
        let result: ApiResult<LoginRecord> = payload.decode("login");
        assert!(matches!(result.unwrap_err(), ApiError::Server(_)));
    }
}
