pub mod domain;
pub mod ports;

pub use domain::{AuthToken, Credential, Owner, RegisteredUser, Session, Task, TaskChange};
pub use ports::{ApiError, ApiResult, AuthService, BackendService, TodoService, TokenProvider};
