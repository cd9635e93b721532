//! services/client/src/session.rs
//!
//! Durable session storage: the authenticated identity and bearer token,
//! persisted as JSON so a login survives process restarts.
//!
//! The store is the single writer of the session. It never makes network
//! calls; backends read the token through the `TokenProvider` capability.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use todo_core::domain::Session;
use todo_core::ports::TokenProvider;
use tracing::{info, warn};

/// A failure while persisting or clearing the session file.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

//=========================================================================================
// "Impure" Persistence Record
//=========================================================================================

/// On-disk twin of the domain `Session`.
#[derive(Serialize, Deserialize)]
struct SessionRecord {
    username: String,
    token: String,
}

impl SessionRecord {
    fn to_domain(self) -> Session {
        Session {
            username: self.username,
            token: self.token,
        }
    }

    fn from_domain(session: &Session) -> Self {
        Self {
            username: session.username.clone(),
            token: session.token.clone(),
        }
    }
}

//=========================================================================================
// The Session Store
//=========================================================================================

/// File-backed store for the current session.
pub struct SessionStore {
    path: PathBuf,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Creates a store over the given file path. Does not touch the disk;
    /// call [`SessionStore::restore`] once at startup.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(None),
        }
    }

    /// Loads any persisted session into memory.
    ///
    /// An absent file leaves the store unauthenticated. A malformed file is
    /// treated the same way: the store fails open to "logged out" and only
    /// logs a warning.
    pub fn restore(&self) {
        let restored = match self.load_from_disk() {
            Ok(session) => session,
            Err(err) => {
                warn!(path = %self.path.display(), "Ignoring unreadable session file: {err}");
                None
            }
        };

        if let Some(session) = &restored {
            info!(username = %session.username, "Restored session");
        }
        *self.write_guard() = restored;
    }

    /// Stores the identity and token durably, replacing any prior session.
    pub fn login(&self, username: &str, token: &str) -> Result<(), SessionError> {
        let session = Session {
            username: username.to_string(),
            token: token.to_string(),
        };
        self.save_to_disk(&session)?;
        *self.write_guard() = Some(session);
        info!(%username, "Successfully logged in");
        Ok(())
    }

    /// Clears durable storage and in-memory state.
    pub fn logout(&self) -> Result<(), SessionError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        *self.write_guard() = None;
        info!("Logged out");
        Ok(())
    }

    /// Returns a copy of the current session, if any.
    pub fn current(&self) -> Option<Session> {
        self.read_guard().clone()
    }

    /// Returns the current bearer token, if any.
    pub fn current_token(&self) -> Option<String> {
        self.read_guard().as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_guard().is_some()
    }

    fn load_from_disk(&self) -> Result<Option<Session>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let record: SessionRecord = serde_json::from_str(&contents)?;
        Ok(Some(record.to_domain()))
    }

    fn save_to_disk(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&SessionRecord::from_domain(session))?;
        write_private(&self.path, &contents)?;
        Ok(())
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, Option<Session>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenProvider for SessionStore {
    fn token(&self) -> Option<String> {
        self.current_token()
    }
}

/// Writes the session file with permissions restricted to the owner (0600).
#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("session.json"))
    }

    #[test]
    fn restore_without_file_is_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.restore();
        assert!(!store.is_authenticated());
        assert_eq!(store.current_token(), None);
    }

    #[test]
    fn login_persists_across_restore() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.login("testuser", "token-1").unwrap();

        let reopened = store_in(&dir);
        reopened.restore();
        assert!(reopened.is_authenticated());
        let session = reopened.current().unwrap();
        assert_eq!(session.username, "testuser");
        assert_eq!(session.token, "token-1");
    }

    #[test]
    fn malformed_file_fails_open_to_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::new(path);
        store.restore();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn login_overwrites_prior_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.login("first", "token-1").unwrap();
        store.login("second", "token-2").unwrap();

        let session = store.current().unwrap();
        assert_eq!(session.username, "second");
        assert_eq!(store.current_token().as_deref(), Some("token-2"));
    }

    #[test]
    fn logout_clears_storage_and_memory() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.login("testuser", "token-1").unwrap();
        store.logout().unwrap();
        assert!(!store.is_authenticated());

        let reopened = store_in(&dir);
        reopened.restore();
        assert!(!reopened.is_authenticated());
    }

    #[test]
    fn logout_without_session_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.logout().unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn token_provider_exposes_current_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(TokenProvider::token(&store), None);
        store.login("testuser", "token-1").unwrap();
        assert_eq!(TokenProvider::token(&store).as_deref(), Some("token-1"));
    }
}
