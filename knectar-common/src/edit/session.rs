//! Edit-mode session: credential check and session lifecycle
//!
//! States: `LoggedOut → LoggedIn → LoggedOut`. Logging out, an expired
//! record, a record with `loggedIn: false` and an unparsable record all
//! clear the stored session.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};

use super::storage::{SessionStorage, SESSION_KEY};

/// Session lifetime: 24 hours
pub const SESSION_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Username accepted when no editor credentials are configured
const DEFAULT_USERNAME: &str = "admin";

/// Password digest accepted when no editor credentials are configured
const DEFAULT_PASSWORD_SHA256: &str = "2d52c696cf01ae1d3da9bb2dd31e0b6915481bd4149aa8f63e1e59dca22cfab5";

/// Stored session record (epoch milliseconds)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub logged_in: bool,
    pub timestamp: i64,
    pub expires_at: i64,
}

impl Session {
    /// New session starting at `now_ms`, expiring after [`SESSION_TTL_MS`]
    pub fn start(now_ms: i64) -> Self {
        Self {
            logged_in: true,
            timestamp: now_ms,
            expires_at: now_ms + SESSION_TTL_MS,
        }
    }

    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        self.logged_in && self.expires_at > now_ms
    }
}

/// Lowercase hex SHA-256 of a password
pub fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Expected editor username and password digest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password_sha256: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            password_sha256: DEFAULT_PASSWORD_SHA256.to_string(),
        }
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password_sha256: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_sha256: password_sha256.into().to_lowercase(),
        }
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password_digest(password) == self.password_sha256
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("Invalid username or password")]
    InvalidCredentials,
}

/// Outcome of a session check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    LoggedOut,
    LoggedIn(Session),
}

impl EditMode {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, EditMode::LoggedIn(_))
    }
}

/// The edit-mode gate
#[derive(Debug, Clone, Default)]
pub struct EditGate {
    credentials: Credentials,
}

impl EditGate {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Check credentials and, on success, store a fresh session
    pub fn login<S: SessionStorage>(
        &self,
        storage: &mut S,
        username: &str,
        password: &str,
    ) -> Result<Session, LoginError> {
        self.login_at(storage, username, password, Utc::now().timestamp_millis())
    }

    pub fn login_at<S: SessionStorage>(
        &self,
        storage: &mut S,
        username: &str,
        password: &str,
        now_ms: i64,
    ) -> Result<Session, LoginError> {
        if !self.credentials.verify(username, password) {
            info!("Edit-mode login rejected for user {:?}", username);
            return Err(LoginError::InvalidCredentials);
        }

        let session = Session::start(now_ms);
        match serde_json::to_string(&session) {
            Ok(json) => storage.set(SESSION_KEY, json),
            Err(e) => debug!("Failed to encode session record: {}", e),
        }
        info!("Edit mode enabled for user {:?}", username);
        Ok(session)
    }

    pub fn logout<S: SessionStorage>(&self, storage: &mut S) {
        storage.remove(SESSION_KEY);
    }

    /// Current mode; clears stale or corrupt records
    pub fn check<S: SessionStorage>(&self, storage: &mut S) -> EditMode {
        self.check_at(storage, Utc::now().timestamp_millis())
    }

    pub fn check_at<S: SessionStorage>(&self, storage: &mut S, now_ms: i64) -> EditMode {
        let Some(raw) = storage.get(SESSION_KEY) else {
            return EditMode::LoggedOut;
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if session.is_valid_at(now_ms) => EditMode::LoggedIn(session),
            Ok(_) => {
                debug!("Edit session expired, clearing");
                self.logout(storage);
                EditMode::LoggedOut
            }
            Err(e) => {
                debug!("Edit session record unreadable ({}), clearing", e);
                self.logout(storage);
                EditMode::LoggedOut
            }
        }
    }
}
