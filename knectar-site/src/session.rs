//! Cookie-backed session storage
//!
//! Each storage key is one cookie holding the url-encoded value. Writes are
//! collected and emitted as `Set-Cookie` headers on the response.
//!
//! The session record itself is plain JSON anyone can write. A second
//! cookie carries a seal over the record, keyed by server-side secrets, and
//! only a sealed record puts a request in edit mode.

use std::collections::HashMap;

use axum::http::{header, HeaderMap, HeaderValue};
use knectar_common::edit::{EditGate, EditMode, SessionStorage, SESSION_KEY, SESSION_TTL_MS};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::SiteConfig;

/// Cookie holding the seal of the session record
pub const SEAL_COOKIE: &str = "knectar_edit_seal";

#[derive(Debug, Clone, Default)]
pub struct CookieStorage {
    values: HashMap<String, String>,
    /// Pending writes in order; `None` expires the cookie
    changes: Vec<(String, Option<String>)>,
}

impl CookieStorage {
    /// Read every cookie from the request's `Cookie` headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut values = HashMap::new();
        for header_value in headers.get_all(header::COOKIE) {
            let Ok(raw) = header_value.to_str() else {
                continue;
            };
            for pair in raw.split(';') {
                let Some((name, value)) = pair.trim().split_once('=') else {
                    continue;
                };
                let value = urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string());
                values.insert(name.trim().to_string(), value);
            }
        }
        Self {
            values,
            changes: Vec::new(),
        }
    }

    /// `Set-Cookie` header values for the pending writes
    pub fn set_cookie_headers(&self) -> Vec<HeaderValue> {
        self.changes
            .iter()
            .filter_map(|(name, value)| {
                let cookie = match value {
                    Some(value) => format!(
                        "{}={}; Path=/; SameSite=Lax; HttpOnly; Max-Age={}",
                        name,
                        urlencoding::encode(value),
                        SESSION_TTL_MS / 1000
                    ),
                    None => format!("{}=; Path=/; SameSite=Lax; HttpOnly; Max-Age=0", name),
                };
                match HeaderValue::from_str(&cookie) {
                    Ok(header_value) => Some(header_value),
                    Err(e) => {
                        warn!("Dropping unencodable cookie {}: {}", name, e);
                        None
                    }
                }
            })
            .collect()
    }

    pub fn apply_to(&self, headers: &mut HeaderMap) {
        for value in self.set_cookie_headers() {
            headers.append(header::SET_COOKIE, value);
        }
    }
}

impl SessionStorage for CookieStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value.clone());
        self.changes.push((key.to_string(), Some(value)));
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
        self.changes.push((key.to_string(), None));
    }
}

/// Seals session records with a key derived from the edit secret and the
/// editor credentials, so seals survive restarts but not a credential change
#[derive(Clone)]
pub struct SessionSeal {
    key: [u8; 32],
}

impl SessionSeal {
    pub fn new(config: &SiteConfig) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"knectar-edit-seal\0");
        hasher.update(config.credentials.username.as_bytes());
        hasher.update(b"\0");
        hasher.update(config.credentials.password_sha256.as_bytes());
        hasher.update(b"\0");
        hasher.update(config.edit_secret.as_deref().unwrap_or_default().as_bytes());
        Self { key: hasher.finalize().into() }
    }

    fn tag(&self, record: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.key);
        hasher.update(record.as_bytes());
        hasher.update(self.key);
        hex::encode(hasher.finalize())
    }

    /// Seal the stored session record, if any
    pub fn seal<S: SessionStorage>(&self, storage: &mut S) {
        if let Some(record) = storage.get(SESSION_KEY) {
            storage.set(SEAL_COOKIE, self.tag(&record));
        }
    }

    pub fn unseal<S: SessionStorage>(&self, storage: &mut S) {
        storage.remove(SEAL_COOKIE);
    }

    /// The stored record carries a matching seal
    pub fn is_sealed<S: SessionStorage>(&self, storage: &S) -> bool {
        match (storage.get(SESSION_KEY), storage.get(SEAL_COOKIE)) {
            (Some(record), Some(seal)) => constant_time_eq(self.tag(&record).as_bytes(), seal.as_bytes()),
            _ => false,
        }
    }

    /// Edit mode of a request: a live session record that this server sealed
    ///
    /// Stale records are cleared by the gate; an unsealed record is ignored
    /// but left in place.
    pub fn edit_mode<S: SessionStorage>(&self, gate: &EditGate, storage: &mut S) -> EditMode {
        match gate.check(storage) {
            EditMode::LoggedIn(_) if !self.is_sealed(storage) => {
                debug!("Ignoring edit session without a valid seal");
                EditMode::LoggedOut
            }
            EditMode::LoggedOut => {
                if storage.get(SEAL_COOKIE).is_some() && storage.get(SESSION_KEY).is_none() {
                    self.unseal(storage);
                }
                EditMode::LoggedOut
            }
            mode => mode,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
