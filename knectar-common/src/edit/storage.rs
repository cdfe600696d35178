//! Key/value storage for edit-mode state

use std::collections::HashMap;

/// Storage key of the session record
pub const SESSION_KEY: &str = "knectar_edit_session";

/// Storage key of the in-progress edited menu tree
pub const DRAFT_KEY: &str = "knectar_menu_draft";

/// String key/value store with browser-storage semantics
///
/// The site service backs this with cookies; tools and tests use
/// [`MemoryStorage`].
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-process storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
