//! Content-addressed audio cache
//!
//! One `<sha256>.mp3` file per distinct text. Entries are never evicted.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

#[derive(Debug, Clone)]
pub struct TtsCache {
    dir: PathBuf,
}

impl TtsCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.mp3", key))
    }

    /// Cached audio for `key`; unreadable entries count as misses
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read TTS cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Store audio for `key`; failures are logged and otherwise ignored
    pub async fn put(&self, key: &str, audio: &[u8]) {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!("Failed to create TTS cache dir {}: {}", self.dir.display(), e);
            return;
        }
        if let Err(e) = tokio::fs::write(self.path_for(key), audio).await {
            warn!("Failed to write TTS cache entry {}: {}", key, e);
        }
    }
}
