//! Text-to-speech proxy: cache lookup, vendor call, cache fill

mod cache;
mod elevenlabs;

pub use cache::TtsCache;
pub use elevenlabs::ElevenLabsClient;

use knectar_common::tts::cache_key;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SiteConfig;

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Server not configured with ELEVEN_API_KEY")]
    NotConfigured,

    #[error("ElevenLabs request failed ({status})")]
    Upstream { status: u16, details: String },

    #[error("Network error: {0}")]
    Network(String),
}

/// Proxy state shared by all requests
pub struct TtsService {
    cache: TtsCache,
    client: Option<ElevenLabsClient>,
    debug: bool,
}

impl TtsService {
    pub fn new(config: &SiteConfig) -> Result<Self, TtsError> {
        let client = match &config.tts.api_key {
            Some(key) => Some(ElevenLabsClient::new(&config.tts, key.clone())?),
            None => None,
        };

        Ok(Self {
            cache: TtsCache::new(config.tts_cache_dir()),
            client,
            debug: config.tts.debug,
        })
    }

    /// An API key is set
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn cache(&self) -> &TtsCache {
        &self.cache
    }

    /// Audio for `text`, from cache when possible
    ///
    /// The API key is required even for cached text.
    pub async fn speak(&self, text: &str) -> Result<Vec<u8>, TtsError> {
        let client = self.client.as_ref().ok_or(TtsError::NotConfigured)?;
        let key = cache_key(text);

        if let Some(audio) = self.cache.get(&key).await {
            self.trace(format_args!("TTS cache hit: {}", key));
            return Ok(audio);
        }
        self.trace(format_args!("TTS cache miss: {}", key));

        let audio = client.synthesize(text).await?;
        self.cache.put(&key, &audio).await;
        Ok(audio)
    }

    fn trace(&self, message: std::fmt::Arguments<'_>) {
        if self.debug {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
    }
}
