//! Site service configuration
//!
//! Resolution:
//! 1. Command-line arguments / their environment variables (see `main.rs`)
//! 2. Process environment (optionally seeded from `.env`) for secrets
//! 3. Optional TOML file for editor credentials and TTS tuning
//! 4. Compiled defaults
//!
//! A missing TOML file is not an error; startup continues with defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use knectar_common::edit::Credentials;
use knectar_common::{Error, Result};
use serde::Deserialize;
use tracing::{info, warn};

/// Voice used when `ELEVEN_VOICE_ID` is unset ("Rachel")
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

pub const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";

const DEFAULT_TTS_TIMEOUT_SECS: u64 = 60;

/// Menu document location under the site root
pub const MENU_PATH: &str = "data/menu.json";

/// Last staged edit from the page editor, under the site root
pub const DRAFT_PATH: &str = "data/menu.draft.json";

/// TTS cache directory under the site root
pub const TTS_CACHE_DIR: &str = "tts_cache";

/// Text-to-speech proxy settings
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Vendor API key; the endpoint answers 500 while this is unset
    pub api_key: Option<String>,
    pub voice_id: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Log cache hits and misses at info level
    pub debug: bool,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            voice_id: DEFAULT_VOICE_ID.to_string(),
            base_url: ELEVENLABS_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TTS_TIMEOUT_SECS),
            debug: false,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Directory holding the HTML templates, assets and `data/menu.json`
    pub site_root: PathBuf,
    /// Shared secret for `POST /api/update-menu`; unset rejects every write
    pub edit_secret: Option<String>,
    pub credentials: Credentials,
    pub tts: TtsConfig,
}

/// Optional TOML file contents
#[derive(Debug, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub editor: Option<Credentials>,
    #[serde(default)]
    pub tts: TtsSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct TtsSection {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl SiteConfig {
    /// Defaults only, nothing read from the environment
    pub fn new(site_root: impl Into<PathBuf>) -> Self {
        Self {
            site_root: site_root.into(),
            edit_secret: None,
            credentials: Credentials::default(),
            tts: TtsConfig::default(),
        }
    }

    /// Build from the environment and an optional TOML file
    pub fn load(site_root: impl Into<PathBuf>, config_file: Option<&Path>) -> Result<Self> {
        let toml_config = load_toml_config(config_file)?;
        let mut config = Self::new(site_root);

        config.edit_secret = env_var("EDIT_SECRET");
        if config.edit_secret.is_none() {
            warn!("EDIT_SECRET not set, menu updates will be rejected");
        }

        if let Some(credentials) = toml_config.editor {
            config.credentials = Credentials::new(credentials.username, credentials.password_sha256);
        }

        config.tts.api_key = env_var("ELEVEN_API_KEY");
        if config.tts.api_key.is_none() {
            warn!("ELEVEN_API_KEY not set, text-to-speech is unavailable");
        }
        if let Some(voice_id) = env_var("ELEVEN_VOICE_ID") {
            config.tts.voice_id = voice_id;
        }
        config.tts.debug = env_var("TTS_DEBUG").is_some();
        if let Some(base_url) = toml_config.tts.base_url {
            config.tts.base_url = base_url;
        }
        if let Some(secs) = toml_config.tts.timeout_secs {
            config.tts.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn menu_path(&self) -> PathBuf {
        self.site_root.join(MENU_PATH)
    }

    pub fn draft_path(&self) -> PathBuf {
        self.site_root.join(DRAFT_PATH)
    }

    pub fn tts_cache_dir(&self) -> PathBuf {
        self.site_root.join(TTS_CACHE_DIR)
    }
}

/// Non-empty environment variable
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Default TOML location: `<config dir>/knectar/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("knectar").join("config.toml"))
}

/// Read the TOML file
///
/// An explicitly named file must exist and parse. The default location is
/// optional: absence is silent and a parse failure only warns.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        return toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid {}: {}", path.display(), e)));
    }

    let Some(path) = default_config_path().filter(|p| p.exists()) else {
        return Ok(TomlConfig::default());
    };

    match std::fs::read_to_string(&path).map(|content| toml::from_str::<TomlConfig>(&content)) {
        Ok(Ok(config)) => {
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        Ok(Err(e)) => {
            warn!("Ignoring invalid config file {}: {}", path.display(), e);
            Ok(TomlConfig::default())
        }
        Err(e) => {
            warn!("Ignoring unreadable config file {}: {}", path.display(), e);
            Ok(TomlConfig::default())
        }
    }
}
