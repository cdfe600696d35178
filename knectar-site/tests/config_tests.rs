//! Configuration loading tests
//!
//! These tests modify process environment variables and run serially.

use std::time::Duration;

use knectar_common::edit::password_digest;
use knectar_site::config::{SiteConfig, DEFAULT_VOICE_ID, ELEVENLABS_BASE_URL};
use serial_test::serial;

const ENV_KEYS: [&str; 4] = ["EDIT_SECRET", "ELEVEN_API_KEY", "ELEVEN_VOICE_ID", "TTS_DEBUG"];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

fn write_config(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_environment_secrets() {
    clear_env();
    std::env::set_var("EDIT_SECRET", "hunter2");
    std::env::set_var("ELEVEN_API_KEY", "key-123");
    std::env::set_var("ELEVEN_VOICE_ID", "voice-9");
    std::env::set_var("TTS_DEBUG", "1");

    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "");
    let config = SiteConfig::load("/srv/site", Some(&path)).unwrap();

    assert_eq!(config.edit_secret.as_deref(), Some("hunter2"));
    assert_eq!(config.tts.api_key.as_deref(), Some("key-123"));
    assert_eq!(config.tts.voice_id, "voice-9");
    assert!(config.tts.debug);

    clear_env();
}

#[test]
#[serial]
fn test_unset_environment_uses_defaults() {
    clear_env();
    std::env::set_var("EDIT_SECRET", "");

    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "");
    let config = SiteConfig::load("/srv/site", Some(&path)).unwrap();

    assert!(config.edit_secret.is_none(), "Empty secret counts as unset");
    assert!(config.tts.api_key.is_none());
    assert_eq!(config.tts.voice_id, DEFAULT_VOICE_ID);
    assert_eq!(config.tts.base_url, ELEVENLABS_BASE_URL);
    assert!(!config.tts.debug);

    clear_env();
}

#[test]
#[serial]
fn test_toml_credentials_and_tts_settings() {
    clear_env();

    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        &format!(
            r#"
[editor]
username = "editor"
password_sha256 = "{}"

[tts]
base_url = "http://localhost:9999"
timeout_secs = 5
"#,
            password_digest("s3cret").to_uppercase()
        ),
    );
    let config = SiteConfig::load("/srv/site", Some(&path)).unwrap();

    assert!(config.credentials.verify("editor", "s3cret"));
    assert!(!config.credentials.verify("admin", "s3cret"));
    assert_eq!(config.tts.base_url, "http://localhost:9999");
    assert_eq!(config.tts.timeout, Duration::from_secs(5));
}

#[test]
#[serial]
fn test_invalid_explicit_toml_is_error() {
    clear_env();

    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[editor\nusername = ");
    assert!(SiteConfig::load("/srv/site", Some(&path)).is_err());
}
