//! Text-to-speech helpers shared by the proxy and its callers

use sha2::{Digest, Sha256};

/// Upper bound on characters sent for synthesis (vendor limit is 5000)
pub const MAX_SPEECH_CHARS: usize = 4900;

/// Message shown in place of the player when synthesis fails
pub const AUDIO_UNAVAILABLE: &str = "Audio unavailable";

/// Cache key for a text: lowercase hex SHA-256 of its UTF-8 bytes
///
/// # Examples
///
/// ```
/// use knectar_common::tts::cache_key;
///
/// assert_eq!(
///     cache_key("hello"),
///     "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
/// );
/// ```
pub fn cache_key(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Text to speak for a rendered article: whitespace collapsed, trimmed and
/// cut to [`MAX_SPEECH_CHARS`] characters
pub fn speech_text(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_SPEECH_CHARS)
        .collect()
}
