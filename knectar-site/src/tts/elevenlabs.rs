//! ElevenLabs text-to-speech API client

use serde::Serialize;
use tracing::debug;

use super::TtsError;
use crate::config::TtsConfig;

const MODEL_ID: &str = "eleven_monolingual_v1";

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

pub struct ElevenLabsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    voice_id: String,
}

impl ElevenLabsClient {
    pub fn new(config: &TtsConfig, api_key: String) -> Result<Self, TtsError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TtsError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            voice_id: config.voice_id.clone(),
        })
    }

    /// Synthesize `text` to MP3 bytes
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id);
        debug!(url = %url, chars = text.chars().count(), "Calling ElevenLabs TTS");

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&SpeechRequest {
                text,
                model_id: MODEL_ID,
                voice_settings: VoiceSettings {
                    stability: 0.5,
                    similarity_boost: 0.5,
                },
            })
            .send()
            .await
            .map_err(|e| TtsError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(TtsError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| TtsError::Network(e.to_string()))?;
        Ok(audio.to_vec())
    }
}
