//! Text-to-speech proxy endpoint

use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{error, warn};

use crate::error::{ApiError, ApiResult};
use crate::tts::TtsError;
use crate::AppState;

/// POST /api/tts
///
/// Body `{"text": "..."}`; answers with `audio/mpeg`. A body that is not
/// JSON or has no non-empty string `text` is a 400.
pub async fn text_to_speech(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let text = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|v| v.get("text").and_then(Value::as_str).map(str::to_string))
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing \"text\" field"))?;

    match state.tts.speak(&text).await {
        Ok(audio) => Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response()),
        Err(e @ TtsError::NotConfigured) => Err(ApiError::internal(e.to_string())),
        Err(TtsError::Upstream { status, details }) => {
            warn!(status, "ElevenLabs request failed");
            Err(ApiError::internal_with("ElevenLabs request failed", details))
        }
        Err(TtsError::Network(e)) => {
            error!("TTS proxy error: {}", e);
            Err(ApiError::internal("Internal server error"))
        }
    }
}
