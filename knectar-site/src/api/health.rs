//! Health check endpoint
//!
//! Reports the build and whether the site's own inputs are usable: the
//! menu document parses and the speech service has an API key.

use axum::{extract::State, routing::get, Json, Router};
use knectar_common::menu::parse_menu;
use serde::Serialize;

use crate::config::MENU_PATH;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    /// Short git hash captured at build time
    pub build: String,
    pub menu: MenuHealth,
    pub tts_configured: bool,
}

/// State of the menu document; pages use the inline menu while `loaded` is false
#[derive(Debug, Serialize)]
pub struct MenuHealth {
    pub path: String,
    pub loaded: bool,
    pub entries: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let parsed = match tokio::fs::read_to_string(state.config.menu_path()).await {
        Ok(json) => parse_menu(&json).ok(),
        Err(_) => None,
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "knectar-site".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: env!("GIT_HASH").to_string(),
        menu: MenuHealth {
            path: MENU_PATH.to_string(),
            loaded: parsed.is_some(),
            entries: parsed.map(|tree| tree.nodes().len()).unwrap_or(0),
        },
        tts_configured: state.tts.is_configured(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
