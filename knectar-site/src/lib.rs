//! knectar-site library - portfolio site backend
//!
//! Serves the site from its root directory, composing HTML pages from the
//! menu tree, and exposes the menu persistence, page editing and
//! text-to-speech APIs.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Router};
use knectar_common::edit::EditGate;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod pages;
pub mod session;
pub mod tts;

use config::SiteConfig;
use session::SessionSeal;
use tts::{TtsError, TtsService};

/// Largest accepted request body (menu documents included)
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SiteConfig>,
    pub tts: Arc<TtsService>,
    pub gate: EditGate,
    pub seal: SessionSeal,
}

impl AppState {
    pub fn new(config: SiteConfig) -> Result<Self, TtsError> {
        let tts = TtsService::new(&config)?;
        let gate = EditGate::new(config.credentials.clone());
        let seal = SessionSeal::new(&config);
        Ok(Self {
            config: Arc::new(config),
            tts: Arc::new(tts),
            gate,
            seal,
        })
    }
}

/// Build application router
///
/// API routes first; every other path falls through to the site handler.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::post;

    let api = Router::new()
        .route("/api/update-menu", post(api::update_menu))
        .route("/api/tts", post(api::text_to_speech))
        .route("/api/login", post(api::login))
        .route("/api/logout", post(api::logout))
        .route("/api/save-page", post(api::save_page))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .fallback(pages::serve_site)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
