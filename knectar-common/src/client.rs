//! HTTP client for the site backend
//!
//! Used by the editor save flow and the menu importer's publish step. No
//! call is retried.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::menu::MenuTree;

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Header carrying the shared edit secret
pub const EDIT_SECRET_HEADER: &str = "x-edit-secret";

/// Backend client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response; `message` is the body's `error` field when present
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Encode error: {0}")]
    Encode(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    details: Option<String>,
}

/// Client for one running site
#[derive(Debug, Clone)]
pub struct SiteClient {
    http: reqwest::Client,
    base_url: String,
}

impl SiteClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the site's menu document with `tree`
    pub async fn update_menu(&self, secret: &str, tree: &MenuTree) -> Result<(), ClientError> {
        let body = serde_json::to_vec(tree).map_err(|e| ClientError::Encode(e.to_string()))?;
        let url = format!("{}/api/update-menu", self.base_url);
        debug!(url = %url, bytes = body.len(), "Publishing menu");

        let response = self
            .http
            .post(&url)
            .header(EDIT_SECRET_HEADER, secret)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        check_status(response).await.map(|_| ())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody {
            error: Some(error),
            details: Some(details),
        }) => format!("{}: {}", error, details),
        Ok(ErrorBody { error: Some(error), .. }) => error,
        _ => text,
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
