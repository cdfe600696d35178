//! Menu persistence endpoint

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use knectar_common::client::EDIT_SECRET_HEADER;
use knectar_common::menu::save_menu;
use knectar_common::MenuTree;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/update-menu
///
/// Replaces `data/menu.json` with the request body. The `x-edit-secret`
/// header must equal the configured secret; while no secret is configured
/// every request is refused. A refused request never touches the file.
///
/// The body must read as a menu tree, but the file receives the body itself
/// re-indented, so values the tree model would coerce are kept as sent.
pub async fn update_menu(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let provided = headers.get(EDIT_SECRET_HEADER).and_then(|v| v.to_str().ok());
    match (state.config.edit_secret.as_deref(), provided) {
        (Some(expected), Some(provided)) if provided == expected => {}
        _ => {
            warn!("Menu update refused: missing or wrong edit secret");
            return Err(ApiError::Forbidden);
        }
    }

    let invalid = |e: serde_json::Error| ApiError::BadRequest {
        error: "Invalid menu document".to_string(),
        details: Some(e.to_string()),
    };
    let document: Value = serde_json::from_slice(&body).map_err(invalid)?;
    let tree = MenuTree::deserialize(&document).map_err(invalid)?;

    let path = state.config.menu_path();
    save_menu(&path, &document).await.map_err(|e| {
        error!("Failed to write {}: {}", path.display(), e);
        ApiError::internal_with("Failed to write file", e.to_string())
    })?;

    info!(entries = tree.nodes().len(), "Menu updated");
    Ok(Json(json!({ "success": true })))
}
