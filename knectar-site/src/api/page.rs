//! Page editor save endpoint
//!
//! Receives the edit-mode controls form. Only a sealed, live edit session
//! may save; the edit goes through [`PageEditor`] so the draft and the menu
//! document are written the same way a remote editor would.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use knectar_common::edit::{MemoryStorage, PageEditor, SessionStorage, DRAFT_KEY};
use knectar_common::menu::{load_menu, save_menu, PageKey};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::session::HOME;
use crate::error::{ApiError, ApiResult};
use crate::session::CookieStorage;
use crate::AppState;

/// Fields posted by the editor form
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEditForm {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub page_body: String,
    /// Sent only while the checkbox is ticked
    #[serde(default)]
    pub display_in_menu: Option<String>,
    #[serde(default)]
    pub return_to: Option<String>,
}

impl PageEditForm {
    fn key(&self) -> Option<PageKey> {
        let present = |v: &Option<String>| v.as_deref().filter(|v| !v.is_empty()).map(str::to_string);
        present(&self.slug)
            .map(PageKey::Slug)
            .or_else(|| present(&self.url).map(PageKey::Url))
    }
}

/// POST /api/save-page
///
/// Answers `303 See Other` back to the edited page, or 403 outside edit mode.
pub async fn save_page(State(state): State<AppState>, headers: HeaderMap, Form(form): Form<PageEditForm>) -> Response {
    let mut cookies = CookieStorage::from_headers(&headers);
    let mut response = match save(&state, &mut cookies, form).await {
        Ok(location) => Redirect::to(&location).into_response(),
        Err(e) => e.into_response(),
    };
    cookies.apply_to(response.headers_mut());
    response
}

async fn save(state: &AppState, cookies: &mut CookieStorage, form: PageEditForm) -> ApiResult<String> {
    if !state.seal.edit_mode(&state.gate, cookies).is_logged_in() {
        warn!("Page save refused: no edit session");
        return Err(ApiError::Forbidden);
    }

    let key = form
        .key()
        .ok_or_else(|| ApiError::bad_request("Missing page slug or url"))?;
    let menu_path = state.config.menu_path();
    let mut tree = load_menu(&menu_path).await;

    let mut editor = tree
        .find(&key)
        .and_then(|located| PageEditor::for_node(located.node))
        .ok_or_else(|| ApiError::BadRequest {
            error: "Page not in menu".to_string(),
            details: Some(format!("{:?}", key)),
        })?;
    // Browsers submit textarea line breaks as CRLF
    editor.set_body(form.page_body.replace("\r\n", "\n"));
    editor.set_display_in_menu(form.display_in_menu.is_some());

    let mut draft = MemoryStorage::new();
    let staged = editor
        .stage(&mut tree, &mut draft)
        .map_err(|e| ApiError::internal_with("Failed to stage edit", e.to_string()))?;

    if staged {
        if let Some(json) = draft.get(DRAFT_KEY) {
            let draft_path = state.config.draft_path();
            write_draft(&draft_path, json).await.map_err(|e| {
                error!("Failed to write {}: {}", draft_path.display(), e);
                ApiError::internal_with("Failed to write file", e.to_string())
            })?;
        }
        save_menu(&menu_path, &tree).await.map_err(|e| {
            error!("Failed to write {}: {}", menu_path.display(), e);
            ApiError::internal_with("Failed to write file", e.to_string())
        })?;
        editor.mark_saved();
        info!(page = ?key, "Page edit saved");
    } else {
        debug!(page = ?key, "Page edit unchanged, nothing written");
    }

    Ok(return_location(form.return_to.as_deref()))
}

async fn write_draft(path: &std::path::Path, json: String) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, json).await
}

/// Site-local path to send the editor back to; anything else goes home
fn return_location(requested: Option<&str>) -> String {
    match requested {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => HOME.to_string(),
    }
}
