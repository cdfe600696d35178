//! Server-side page composition
//!
//! HTML templates under the site root are rewritten per request from the
//! menu tree, the request URL and the edit-mode session. Composers run in a
//! fixed order: sidebar, page content, project list, edit controls, login
//! form, edit banner. Blog article audio is filled last, since it needs the
//! speech service. Everything that is not an HTML page is served as a
//! static file.

pub mod audio;
pub mod content;
pub mod edit;
pub mod html;
pub mod projects;
pub mod sidebar;

use std::path::{Path, PathBuf};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use knectar_common::edit::EditMode;
use knectar_common::menu::{load_menu, Located};
use knectar_common::url::PageUrl;
use knectar_common::MenuTree;
use rand::Rng;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, warn};

use crate::session::CookieStorage;
use crate::AppState;
use html::{Document, Selector};
use projects::ProjectView;

/// Page served for `/`
pub const INDEX_PAGE: &str = "index.html";

/// Everything a composer may read about the current request
#[derive(Debug, Clone)]
pub struct PageContext {
    pub menu: MenuTree,
    pub url: PageUrl,
    pub edit_mode: EditMode,
}

impl PageContext {
    /// The page the URL shows: `item` slug first, then the file name
    pub fn page(&self) -> Option<Located<'_>> {
        let item = self.url.param("item");
        self.menu.resolve_page(item.as_deref(), self.url.file_name())
    }
}

/// Apply every composer to `template`
pub fn compose_page<R: Rng>(template: &str, ctx: &PageContext, rng: &mut R) -> String {
    compose_document(template, ctx, rng).into_html()
}

fn compose_document<R: Rng>(template: &str, ctx: &PageContext, rng: &mut R) -> Document {
    let mut doc = Document::parse(template);

    let projects = doc
        .first(Selector::Id("projectList"))
        .map(|_| ProjectView::build(&ctx.menu, &ctx.url, rng));

    sidebar::inject(&mut doc, ctx, projects.as_ref().map(ProjectView::category));
    content::inject(&mut doc, ctx);
    if let Some(view) = &projects {
        view.inject(&mut doc);
    }
    edit::inject_controls(&mut doc, ctx);
    edit::inject_login_form(&mut doc, ctx);
    edit::inject_banner(&mut doc, ctx);

    doc
}

/// Fallback handler: composed HTML pages, static files otherwise
pub async fn serve_site(State(state): State<AppState>, request: Request) -> Response {
    let decoded = match urlencoding::decode(request.uri().path()) {
        Ok(path) => path.into_owned(),
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let Some(relative) = site_path(&decoded) else {
        debug!("Refusing path {}", decoded);
        return StatusCode::NOT_FOUND.into_response();
    };

    if relative.extension().and_then(|e| e.to_str()) == Some("html") {
        let target = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default();
        return render_page(&state, &relative, &target, request.headers()).await;
    }

    match ServeDir::new(&state.config.site_root).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// Relative file path for a request path
///
/// `/` maps to the index page. Any segment starting with `.` (dotfiles,
/// `..`) is refused.
pub fn site_path(path: &str) -> Option<PathBuf> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| s.starts_with('.') || s.contains('\\')) {
        return None;
    }
    if segments.is_empty() {
        return Some(PathBuf::from(INDEX_PAGE));
    }
    Some(segments.iter().collect())
}

async fn render_page(state: &AppState, relative: &Path, target: &str, headers: &HeaderMap) -> Response {
    let file = state.config.site_root.join(relative);
    let template = match tokio::fs::read_to_string(&file).await {
        Ok(template) => template,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return StatusCode::NOT_FOUND.into_response();
        }
        Err(e) => {
            warn!("Failed to read page {}: {}", file.display(), e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let menu = load_menu(&state.config.menu_path()).await;
    let mut cookies = CookieStorage::from_headers(headers);
    let edit_mode = state.seal.edit_mode(&state.gate, &mut cookies);

    let ctx = PageContext {
        menu,
        url: PageUrl::parse(target),
        edit_mode,
    };
    let mut doc = compose_document(&template, &ctx, &mut rand::thread_rng());
    audio::fill_player(&mut doc, &state.tts).await;

    let mut response = Html(doc.into_html()).into_response();
    cookies.apply_to(response.headers_mut());
    response
}
