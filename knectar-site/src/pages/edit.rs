//! Edit-mode affordances: banner, page editor controls, login page

use knectar_common::edit::{LoginError, PageEditor};
use knectar_common::menu::PageKey;

use super::html::{escape_attr, escape_text, Document, Selector};
use super::PageContext;

/// The login page never shows the banner or editor
pub const LOGIN_PAGE: &str = "edit.html";

/// Endpoint receiving the page editor form
pub const SAVE_ACTION: &str = "/api/save-page";

/// Enables the Save button on the first edit inside its form
const ENABLE_SAVE_JS: &str = "(function(f){var b=f.querySelector('.save-btn');\
function on(){b.disabled=false;}f.addEventListener('input',on);f.addEventListener('change',on);})\
(document.currentScript.parentNode);";

/// Vertical space taken by the banner
const BANNER_HEIGHT: &str = "40px";

const BANNER_HTML: &str = concat!(
    r#"<div id="edit-banner"><div class="edit-banner-content"><span>Editing Mode</span>"#,
    r#"<form method="post" action="/api/logout" class="logout-form">"#,
    r#"<button id="logoutBtn" class="logout-btn" type="submit">Logout</button></form></div></div>"#
);

const BANNER_CSS: &str = "\
#edit-banner { position: fixed; top: 0; left: 0; right: 0; background-color: #FF0000; color: white; \
z-index: 10000; font-family: 'Karla', sans-serif; font-size: 14px; font-weight: 500; }
.edit-banner-content { display: flex; justify-content: space-between; align-items: center; \
padding: 8px 20px; max-width: 1200px; margin: 0 auto; }
.logout-form { margin: 0; }
.logout-btn { background: none; border: 1px solid white; color: white; padding: 4px 12px; \
border-radius: 4px; cursor: pointer; font-size: 12px; transition: all 0.3s; }
.logout-btn:hover { background: white; color: #FF0000; }
";

fn is_login_page(ctx: &PageContext) -> bool {
    ctx.url.file_name() == LOGIN_PAGE
}

/// Editing banner with a logout button, on every page but the login page
pub fn inject_banner(doc: &mut Document, ctx: &PageContext) {
    if !ctx.edit_mode.is_logged_in() || is_login_page(ctx) {
        return;
    }

    if let Some(main) = doc.first(Selector::Class("main-content")) {
        doc.set_style(main, "margin-top", BANNER_HEIGHT);
    }
    if let Some(sidebar) = doc.first(Selector::Class("sidebar")) {
        doc.set_style(sidebar, "top", BANNER_HEIGHT);
        doc.set_style(sidebar, "height", &format!("calc(100vh - {})", BANNER_HEIGHT));
    }

    let style = format!("<style data-edit-banner>{}</style>", BANNER_CSS);
    if doc.first(Selector::Tag("head")).is_some() {
        doc.append_to_head(&style);
        doc.prepend_to_body(BANNER_HTML);
    } else {
        doc.prepend_to_body(&format!("{}{}", BANNER_HTML, style));
    }
}

/// Body editor, "Display in menu" checkbox and Save button on page views
///
/// Save starts disabled: a freshly loaded editor has nothing to save. The
/// controls are a form posting to `/api/save-page`, which brings the editor
/// back to this page.
pub fn inject_controls(doc: &mut Document, ctx: &PageContext) {
    if !ctx.edit_mode.is_logged_in() || is_login_page(ctx) {
        return;
    }
    let Some(editor) = ctx.page().and_then(|located| PageEditor::for_node(located.node)) else {
        return;
    };
    let Some(target) = doc
        .first(Selector::Class("project-info"))
        .or_else(|| doc.first(Selector::Class("blog-post")))
    else {
        return;
    };

    let return_to = match ctx.url.query() {
        "" => ctx.url.path().to_string(),
        query => format!("{}?{}", ctx.url.path(), query),
    };
    doc.append_html(target, &controls_html(&editor, &return_to));
}

/// Editor form; the page key is carried in `data-slug` or `data-url` and
/// posted back in the matching hidden field
pub fn controls_html(editor: &PageEditor, return_to: &str) -> String {
    let (key_name, key_value) = match editor.key() {
        PageKey::Slug(slug) => ("slug", escape_attr(slug)),
        PageKey::Url(url) => ("url", escape_attr(url)),
    };
    format!(
        concat!(
            r#"<form class="edit-controls" method="post" action="{save}" data-{name}="{value}">"#,
            r#"<input type="hidden" name="{name}" value="{value}">"#,
            r#"<textarea class="page-body-editor" name="pageBody">{body}</textarea>"#,
            r#"<label class="display-in-menu"><input type="checkbox" id="displayInMenu" name="displayInMenu" value="1"{checked}> Display in menu</label>"#,
            r#"<input type="hidden" name="returnTo" value="{return_to}">"#,
            r#"<button type="submit" id="savePageBtn" class="save-btn"{disabled}>Save</button>"#,
            "<script>{script}</script>",
            "</form>"
        ),
        save = SAVE_ACTION,
        name = key_name,
        value = key_value,
        body = escape_text(editor.body()),
        checked = if editor.display_in_menu() { " checked" } else { "" },
        return_to = escape_attr(return_to),
        disabled = if editor.is_dirty() { "" } else { " disabled" },
        script = ENABLE_SAVE_JS,
    )
}

/// Login form posting to the backend, with the inline error after a
/// rejected attempt (`?error=1`)
pub fn inject_login_form(doc: &mut Document, ctx: &PageContext) {
    if !is_login_page(ctx) {
        return;
    }

    if ctx.url.param("error").as_deref() == Some("1") {
        if let Some(message) = doc.first(Selector::Id("errorMessage")) {
            doc.set_text(message, &LoginError::InvalidCredentials.to_string());
            doc.set_style(message, "display", "block");
        }
    }

    if let Some(form) = doc.first(Selector::Id("loginForm")) {
        doc.set_attr(form, "method", "post");
        doc.set_attr(form, "action", "/api/login");
    }
}
