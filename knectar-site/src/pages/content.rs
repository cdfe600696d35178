//! Page content injection: `data-field` elements, breadcrumb, project-info
//! and blog-post blocks, feature flags

use knectar_common::menu::PageRecord;
use knectar_common::url::encode_component;
use knectar_common::MenuNode;

use super::html::{escape_attr, escape_text, Document, Selector};
use super::PageContext;

/// Field rendered as authored HTML rather than text
const HTML_FIELD: &str = "pageBody";

const LINK_ICON: &str = r#"<img src="assets/link_arrow.svg" alt="" class="link-icon">"#;

/// Fill the template with the current page's data; no-op when the URL does
/// not resolve to a page
pub fn inject(doc: &mut Document, ctx: &PageContext) {
    let Some(located) = ctx.page() else {
        return;
    };
    let node = located.node;

    fill_fields(doc, &node.record());
    fill_breadcrumb(doc, ctx.menu.parent_label_of(node));

    if let Some(info) = doc.first(Selector::Class("project-info")) {
        doc.set_inner_html(info, &project_info_html(node));
    }
    fill_blog_post(doc, node);

    if node.text_to_audio_widget_displayed == Some(false) {
        if let Some(player) = doc.first(Selector::Class("tts-player")) {
            doc.set_style(player, "display", "none");
        }
    }
}

/// Rewrite every `data-field` element whose field is present
///
/// Anchors take `href` from `<field>Url` and text from `<field>Display`,
/// each falling back to the field itself. Images take `src`.
fn fill_fields(doc: &mut Document, record: &PageRecord) {
    for element in doc.all(Selector::Attr("data-field")).into_iter().rev() {
        let key = doc.attr(element, "data-field").unwrap_or_default().to_string();
        let Some(value) = record.get(&key) else {
            continue;
        };

        let tag = doc.tag(element).to_string();
        match tag.as_str() {
            "a" => {
                let href = non_empty(record.get(&format!("{}Url", key))).unwrap_or_else(|| value.clone());
                let display = non_empty(record.get(&format!("{}Display", key))).unwrap_or(value);
                doc.set_text(element, &display);
                doc.set_attr(element, "href", &href);
            }
            "img" => doc.set_attr(element, "src", &value),
            _ if key == HTML_FIELD => doc.set_inner_html(element, &value),
            _ => doc.set_text(element, &value),
        }
    }
}

fn fill_breadcrumb(doc: &mut Document, parent_label: Option<&str>) {
    let Some(crumb) = doc.first(Selector::Id("crumbCategoryLink")) else {
        return;
    };
    match parent_label {
        Some(label) => {
            doc.set_text(crumb, label);
            doc.set_attr(crumb, "href", &format!("projects.html?category={}", encode_component(label)));
        }
        None => doc.remove(crumb),
    }
}

/// Contents of the `.project-info` block
pub fn project_info_html(node: &MenuNode) -> String {
    let mut html = String::new();
    if let Some(title) = present(&node.project_title) {
        html.push_str(&format!("<h1>{}</h1>", escape_text(title)));
    }

    let mut rows = Vec::new();
    for (label, value) in [
        ("ROLE", &node.role),
        ("BUDGET", &node.budget),
        ("TECHNOLOGY", &node.technology),
        ("YEARS", &node.years),
    ] {
        if let Some(value) = present(value) {
            rows.push(format!("<li><strong>{}:</strong> {}</li>", label, escape_text(value)));
        }
    }
    if let Some(partner) = present(&node.design_partner) {
        match present(&node.design_partner_url) {
            Some(url) => rows.push(format!(
                "<li><strong>DESIGN PARTNER:</strong> {}</li>",
                external_link(url, partner)
            )),
            None => rows.push(format!("<li><strong>DESIGN PARTNER:</strong> {}</li>", escape_text(partner))),
        }
    }
    if let Some(url) = present(&node.project_url) {
        let display = present(&node.project_link_display).unwrap_or(url);
        rows.push(format!("<li><strong>DOMAIN:</strong> {}</li>", external_link(url, display)));
    }
    if !rows.is_empty() {
        html.push_str(&format!("<ul>{}</ul>", rows.join("\n")));
    }

    if let Some(summary) = present(&node.page_summary) {
        html.push_str(&format!(r#"<p class="description">{}</p>"#, escape_text(summary)));
    }
    if let Some(body) = present(&node.page_body) {
        html.push_str(&format!(r#"<div class="dynamic-body">{}</div>"#, body));
    }
    html
}

fn fill_blog_post(doc: &mut Document, node: &MenuNode) {
    let post = |doc: &Document| doc.first(Selector::Class("blog-post"));

    if let Some(tldr) = present(&node.page_tldr) {
        if let Some(summary) = post(doc).and_then(|p| doc.first_within(p, Selector::Class("blog-summary"))) {
            doc.set_inner_html(
                summary,
                &format!(r#"<span class="summary-label">TL;DR:</span> {}"#, escape_text(tldr)),
            );
        }
    }

    let mut rows = Vec::new();
    if let Some(author) = present(&node.author) {
        rows.push(format!(r#"<li><span class="label">Author:</span> <span>{}</span></li>"#, escape_text(author)));
    }
    if let Some(technology) = present(&node.technology) {
        rows.push(format!(
            r#"<li><span class="label">Technology:</span> <span>{}</span></li>"#,
            escape_text(technology)
        ));
    }
    if let Some(url) = present(&node.project_url) {
        let display = present(&node.project_link_display).unwrap_or(url);
        rows.push(format!(
            r#"<li><span class="label">Domain:</span> <span>{}</span></li>"#,
            external_link(url, display)
        ));
    }
    if !rows.is_empty() {
        if let Some(meta) = post(doc).and_then(|p| doc.first_within(p, Selector::Class("blog-meta"))) {
            doc.set_inner_html(meta, &rows.join("\n"));
        }
    }

    if let Some(title) = present(&node.project_title) {
        if let Some(h1) = post(doc).and_then(|p| doc.first_within(p, Selector::Tag("h1"))) {
            doc.set_text(h1, title);
        }
    }
}

fn external_link(url: &str, text: &str) -> String {
    format!(
        r#"<a href="{}" target="_blank" class="external-link">{}{}</a>"#,
        escape_attr(url),
        escape_text(text),
        LINK_ICON
    )
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::PageContext;
    use knectar_common::edit::EditMode;
    use knectar_common::menu::parse_menu;
    use knectar_common::url::PageUrl;

    fn ctx(target: &str) -> PageContext {
        PageContext {
            menu: parse_menu(
                r#"[
                    {"label": "Higher Education", "submenu": [
                        {"label": "Yale", "slug": "yale", "url": "project.html?item=yale",
                         "projectTitle": "Yale <Art>", "role": "Lead", "technology": "Drupal 10",
                         "designPartner": "Studio", "designPartnerUrl": "https://studio.example",
                         "projectUrl": "https://yale.example", "projectLinkDisplay": "yale.example",
                         "pageSummary": "Summary", "pageBody": "<p>Body</p>",
                         "coverImage": "assets/ycba.png", "textToAudioWidgetDisplayed": false}
                    ]},
                    {"label": "Standalone", "slug": "solo", "url": "solo.html", "author": "Ann"}
                ]"#,
            )
            .unwrap(),
            url: PageUrl::parse(target),
            edit_mode: EditMode::LoggedOut,
        }
    }

    #[test]
    fn test_project_template_filled() {
        let mut doc = Document::parse(
            r#"<body><a id="crumbCategoryLink" href="projects.html">Projects</a>
<div class="project-gallery"><img data-field="coverImage" src="placeholder.png"></div>
<div class="project-info"><h1>Placeholder</h1></div>
<div class="tts-player">player</div></body>"#,
        );
        inject(&mut doc, &ctx("/project.html?item=yale"));
        let html = doc.into_html();

        assert!(html.contains(
            r#"<a id="crumbCategoryLink" href="projects.html?category=Higher%20Education">Higher Education</a>"#
        ));
        assert!(html.contains(r#"<img data-field="coverImage" src="assets/ycba.png">"#));
        assert!(html.contains("<h1>Yale &lt;Art&gt;</h1>"));
        assert!(html.contains("<li><strong>TECHNOLOGY:</strong> Drupal 10</li>"));
        assert!(html.contains(r#"<a href="https://studio.example" target="_blank" class="external-link">Studio"#));
        assert!(html.contains(r#"<a href="https://yale.example" target="_blank" class="external-link">yale.example"#));
        assert!(html.contains(r#"<div class="dynamic-body"><p>Body</p></div>"#));
        assert!(html.contains(r#"<div class="tts-player" style="display: none">"#));
    }

    #[test]
    fn test_anchor_field_uses_url_and_display_keys() {
        let mut doc = Document::parse(r##"<a data-field="projectLink" href="#">x</a><span data-field="role">?</span>"##);
        let mut page = ctx("/solo.html");
        page.menu = parse_menu(
            r#"[{"label": "Solo", "url": "solo.html", "projectLink": "raw",
                 "projectLinkUrl": "https://x.example", "projectLinkDisplay": "X", "role": "Dev"}]"#,
        )
        .unwrap();
        inject(&mut doc, &page);
        assert_eq!(
            doc.html(),
            r#"<a data-field="projectLink" href="https://x.example">X</a><span data-field="role">Dev</span>"#
        );
    }

    #[test]
    fn test_top_level_page_drops_breadcrumb() {
        let mut doc = Document::parse(
            r##"<nav>Home / <a id="crumbCategoryLink" href="#">Cat</a></nav><article class="blog-post"><h1>T</h1><ul class="blog-meta"></ul></article>"##,
        );
        inject(&mut doc, &ctx("/solo.html"));
        let html = doc.into_html();
        assert!(!html.contains("crumbCategoryLink"));
        assert!(html.contains(r#"<ul class="blog-meta"><li><span class="label">Author:</span> <span>Ann</span></li></ul>"#));
        assert!(html.contains("<h1>T</h1>"));
    }

    #[test]
    fn test_unresolved_page_untouched() {
        let template = r#"<span data-field="role">?</span>"#;
        let mut doc = Document::parse(template);
        inject(&mut doc, &ctx("/missing.html"));
        assert_eq!(doc.html(), template);
    }
}
