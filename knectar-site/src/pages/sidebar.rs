//! Sidebar navigation built from the menu tree

use knectar_common::filter::ALL;
use knectar_common::url::{encode_component, PageUrl};
use knectar_common::{MenuNode, MenuTree};

use super::html::{escape_attr, escape_text, Document};
use super::PageContext;

/// Label of the legacy placeholder entries dropped from submenus
const MORE_LABEL: &str = "more...";

/// One rendered submenu link
struct SubLink {
    href: String,
    label: String,
}

/// Highlighted sidebar entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Active {
    /// Submenu link `child` of top-level entry `parent`
    Child { parent: usize, child: usize },
    Parent(usize),
}

/// Insert the sidebar and its overlay at the start of `<body>`
///
/// `category_override` is set on the project list page: the top-level entry
/// for the selected category is expanded and every other one collapsed.
pub fn inject(doc: &mut Document, ctx: &PageContext, category_override: Option<&str>) {
    let html = render_sidebar(&ctx.menu, &ctx.url, category_override);
    doc.prepend_to_body(&html);
}

/// Sidebar markup: `aside#sidebar` followed by the overlay
pub fn render_sidebar(tree: &MenuTree, url: &PageUrl, category_override: Option<&str>) -> String {
    let links: Vec<Vec<SubLink>> = tree.nodes().iter().map(submenu_links).collect();
    let active = find_active(tree, &links, url);

    let mut items = String::new();
    for (index, node) in tree.nodes().iter().enumerate() {
        let active_child = match active {
            Some(Active::Child { parent, child }) if parent == index => Some(child),
            _ => None,
        };
        let expanded = match category_override {
            Some(category) => category != ALL && is_category(node) && labels_match(&node.label, category),
            None => match active {
                Some(Active::Child { parent, .. }) => parent == index,
                Some(Active::Parent(parent)) => parent == index,
                None => false,
            },
        };
        items.push_str(&render_item(node, &links[index], expanded, active_child));
    }

    format!(
        concat!(
            r#"<aside class="sidebar" id="sidebar">"#,
            r#"<div class="logo logo-desktop logo-active"><a href="index.html"><img src="assets/logo.svg" class="logo-icon" alt="">KNECTAR</a></div>"#,
            r#"<nav class="main-nav"><ul>{}</ul></nav></aside>"#,
            r#"<div class="overlay"></div>"#
        ),
        items
    )
}

fn is_category(node: &MenuNode) -> bool {
    node.submenu.is_some()
}

/// Submenu links of a top-level entry, after skipping hidden entries and
/// placeholders and appending the automatic "more..." link
fn submenu_links(node: &MenuNode) -> Vec<SubLink> {
    let Some(children) = &node.submenu else {
        return Vec::new();
    };

    let mut links: Vec<SubLink> = children
        .iter()
        .filter(|child| !child.is_hidden() && child.label != MORE_LABEL)
        .map(|child| SubLink {
            href: child.url.clone().unwrap_or_default(),
            label: child.label.clone(),
        })
        .collect();

    if node.has_more_link() {
        links.push(SubLink {
            href: format!("projects.html?category={}", encode_component(&node.label)),
            label: MORE_LABEL.to_string(),
        });
    }
    links
}

/// Resolve the highlighted entry for `url`
///
/// Tried in order: a submenu link equal to `<file><query>`, a submenu link
/// ending with the file name, a category entry named by the `category`
/// query parameter (case-insensitive).
fn find_active(tree: &MenuTree, links: &[Vec<SubLink>], url: &PageUrl) -> Option<Active> {
    let full = url.file_with_query();
    let file = url.file_name();

    let find_child = |pred: &dyn Fn(&str) -> bool| {
        links.iter().enumerate().find_map(|(parent, subs)| {
            subs.iter()
                .position(|link| pred(&link.href))
                .map(|child| Active::Child { parent, child })
        })
    };

    if let Some(active) = find_child(&|href: &str| !full.is_empty() && href == full) {
        return Some(active);
    }
    if !file.is_empty() {
        if let Some(active) = find_child(&|href: &str| href.ends_with(file)) {
            return Some(active);
        }
    }

    let category = url.param("category")?;
    tree.nodes()
        .iter()
        .position(|node| is_category(node) && labels_match(&node.label, &category))
        .map(Active::Parent)
}

fn labels_match(label: &str, other: &str) -> bool {
    label.trim().to_uppercase() == other.trim().to_uppercase()
}

fn render_item(node: &MenuNode, links: &[SubLink], expanded: bool, active_child: Option<usize>) -> String {
    let li_class = if expanded {
        "menu-item-parent active"
    } else {
        "menu-item-parent"
    };
    let href = node.url.as_deref().filter(|u| !u.is_empty()).unwrap_or("#");
    let anchor_class = if is_category(node) { r#" class="menu-parent""# } else { "" };
    let icon = node
        .icon
        .as_deref()
        .map(|icon| format!(r#"<img src="assets/{}" class="nav-icon" alt="">"#, escape_attr(icon)))
        .unwrap_or_default();

    let mut out = format!(
        r#"<li class="{}"><a href="{}"{}>{}{}</a>"#,
        li_class,
        escape_attr(href),
        anchor_class,
        icon,
        escape_text(&node.label.to_uppercase())
    );

    if is_category(node) {
        if expanded {
            out.push_str(r#"<ul class="submenu" style="display: block">"#);
        } else {
            out.push_str(r#"<ul class="submenu">"#);
        }
        for (index, link) in links.iter().enumerate() {
            let class = if active_child == Some(index) {
                r#" class="active-sub""#
            } else {
                ""
            };
            out.push_str(&format!(
                r#"<li{}><a href="{}">{}</a></li>"#,
                class,
                escape_attr(&link.href),
                escape_text(&link.label)
            ));
        }
        out.push_str("</ul>");
    }

    out.push_str("</li>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use knectar_common::menu::parse_menu;

    fn tree() -> MenuTree {
        parse_menu(
            r#"[
                {"label": "About", "url": "about.html", "icon": "about.svg"},
                {"label": "Higher Education", "icon": "grad.svg", "more": 1, "submenu": [
                    {"label": "Yale", "url": "project.html?item=yale", "slug": "yale", "sub_menu": 1},
                    {"label": "Secret", "url": "project.html?item=secret", "slug": "secret", "sub_menu": 0},
                    {"label": "more...", "url": "projects.html"}
                ]},
                {"label": "Blog Posts", "icon": "hash.svg", "submenu": [
                    {"label": "Hello", "url": "blog.html?item=hello", "slug": "hello"},
                    {"label": "Legacy", "url": "posts/legacy.html"}
                ]}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_hidden_and_placeholder_entries_skipped() {
        let html = render_sidebar(&tree(), &PageUrl::parse("/index.html"), None);
        assert!(html.contains(r#"<a href="project.html?item=yale">Yale</a>"#));
        assert!(!html.contains("Secret"));
        assert_eq!(html.matches("more...").count(), 1);
        assert!(html.contains(r#"<a href="projects.html?category=Higher%20Education">more...</a>"#));
    }

    #[test]
    fn test_top_level_markup() {
        let html = render_sidebar(&tree(), &PageUrl::parse("/index.html"), None);
        assert!(html.starts_with(r#"<aside class="sidebar" id="sidebar">"#));
        assert!(html.ends_with(r#"<div class="overlay"></div>"#));
        assert!(html.contains(
            r#"<li class="menu-item-parent"><a href="about.html"><img src="assets/about.svg" class="nav-icon" alt="">ABOUT</a></li>"#
        ));
        assert!(html.contains(r##"<a href="#" class="menu-parent"><img src="assets/grad.svg" class="nav-icon" alt="">HIGHER EDUCATION</a>"##));
    }

    #[test]
    fn test_exact_match_marks_child_and_expands_parent() {
        let html = render_sidebar(&tree(), &PageUrl::parse("/project.html?item=yale"), None);
        assert!(html.contains(r##"<li class="menu-item-parent active"><a href="#" class="menu-parent">"##));
        assert!(html.contains(r#"<ul class="submenu" style="display: block"><li class="active-sub"><a href="project.html?item=yale">"#));
    }

    #[test]
    fn test_file_name_suffix_match() {
        let html = render_sidebar(&tree(), &PageUrl::parse("/legacy.html"), None);
        assert!(html.contains(r#"<li class="active-sub"><a href="posts/legacy.html">"#));
    }

    #[test]
    fn test_category_param_activates_parent() {
        let html = render_sidebar(&tree(), &PageUrl::parse("/other.html?category=blog%20posts"), None);
        assert!(html.contains(r##"<li class="menu-item-parent active"><a href="#" class="menu-parent"><img src="assets/hash.svg""##));
        assert!(!html.contains("active-sub"));
    }

    #[test]
    fn test_no_match_leaves_everything_collapsed() {
        let html = render_sidebar(&tree(), &PageUrl::parse("/"), None);
        assert!(!html.contains("menu-item-parent active"));
        assert!(!html.contains("active-sub"));
        assert!(!html.contains("display: block"));
    }

    #[test]
    fn test_category_override_collapses_others() {
        let url = PageUrl::parse("/project.html?item=yale");
        let html = render_sidebar(&tree(), &url, Some("Blog Posts"));
        assert_eq!(html.matches("menu-item-parent active").count(), 1);
        assert!(html.contains(r##"<li class="menu-item-parent active"><a href="#" class="menu-parent"><img src="assets/hash.svg""##));

        let html = render_sidebar(&tree(), &url, Some(ALL));
        assert!(!html.contains("menu-item-parent active"));
    }
}
