//! knectar-import library - menu document builder
//!
//! Turns the project spreadsheet (CSV export) into a menu tree: one leaf per
//! project row, grouped under normalized categories in display order.

use std::io::Read;
use std::path::Path;

use knectar_common::client::{ClientError, SiteClient};
use knectar_common::filter::category_icon;
use knectar_common::menu::Toggle;
use knectar_common::{MenuNode, MenuTree};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Longest slug produced from a title
pub const MAX_SLUG_LEN: usize = 60;

/// Cover image given to every imported project
pub const DEFAULT_COVER: &str = "assets/ycba.png";

/// Icon for categories without one of their own
const DEFAULT_ICON: &str = "info.svg";

/// Categories listed before the blog section, in this order
pub const CATEGORY_ORDER: [&str; 5] = [
    "Higher Education",
    "Intranets & Portals",
    "Web & iOS Apps",
    "Informational",
    "E-Commerce",
];

/// Category listed after the blog section
pub const MUSIC_CATEGORY: &str = "Music & Art";

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One spreadsheet row; column names are the export's headers verbatim
#[derive(Debug, Deserialize)]
struct ProjectRow {
    #[serde(rename = "Project Title")]
    title: String,
    #[serde(rename = "Category", default)]
    category: String,
    #[serde(rename = "ROLE", default)]
    role: Option<String>,
    #[serde(rename = "BUDGET", default)]
    budget: Option<String>,
    #[serde(rename = "TECHNOLOGY", default)]
    technology: Option<String>,
    #[serde(rename = "DESIGN PARTNER", default)]
    design_partner: Option<String>,
    #[serde(rename = "DESIGNER domain", default)]
    designer_domain: Option<String>,
    #[serde(rename = "DOMAIN", default)]
    domain: Option<String>,
    #[serde(rename = "Description ", default)]
    description: Option<String>,
}

/// Lowercase, runs of other characters collapsed to `-`, at most 60 chars
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let slug = NON_ALNUM.replace_all(&lower, "-");
    slug.trim_matches('-').chars().take(MAX_SLUG_LEN).collect()
}

/// Map the spreadsheet's free-form category onto the site's categories
pub fn normalize_category(raw: &str) -> String {
    let raw = raw.trim();
    let lower = raw.to_lowercase();
    let known = if lower.starts_with("high") {
        "Higher Education"
    } else if lower.starts_with("intranet") {
        "Intranets & Portals"
    } else if lower.starts_with("web") {
        "Web & iOS Apps"
    } else if lower.starts_with("inform") {
        "Informational"
    } else if lower.starts_with("e-") || lower.starts_with("ecommerce") {
        "E-Commerce"
    } else if lower.starts_with("music") {
        MUSIC_CATEGORY
    } else {
        return title_case(raw);
    };
    known.to_string()
}

/// Uppercase the first letter of every run of letters, lowercase the rest
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Menu icon file name for a category
pub fn icon_for(category: &str) -> &'static str {
    category_icon(category)
        .and_then(|path| path.strip_prefix("assets/"))
        .unwrap_or(DEFAULT_ICON)
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn project_node(row: ProjectRow, title: &str) -> MenuNode {
    let slug = slugify(title);
    MenuNode {
        label: title.to_string(),
        url: Some(format!("project.html?item={}", slug)),
        slug: Some(slug),
        project_title: Some(title.to_string()),
        role: present(row.role),
        budget: present(row.budget),
        technology: present(row.technology),
        design_partner: present(row.design_partner),
        design_partner_url: present(row.designer_domain),
        project_url: present(row.domain),
        page_summary: present(row.description),
        cover_image: Some(DEFAULT_COVER.to_string()),
        sub_menu: Some(Toggle::Number(1)),
        ..Default::default()
    }
}

fn category_node(label: &str, projects: Vec<MenuNode>) -> MenuNode {
    MenuNode {
        label: label.to_string(),
        icon: Some(icon_for(label).to_string()),
        more: Some(Toggle::Number(1)),
        submenu: Some(projects),
        ..Default::default()
    }
}

fn fixed_node(label: &str, icon: &str, url: Option<&str>, submenu: Option<Vec<MenuNode>>) -> MenuNode {
    MenuNode {
        label: label.to_string(),
        icon: Some(icon.to_string()),
        url: url.map(str::to_string),
        more: Some(Toggle::Number(0)),
        submenu,
        ..Default::default()
    }
}

/// Build the menu tree from CSV data
///
/// Layout: About, the ordered categories, an empty Blog Posts section,
/// Music & Art, any other categories in first-seen order, Resume. Rows
/// with a blank title are skipped.
pub fn build_menu<R: Read>(input: R) -> Result<MenuTree, ImportError> {
    let mut reader = csv::Reader::from_reader(input);
    let mut categories: Vec<(String, Vec<MenuNode>)> = Vec::new();

    for row in reader.deserialize::<ProjectRow>() {
        let row = row?;
        let title = row.title.trim().to_string();
        if title.is_empty() {
            debug!("Skipping row without a project title");
            continue;
        }

        let category = normalize_category(&row.category);
        let node = project_node(row, &title);
        match categories.iter_mut().find(|(label, _)| *label == category) {
            Some((_, projects)) => projects.push(node),
            None => categories.push((category, vec![node])),
        }
    }

    let mut take = |label: &str| -> Option<Vec<MenuNode>> {
        let index = categories.iter().position(|(l, _)| l == label)?;
        Some(categories.remove(index).1)
    };

    let mut menu = vec![fixed_node("About", "about.svg", Some("#"), None)];
    for label in CATEGORY_ORDER {
        if let Some(projects) = take(label) {
            menu.push(category_node(label, projects));
        }
    }
    menu.push(fixed_node("Blog Posts", "hash.svg", None, Some(Vec::new())));
    if let Some(projects) = take(MUSIC_CATEGORY) {
        menu.push(category_node(MUSIC_CATEGORY, projects));
    }
    for (label, projects) in categories {
        menu.push(category_node(&label, projects));
    }
    menu.push(fixed_node("Resume", "work.svg", Some("resume/resume.html"), None));

    Ok(MenuTree::new(menu))
}

/// Build the menu tree from a CSV file
pub fn build_menu_from_path(path: &Path) -> Result<MenuTree, ImportError> {
    let file = std::fs::File::open(path)?;
    let tree = build_menu(file)?;
    info!(
        "Imported {} projects from {}",
        tree.leaves().iter().filter(|l| l.parent_label.is_some()).count(),
        path.display()
    );
    Ok(tree)
}

/// Replace the menu of a running site
pub async fn publish(base_url: &str, secret: &str, tree: &MenuTree) -> Result<(), ClientError> {
    let client = SiteClient::new(base_url)?;
    client.update_menu(secret, tree).await?;
    info!("Published menu to {}", client.base_url());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Yale Center for British Art"), "yale-center-for-british-art");
        assert_eq!(slugify("  --Hello, World!--  "), "hello-world");
        assert_eq!(slugify("Café & Co."), "caf-co");
        assert_eq!(slugify(&"a".repeat(80)).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("Higher Ed"), "Higher Education");
        assert_eq!(normalize_category(" intranet "), "Intranets & Portals");
        assert_eq!(normalize_category("Web apps"), "Web & iOS Apps");
        assert_eq!(normalize_category("INFORMATIONAL"), "Informational");
        assert_eq!(normalize_category("e-commerce"), "E-Commerce");
        assert_eq!(normalize_category("ecommerce"), "E-Commerce");
        assert_eq!(normalize_category("Music"), "Music & Art");
        assert_eq!(normalize_category("non-profit work"), "Non-Profit Work");
        assert_eq!(normalize_category("3d art"), "3D Art");
    }

    #[test]
    fn test_icons() {
        assert_eq!(icon_for("Higher Education"), "grad.svg");
        assert_eq!(icon_for("E-Commerce"), "money.svg");
        assert_eq!(icon_for("Non-Profit Work"), "info.svg");
    }
}
