//! Project list page: tiles, category and technology filters
//!
//! The filter state comes from the query string and every dropdown entry
//! links to the state it selects, so the list works without scripting.

use knectar_common::filter::{
    category_icon, FilterOutcome, FilterState, ProjectList, ProjectTile, TileAnimation, ALL,
};
use knectar_common::url::PageUrl;
use knectar_common::MenuTree;
use rand::Rng;
use tracing::debug;

use super::html::{escape_attr, escape_text, Document, Selector};

const LIST_PAGE: &str = "projects.html";

/// Tile image used when a page has no cover image
const PLACEHOLDER_COVER: &str = "project_tiles/sample_tile1.png";

/// The project list with a filter state applied
pub struct ProjectView {
    list: ProjectList,
    outcome: FilterOutcome,
    /// Per tile: image and text swap sides
    reversed: Vec<bool>,
}

impl ProjectView {
    pub fn build<R: Rng>(tree: &MenuTree, url: &PageUrl, rng: &mut R) -> Self {
        let list = ProjectList::from_tree(tree);
        let reversed = list.tiles().iter().map(|_| rng.gen_bool(0.5)).collect();
        let outcome = list.apply(&FilterState::from_url(url), rng);
        debug!(
            category = %outcome.state.category,
            technology = %outcome.state.technology,
            visible = outcome.visible_count(),
            "Project list filtered"
        );
        Self {
            list,
            outcome,
            reversed,
        }
    }

    /// Effective category after normalization
    pub fn category(&self) -> &str {
        &self.outcome.state.category
    }

    pub fn outcome(&self) -> &FilterOutcome {
        &self.outcome
    }

    pub fn inject(&self, doc: &mut Document) {
        let state = &self.outcome.state;

        self.set_inner(doc, "projectList", &self.tiles_html());
        self.set_inner(doc, "categoryFilter", &self.category_options_html());
        self.set_inner(doc, "dropdownOptions", &self.category_items_html());
        self.set_inner(doc, "technologyFilter", &self.technology_options_html());
        self.set_inner(doc, "techDropdownOptions", &self.technology_items_html());
        self.set_inner(doc, "dropdownLabel", &escape_text(&state.category));
        self.set_inner(doc, "techDropdownLabel", &escape_text(&self.outcome.technology_label()));

        if let Some(icon) = doc.first(Selector::Id("dropdownIcon")) {
            let background = category_icon(&state.category)
                .map(|path| format!("url('{}')", path))
                .unwrap_or_else(|| "none".to_string());
            doc.set_style(icon, "background-image", &background);
        }

        if let Some(crumb) = doc.first(Selector::Id("crumbCategoryLink")) {
            doc.set_text(crumb, &state.category);
            doc.set_attr(crumb, "href", &format!("{}{}", LIST_PAGE, state.query_string()));
        }
    }

    fn set_inner(&self, doc: &mut Document, id: &str, html: &str) {
        if let Some(element) = doc.first(Selector::Id(id)) {
            doc.set_inner_html(element, html);
        }
    }

    fn tiles_html(&self) -> String {
        let mut animations = self.outcome.animations.iter().peekable();
        let mut html = String::new();
        for (index, tile) in self.list.tiles().iter().enumerate() {
            let animation = animations.next_if(|a| a.tile == index);
            let visible = self.outcome.visible.get(index).copied().unwrap_or(false);
            html.push_str(&tile_html(
                tile,
                self.reversed.get(index).copied().unwrap_or(false),
                visible,
                animation,
            ));
        }
        html
    }

    fn category_options_html(&self) -> String {
        let current = &self.outcome.state.category;
        std::iter::once(ALL.to_string())
            .chain(self.list.categories().iter().cloned())
            .map(|category| {
                format!(
                    r#"<option value="{}"{}>{}</option>"#,
                    escape_attr(&category),
                    if &category == current { " selected" } else { "" },
                    escape_text(&category)
                )
            })
            .collect()
    }

    fn category_items_html(&self) -> String {
        let technology = &self.outcome.state.technology;
        std::iter::once(ALL.to_string())
            .chain(self.list.categories().iter().cloned())
            .map(|category| {
                let href = format!("{}{}", LIST_PAGE, FilterState::new(category.clone(), technology.clone()).query_string());
                format!(
                    r#"<li data-value="{}"><a href="{}">{}</a></li>"#,
                    escape_attr(&category),
                    escape_attr(&href),
                    escape_text(&category)
                )
            })
            .collect()
    }

    fn technology_options_html(&self) -> String {
        let current = &self.outcome.state.technology;
        let mut html = format!(
            r#"<option value="{}"{}>{}</option>"#,
            ALL,
            if current == ALL { " selected" } else { "" },
            escape_text(&self.outcome.all_label())
        );
        for option in &self.outcome.options {
            let mut flags = String::new();
            if option.hidden {
                flags.push_str(" hidden disabled");
            }
            if &option.name == current {
                flags.push_str(" selected");
            }
            html.push_str(&format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape_attr(&option.name),
                flags,
                escape_text(&option.label())
            ));
        }
        html
    }

    fn technology_items_html(&self) -> String {
        let category = &self.outcome.state.category;
        let item = |value: &str, label: &str, hidden: bool| {
            let href = format!("{}{}", LIST_PAGE, FilterState::new(category.clone(), value).query_string());
            format!(
                r#"<li data-value="{}"{}><a href="{}">{}</a></li>"#,
                escape_attr(value),
                if hidden { r#" style="display: none""# } else { "" },
                escape_attr(&href),
                escape_text(label)
            )
        };

        let mut html = item(ALL, &self.outcome.all_label(), false);
        for option in &self.outcome.options {
            html.push_str(&item(&option.name, &option.label(), option.hidden));
        }
        html
    }
}

fn tile_html(tile: &ProjectTile, reversed: bool, visible: bool, animation: Option<&TileAnimation>) -> String {
    let mut classes = vec!["project-tile"];
    if reversed {
        classes.push("reverse");
    }
    let mut style = vec!["cursor: pointer".to_string()];
    match animation {
        Some(animation) if visible => {
            classes.push(animation.from.css_class());
            style.push(format!("animation-delay: {}s", format_delay(animation.delay_secs)));
        }
        _ if !visible => style.push("display: none".to_string()),
        _ => {}
    }

    let mut text = format!(
        r#"<span class="project-category">{}</span><h2 class="project-title">{}</h2>"#,
        escape_text(&tile.parent_label),
        escape_text(&tile.title)
    );
    if let Some(role) = tile.role.as_deref().filter(|r| !r.is_empty()) {
        text.push_str(&format!("<p><strong>Role:</strong> {}</p>", escape_text(role)));
    }
    if !tile.technology.is_empty() {
        text.push_str(&format!("<p><strong>Technology:</strong> {}</p>", escape_text(&tile.technology)));
    }

    let cover = tile.cover_image.as_deref().filter(|c| !c.is_empty()).unwrap_or(PLACEHOLDER_COVER);
    let body = format!(
        r#"<div class="project-image"><img src="{}" alt="{} image"></div><div class="project-text">{}</div>"#,
        escape_attr(cover),
        escape_attr(&tile.title),
        text
    );
    let body = match tile.url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => format!(r#"<a class="project-link" href="{}">{}</a>"#, escape_attr(url), body),
        None => body,
    };

    format!(
        r#"<article class="{}" data-category="{}" data-technology="{}" style="{}">{}</article>"#,
        classes.join(" "),
        escape_attr(&tile.category),
        escape_attr(&tile.canonical.join("|")),
        style.join("; "),
        body
    )
}

/// Seconds with at most three decimals: `0`, `0.075`, `0.15`
fn format_delay(secs: f64) -> String {
    let fixed = format!("{:.3}", secs);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
