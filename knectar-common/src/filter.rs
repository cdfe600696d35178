//! Project list and its two composable filters
//!
//! Tiles are built from every displayable page of the menu tree. The list is
//! filtered by category (the page's parent label) and by technology.
//!
//! **Note:** the technology dropdown is populated from canonical names (see
//! [`crate::tech`]) while the technology match itself is a case-insensitive
//! substring test against the page's *raw* technology string. A page counted
//! under "JavaScript" because it lists "Node.js" is therefore not shown when
//! "JavaScript" is selected. This mirrors the live site's behaviour.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::debug;

use crate::menu::MenuTree;
use crate::tech::canonical_list;
use crate::url::{encode_component, PageUrl};

/// Filter value that disables a facet
pub const ALL: &str = "All";

/// Category given to pages that sit at the top level of the tree
pub const MISC_CATEGORY: &str = "Misc";

/// Delay added per visible tile to the entrance animation
pub const TILE_STAGGER_SECS: f64 = 0.075;

/// One tile of the project list
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectTile {
    pub title: String,
    pub url: Option<String>,
    pub category: String,
    /// Raw technology string as authored (may be empty)
    pub technology: String,
    /// Canonical technology names, de-duplicated in first-seen order
    pub canonical: Vec<String>,
    pub role: Option<String>,
    pub cover_image: Option<String>,
    /// Label shown above the title (empty for top-level pages)
    pub parent_label: String,
}

/// Selected category and technology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub category: String,
    pub technology: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: ALL.to_string(),
            technology: ALL.to_string(),
        }
    }
}

impl FilterState {
    pub fn new(category: impl Into<String>, technology: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            technology: technology.into(),
        }
    }

    /// Read `category` and `technology` from the query string
    pub fn from_url(url: &PageUrl) -> Self {
        Self {
            category: url.param("category").filter(|c| !c.is_empty()).unwrap_or_else(|| ALL.to_string()),
            technology: url.param("technology").filter(|t| !t.is_empty()).unwrap_or_else(|| ALL.to_string()),
        }
    }

    /// `?category=..&technology=..` with `All` facets omitted, or `""`
    pub fn query_string(&self) -> String {
        let mut parts = Vec::new();
        if self.category != ALL {
            parts.push(format!("category={}", encode_component(&self.category)));
        }
        if self.technology != ALL {
            parts.push(format!("technology={}", encode_component(&self.technology)));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}

/// Side a tile slides in from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideFrom {
    Left,
    Right,
}

impl SlideFrom {
    pub fn css_class(self) -> &'static str {
        match self {
            SlideFrom::Left => "slide-in-left",
            SlideFrom::Right => "slide-in-right",
        }
    }
}

/// Entrance animation for one visible tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileAnimation {
    pub tile: usize,
    pub from: SlideFrom,
    pub delay_secs: f64,
}

/// Technology dropdown entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechOption {
    pub name: String,
    pub count: usize,
    /// Zero-count options are hidden and not selectable
    pub hidden: bool,
}

impl TechOption {
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.count)
    }
}

/// Result of applying a filter state to the list
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Effective state after normalization and technology reset
    pub state: FilterState,
    /// Visibility per tile, in tile order
    pub visible: Vec<bool>,
    /// Number of tiles in the selected category
    pub category_total: usize,
    pub options: Vec<TechOption>,
    pub animations: Vec<TileAnimation>,
}

impl FilterOutcome {
    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }

    /// Label for the "All" technology entry
    pub fn all_label(&self) -> String {
        format!("{} ({})", ALL, self.category_total)
    }

    /// Label for the technology dropdown header
    pub fn technology_label(&self) -> String {
        if self.state.technology == ALL {
            return self.all_label();
        }
        let count = self
            .options
            .iter()
            .find(|o| o.name == self.state.technology)
            .map(|o| o.count)
            .unwrap_or(0);
        format!("{} ({})", self.state.technology, count)
    }
}

/// All tiles of the site plus the facet values derived from them
#[derive(Debug, Clone, Default)]
pub struct ProjectList {
    tiles: Vec<ProjectTile>,
    categories: Vec<String>,
    technologies: Vec<String>,
}

impl ProjectList {
    /// One tile per page that is not hidden, in depth-first order
    pub fn from_tree(tree: &MenuTree) -> Self {
        let tiles: Vec<ProjectTile> = tree
            .leaves()
            .into_iter()
            .filter(|located| !located.node.is_hidden())
            .map(|located| {
                let node = located.node;
                let technology = node.technology.clone().unwrap_or_default();
                ProjectTile {
                    title: node.title().to_string(),
                    url: node.url.clone(),
                    category: located.parent_label.unwrap_or(MISC_CATEGORY).to_string(),
                    canonical: canonical_list(&technology),
                    technology,
                    role: node.role.clone(),
                    cover_image: node.cover_image.clone(),
                    parent_label: located.parent_label.unwrap_or_default().to_string(),
                }
            })
            .collect();

        let mut categories: Vec<String> = Vec::new();
        for tile in &tiles {
            if !categories.contains(&tile.category) {
                categories.push(tile.category.clone());
            }
        }

        let (_, counts) = count_technologies(&tiles, ALL);
        let technologies = counts.into_keys().collect();

        Self {
            tiles,
            categories,
            technologies,
        }
    }

    pub fn tiles(&self) -> &[ProjectTile] {
        &self.tiles
    }

    /// Category facet values in order of first appearance
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Canonical technology names across all tiles, sorted
    pub fn technologies(&self) -> &[String] {
        &self.technologies
    }

    /// Apply a requested state
    ///
    /// An unknown category falls back to `All`. A technology with no tiles in
    /// the selected category resets to `All`. Visible tiles get a random
    /// slide direction and a delay growing by [`TILE_STAGGER_SECS`].
    pub fn apply<R: Rng>(&self, requested: &FilterState, rng: &mut R) -> FilterOutcome {
        let mut state = requested.clone();
        if state.category != ALL && !self.categories.contains(&state.category) {
            debug!("Unknown category filter {:?}, showing all", state.category);
            state.category = ALL.to_string();
        }

        let (category_total, counts) = count_technologies(&self.tiles, &state.category);

        let options: Vec<TechOption> = self
            .technologies
            .iter()
            .map(|name| {
                let count = counts.get(name).copied().unwrap_or(0);
                TechOption {
                    name: name.clone(),
                    count,
                    hidden: count == 0,
                }
            })
            .collect();

        if state.technology != ALL && counts.get(&state.technology).copied().unwrap_or(0) == 0 {
            debug!(
                "Technology filter {:?} has no matches in {:?}, resetting",
                state.technology, state.category
            );
            state.technology = ALL.to_string();
        }

        let visible: Vec<bool> = self.tiles.iter().map(|tile| tile_matches(tile, &state)).collect();

        let mut animations = Vec::new();
        let mut delay = 0.0;
        for (index, shown) in visible.iter().enumerate() {
            if !*shown {
                continue;
            }
            let from = if rng.gen_bool(0.5) {
                SlideFrom::Left
            } else {
                SlideFrom::Right
            };
            animations.push(TileAnimation {
                tile: index,
                from,
                delay_secs: delay,
            });
            delay += TILE_STAGGER_SECS;
        }

        FilterOutcome {
            state,
            visible,
            category_total,
            options,
            animations,
        }
    }
}

/// Category facet: exact parent label, or `All`
pub fn category_matches(tile: &ProjectTile, category: &str) -> bool {
    category == ALL || tile.category == category
}

/// Technology facet: case-insensitive substring of the raw string, or `All`
pub fn technology_matches(tile: &ProjectTile, technology: &str) -> bool {
    technology == ALL || tile.technology.to_lowercase().contains(&technology.to_lowercase())
}

pub fn tile_matches(tile: &ProjectTile, state: &FilterState) -> bool {
    category_matches(tile, &state.category) && technology_matches(tile, &state.technology)
}

/// Tiles in `category` and their canonical technology counts
fn count_technologies(tiles: &[ProjectTile], category: &str) -> (usize, BTreeMap<String, usize>) {
    let mut total = 0;
    let mut counts = BTreeMap::new();
    for tile in tiles.iter().filter(|t| category_matches(t, category)) {
        total += 1;
        for name in &tile.canonical {
            *counts.entry(name.clone()).or_insert(0) += 1;
        }
    }
    (total, counts)
}

/// Icon shown next to a category in the filter dropdown
pub fn category_icon(category: &str) -> Option<&'static str> {
    match category {
        "Higher Education" => Some("assets/grad.svg"),
        "Intranets & Portals" => Some("assets/intranet.svg"),
        "Web & iOS Apps" => Some("assets/web.svg"),
        "Informational" => Some("assets/info.svg"),
        "E-Commerce" => Some("assets/money.svg"),
        "Blog Posts" => Some("assets/hash.svg"),
        "Music & Art" => Some("assets/music.svg"),
        ALL => Some("assets/360.svg"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::parse_menu;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn list() -> ProjectList {
        let tree = parse_menu(
            r##"[
                {"label": "About", "url": "#"},
                {"label": "Higher Education", "submenu": [
                    {"label": "Yale", "url": "y.html", "technology": "Drupal 10, Custom JS"},
                    {"label": "Brown", "url": "b.html", "technology": "Drupal 7"},
                    {"label": "Hidden", "url": "h.html", "technology": "Magento", "sub_menu": 0}
                ]},
                {"label": "E-Commerce", "submenu": [
                    {"label": "Shop", "url": "s.html", "technology": "Shopify, Node.js"},
                    {"label": "Store", "url": "t.html", "technology": "Magento 2, javascript"}
                ]}
            ]"##,
        )
        .unwrap();
        ProjectList::from_tree(&tree)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn visible_titles(list: &ProjectList, outcome: &FilterOutcome) -> Vec<String> {
        list.tiles()
            .iter()
            .zip(&outcome.visible)
            .filter(|(_, v)| **v)
            .map(|(t, _)| t.title.clone())
            .collect()
    }

    #[test]
    fn test_tiles_skip_hidden_and_label_top_level_misc() {
        let list = list();
        let titles: Vec<_> = list.tiles().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["About", "Yale", "Brown", "Shop", "Store"]);
        assert_eq!(list.tiles()[0].category, MISC_CATEGORY);
        assert_eq!(list.categories(), &["Misc", "Higher Education", "E-Commerce"]);
    }

    #[test]
    fn test_technology_options_sorted_canonical() {
        let list = list();
        assert_eq!(
            list.technologies(),
            &["Drupal", "JavaScript", "Magento", "Shopify"]
        );
    }

    #[test]
    fn test_all_all_shows_everything() {
        let list = list();
        let outcome = list.apply(&FilterState::default(), &mut rng());
        assert_eq!(outcome.visible_count(), 5);
        assert_eq!(outcome.category_total, 5);
        assert_eq!(outcome.all_label(), "All (5)");
    }

    #[test]
    fn test_category_filter_scopes_counts_and_hides_zero_options() {
        let list = list();
        let outcome = list.apply(&FilterState::new("Higher Education", ALL), &mut rng());
        assert_eq!(visible_titles(&list, &outcome), vec!["Yale", "Brown"]);

        let drupal = outcome.options.iter().find(|o| o.name == "Drupal").unwrap();
        assert_eq!(drupal.count, 2);
        assert!(!drupal.hidden);
        let shopify = outcome.options.iter().find(|o| o.name == "Shopify").unwrap();
        assert_eq!(shopify.count, 0);
        assert!(shopify.hidden);
    }

    #[test]
    fn test_zero_count_technology_resets_to_all() {
        let list = list();
        let outcome = list.apply(&FilterState::new("Higher Education", "Shopify"), &mut rng());
        assert_eq!(outcome.state.technology, ALL);
        assert_eq!(outcome.visible_count(), 2);
        assert_eq!(outcome.state.query_string(), "?category=Higher%20Education");
    }

    #[test]
    fn test_technology_match_uses_raw_string() {
        let list = list();
        // "Shop" counts under JavaScript (Node.js) but its raw string lacks "javascript"
        let outcome = list.apply(&FilterState::new(ALL, "JavaScript"), &mut rng());
        let js = outcome.options.iter().find(|o| o.name == "JavaScript").unwrap();
        assert_eq!(js.count, 3);
        assert_eq!(visible_titles(&list, &outcome), vec!["Store"]);
        assert_eq!(outcome.technology_label(), "JavaScript (3)");
    }

    #[test]
    fn test_combined_filters_equal_predicate() {
        let list = list();
        for category in [ALL, "Higher Education", "E-Commerce", "Misc"] {
            for tech in [ALL, "Drupal", "Magento", "Shopify"] {
                let outcome = list.apply(&FilterState::new(category, tech), &mut rng());
                for (tile, shown) in list.tiles().iter().zip(&outcome.visible) {
                    assert_eq!(*shown, tile_matches(tile, &outcome.state));
                }
            }
        }
    }

    #[test]
    fn test_unknown_category_falls_back_to_all() {
        let list = list();
        let outcome = list.apply(&FilterState::new("Nope", ALL), &mut rng());
        assert_eq!(outcome.state.category, ALL);
        assert_eq!(outcome.visible_count(), 5);
    }

    #[test]
    fn test_animation_delays_stagger_visible_tiles() {
        let list = list();
        let outcome = list.apply(&FilterState::new("E-Commerce", ALL), &mut rng());
        let tiles: Vec<_> = outcome.animations.iter().map(|a| a.tile).collect();
        assert_eq!(tiles, vec![3, 4]);
        assert_eq!(outcome.animations[0].delay_secs, 0.0);
        assert!((outcome.animations[1].delay_secs - TILE_STAGGER_SECS).abs() < 1e-9);
    }

    #[test]
    fn test_query_string_roundtrip() {
        let state = FilterState::new("Web & iOS Apps", "Drupal");
        let query = state.query_string();
        assert_eq!(query, "?category=Web%20%26%20iOS%20Apps&technology=Drupal");
        let parsed = FilterState::from_url(&PageUrl::parse(&format!("/projects.html{}", query)));
        assert_eq!(parsed, state);
        assert_eq!(FilterState::default().query_string(), "");
    }

    #[test]
    fn test_category_icons() {
        assert_eq!(category_icon("E-Commerce"), Some("assets/money.svg"));
        assert_eq!(category_icon(ALL), Some("assets/360.svg"));
        assert_eq!(category_icon("Misc"), None);
    }
}
