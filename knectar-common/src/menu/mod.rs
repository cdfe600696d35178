//! Menu tree model
//!
//! The menu document (`data/menu.json`) is a tree of navigation categories
//! whose leaves are the site's renderable pages (projects and blog posts).
//! Leaves carry the page metadata that the content injector and the project
//! list read.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

mod loader;
mod lookup;

pub use loader::{fallback_menu, load_menu, parse_menu, save_menu};
pub use lookup::{Located, PageKey};

/// Numeric-or-boolean flag as it appears in hand-edited menu documents
///
/// `sub_menu` and `more` are written as `0`/`1` by the importer and as
/// `true`/`false` by hand. The original representation is kept so a
/// re-serialized tree stays diff-friendly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toggle {
    Bool(bool),
    Number(i64),
}

impl Toggle {
    /// Truthiness of the flag
    pub fn is_on(self) -> bool {
        match self {
            Toggle::Bool(b) => b,
            Toggle::Number(n) => n != 0,
        }
    }

    /// Same flag with a new value, keeping the representation
    pub fn with(self, on: bool) -> Self {
        match self {
            Toggle::Bool(_) => Toggle::Bool(on),
            Toggle::Number(_) => Toggle::Number(on as i64),
        }
    }
}

/// One entry of the menu tree
///
/// Entries with a `submenu` are categories; entries without one are pages.
/// Keys this model does not name are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    #[serde(default, deserialize_with = "lenient_label")]
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submenu: Option<Vec<MenuNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub years: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub project_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub page_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub page_body: Option<String>,
    #[serde(
        default,
        rename = "pageTLDR",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_text"
    )]
    pub page_tldr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub cover_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub design_partner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub design_partner_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub project_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub project_link_display: Option<String>,

    /// `0`/`false` hides a page from the sidebar and the project list
    #[serde(
        default,
        rename = "sub_menu",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_toggle"
    )]
    pub sub_menu: Option<Toggle>,
    /// Appends an automatic "more..." link to a category's submenu
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_toggle")]
    pub more: Option<Toggle>,
    /// `false` hides the text-to-speech player on the page
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_bool")]
    pub text_to_audio_widget_displayed: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MenuNode {
    /// A page has no submenu (an empty submenu still makes a category)
    pub fn is_leaf(&self) -> bool {
        self.submenu.is_none()
    }

    /// Hidden from navigation only when `sub_menu` is present and off
    pub fn is_hidden(&self) -> bool {
        matches!(self.sub_menu, Some(flag) if !flag.is_on())
    }

    pub fn has_more_link(&self) -> bool {
        self.more.map(Toggle::is_on).unwrap_or(false)
    }

    /// Title used for headings and tiles
    pub fn title(&self) -> &str {
        self.project_title.as_deref().unwrap_or(&self.label)
    }

    /// Flat field view of this node, keyed by JSON names
    pub fn record(&self) -> PageRecord {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => PageRecord(map),
            _ => PageRecord(Map::new()),
        }
    }
}

/// Field lookup by JSON key, as used by `data-field` templates
#[derive(Debug, Clone, Default)]
pub struct PageRecord(Map<String, Value>);

impl PageRecord {
    /// Text value of a field; `null`, arrays and objects have none
    pub fn get(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// The whole menu document: the top-level entries in display order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuTree(pub Vec<MenuNode>);

impl MenuTree {
    pub fn new(nodes: Vec<MenuNode>) -> Self {
        Self(nodes)
    }

    pub fn nodes(&self) -> &[MenuNode] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Accepts strings, numbers and booleans for free-text fields
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Free-text field that must always be present; unusable values read as ""
fn lenient_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

/// Flags accept booleans, numbers and their string spellings; anything
/// else reads as absent rather than failing the whole document
fn lenient_toggle<'de, D>(deserializer: D) -> Result<Option<Toggle>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(Toggle::Bool(b)),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| (f != 0.0) as i64))
            .map(Toggle::Number),
        Some(Value::String(s)) => match s.trim() {
            "true" => Some(Toggle::Bool(true)),
            "false" => Some(Toggle::Bool(false)),
            other => other.parse().ok().map(Toggle::Number),
        },
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_toggle(deserializer)?.map(Toggle::is_on))
}
