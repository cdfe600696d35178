//! Technology label canonicalization
//!
//! Menu entries carry free-text technology strings such as
//! `"Drupal 10, Custom JS, 2019"`. The project list groups them under a
//! fixed set of display names for its technology facet.

use once_cell::sync::Lazy;
use regex::Regex;

/// Pattern table, checked in order; the first match names the group.
///
/// `javascript|js` precedes `p5\.js`, so p5.js labels land in JavaScript.
static CANONICAL_NAMES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)drupal", "Drupal"),
        (r"(?i)shopify", "Shopify"),
        (r"(?i)magento", "Magento"),
        (r"(?i)wordpress", "WordPress"),
        (r"(?i)django", "Django"),
        (r"(?i)angular", "Angular"),
        (r"(?i)javascript|js", "JavaScript"),
        (r"(?i)p5\.js", "P5.js"),
        (r"(?i)unity", "Unity"),
        (r"(?i)c#", "C#"),
        (r"(?i)rhino", "Rhino 3D"),
    ]
    .into_iter()
    .filter_map(|(pattern, name)| Regex::new(pattern).ok().map(|re| (re, name)))
    .collect()
});

static DIGITS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid regex"));

/// First run of whitespace followed by digits, and everything after it
static TRAILING_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\d+.*").expect("valid regex"));

/// Canonical display name for one technology token
///
/// Returns `None` for empty and numeric-only tokens (years, version
/// numbers listed on their own).
///
/// # Examples
///
/// ```
/// use knectar_common::tech::canonicalize_tech;
///
/// assert_eq!(canonicalize_tech(" drupal 9 ").as_deref(), Some("Drupal"));
/// assert_eq!(canonicalize_tech("PHP 8.1").as_deref(), Some("PHP"));
/// assert_eq!(canonicalize_tech("2019"), None);
/// ```
pub fn canonicalize_tech(raw: &str) -> Option<String> {
    let token = raw.trim();
    if token.is_empty() || DIGITS_ONLY.is_match(token) {
        return None;
    }

    if let Some((_, name)) = CANONICAL_NAMES.iter().find(|(re, _)| re.is_match(token)) {
        return Some((*name).to_string());
    }

    let cleaned = TRAILING_VERSION.replacen(token, 1, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        Some(token.to_string())
    } else {
        Some(cleaned.to_string())
    }
}

/// Split a raw technology string on commas and canonicalize each token,
/// keeping first-seen order without duplicates
pub fn canonical_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in raw.split(',').filter_map(canonicalize_tech) {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
