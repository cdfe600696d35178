//! Menu document loading and persistence
//!
//! Loading never fails: a missing or malformed document is replaced by the
//! inline fallback tree compiled into the binary.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use super::MenuTree;
use crate::Result;

const FALLBACK_MENU_JSON: &str = include_str!("fallback_menu.json");

/// Parse a menu document
pub fn parse_menu(json: &str) -> Result<MenuTree> {
    Ok(serde_json::from_str(json)?)
}

/// Inline copy of the menu used when the document is unavailable
pub fn fallback_menu() -> MenuTree {
    parse_menu(FALLBACK_MENU_JSON).unwrap_or_else(|e| {
        warn!("Inline fallback menu is invalid: {}", e);
        MenuTree::default()
    })
}

/// Read the menu document, falling back silently to the inline tree
pub async fn load_menu(path: &Path) -> MenuTree {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) => {
            warn!("Menu JSON unavailable ({}): {}, using inline data", path.display(), e);
            return fallback_menu();
        }
    };

    match parse_menu(&json) {
        Ok(tree) => {
            debug!("Loaded menu from {} ({} top-level entries)", path.display(), tree.nodes().len());
            tree
        }
        Err(e) => {
            warn!("Menu JSON at {} is malformed: {}, using inline data", path.display(), e);
            fallback_menu()
        }
    }
}

/// Overwrite the menu document (2-space pretty JSON)
///
/// Takes a [`MenuTree`] or a raw `serde_json::Value`; a value is written
/// exactly as given, keeping keys and number forms the tree model would
/// normalize. The write replaces the whole file. Concurrent writers are not
/// coordinated: the last one wins.
pub async fn save_menu<T: Serialize + ?Sized>(path: &Path, document: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(dir).await?;
        }
    }
    tokio::fs::write(path, json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_menu_parses() {
        let tree = fallback_menu();
        assert!(!tree.is_empty());
        assert!(!tree.leaves().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let tree = load_menu(&dir.path().join("nope.json")).await;
        assert_eq!(tree, fallback_menu());
    }

    #[tokio::test]
    async fn test_malformed_file_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_menu(&path).await, fallback_menu());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("menu.json");
        let tree = parse_menu(r#"[{"label": "Blog Posts", "submenu": [{"label": "Hi", "slug": "hi"}]}]"#).unwrap();

        save_menu(&path, &tree).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("[\n  {"));
        assert_eq!(load_menu(&path).await, tree);
    }
}
