//! Page editor: body text and "display in menu" for one page
//!
//! Saving is allowed only when either field differs from its last-saved
//! value. A save first stages the edit (tree updated, draft storage key
//! written), then persists the whole tree: through the backend API for
//! remote callers, or straight to the menu document on the server.

use tracing::info;

use super::storage::{SessionStorage, DRAFT_KEY};
use crate::client::{ClientError, SiteClient};
use crate::menu::{MenuNode, MenuTree, PageKey, Toggle};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEditor {
    key: PageKey,
    saved_body: String,
    saved_display: bool,
    body: String,
    display_in_menu: bool,
}

impl PageEditor {
    /// Editor for a page; `None` when the page has neither slug nor url
    pub fn for_node(node: &MenuNode) -> Option<Self> {
        let key = PageKey::of(node)?;
        let body = node.page_body.clone().unwrap_or_default();
        let display = !node.is_hidden();
        Some(Self {
            key,
            saved_body: body.clone(),
            saved_display: display,
            body,
            display_in_menu: display,
        })
    }

    pub fn key(&self) -> &PageKey {
        &self.key
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn display_in_menu(&self) -> bool {
        self.display_in_menu
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn set_display_in_menu(&mut self, display: bool) {
        self.display_in_menu = display;
    }

    /// Save is enabled only while this is true
    pub fn is_dirty(&self) -> bool {
        self.body != self.saved_body || self.display_in_menu != self.saved_display
    }

    /// Write the edited fields into the tree
    pub fn apply(&self, tree: &mut MenuTree) -> bool {
        let Some(node) = tree.find_mut(&self.key) else {
            return false;
        };
        node.page_body = if self.body.is_empty() { None } else { Some(self.body.clone()) };
        node.sub_menu = Some(match node.sub_menu {
            Some(flag) => flag.with(self.display_in_menu),
            None => Toggle::Number(self.display_in_menu as i64),
        });
        true
    }

    /// Apply the edit to `tree` and mirror the tree to draft storage
    ///
    /// Returns `Ok(false)` when there was nothing to save. The saved values
    /// do not move; call [`PageEditor::mark_saved`] once the tree is
    /// persisted.
    pub fn stage<S: SessionStorage>(&self, tree: &mut MenuTree, storage: &mut S) -> Result<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }
        if !self.apply(tree) {
            return Err(Error::NotFound(format!("page {:?} is not in the menu", self.key)));
        }
        storage.set(DRAFT_KEY, serde_json::to_string(tree)?);
        Ok(true)
    }

    /// The current values become the last-saved ones
    pub fn mark_saved(&mut self) {
        self.saved_body = self.body.clone();
        self.saved_display = self.display_in_menu;
        info!("Saved page {:?}", self.key);
    }

    /// Persist the edit: stage it, then publish with `secret`
    ///
    /// Returns `Ok(false)` when there was nothing to save. The saved values
    /// advance only after the backend accepted the write.
    pub async fn save<S: SessionStorage>(
        &mut self,
        tree: &mut MenuTree,
        client: &SiteClient,
        secret: &str,
        storage: &mut S,
    ) -> std::result::Result<bool, ClientError> {
        if !self.stage(tree, storage).map_err(|e| ClientError::Encode(e.to_string()))? {
            return Ok(false);
        }
        client.update_menu(secret, tree).await?;
        self.mark_saved();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::MemoryStorage;
    use crate::menu::parse_menu;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tree() -> MenuTree {
        parse_menu(
            r#"[{"label": "Blog Posts", "submenu": [
                {"label": "Hi", "slug": "hi", "pageBody": "<p>old</p>", "sub_menu": 1}
            ]}]"#,
        )
        .unwrap()
    }

    fn editor(tree: &MenuTree) -> PageEditor {
        PageEditor::for_node(tree.find_by_slug("hi").unwrap().node).unwrap()
    }

    #[test]
    fn test_dirty_tracking() {
        let tree = tree();
        let mut editor = editor(&tree);
        assert!(!editor.is_dirty());

        editor.set_body("<p>new</p>");
        assert!(editor.is_dirty());
        editor.set_body("<p>old</p>");
        assert!(!editor.is_dirty());

        editor.set_display_in_menu(false);
        assert!(editor.is_dirty());
    }

    #[test]
    fn test_apply_updates_node_and_keeps_flag_form() {
        let mut tree = tree();
        let mut editor = editor(&tree);
        editor.set_display_in_menu(false);
        assert!(editor.apply(&mut tree));

        let node = tree.find_by_slug("hi").unwrap().node;
        assert_eq!(node.sub_menu, Some(Toggle::Number(0)));
        assert!(node.is_hidden());
    }

    #[test]
    fn test_stage_unknown_page_is_not_found() {
        let mut tree = tree();
        let mut editor = editor(&tree);
        let mut other = parse_menu(r#"[{"label": "Other", "slug": "other"}]"#).unwrap();
        editor.set_body("<p>new</p>");
        let mut storage = MemoryStorage::new();

        assert!(matches!(editor.stage(&mut other, &mut storage), Err(Error::NotFound(_))));
        assert!(storage.get(DRAFT_KEY).is_none());
        assert!(editor.stage(&mut tree, &mut storage).unwrap());
        assert!(editor.is_dirty(), "Staging alone does not mark the edit saved");
    }

    #[tokio::test]
    async fn test_save_without_changes_is_noop() {
        let mut tree = tree();
        let mut editor = editor(&tree);
        let client = SiteClient::new("http://127.0.0.1:9").unwrap();
        let mut storage = MemoryStorage::new();

        assert!(!editor.save(&mut tree, &client, "s", &mut storage).await.unwrap());
        assert!(storage.get(DRAFT_KEY).is_none());
    }

    #[tokio::test]
    async fn test_save_publishes_and_mirrors_draft() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/update-menu"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let mut tree = tree();
        let mut editor = editor(&tree);
        editor.set_body("<p>new</p>");
        let client = SiteClient::new(server.uri()).unwrap();
        let mut storage = MemoryStorage::new();

        assert!(editor.save(&mut tree, &client, "secret", &mut storage).await.unwrap());
        assert!(!editor.is_dirty());

        let draft = parse_menu(&storage.get(DRAFT_KEY).unwrap()).unwrap();
        assert_eq!(draft.find_by_slug("hi").unwrap().node.page_body.as_deref(), Some("<p>new</p>"));
    }

    #[tokio::test]
    async fn test_failed_save_stays_dirty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/update-menu"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({"error": "Forbidden"})))
            .mount(&server)
            .await;

        let mut tree = tree();
        let mut editor = editor(&tree);
        editor.set_body("<p>new</p>");
        let client = SiteClient::new(server.uri()).unwrap();
        let mut storage = MemoryStorage::new();

        assert!(editor.save(&mut tree, &client, "wrong", &mut storage).await.is_err());
        assert!(editor.is_dirty());
        assert!(storage.get(DRAFT_KEY).is_some());
    }
}
