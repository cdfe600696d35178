//! Integration tests for the spreadsheet import
//!
//! Tests cover:
//! - Menu layout and category order
//! - Leaf fields taken from the spreadsheet columns
//! - Publishing to a running site

use knectar_common::menu::{parse_menu, save_menu};
use knectar_common::MenuTree;
use knectar_import::{build_menu, build_menu_from_path, publish, DEFAULT_COVER};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CSV: &str = "\
Project Title,Category,ROLE,BUDGET,TECHNOLOGY,DESIGN PARTNER,DESIGNER domain,DOMAIN,Description \n\
Shop Front,ecommerce,Developer,,Shopify,,,shop.example.com,A store
Yale Center for British Art,Higher Ed,Technical Lead,$200k,\"Drupal 10, JavaScript\",Studio X,studiox.example.com,britishart.yale.edu,Museum site
,Higher Ed,,,,,,,
Gallery,music,Designer,,Squarespace,,,,
Penn Law,higher education,Lead,,WordPress,,,,
Food Bank,non-profit,Lead,,Django,,,,
";

fn labels(tree: &MenuTree) -> Vec<&str> {
    tree.nodes().iter().map(|n| n.label.as_str()).collect()
}

// =============================================================================
// Menu Layout Tests
// =============================================================================

#[test]
fn test_top_level_order() {
    let tree = build_menu(CSV.as_bytes()).unwrap();

    assert_eq!(
        labels(&tree),
        vec![
            "About",
            "Higher Education",
            "E-Commerce",
            "Blog Posts",
            "Music & Art",
            "Non-Profit",
            "Resume"
        ]
    );

    let about = &tree.nodes()[0];
    assert_eq!(about.url.as_deref(), Some("#"));
    assert!(about.is_leaf());

    let blog = &tree.nodes()[3];
    assert_eq!(blog.submenu.as_ref().map(Vec::len), Some(0));
    assert!(!blog.has_more_link());

    let resume = tree.nodes().last().unwrap();
    assert_eq!(resume.url.as_deref(), Some("resume/resume.html"));
}

#[test]
fn test_categories_keep_row_order_and_icons() {
    let tree = build_menu(CSV.as_bytes()).unwrap();

    let higher_ed = &tree.nodes()[1];
    assert_eq!(higher_ed.icon.as_deref(), Some("grad.svg"));
    assert!(higher_ed.has_more_link());
    let titles: Vec<&str> = higher_ed
        .submenu
        .as_ref()
        .unwrap()
        .iter()
        .map(|n| n.label.as_str())
        .collect();
    assert_eq!(titles, vec!["Yale Center for British Art", "Penn Law"]);

    assert_eq!(tree.nodes()[5].icon.as_deref(), Some("info.svg"));
}

#[test]
fn test_leaf_fields() {
    let tree = build_menu(CSV.as_bytes()).unwrap();
    let yale = tree.find_by_slug("yale-center-for-british-art").unwrap();

    assert_eq!(yale.parent_label, Some("Higher Education"));
    let node = yale.node;
    assert_eq!(node.url.as_deref(), Some("project.html?item=yale-center-for-british-art"));
    assert_eq!(node.project_title.as_deref(), Some("Yale Center for British Art"));
    assert_eq!(node.role.as_deref(), Some("Technical Lead"));
    assert_eq!(node.budget.as_deref(), Some("$200k"));
    assert_eq!(node.technology.as_deref(), Some("Drupal 10, JavaScript"));
    assert_eq!(node.design_partner.as_deref(), Some("Studio X"));
    assert_eq!(node.design_partner_url.as_deref(), Some("studiox.example.com"));
    assert_eq!(node.project_url.as_deref(), Some("britishart.yale.edu"));
    assert_eq!(node.page_summary.as_deref(), Some("Museum site"));
    assert_eq!(node.cover_image.as_deref(), Some(DEFAULT_COVER));
    assert!(!node.is_hidden());

    let shop = tree.find_by_slug("shop-front").unwrap().node;
    assert!(shop.budget.is_none(), "Empty cells are left out");
}

#[tokio::test]
async fn test_written_document_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("project_data.csv");
    std::fs::write(&csv_path, CSV).unwrap();

    let tree = build_menu_from_path(&csv_path).unwrap();
    let out = dir.path().join("data/menu.json");
    save_menu(&out, &tree).await.unwrap();

    let json = std::fs::read_to_string(&out).unwrap();
    assert!(json.contains("\"sub_menu\": 1"));
    assert_eq!(parse_menu(&json).unwrap(), tree);
}

#[test]
fn test_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(build_menu_from_path(&dir.path().join("absent.csv")).is_err());
}

// =============================================================================
// Publish Tests
// =============================================================================

#[tokio::test]
async fn test_publish_sends_secret() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/update-menu"))
        .and(header("x-edit-secret", "hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let tree = build_menu(CSV.as_bytes()).unwrap();
    publish(&server.uri(), "hunter2", &tree).await.unwrap();
}

#[tokio::test]
async fn test_publish_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/update-menu"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({"error": "Forbidden"})))
        .mount(&server)
        .await;

    let tree = build_menu(CSV.as_bytes()).unwrap();
    let err = publish(&server.uri(), "wrong", &tree).await.unwrap_err();
    assert!(err.to_string().contains("403"));
}
