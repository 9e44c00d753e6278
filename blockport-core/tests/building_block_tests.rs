use std::sync::Arc;

use blockport::app_context::BuildingBlockRequest;
use blockport::auth::{Actor, AllowAllAuthorizer};
use blockport::config::ImportSettings;
use blockport::errors::CoreErrorKind;
use blockport::services::DirectoryTemplateSource;
use blockport::AppContext;
use blockport_test_utils::fixtures::load_fixture;
use blockport_test_utils::seed::{seed_action, seed_standard_page, POSTGRES_PLUGIN};
use blockport_test_utils::{SeededPage, TempDir, TestDb};
use sea_orm::DatabaseConnection;

async fn setup_with_templates(
    blocks: &[(&str, &str)],
) -> (DatabaseConnection, SeededPage, AppContext, TempDir) {
    let db = TestDb::new_in_memory().migrated().await.unwrap();
    let seeded = seed_standard_page(&db).await.unwrap();

    let templates = TempDir::new().unwrap();
    for (template_id, fixture) in blocks {
        let bytes = load_fixture(&format!("blocks/{}.json", fixture)).unwrap();
        templates
            .write(&format!("{}.json", template_id), &bytes)
            .unwrap();
    }

    let context = AppContext::with_services(
        db.clone(),
        Arc::new(AllowAllAuthorizer),
        ImportSettings::default(),
        Arc::new(DirectoryTemplateSource::new(templates.path())),
    );
    (db, seeded, context, templates)
}

fn request(seeded: &SeededPage, template_id: &str) -> BuildingBlockRequest {
    BuildingBlockRequest {
        workspace_id: seeded.workspace.id,
        application_id: seeded.application.id,
        page_id: seeded.page.id,
        template_id: template_id.to_string(),
    }
}

#[tokio::test]
async fn building_block_response_carries_layout_and_renames() {
    let (db, seeded, context, _templates) =
        setup_with_templates(&[("query-table", "query_table")]).await;
    seed_action(&db, &seeded.page, seeded.plugin_id(POSTGRES_PLUGIN), "Query1")
        .await
        .unwrap();

    let response = context
        .import_building_block(&Actor::system(), request(&seeded, "query-table"), None)
        .await
        .unwrap();

    assert_eq!(
        response.refactored_name_map.get("Query1").map(String::as_str),
        Some("Query1Copy")
    );
    let layout = response.widget_layout.as_ref().unwrap();
    assert_eq!(layout["children"][0]["tableData"], "{{Query1Copy.data}}");

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["refactoredNameMap"]["Table1"], "Table1Copy");
    assert_eq!(json["onPageLoadActions"][0][0]["name"], "Query1Copy");
    assert_eq!(json["onPageLoadActions"][0][0]["pluginType"], "DB");
    assert!(json["widgetLayout"]["children"].is_array());
}

#[tokio::test]
async fn rename_map_lists_seeded_names_before_fragment_names() {
    let (_db, seeded, context, _templates) =
        setup_with_templates(&[("query-table", "query_table")]).await;

    let response = context
        .import_building_block(&Actor::system(), request(&seeded, "query-table"), None)
        .await
        .unwrap();

    let keys: Vec<&str> = response
        .refactored_name_map
        .keys()
        .map(String::as_str)
        .collect();
    // Home already holds a Table1 widget.
    assert_eq!(keys, vec!["Table1", "Query1", "RowCount"]);
    let renamed = |name: &str| response.refactored_name_map.get(name).map(String::as_str);
    assert_eq!(renamed("Table1"), Some("Table1Copy"));
    assert_eq!(renamed("Query1"), Some("Query1"));
    assert_eq!(renamed("RowCount"), Some("RowCount"));
}

#[tokio::test]
async fn unknown_template_is_not_found() {
    let (_db, seeded, context, _templates) = setup_with_templates(&[]).await;

    let err = context
        .import_building_block(&Actor::system(), request(&seeded, "missing-block"), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), CoreErrorKind::NotFound);
    assert_eq!(err.code(), Some("RESOURCE_NOT_FOUND"));
}

#[tokio::test]
async fn template_ids_cannot_escape_the_templates_dir() {
    let (_db, seeded, context, _templates) = setup_with_templates(&[]).await;

    let err = context
        .import_building_block(&Actor::system(), request(&seeded, "../secrets"), None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some("RESOURCE_NOT_FOUND"));
}
