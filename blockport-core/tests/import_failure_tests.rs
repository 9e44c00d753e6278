use std::sync::Arc;

use blockport::auth::{
    Actor, Scope, ScopeAuthorizer, ACTION_CREATE_ACTION, ACTION_CREATE_DATASOURCE, ACTION_EDIT,
    ACTION_READ,
};
use blockport::config::ImportSettings;
use blockport::database::entities::{
    action_collections, actions, applications, custom_js_libs, datasources,
};
use blockport::errors::{CoreError, CoreErrorKind};
use blockport::partial_import::PageTarget;
use blockport::services::DirectoryTemplateSource;
use blockport::AppContext;
use blockport_test_utils::fixtures::{load_block, load_fixture};
use blockport_test_utils::seed::{page_dsl, seed_application, seed_page, seed_standard_page};
use blockport_test_utils::{SeededPage, TempDir, TestDb};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait, Set,
};
use serde_json::json;

async fn setup() -> (DatabaseConnection, SeededPage, AppContext, TempDir) {
    let db = TestDb::new_in_memory().migrated().await.unwrap();
    let seeded = seed_standard_page(&db).await.unwrap();
    let templates = TempDir::new().unwrap();
    let context = AppContext::with_services(
        db.clone(),
        Arc::new(ScopeAuthorizer),
        ImportSettings::default(),
        Arc::new(DirectoryTemplateSource::new(templates.path())),
    );
    (db, seeded, context, templates)
}

/// User allowed to reach the page but holding only the listed page-level grants.
fn page_editor(seeded: &SeededPage, page_actions: &[&str]) -> Actor {
    let actor = Actor::user(7)
        .with_permission(Scope::Workspace(seeded.workspace.id), ACTION_READ)
        .with_permission(Scope::Application(seeded.application.id), ACTION_EDIT)
        .with_permission(Scope::Page(seeded.page.id), ACTION_EDIT);
    page_actions.iter().fold(actor, |actor, action| {
        actor.with_permission(Scope::Page(seeded.page.id), action)
    })
}

async fn import_document(
    context: &AppContext,
    actor: &Actor,
    target: PageTarget,
    document: serde_json::Value,
) -> CoreError {
    context
        .import_resource_in_page(actor, target, document.to_string().as_bytes())
        .await
        .unwrap_err()
}

fn field<'a>(err: &'a CoreError, key: &str) -> Option<&'a str> {
    err.fields()
        .and_then(|fields| fields.get(key))
        .map(String::as_str)
}

async fn row_counts(db: &DatabaseConnection) -> (u64, u64, u64, u64) {
    (
        actions::Entity::find().count(db).await.unwrap(),
        action_collections::Entity::find().count(db).await.unwrap(),
        datasources::Entity::find().count(db).await.unwrap(),
        custom_js_libs::Entity::find().count(db).await.unwrap(),
    )
}

#[tokio::test]
async fn missing_collection_permission_rolls_back_everything() {
    let (db, seeded, context, _templates) = setup().await;
    let actor = page_editor(&seeded, &[ACTION_CREATE_ACTION]);
    let document = load_fixture("blocks/js_object.json").unwrap();

    let err = context
        .import_resource_in_page(&actor, seeded.target(), &document)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), CoreErrorKind::Forbidden);
    assert_eq!(err.code(), Some("PERMISSION_DENIED"));
    assert_eq!(field(&err, "stage"), Some("action_collections"));
    assert_eq!(row_counts(&db).await, (0, 0, 0, 0));

    let application = applications::Entity::find_by_id(seeded.application.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(application.installed_js_lib_uids().unwrap().is_empty());
}

#[tokio::test]
async fn missing_datasource_permission_is_denied() {
    let (db, seeded, context, _templates) = setup().await;
    let actor = page_editor(&seeded, &[ACTION_CREATE_ACTION]);
    let document = load_fixture("blocks/query_table.json").unwrap();

    let err = context
        .import_resource_in_page(&actor, seeded.target(), &document)
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some("PERMISSION_DENIED"));
    assert_eq!(field(&err, "stage"), Some("datasources"));
    assert_eq!(field(&err, "entity"), Some("Users DB"));
    assert_eq!(row_counts(&db).await, (0, 0, 0, 0));
}

#[tokio::test]
async fn fully_granted_user_can_import() {
    let (db, seeded, context, _templates) = setup().await;
    let actor = page_editor(&seeded, &[ACTION_CREATE_ACTION])
        .with_permission(Scope::Workspace(seeded.workspace.id), ACTION_CREATE_DATASOURCE);
    let document = load_fixture("blocks/query_table.json").unwrap();

    context
        .import_resource_in_page(&actor, seeded.target(), &document)
        .await
        .unwrap();

    assert_eq!(row_counts(&db).await, (1, 0, 1, 0));
}

#[tokio::test]
async fn unreadable_workspace_looks_missing() {
    let (db, seeded, context, _templates) = setup().await;
    let actor = Actor::user(7)
        .with_permission(Scope::Application(seeded.application.id), ACTION_EDIT)
        .with_permission(Scope::Page(seeded.page.id), ACTION_EDIT);

    let err = context
        .import_resource_in_page(
            &actor,
            seeded.target(),
            &load_fixture("blocks/query_table.json").unwrap(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), CoreErrorKind::NotFound);
    assert_eq!(err.code(), Some("RESOURCE_NOT_FOUND"));
    assert_eq!(field(&err, "stage"), Some("target_resolution"));
    assert_eq!(row_counts(&db).await, (0, 0, 0, 0));
}

#[tokio::test]
async fn page_outside_application_is_not_found() {
    let (db, seeded, context, _templates) = setup().await;
    let other_app = seed_application(&db, seeded.workspace.id, "Other")
        .await
        .unwrap();
    let other_page = seed_page(&db, other_app.id, "Elsewhere", page_dsl(&[]))
        .await
        .unwrap();

    let target = PageTarget {
        page_id: other_page.id,
        ..seeded.target()
    };
    let err = context
        .partial_import_service()
        .import_fragment(&Actor::system(), &target, load_block("query_table").unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn full_application_export_is_rejected() {
    let (db, seeded, context, _templates) = setup().await;

    let err = import_document(
        &context,
        &Actor::system(),
        seeded.target(),
        json!({ "exportedApplication": { "name": "Console" }, "pageList": [] }),
    )
    .await;

    assert_eq!(err.kind(), CoreErrorKind::Validation);
    assert_eq!(err.code(), Some("MALFORMED_FRAGMENT"));
    assert_eq!(field(&err, "stage"), Some("validation"));
    assert_eq!(row_counts(&db).await, (0, 0, 0, 0));
}

#[tokio::test]
async fn multi_page_documents_are_rejected() {
    let (_db, seeded, context, _templates) = setup().await;

    let err = import_document(
        &context,
        &Actor::system(),
        seeded.target(),
        json!({ "pageList": [{ "name": "A" }, { "name": "B" }] }),
    )
    .await;

    assert_eq!(err.code(), Some("MALFORMED_FRAGMENT"));
}

#[tokio::test]
async fn invalid_template_id_rolls_back_shared_entities() {
    let (db, seeded, context, _templates) = setup().await;
    let mut document: serde_json::Value =
        serde_json::from_slice(&load_fixture("blocks/query_table.json").unwrap()).unwrap();
    document["actionList"][0]["id"] = json!("tmpl_abc_def");

    let err = import_document(&context, &Actor::system(), seeded.target(), document).await;

    assert_eq!(err.code(), Some("MALFORMED_FRAGMENT"));
    assert_eq!(field(&err, "stage"), Some("rescope"));
    // The datasource was inserted before rescoping failed.
    assert_eq!(row_counts(&db).await, (0, 0, 0, 0));
}

#[tokio::test]
async fn orphan_collection_member_is_malformed() {
    let (db, seeded, context, _templates) = setup().await;
    let mut document: serde_json::Value =
        serde_json::from_slice(&load_fixture("blocks/js_object.json").unwrap()).unwrap();
    document["actionList"][0]["collectionId"] = json!("tmpl_Missing");

    let err = import_document(&context, &Actor::system(), seeded.target(), document).await;

    assert_eq!(err.code(), Some("MALFORMED_FRAGMENT"));
    assert_eq!(row_counts(&db).await, (0, 0, 0, 0));
}

#[tokio::test]
async fn unparseable_widgets_fail_with_format_error() {
    let (db, seeded, context, _templates) = setup().await;
    let mut document: serde_json::Value =
        serde_json::from_slice(&load_fixture("blocks/query_table.json").unwrap()).unwrap();
    document["pageList"][0]["layouts"] = json!([]);
    document["widgets"] = json!("{\"widgetName\": \"MainContainer\", ");

    let err = import_document(&context, &Actor::system(), seeded.target(), document).await;

    assert_eq!(err.code(), Some("FORMAT_ERROR"));
    assert_eq!(err.kind(), CoreErrorKind::Validation);
    assert_eq!(row_counts(&db).await, (0, 0, 0, 0));
}

#[tokio::test]
async fn unknown_plugin_is_not_found() {
    let (db, seeded, context, _templates) = setup().await;
    let mut document: serde_json::Value =
        serde_json::from_slice(&load_fixture("blocks/query_table.json").unwrap()).unwrap();
    document["pluginList"][0]["packageName"] = json!("mongo-plugin");
    document["datasourceList"][0]["pluginId"] = json!("mongo-plugin");
    document["actionList"][0]["pluginId"] = json!("mongo-plugin");

    let err = import_document(&context, &Actor::system(), seeded.target(), document).await;

    assert_eq!(err.code(), Some("RESOURCE_NOT_FOUND"));
    assert_eq!(field(&err, "stage"), Some("plugins"));
    assert_eq!(row_counts(&db).await, (0, 0, 0, 0));
}

#[tokio::test]
async fn failed_import_leaves_connection_usable() {
    let (db, seeded, context, _templates) = setup().await;
    let broken = json!({
        "actionList": [{ "id": "tmpl_q", "name": "Q", "pluginId": "mongo-plugin" }]
    });
    import_document(&context, &Actor::system(), seeded.target(), broken).await;

    context
        .import_resource_in_page(
            &Actor::system(),
            seeded.target(),
            &load_fixture("blocks/query_table.json").unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(row_counts(&db).await, (1, 0, 1, 0));
}

#[tokio::test]
async fn top_level_array_is_malformed() {
    let (db, seeded, context, _templates) = setup().await;

    let err = context
        .import_resource_in_page(&Actor::system(), seeded.target(), b"[]")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), CoreErrorKind::Validation);
    assert_eq!(err.code(), Some("MALFORMED_FRAGMENT"));
    assert_eq!(row_counts(&db).await, (0, 0, 0, 0));
}

#[tokio::test]
async fn page_name_with_delimiter_cannot_scope_actions() {
    let (db, seeded, context, _templates) = setup().await;
    let page = seed_page(&db, seeded.application.id, "Order_List", page_dsl(&[]))
        .await
        .unwrap();
    let target = PageTarget {
        page_id: page.id,
        ..seeded.target()
    };

    let err = context
        .import_resource_in_page(
            &Actor::system(),
            target,
            &load_fixture("blocks/query_table.json").unwrap(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some("MALFORMED_FRAGMENT"));
    assert_eq!(field(&err, "stage"), Some("rescope"));
    assert_eq!(row_counts(&db).await, (0, 0, 0, 0));
}

#[tokio::test]
async fn corrupt_installed_libraries_abort_the_import() {
    let (db, seeded, context, _templates) = setup().await;
    let corrupt = "[\"lodash\", ";
    let mut application = seeded.application.clone().into_active_model();
    application.installed_js_libs = Set(corrupt.to_string());
    application.update(&db).await.unwrap();

    let err = context
        .import_resource_in_page(
            &Actor::system(),
            seeded.target(),
            &load_fixture("blocks/js_object.json").unwrap(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some("FORMAT_ERROR"));
    assert_eq!(row_counts(&db).await, (0, 0, 0, 0));
    let stored = applications::Entity::find_by_id(seeded.application.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.installed_js_libs, corrupt);
}
