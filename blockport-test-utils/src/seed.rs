use std::collections::HashMap;

use anyhow::Result;
use blockport::database::entities::{
    action_collections, actions, applications, datasources, pages, plugins, workspaces,
};
use blockport::partial_import::PageTarget;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use serde_json::{json, Value};

pub const POSTGRES_PLUGIN: &str = "postgres-plugin";
pub const REST_API_PLUGIN: &str = "restapi-plugin";
pub const JS_PLUGIN: &str = "js-plugin";

/// A workspace with one application holding one page, plus the standard plugins.
#[derive(Clone, Debug)]
pub struct SeededPage {
    pub workspace: workspaces::Model,
    pub application: applications::Model,
    pub page: pages::Model,
    pub plugins: HashMap<String, plugins::Model>,
}

impl SeededPage {
    pub fn target(&self) -> PageTarget {
        PageTarget {
            workspace_id: self.workspace.id,
            application_id: self.application.id,
            page_id: self.page.id,
            branch_name: None,
        }
    }

    pub fn plugin_id(&self, package_name: &str) -> i32 {
        self.plugins
            .get(package_name)
            .map(|p| p.id)
            .unwrap_or_else(|| panic!("plugin {} not seeded", package_name))
    }
}

pub async fn seed_workspace<C: ConnectionTrait>(db: &C, name: &str) -> Result<workspaces::Model> {
    let now = Utc::now();
    Ok(workspaces::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn seed_application<C: ConnectionTrait>(
    db: &C,
    workspace_id: i32,
    name: &str,
) -> Result<applications::Model> {
    let now = Utc::now();
    Ok(applications::ActiveModel {
        workspace_id: Set(workspace_id),
        name: Set(name.to_string()),
        installed_js_libs: Set("[]".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn seed_page<C: ConnectionTrait>(
    db: &C,
    application_id: i32,
    name: &str,
    dsl: Value,
) -> Result<pages::Model> {
    let now = Utc::now();
    Ok(pages::ActiveModel {
        application_id: Set(application_id),
        name: Set(name.to_string()),
        dsl: Set(dsl.to_string()),
        layout_on_load_actions: Set("[]".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Branch copy of `base`, as created when an application is connected to git.
pub async fn seed_branch_application<C: ConnectionTrait>(
    db: &C,
    base: &applications::Model,
    branch_name: &str,
) -> Result<applications::Model> {
    let now = Utc::now();
    Ok(applications::ActiveModel {
        workspace_id: Set(base.workspace_id),
        name: Set(base.name.clone()),
        base_application_id: Set(Some(base.id)),
        branch_name: Set(Some(branch_name.to_string())),
        installed_js_libs: Set(base.installed_js_libs.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Copy of `base` inside a branch application.
pub async fn seed_branch_page<C: ConnectionTrait>(
    db: &C,
    base: &pages::Model,
    branch_application: &applications::Model,
) -> Result<pages::Model> {
    let now = Utc::now();
    Ok(pages::ActiveModel {
        application_id: Set(branch_application.id),
        name: Set(base.name.clone()),
        base_page_id: Set(Some(base.id)),
        branch_name: Set(branch_application.branch_name.clone()),
        dsl: Set(base.dsl.clone()),
        layout_on_load_actions: Set("[]".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn seed_plugin<C: ConnectionTrait>(
    db: &C,
    package_name: &str,
    plugin_type: &str,
) -> Result<plugins::Model> {
    let now = Utc::now();
    Ok(plugins::ActiveModel {
        package_name: Set(package_name.to_string()),
        name: Set(package_name.trim_end_matches("-plugin").to_string()),
        plugin_type: Set(plugin_type.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn seed_datasource<C: ConnectionTrait>(
    db: &C,
    workspace_id: i32,
    plugin_id: i32,
    name: &str,
) -> Result<datasources::Model> {
    let now = Utc::now();
    Ok(datasources::ActiveModel {
        workspace_id: Set(workspace_id),
        plugin_id: Set(plugin_id),
        name: Set(name.to_string()),
        configuration: Set("{}".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn seed_action<C: ConnectionTrait>(
    db: &C,
    page: &pages::Model,
    plugin_id: i32,
    name: &str,
) -> Result<actions::Model> {
    let now = Utc::now();
    Ok(actions::ActiveModel {
        application_id: Set(page.application_id),
        page_id: Set(page.id),
        plugin_id: Set(plugin_id),
        name: Set(name.to_string()),
        template_id: Set(format!("{}_{}", page.name, name)),
        body: Set("{}".to_string()),
        execute_on_load: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn seed_action_collection<C: ConnectionTrait>(
    db: &C,
    page: &pages::Model,
    name: &str,
) -> Result<action_collections::Model> {
    let now = Utc::now();
    Ok(action_collections::ActiveModel {
        application_id: Set(page.application_id),
        page_id: Set(page.id),
        name: Set(name.to_string()),
        template_id: Set(format!("{}_{}", page.name, name)),
        body: Set("export default {}".to_string()),
        variables: Set("[]".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Canvas with the given widget names as direct children.
pub fn page_dsl(widget_names: &[&str]) -> Value {
    let children: Vec<Value> = widget_names
        .iter()
        .map(|name| json!({ "widgetName": name, "type": "TEXT_WIDGET" }))
        .collect();
    json!({
        "widgetName": "MainContainer",
        "type": "CANVAS_WIDGET",
        "children": children
    })
}

/// Workspace `Acme`, application `Console`, page `Home` with a `Table1` widget,
/// and the postgres, REST API and JS plugins.
pub async fn seed_standard_page<C: ConnectionTrait>(db: &C) -> Result<SeededPage> {
    let workspace = seed_workspace(db, "Acme").await?;
    let application = seed_application(db, workspace.id, "Console").await?;
    let page = seed_page(db, application.id, "Home", page_dsl(&["Table1"])).await?;

    let mut plugins = HashMap::new();
    for (package_name, plugin_type) in [
        (POSTGRES_PLUGIN, "DB"),
        (REST_API_PLUGIN, "API"),
        (JS_PLUGIN, "JS"),
    ] {
        let plugin = seed_plugin(db, package_name, plugin_type).await?;
        plugins.insert(package_name.to_string(), plugin);
    }

    Ok(SeededPage {
        workspace,
        application,
        page,
        plugins,
    })
}
