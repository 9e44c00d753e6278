use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::{Authorizer, ScopeAuthorizer};
use crate::config::ImportSettings;
use crate::database::entities::applications;
use crate::errors::ImportError;
use crate::partial_import::OnLoadManifest;
use crate::services::{DirectoryTemplateSource, PartialImportService, TemplateSource};

mod import_operations;

/// Shared application context exposing the import services to the CLI and tests.
#[derive(Clone)]
pub struct AppContext {
    db: DatabaseConnection,
    partial_import_service: Arc<PartialImportService>,
    template_source: Arc<dyn TemplateSource>,
}

impl AppContext {
    pub fn new(db: DatabaseConnection) -> Self {
        let settings = ImportSettings::from_env();
        let template_source = Arc::new(DirectoryTemplateSource::new(settings.templates_dir.clone()));
        Self::with_services(db, Arc::new(ScopeAuthorizer), settings, template_source)
    }

    pub fn with_services(
        db: DatabaseConnection,
        authorizer: Arc<dyn Authorizer>,
        settings: ImportSettings,
        template_source: Arc<dyn TemplateSource>,
    ) -> Self {
        let partial_import_service =
            Arc::new(PartialImportService::new(db.clone(), authorizer, settings));

        Self {
            db,
            partial_import_service,
            template_source,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn partial_import_service(&self) -> &Arc<PartialImportService> {
        &self.partial_import_service
    }

    pub fn template_source(&self) -> &Arc<dyn TemplateSource> {
        &self.template_source
    }
}

// ----- Public types -----

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    pub id: i32,
    pub workspace_id: i32,
    pub name: String,
    pub branch_name: Option<String>,
    pub installed_js_libs: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<applications::Model> for ApplicationSummary {
    type Error = ImportError;

    fn try_from(model: applications::Model) -> Result<Self, Self::Error> {
        let installed_js_libs = model.installed_js_lib_uids()?;
        Ok(Self {
            id: model.id,
            workspace_id: model.workspace_id,
            name: model.name,
            branch_name: model.branch_name,
            installed_js_libs,
            updated_at: model.updated_at,
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingBlockRequest {
    pub workspace_id: i32,
    pub application_id: i32,
    pub page_id: i32,
    pub template_id: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingBlockResponse {
    pub widget_layout: Option<Value>,
    pub on_page_load_actions: OnLoadManifest,
    pub refactored_name_map: IndexMap<String, String>,
}
