use std::sync::Arc;

use anyhow::{Context, Result};
use blockport::app_context::{ApplicationSummary, BuildingBlockRequest, BuildingBlockResponse};
use blockport::auth::{Actor, ScopeAuthorizer, ROLE_ADMIN};
use blockport::config::ImportSettings;
use blockport::partial_import::PageTarget;
use blockport::services::DirectoryTemplateSource;
use blockport::AppContext;
use clap::Args;

use crate::db;

#[derive(Args, Debug)]
pub struct TargetArgs {
    #[clap(long)]
    pub workspace: i32,
    #[clap(long)]
    pub application: i32,
    #[clap(long)]
    pub page: i32,
    #[clap(long)]
    pub branch: Option<String>,
}

impl TargetArgs {
    fn into_target(self) -> PageTarget {
        PageTarget {
            workspace_id: self.workspace,
            application_id: self.application,
            page_id: self.page,
            branch_name: self.branch,
        }
    }
}

/// Without `--user` the import runs as the system actor.
#[derive(Args, Debug)]
pub struct ActorArgs {
    #[clap(long)]
    pub user: Option<i32>,
    /// Permission granted to the user, e.g. `page:4:create_action`
    #[clap(long = "grant")]
    pub grants: Vec<String>,
    #[clap(long)]
    pub admin: bool,
}

impl ActorArgs {
    fn into_actor(self) -> Actor {
        let Some(user_id) = self.user else {
            return Actor::system();
        };
        let mut actor = Actor::user(user_id);
        if self.admin {
            actor = actor.with_role(ROLE_ADMIN);
        }
        self.grants
            .into_iter()
            .fold(actor, |actor, grant| actor.with_scope(grant))
    }
}

fn app_context(db: sea_orm::DatabaseConnection, templates_dir: Option<String>) -> AppContext {
    let mut settings = ImportSettings::from_env();
    if let Some(dir) = templates_dir {
        settings = settings.with_templates_dir(dir);
    }
    let template_source = Arc::new(DirectoryTemplateSource::new(settings.templates_dir.clone()));
    AppContext::with_services(db, Arc::new(ScopeAuthorizer), settings, template_source)
}

pub async fn import_block(
    database: &str,
    target: TargetArgs,
    template_id: String,
    templates_dir: Option<String>,
    actor: ActorArgs,
) -> Result<BuildingBlockResponse> {
    let db = db::connect_migrated(database).await?;
    let context = app_context(db, templates_dir);
    let target = target.into_target();

    let request = BuildingBlockRequest {
        workspace_id: target.workspace_id,
        application_id: target.application_id,
        page_id: target.page_id,
        template_id,
    };
    let response = context
        .import_building_block(&actor.into_actor(), request, target.branch_name)
        .await?;
    Ok(response)
}

pub async fn import_file(
    database: &str,
    target: TargetArgs,
    file: &str,
    actor: ActorArgs,
) -> Result<ApplicationSummary> {
    let document = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read fragment file {}", file))?;

    let db = db::connect_migrated(database).await?;
    let context = app_context(db, None);
    let summary = context
        .import_resource_in_page(&actor.into_actor(), target.into_target(), &document)
        .await?;
    Ok(summary)
}
