use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::{debug, info};

use crate::auth::{Scope, ACTION_CREATE_DATASOURCE};
use crate::database::entities::datasources;
use crate::errors::{ImportError, ImportResult, ImportStage, StageResultExt};
use crate::partial_import::context::ResolutionContext;
use crate::partial_import::fragment::{Fragment, FragmentDatasource};

use super::{ImportScope, ImportableEntity};

/// Links fragment datasources to workspace datasources, creating missing ones.
pub struct DatasourceImporter;

fn disambiguate(name: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{} ({})", name, counter);
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

impl DatasourceImporter {
    async fn link_or_create(
        &self,
        scope: &ImportScope<'_>,
        existing: &mut Vec<datasources::Model>,
        plugin_id: i32,
        datasource: &FragmentDatasource,
    ) -> ImportResult<i32> {
        if let Some(found) = existing
            .iter()
            .find(|d| d.name == datasource.name && d.plugin_id == plugin_id)
        {
            debug!("Linking datasource '{}' to id {}", datasource.name, found.id);
            return Ok(found.id);
        }

        scope.require(Scope::Workspace(scope.workspace.id), ACTION_CREATE_DATASOURCE)?;

        let taken: HashSet<String> = existing.iter().map(|d| d.name.clone()).collect();
        let name = disambiguate(&datasource.name, &taken);
        let now = Utc::now();
        let created = datasources::ActiveModel {
            workspace_id: Set(scope.workspace.id),
            plugin_id: Set(plugin_id),
            name: Set(name),
            configuration: Set(serde_json::to_string(&datasource.configuration)?),
            git_sync_id: Set(Some(scope.new_sync_id())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(scope.txn)
        .await?;

        info!(
            "Created datasource '{}' (id {}) in workspace {}",
            created.name, created.id, scope.workspace.id
        );
        let id = created.id;
        existing.push(created);
        Ok(id)
    }
}

#[async_trait]
impl ImportableEntity for DatasourceImporter {
    fn stage(&self) -> ImportStage {
        ImportStage::Datasources
    }

    async fn import_entities(
        &self,
        scope: &ImportScope<'_>,
        context: &mut ResolutionContext,
        fragment: &Fragment,
    ) -> ImportResult<()> {
        if fragment.datasource_list.is_empty() {
            return Ok(());
        }

        let mut existing = datasources::Entity::find()
            .filter(datasources::Column::WorkspaceId.eq(scope.workspace.id))
            .all(scope.txn)
            .await
            .stage(self.stage())?;

        for datasource in &fragment.datasource_list {
            let plugin_id = context.plugin_id(&datasource.plugin_id).ok_or_else(|| {
                ImportError::not_found("plugin", &datasource.plugin_id)
                    .in_stage(self.stage(), Some(datasource.name.clone()))
            })?;

            let id = self
                .link_or_create(scope, &mut existing, plugin_id, datasource)
                .await
                .stage_entity(self.stage(), &datasource.name)?;
            context.set_datasource_id(datasource.name.clone(), id);
        }
        Ok(())
    }
}
