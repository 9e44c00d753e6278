use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use tracing::debug;

use crate::auth::{Scope, ACTION_CREATE_ACTION};
use crate::database::entities::actions;
use crate::errors::{ImportError, ImportResult, ImportStage, StageResultExt};
use crate::partial_import::context::{ImportedAction, ResolutionContext};
use crate::partial_import::fragment::{Fragment, FragmentAction};
use crate::partial_import::template_id::claim_template_id;

use super::{ImportScope, ImportableEntity};

/// Persists fragment actions into the target page.
///
/// Standalone actions take a collision-free name; JS functions keep their
/// name, which is only visible through the owning collection.
pub struct ActionImporter;

impl ActionImporter {
    async fn import_one(
        &self,
        scope: &ImportScope<'_>,
        context: &mut ResolutionContext,
        taken_template_ids: &mut HashSet<String>,
        action: &FragmentAction,
    ) -> ImportResult<ImportedAction> {
        let plugin_id = context
            .plugin_id(&action.plugin_id)
            .ok_or_else(|| ImportError::not_found("plugin", &action.plugin_id))?;
        let datasource_id = match action.datasource.as_deref() {
            Some(name) => Some(
                context
                    .datasource_id(name)
                    .ok_or_else(|| ImportError::not_found("datasource", name))?,
            ),
            None => None,
        };

        let name = if action.collection_id.is_some() {
            action.name.clone()
        } else {
            context.reserve_name(&action.name, scope.settings)?
        };
        let template_id =
            claim_template_id(&action.id, &scope.page.name, &name, taken_template_ids);

        let now = Utc::now();
        let created = actions::ActiveModel {
            application_id: Set(scope.application.id),
            page_id: Set(scope.page.id),
            collection_id: Set(None),
            plugin_id: Set(plugin_id),
            datasource_id: Set(datasource_id),
            name: Set(name.clone()),
            template_id: Set(template_id.clone()),
            body: Set(serde_json::to_string(&action.body)?),
            execute_on_load: Set(action.execute_on_load),
            git_sync_id: Set(Some(scope.new_sync_id())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(scope.txn)
        .await?;

        debug!(
            "Imported action '{}' as '{}' (id {}, template {})",
            action.name, name, created.id, template_id
        );

        Ok(ImportedAction {
            id: created.id,
            name,
            original_name: action.name.clone(),
            collection_template_id: action.collection_id.clone(),
        })
    }
}

#[async_trait]
impl ImportableEntity for ActionImporter {
    fn stage(&self) -> ImportStage {
        ImportStage::Actions
    }

    async fn import_entities(
        &self,
        scope: &ImportScope<'_>,
        context: &mut ResolutionContext,
        fragment: &Fragment,
    ) -> ImportResult<()> {
        if fragment.action_list.is_empty() {
            return Ok(());
        }
        scope
            .require(Scope::Page(scope.page.id), ACTION_CREATE_ACTION)
            .stage(self.stage())?;

        let mut taken_template_ids = scope.page_template_ids().await.stage(self.stage())?;

        for action in &fragment.action_list {
            let imported = self
                .import_one(scope, context, &mut taken_template_ids, action)
                .await
                .stage_entity(self.stage(), &action.name)?;
            context.record_action(imported);
        }
        Ok(())
    }
}
