use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use tracing::debug;

use crate::auth::{Scope, ACTION_CREATE_COLLECTION};
use crate::database::entities::{action_collections, actions};
use crate::errors::{ImportError, ImportResult, ImportStage, StageResultExt};
use crate::partial_import::context::{ImportedCollection, ResolutionContext};
use crate::partial_import::fragment::{Fragment, FragmentActionCollection};
use crate::partial_import::template_id::claim_template_id;

use super::{ImportScope, ImportableEntity};

/// Persists JS objects and links the member actions imported before them.
pub struct ActionCollectionImporter;

impl ActionCollectionImporter {
    async fn import_one(
        &self,
        scope: &ImportScope<'_>,
        context: &mut ResolutionContext,
        taken_template_ids: &mut HashSet<String>,
        collection: &FragmentActionCollection,
    ) -> ImportResult<ImportedCollection> {
        let name = context.reserve_name(&collection.name, scope.settings)?;
        let template_id =
            claim_template_id(&collection.id, &scope.page.name, &name, taken_template_ids);

        let now = Utc::now();
        let created = action_collections::ActiveModel {
            application_id: Set(scope.application.id),
            page_id: Set(scope.page.id),
            name: Set(name.clone()),
            template_id: Set(template_id.clone()),
            body: Set(collection.body.clone()),
            variables: Set(match &collection.variables {
                serde_json::Value::Null => "[]".to_string(),
                other => serde_json::to_string(other)?,
            }),
            git_sync_id: Set(Some(scope.new_sync_id())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(scope.txn)
        .await?;

        let member_ids: Vec<i32> = context
            .action_outcome()
            .members_of(&collection.id)
            .map(|member| member.id)
            .collect();

        for member_id in &member_ids {
            let member = actions::Entity::find_by_id(*member_id)
                .one(scope.txn)
                .await?
                .ok_or_else(|| ImportError::not_found("action", member_id))?;
            let mut active = member.into_active_model();
            active.collection_id = Set(Some(created.id));
            active.updated_at = Set(now);
            active.update(scope.txn).await?;
        }

        debug!(
            "Imported collection '{}' as '{}' (id {}) with {} member(s)",
            collection.name,
            name,
            created.id,
            member_ids.len()
        );

        Ok(ImportedCollection {
            id: created.id,
            name,
        })
    }
}

#[async_trait]
impl ImportableEntity for ActionCollectionImporter {
    fn stage(&self) -> ImportStage {
        ImportStage::ActionCollections
    }

    async fn import_entities(
        &self,
        scope: &ImportScope<'_>,
        context: &mut ResolutionContext,
        fragment: &Fragment,
    ) -> ImportResult<()> {
        if !fragment.action_collection_list.is_empty() {
            scope
                .require(Scope::Page(scope.page.id), ACTION_CREATE_COLLECTION)
                .stage(self.stage())?;

            let mut taken_template_ids = scope.page_template_ids().await.stage(self.stage())?;

            for collection in &fragment.action_collection_list {
                let imported = self
                    .import_one(scope, context, &mut taken_template_ids, collection)
                    .await
                    .stage_entity(self.stage(), &collection.name)?;
                context.record_collection(imported);
            }
        }

        let known: HashSet<&str> = fragment
            .action_collection_list
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        if let Some(orphan) = context.action_outcome().actions().iter().find(|a| {
            a.collection_template_id
                .as_deref()
                .is_some_and(|id| !known.contains(id))
        }) {
            return Err(ImportError::malformed(format!(
                "action '{}' belongs to collection '{}' which is not in the fragment",
                orphan.original_name,
                orphan.collection_template_id.as_deref().unwrap_or_default()
            ))
            .in_stage(self.stage(), Some(orphan.original_name.clone())));
        }

        Ok(())
    }
}
