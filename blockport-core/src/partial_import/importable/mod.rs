//! Per-entity importers
//!
//! Each importer persists (or links) one entity type of the fragment into the
//! target page and records what it produced in the [`ResolutionContext`].
//! They run in a fixed order: plugins, datasources and libraries first, then
//! actions, then action collections.

mod action_collections;
mod actions;
mod datasources;
mod js_libs;
mod plugins;

use std::collections::HashSet;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::auth::{Actor, Authorizer, Scope};
use crate::config::ImportSettings;
use crate::database::entities::{
    action_collections as collection_rows, actions as action_rows, applications, pages, workspaces,
};
use crate::errors::{ImportError, ImportResult, ImportStage};

use super::context::ResolutionContext;
use super::fragment::Fragment;

pub use action_collections::ActionCollectionImporter;
pub use actions::ActionImporter;
pub use datasources::DatasourceImporter;
pub use js_libs::JsLibImporter;
pub use plugins::PluginImporter;

/// Everything an importer may touch, bound to the open transaction.
pub struct ImportScope<'a> {
    pub txn: &'a DatabaseTransaction,
    pub actor: &'a Actor,
    pub authorizer: &'a dyn Authorizer,
    pub settings: &'a ImportSettings,
    pub workspace: &'a workspaces::Model,
    pub application: &'a applications::Model,
    pub page: &'a pages::Model,
}

impl ImportScope<'_> {
    pub fn require(&self, scope: Scope, action: &str) -> ImportResult<()> {
        self.authorizer
            .authorize(self.actor, &scope, action)
            .map_err(|_| ImportError::PermissionDenied {
                scope: scope.to_string(),
                action: action.to_string(),
            })
    }

    /// Template ids of every action and collection already in the page.
    pub async fn page_template_ids(&self) -> ImportResult<HashSet<String>> {
        let mut ids: HashSet<String> = action_rows::Entity::find()
            .select_only()
            .column(action_rows::Column::TemplateId)
            .filter(action_rows::Column::PageId.eq(self.page.id))
            .into_tuple::<String>()
            .all(self.txn)
            .await?
            .into_iter()
            .collect();

        let collection_ids: Vec<String> = collection_rows::Entity::find()
            .select_only()
            .column(collection_rows::Column::TemplateId)
            .filter(collection_rows::Column::PageId.eq(self.page.id))
            .into_tuple()
            .all(self.txn)
            .await?;
        ids.extend(collection_ids);
        Ok(ids)
    }

    /// Sync identifier minted for every entity this import persists.
    pub fn new_sync_id(&self) -> String {
        format!("{}_{}", self.application.id, Uuid::new_v4())
    }
}

#[async_trait]
pub trait ImportableEntity: Send + Sync {
    fn stage(&self) -> ImportStage;

    async fn import_entities(
        &self,
        scope: &ImportScope<'_>,
        context: &mut ResolutionContext,
        fragment: &Fragment,
    ) -> ImportResult<()>;
}
