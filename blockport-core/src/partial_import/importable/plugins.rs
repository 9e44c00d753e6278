use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::debug;

use crate::database::entities::plugins;
use crate::errors::{ImportError, ImportResult, ImportStage, StageResultExt};
use crate::partial_import::context::ResolutionContext;
use crate::partial_import::fragment::Fragment;

use super::{ImportScope, ImportableEntity};

/// Plugins are installed platform-wide; the import only resolves package names to ids.
pub struct PluginImporter;

#[async_trait]
impl ImportableEntity for PluginImporter {
    fn stage(&self) -> ImportStage {
        ImportStage::Plugins
    }

    async fn import_entities(
        &self,
        scope: &ImportScope<'_>,
        context: &mut ResolutionContext,
        fragment: &Fragment,
    ) -> ImportResult<()> {
        for package_name in fragment.referenced_plugin_packages() {
            let plugin = plugins::Entity::find()
                .filter(plugins::Column::PackageName.eq(package_name.as_str()))
                .one(scope.txn)
                .await
                .stage_entity(self.stage(), &package_name)?
                .ok_or_else(|| {
                    ImportError::not_found("plugin", &package_name)
                        .in_stage(self.stage(), Some(package_name.clone()))
                })?;

            debug!("Resolved plugin {} to id {}", package_name, plugin.id);
            context.set_plugin_id(package_name, plugin.id);
        }
        Ok(())
    }
}
