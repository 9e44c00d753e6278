use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::debug;

use crate::database::entities::custom_js_libs;
use crate::errors::{ImportResult, ImportStage, StageResultExt};
use crate::partial_import::context::ResolutionContext;
use crate::partial_import::fragment::Fragment;

use super::{ImportScope, ImportableEntity};

pub struct JsLibImporter;

#[async_trait]
impl ImportableEntity for JsLibImporter {
    fn stage(&self) -> ImportStage {
        ImportStage::JsLibraries
    }

    async fn import_entities(
        &self,
        scope: &ImportScope<'_>,
        context: &mut ResolutionContext,
        fragment: &Fragment,
    ) -> ImportResult<()> {
        for lib in &fragment.custom_js_lib_list {
            let uid = lib.uid();
            let found = custom_js_libs::Entity::find()
                .filter(custom_js_libs::Column::UidString.eq(uid.as_str()))
                .one(scope.txn)
                .await
                .stage_entity(self.stage(), &lib.name)?;

            if found.is_none() {
                let now = Utc::now();
                custom_js_libs::ActiveModel {
                    uid_string: Set(uid.clone()),
                    name: Set(lib.name.clone()),
                    url: Set(lib.url.clone()),
                    version: Set(lib.version.clone()),
                    accessor: Set(serde_json::to_string(&lib.accessor)?),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(scope.txn)
                .await
                .stage_entity(self.stage(), &lib.name)?;
                debug!("Registered JS library {}", uid);
            }

            context.install_js_lib(uid);
        }
        Ok(())
    }
}
