use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{ImportError, ImportResult};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub workspace_id: i32,
    pub name: String,
    /// Id of the default-branch application this branch copy belongs to.
    pub base_application_id: Option<i32>,
    pub branch_name: Option<String>,
    /// JSON array of installed library uid strings
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub installed_js_libs: String,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspaces::Entity",
        from = "Column::WorkspaceId",
        to = "super::workspaces::Column::Id"
    )]
    Workspaces,
    #[sea_orm(has_many = "super::pages::Entity")]
    Pages,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspaces.def()
    }
}

impl Related<super::pages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Library uids stored in `installed_js_libs`. A corrupt column is an
    /// error, never an empty set.
    pub fn installed_js_lib_uids(&self) -> ImportResult<Vec<String>> {
        serde_json::from_str(&self.installed_js_libs).map_err(|e| {
            ImportError::Format(format!(
                "installed libraries of application {}: {}",
                self.id, e
            ))
        })
    }
}
