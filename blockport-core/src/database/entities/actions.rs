use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "actions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub application_id: i32,
    pub page_id: i32,
    /// Owning action collection, for JS functions
    pub collection_id: Option<i32>,
    pub plugin_id: i32,
    pub datasource_id: Option<i32>,
    pub name: String,
    /// `<pageName>_<localId>`
    pub template_id: String,
    #[sea_orm(column_type = "Text", default_value = "{}")]
    pub body: String,
    pub execute_on_load: bool,
    pub git_sync_id: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pages::Entity",
        from = "Column::PageId",
        to = "super::pages::Column::Id"
    )]
    Pages,
    #[sea_orm(
        belongs_to = "super::action_collections::Entity",
        from = "Column::CollectionId",
        to = "super::action_collections::Column::Id"
    )]
    ActionCollections,
}

impl Related<super::pages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pages.def()
    }
}

impl Related<super::action_collections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActionCollections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
