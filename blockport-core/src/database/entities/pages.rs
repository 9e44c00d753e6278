use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub application_id: i32,
    pub name: String,
    /// Id of the default-branch page this branch copy belongs to.
    pub base_page_id: Option<i32>,
    pub branch_name: Option<String>,
    /// Widget tree of the page's layout
    #[sea_orm(column_type = "Text", default_value = "{}")]
    pub dsl: String,
    /// JSON batches of on-load action references
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub layout_on_load_actions: String,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::applications::Entity",
        from = "Column::ApplicationId",
        to = "super::applications::Column::Id"
    )]
    Applications,
    #[sea_orm(has_many = "super::actions::Entity")]
    Actions,
    #[sea_orm(has_many = "super::action_collections::Entity")]
    ActionCollections,
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl Related<super::actions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Actions.def()
    }
}

impl Related<super::action_collections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActionCollections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
