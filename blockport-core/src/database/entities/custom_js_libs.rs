use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Third-party JS libraries that applications can install.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "custom_js_libs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// `<name>_<url>`, identifies the library across installs
    #[sea_orm(unique)]
    pub uid_string: String,
    pub name: String,
    pub url: String,
    pub version: Option<String>,
    /// JSON array of global accessor names
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub accessor: String,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
