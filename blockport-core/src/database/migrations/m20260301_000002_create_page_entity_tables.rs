use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_workspace_tables::{Applications, Pages, Workspaces};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Plugins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Plugins::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Plugins::PackageName)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Plugins::Name).string().not_null())
                    .col(ColumnDef::new(Plugins::PluginType).string().not_null())
                    .col(ColumnDef::new(Plugins::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Plugins::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Datasources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Datasources::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Datasources::WorkspaceId).integer().not_null())
                    .col(ColumnDef::new(Datasources::PluginId).integer().not_null())
                    .col(ColumnDef::new(Datasources::Name).string().not_null())
                    .col(
                        ColumnDef::new(Datasources::Configuration)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(ColumnDef::new(Datasources::GitSyncId).string())
                    .col(ColumnDef::new(Datasources::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Datasources::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-datasources-workspace_id")
                            .from(Datasources::Table, Datasources::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-datasources-plugin_id")
                            .from(Datasources::Table, Datasources::PluginId)
                            .to(Plugins::Table, Plugins::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomJsLibs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomJsLibs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomJsLibs::UidString)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(CustomJsLibs::Name).string().not_null())
                    .col(ColumnDef::new(CustomJsLibs::Url).string().not_null())
                    .col(ColumnDef::new(CustomJsLibs::Version).string())
                    .col(
                        ColumnDef::new(CustomJsLibs::Accessor)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(CustomJsLibs::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(CustomJsLibs::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ActionCollections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActionCollections::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ActionCollections::ApplicationId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ActionCollections::PageId).integer().not_null())
                    .col(ColumnDef::new(ActionCollections::Name).string().not_null())
                    .col(
                        ColumnDef::new(ActionCollections::TemplateId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ActionCollections::Body).text().not_null())
                    .col(
                        ColumnDef::new(ActionCollections::Variables)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(ActionCollections::GitSyncId).string())
                    .col(
                        ColumnDef::new(ActionCollections::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ActionCollections::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-action_collections-application_id")
                            .from(ActionCollections::Table, ActionCollections::ApplicationId)
                            .to(Applications::Table, Applications::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-action_collections-page_id")
                            .from(ActionCollections::Table, ActionCollections::PageId)
                            .to(Pages::Table, Pages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Actions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Actions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Actions::ApplicationId).integer().not_null())
                    .col(ColumnDef::new(Actions::PageId).integer().not_null())
                    .col(ColumnDef::new(Actions::CollectionId).integer())
                    .col(ColumnDef::new(Actions::PluginId).integer().not_null())
                    .col(ColumnDef::new(Actions::DatasourceId).integer())
                    .col(ColumnDef::new(Actions::Name).string().not_null())
                    .col(ColumnDef::new(Actions::TemplateId).string().not_null())
                    .col(ColumnDef::new(Actions::Body).text().not_null().default("{}"))
                    .col(
                        ColumnDef::new(Actions::ExecuteOnLoad)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Actions::GitSyncId).string())
                    .col(ColumnDef::new(Actions::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Actions::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-actions-application_id")
                            .from(Actions::Table, Actions::ApplicationId)
                            .to(Applications::Table, Applications::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-actions-page_id")
                            .from(Actions::Table, Actions::PageId)
                            .to(Pages::Table, Pages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-actions-collection_id")
                            .from(Actions::Table, Actions::CollectionId)
                            .to(ActionCollections::Table, ActionCollections::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-actions-plugin_id")
                            .from(Actions::Table, Actions::PluginId)
                            .to(Plugins::Table, Plugins::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-actions-datasource_id")
                            .from(Actions::Table, Actions::DatasourceId)
                            .to(Datasources::Table, Datasources::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-actions-page-name")
                    .table(Actions::Table)
                    .col(Actions::PageId)
                    .col(Actions::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-action-collections-page-name")
                    .table(ActionCollections::Table)
                    .col(ActionCollections::PageId)
                    .col(ActionCollections::Name)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Actions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ActionCollections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomJsLibs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Datasources::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Plugins::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Plugins {
    Table,
    Id,
    PackageName,
    Name,
    PluginType,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Datasources {
    Table,
    Id,
    WorkspaceId,
    PluginId,
    Name,
    Configuration,
    GitSyncId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CustomJsLibs {
    Table,
    Id,
    UidString,
    Name,
    Url,
    Version,
    Accessor,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ActionCollections {
    Table,
    Id,
    ApplicationId,
    PageId,
    Name,
    TemplateId,
    Body,
    Variables,
    GitSyncId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Actions {
    Table,
    Id,
    ApplicationId,
    PageId,
    CollectionId,
    PluginId,
    DatasourceId,
    Name,
    TemplateId,
    Body,
    ExecuteOnLoad,
    GitSyncId,
    CreatedAt,
    UpdatedAt,
}
