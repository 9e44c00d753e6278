use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Workspaces::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Workspaces::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Workspaces::Name).string().not_null())
                    .col(ColumnDef::new(Workspaces::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Workspaces::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Applications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Applications::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Applications::WorkspaceId).integer().not_null())
                    .col(ColumnDef::new(Applications::Name).string().not_null())
                    .col(ColumnDef::new(Applications::BaseApplicationId).integer())
                    .col(ColumnDef::new(Applications::BranchName).string())
                    .col(
                        ColumnDef::new(Applications::InstalledJsLibs)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Applications::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Applications::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-applications-workspace_id")
                            .from(Applications::Table, Applications::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Pages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pages::ApplicationId).integer().not_null())
                    .col(ColumnDef::new(Pages::Name).string().not_null())
                    .col(ColumnDef::new(Pages::BasePageId).integer())
                    .col(ColumnDef::new(Pages::BranchName).string())
                    .col(ColumnDef::new(Pages::Dsl).text().not_null().default("{}"))
                    .col(
                        ColumnDef::new(Pages::LayoutOnLoadActions)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Pages::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Pages::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pages-application_id")
                            .from(Pages::Table, Pages::ApplicationId)
                            .to(Applications::Table, Applications::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pages-base-page-branch")
                    .table(Pages::Table)
                    .col(Pages::BasePageId)
                    .col(Pages::BranchName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Applications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Workspaces::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(super) enum Workspaces {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(super) enum Applications {
    Table,
    Id,
    WorkspaceId,
    Name,
    BaseApplicationId,
    BranchName,
    InstalledJsLibs,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(super) enum Pages {
    Table,
    Id,
    ApplicationId,
    Name,
    BasePageId,
    BranchName,
    Dsl,
    LayoutOnLoadActions,
    CreatedAt,
    UpdatedAt,
}
