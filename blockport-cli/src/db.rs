use anyhow::Result;
use blockport::database::{establish_connection, get_database_url, migrations::Migrator};
use clap::Subcommand;
use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn connect(database_path: &str) -> Result<DatabaseConnection> {
    let database_url = get_database_url(Some(database_path));
    Ok(establish_connection(&database_url).await?)
}

/// Connect and bring the schema up to date before running an import.
pub async fn connect_migrated(database_path: &str) -> Result<DatabaseConnection> {
    let db = connect(database_path).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let db = connect(database_path).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Dropping all tables and re-running migrations");
            Migrator::fresh(&db).await?;
        }
    }

    info!("Database migration complete");
    Ok(())
}
