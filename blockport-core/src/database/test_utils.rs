#[cfg(test)]
use sea_orm::{Database, DatabaseConnection};

/// Fresh in-memory store with every blockport table migrated, for unit tests
/// that need real rows (collision seeding, entity helpers).
#[cfg(test)]
pub async fn migrated_memory_db() -> DatabaseConnection {
    use sea_orm_migration::MigratorTrait;

    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite connection");
    crate::database::migrations::Migrator::up(&db, None)
        .await
        .expect("blockport migrations apply to an empty store");
    db
}
