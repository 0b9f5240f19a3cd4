use sea_orm::sea_query::TableCreateStatement;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, Schema,
    Statement,
};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::entity::{group, group_member, group_message, group_session, message, session, user};

/// Initialize database connection and auto-migrate tables
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let database_url = config.connection_url();

    info!(
        "Connecting to database: {}:{}/{}",
        config.host, config.port, config.name
    );

    let mut opt = ConnectOptions::new(&database_url);
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;
    info!("Database connection established");

    auto_migrate(&db).await?;

    Ok(db)
}

/// Auto-migrate database tables
pub async fn auto_migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    info!("Running auto-migration for all entities...");

    // Create tables in dependency order
    // 1. Independent tables first
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(user::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(group::Entity)).await?;

    // 2. Tables referencing the ones above
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(session::Entity))
        .await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(message::Entity))
        .await?;
    create_table_if_not_exists(
        db,
        backend,
        schema.create_table_from_entity(group_member::Entity),
    )
    .await?;
    create_table_if_not_exists(
        db,
        backend,
        schema.create_table_from_entity(group_session::Entity),
    )
    .await?;
    create_table_if_not_exists(
        db,
        backend,
        schema.create_table_from_entity(group_message::Entity),
    )
    .await?;

    info!("Auto-migration completed successfully");
    Ok(())
}

/// Create a table if it doesn't exist
async fn create_table_if_not_exists(
    db: &DatabaseConnection,
    backend: DbBackend,
    mut stmt: TableCreateStatement,
) -> Result<(), DbErr> {
    stmt.if_not_exists();

    let sql = backend.build(&stmt);

    db.execute(Statement::from_string(backend, sql.to_string()))
        .await?;

    Ok(())
}

/// Open a migrated in-memory SQLite database. Test plumbing; one pooled
/// connection only, since every `:memory:` connection is its own database.
pub async fn connect_memory() -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1);
    let db = Database::connect(opt).await?;
    auto_migrate(&db).await?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_auto_migrate_on_sqlite() {
        let db = connect_memory().await.unwrap();
        // Second run must be a no-op thanks to IF NOT EXISTS
        auto_migrate(&db).await.unwrap();
    }
}
