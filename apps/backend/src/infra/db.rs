use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, SqlxSqliteConnector};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::config::db::{db_url, DbProfile};
use crate::error::AppError;

/// Unified database connector for the supported profiles.
/// This function does NOT run any migrations.
pub async fn connect_db(profile: DbProfile) -> Result<DatabaseConnection, AppError> {
    match profile {
        DbProfile::Prod => {
            let mut opts = ConnectOptions::new(db_url()?);
            opts.max_connections(16)
                .connect_timeout(Duration::from_secs(5))
                .sqlx_logging(false);
            let conn = Database::connect(opts).await?;
            info!(profile = ?DbProfile::Prod, "[DB] connected");
            Ok(conn)
        }
        DbProfile::InMemory => {
            // An in-memory database lives and dies with its connection, so
            // the pool is pinned to exactly one that is never recycled.
            let options: SqliteConnectOptions = "sqlite::memory:"
                .parse::<SqliteConnectOptions>()
                .map_err(|e| AppError::config(format!("invalid sqlite options: {e}")))?
                .foreign_keys(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
                .map_err(|e| AppError::DbUnavailable {
                    detail: format!("failed to open sqlite: {e}"),
                })?;
            info!(profile = ?DbProfile::InMemory, "[DB] connected");
            Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
        }
    }
}

/// Connect and bring the schema up to date.
pub async fn bootstrap_db(profile: DbProfile) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(profile).await?;
    migration::migrate(&conn, migration::MigrationCommand::Up).await?;
    Ok(conn)
}
