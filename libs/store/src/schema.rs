//! Embedded schema migrations

use common::error::{DatabaseError, DatabaseResult};
use sqlx::{MySqlPool, migrate::Migrator};
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply pending migrations to the database behind `pool`
pub async fn migrate(pool: &MySqlPool) -> DatabaseResult<()> {
    info!("Applying store migrations");

    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    info!("Store migrations applied");
    Ok(())
}
