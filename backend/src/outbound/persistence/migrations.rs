//! Embedded schema migrations.
//!
//! Diesel's migration harness is synchronous, so migrations run on a blocking
//! thread over a dedicated `PgConnection` rather than a pooled async one.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::ports::StorageInitError;

/// Migrations from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply any pending migrations. Already-applied migrations are skipped.
pub async fn run_pending_migrations(database_url: &str) -> Result<(), StorageInitError> {
    let database_url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url)
            .map_err(|err| StorageInitError::connection(err.to_string()))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| StorageInitError::migration(err.to_string()))?;
        if !applied.is_empty() {
            info!(count = applied.len(), "applied schema migrations");
        }
        Ok(())
    })
    .await
    .map_err(|err| StorageInitError::migration(format!("migration task failed: {err}")))?
}
