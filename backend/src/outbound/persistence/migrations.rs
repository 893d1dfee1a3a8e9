//! Embedded schema migrations applied at start-up.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Migrations from the backend/migrations directory.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The migration connection could not be opened.
    #[error("failed to connect for migrations: {message}")]
    Connection {
        /// Driver message.
        message: String,
    },
    /// A migration failed.
    #[error("failed to apply migrations: {message}")]
    Apply {
        /// Driver message.
        message: String,
    },
}

/// Apply pending migrations on a blocking thread.
///
/// # Errors
///
/// Returns [`MigrationError`] when the database is unreachable or a migration
/// fails.
pub async fn run_pending_migrations(database_url: String) -> Result<usize, MigrationError> {
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url).map_err(|err| {
            MigrationError::Connection {
                message: err.to_string(),
            }
        })?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| MigrationError::Apply {
                message: err.to_string(),
            })?;
        for version in &applied {
            info!(%version, "migration applied");
        }
        Ok(applied.len())
    })
    .await
    .map_err(|err| MigrationError::Apply {
        message: format!("migration task failed: {err}"),
    })?
}
