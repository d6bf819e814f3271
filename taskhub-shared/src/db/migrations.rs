/// Database migration runner
///
/// Migrations live in this crate's `migrations/` directory as plain SQL
/// files and are embedded at compile time via `sqlx::migrate!`. The API
/// binary runs them at startup so a fresh database is usable immediately.
use sqlx::PgPool;
use tracing::info;

/// Runs all pending migrations
///
/// Already-applied migrations are skipped (sqlx tracks them in the
/// `_sqlx_migrations` table).
///
/// # Errors
///
/// Returns an error if a migration fails to apply or the tracking table
/// cannot be read.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations up to date");
    Ok(())
}
