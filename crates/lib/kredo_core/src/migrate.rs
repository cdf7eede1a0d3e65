//! Database migration support.
//!
//! Embeds and runs the SQL migrations under `kredo_core/migrations/`.

use sqlx::PgPool;

/// Run all embedded migrations against `pool`.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
