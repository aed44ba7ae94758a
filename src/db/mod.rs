//! Database module
//!
//! Connection pool, migrations and repositories. Per-user progress lives in
//! Redis and has its own repository next to the Postgres ones.

pub mod connection;
pub mod repositories;

use sqlx::PgPool;

pub use connection::*;

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
