//! Database connection management

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{config::DatabaseConfig, error::AppError};

/// Create a new database connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

/// Test database connection
pub async fn test_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Name of the pool's connection state, as reported by health and store errors
pub fn pool_state(pool: &PgPool) -> &'static str {
    if pool.is_closed() {
        "disconnected"
    } else if pool.size() == 0 {
        "connecting"
    } else {
        "connected"
    }
}

/// Fail fast with a 503 when the store cannot be reached
pub async fn ensure_ready(pool: &PgPool) -> Result<(), AppError> {
    if pool.is_closed() {
        return Err(AppError::StoreUnavailable {
            state: "disconnected".to_string(),
        });
    }

    test_connection(pool).await.map_err(|e| {
        tracing::warn!(error = %e, "Database not ready");
        AppError::StoreUnavailable {
            state: pool_state(pool).to_string(),
        }
    })
}
