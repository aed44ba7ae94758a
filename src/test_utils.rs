//! Test utilities with lazy testcontainers support
//!
//! A PostgreSQL container is started on first use and shared by every test in
//! the binary. `TEST_DATABASE_URL` points the tests at an existing database
//! instead. When neither is available the database-backed tests are skipped.

use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

struct TestDatabase {
    url: String,
    _container: Option<ContainerAsync<Postgres>>,
}

static DATABASE: OnceCell<Option<TestDatabase>> = OnceCell::const_new();

async fn start_database() -> Option<TestDatabase> {
    let (url, container) = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => (url, None),
        Err(_) => {
            let container = match Postgres::default()
                .with_user("cfladder")
                .with_password("cfladder_test")
                .with_db_name("cfladder_test")
                .start()
                .await
            {
                Ok(container) => container,
                Err(e) => {
                    eprintln!("PostgreSQL container unavailable, skipping database tests: {}", e);
                    return None;
                }
            };
            let host = container.get_host().await.expect("container host");
            let port = container
                .get_host_port_ipv4(5432)
                .await
                .expect("container port");
            let url = format!("postgres://cfladder:cfladder_test@{}:{}/cfladder_test", host, port);
            (url, Some(container))
        }
    };

    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database");
    crate::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool.close().await;

    Some(TestDatabase {
        url,
        _container: container,
    })
}

/// Fresh pool on the shared test database, `None` when no database is reachable
///
/// Pools are per test because each `#[tokio::test]` runs its own runtime.
pub async fn pg_pool() -> Option<PgPool> {
    let database = DATABASE.get_or_init(start_database).await.as_ref()?;
    Some(
        PgPool::connect(&database.url)
            .await
            .expect("Failed to connect to test database"),
    )
}
