//! cfladder - Application Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use redis::Client as RedisClient;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cfladder::{
    cache::{CacheEnvelope, JsonFileStore, ProblemCache, SyncSnapshot, SystemClock},
    codeforces::CodeforcesClient,
    config::Config,
    db, handlers,
    middleware::logging_middleware,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.server.rust_log.clone().into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.server.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        strategy = config.sync.strategy.as_str(),
        "Starting cfladder server..."
    );

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database).await?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&db_pool).await?;

    // Initialize Redis connection
    tracing::info!("Connecting to Redis...");
    let redis_client = RedisClient::open(config.redis.url.as_str())?;
    let redis_conn = redis::aio::ConnectionManager::new(redis_client).await?;

    // Upstream client and problemset cache
    let codeforces = Arc::new(CodeforcesClient::new(&config.codeforces)?);
    let problems = Arc::new(ProblemCache::new(
        config.cache.problems_ttl,
        Arc::new(SystemClock),
        Arc::new(JsonFileStore::<CacheEnvelope>::new(config.cache.problems_file.clone())),
        codeforces.clone(),
    ));
    let warmed = problems.warm().await;
    tracing::info!(count = warmed, "Problemset cache warmed");

    let sync_snapshots = Arc::new(JsonFileStore::<SyncSnapshot>::new(config.cache.contests_file.clone()));

    // Create application state
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let state = AppState::new(db_pool, redis_conn, codeforces, problems, sync_snapshots, config);

    // Build the router
    let app = Router::new()
        .nest("/api", handlers::routes(state.clone()))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the server
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
