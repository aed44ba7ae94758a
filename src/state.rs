//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;

use crate::{
    cache::{ProblemCache, SnapshotStore, SyncSnapshot},
    codeforces::CodeforcesApi,
    config::Config,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Database connection pool
    pub db: PgPool,

    /// Redis connection manager
    pub redis: ConnectionManager,

    /// Upstream API client
    pub codeforces: Arc<dyn CodeforcesApi>,

    /// Problemset cache
    pub problems: Arc<ProblemCache>,

    /// Where the post-sync contest snapshot is written
    pub sync_snapshots: Arc<dyn SnapshotStore<SyncSnapshot>>,

    /// Application configuration
    pub config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(
        db: PgPool,
        redis: ConnectionManager,
        codeforces: Arc<dyn CodeforcesApi>,
        problems: Arc<ProblemCache>,
        sync_snapshots: Arc<dyn SnapshotStore<SyncSnapshot>>,
        config: Config,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                redis,
                codeforces,
                problems,
                sync_snapshots,
                config,
            }),
        }
    }

    /// Get a reference to the database pool
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get a clone of the Redis connection manager
    pub fn redis(&self) -> ConnectionManager {
        self.inner.redis.clone()
    }

    /// Get a reference to the upstream client
    pub fn codeforces(&self) -> &dyn CodeforcesApi {
        self.inner.codeforces.as_ref()
    }

    /// Get a reference to the problemset cache
    pub fn problems(&self) -> &ProblemCache {
        &self.inner.problems
    }

    pub fn sync_snapshots(&self) -> &dyn SnapshotStore<SyncSnapshot> {
        self.inner.sync_snapshots.as_ref()
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
