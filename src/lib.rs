//! cfladder - Codeforces problem ladder backend
//!
//! Mirrors Codeforces contests and the problemset into a local store and
//! serves them to a rating-ladder front end.
//!
//! # Features
//!
//! - Incremental contest sync (watermark or id probing)
//! - Problemset cache with TTL, stale fallback and a disk snapshot
//! - Contest queries: listing, categories, stats, cross-contest search
//! - Rating ladder and per-user solved tracking
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Business logic
//! - **Repositories**: Postgres and Redis access
//! - **Codeforces**: Upstream API client
//! - **Cache**: In-process problemset cache and disk snapshots

pub mod cache;
pub mod codeforces;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
