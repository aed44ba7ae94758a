//! HTTP middleware

pub mod auth;
pub mod logging;

pub use auth::refresh_secret_middleware;
pub use logging::logging_middleware;
