//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CODEFORCES_API_URL, DEFAULT_CODEFORCES_TIMEOUT_SECS, DEFAULT_CONTESTS_CACHE_FILE,
    DEFAULT_CONTESTS_CACHE_TTL_SECS, DEFAULT_DATABASE_MAX_CONNECTIONS,
    DEFAULT_PROBLEMSET_TIMEOUT_SECS, DEFAULT_PROBLEMS_CACHE_FILE, DEFAULT_PROBLEMS_CACHE_TTL_MS,
    DEFAULT_PROGRESS_INFO_TTL_SECS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SYNC_PROBE_CONCURRENCY, DEFAULT_SYNC_PROBE_MAX_CONSECUTIVE_MISSES,
    DEFAULT_SYNC_PROBE_MAX_IDS, DEFAULT_SYNC_REQUEST_DELAY_MS,
};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub codeforces: CodeforcesConfig,
    pub cache: CacheConfig,
    pub sync: SyncConfig,
    pub refresh: RefreshConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    /// Emit logs as JSON lines (`LOG_FORMAT=json`)
    pub log_json: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// Lifetime of a stored user profile snapshot
    pub info_ttl_secs: u64,
}

/// Upstream API configuration
#[derive(Debug, Clone)]
pub struct CodeforcesConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub problemset_timeout: Duration,
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Problems snapshot time-to-live
    pub problems_ttl: chrono::Duration,
    pub problems_file: PathBuf,
    pub contests_file: PathBuf,
    /// Age after which the contest store should be re-synced
    pub contests_ttl: chrono::Duration,
}

/// Contest sync configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub strategy: SyncStrategy,
    pub request_delay: Duration,
    pub probe_concurrency: usize,
    pub probe_max_consecutive_misses: u32,
    pub probe_max_ids: u32,
}

/// Force-refresh protection
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Shared secret; `None` leaves the refresh endpoint open
    pub secret: Option<String>,
}

/// Which incremental sync policy this process runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Filter the upstream contest list by start-time watermark
    Watermark,
    /// Probe ids past the highest stored one
    Probe,
}

impl SyncStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Watermark => "watermark",
            Self::Probe => "probe",
        }
    }
}

impl FromStr for SyncStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "watermark" => Ok(Self::Watermark),
            "probe" => Ok(Self::Probe),
            _ => Err(ConfigError::InvalidValue("SYNC_STRATEGY".to_string())),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            codeforces: CodeforcesConfig::from_env()?,
            cache: CacheConfig::from_env()?,
            sync: SyncConfig::from_env()?,
            refresh: RefreshConfig::from_env(),
        })
    }
}

/// Read `key`, falling back to `default`, and parse it
fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(default),
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        // PORT is what most hosting platforms inject
        let port = match env::var("SERVER_PORT").or_else(|_| env::var("PORT")) {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
            Err(_) => DEFAULT_SERVER_PORT,
        };

        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_json: env::var("LOG_FORMAT").is_ok_and(|f| f.trim().eq_ignore_ascii_case("json")),
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?,
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS)?,
        })
    }
}

impl RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            info_ttl_secs: parse_var("PROGRESS_INFO_TTL_SECS", DEFAULT_PROGRESS_INFO_TTL_SECS)?,
        })
    }
}

impl CodeforcesConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: env::var("CODEFORCES_API_URL")
                .unwrap_or_else(|_| DEFAULT_CODEFORCES_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout: Duration::from_secs(parse_var(
                "CODEFORCES_TIMEOUT_SECS",
                DEFAULT_CODEFORCES_TIMEOUT_SECS,
            )?),
            problemset_timeout: Duration::from_secs(parse_var(
                "PROBLEMSET_TIMEOUT_SECS",
                DEFAULT_PROBLEMSET_TIMEOUT_SECS,
            )?),
        })
    }
}

impl CacheConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let problems_ttl_ms: i64 = parse_var("PROBLEMS_CACHE_TTL_MS", DEFAULT_PROBLEMS_CACHE_TTL_MS)?;
        if problems_ttl_ms < 0 {
            return Err(ConfigError::InvalidValue("PROBLEMS_CACHE_TTL_MS".to_string()));
        }
        let contests_ttl_secs: i64 =
            parse_var("CONTESTS_CACHE_TTL_SECS", DEFAULT_CONTESTS_CACHE_TTL_SECS)?;
        if contests_ttl_secs < 0 {
            return Err(ConfigError::InvalidValue("CONTESTS_CACHE_TTL_SECS".to_string()));
        }

        Ok(Self {
            problems_ttl: chrono::Duration::milliseconds(problems_ttl_ms),
            problems_file: PathBuf::from(
                env::var("CACHE_FILE_PATH").unwrap_or_else(|_| DEFAULT_PROBLEMS_CACHE_FILE.to_string()),
            ),
            contests_file: PathBuf::from(
                env::var("CONTESTS_CACHE_FILE")
                    .unwrap_or_else(|_| DEFAULT_CONTESTS_CACHE_FILE.to_string()),
            ),
            contests_ttl: chrono::Duration::seconds(contests_ttl_secs),
        })
    }
}

impl SyncConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let probe_concurrency = parse_var("SYNC_PROBE_CONCURRENCY", DEFAULT_SYNC_PROBE_CONCURRENCY)?;
        if probe_concurrency == 0 {
            return Err(ConfigError::InvalidValue("SYNC_PROBE_CONCURRENCY".to_string()));
        }

        Ok(Self {
            strategy: parse_var("SYNC_STRATEGY", SyncStrategy::Watermark)?,
            request_delay: Duration::from_millis(parse_var(
                "SYNC_REQUEST_DELAY_MS",
                DEFAULT_SYNC_REQUEST_DELAY_MS,
            )?),
            probe_concurrency,
            probe_max_consecutive_misses: parse_var(
                "SYNC_PROBE_MAX_CONSECUTIVE_MISSES",
                DEFAULT_SYNC_PROBE_MAX_CONSECUTIVE_MISSES,
            )?,
            probe_max_ids: parse_var("SYNC_PROBE_MAX_IDS", DEFAULT_SYNC_PROBE_MAX_IDS)?,
        })
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            strategy: SyncStrategy::Watermark,
            request_delay: Duration::from_millis(DEFAULT_SYNC_REQUEST_DELAY_MS),
            probe_concurrency: DEFAULT_SYNC_PROBE_CONCURRENCY,
            probe_max_consecutive_misses: DEFAULT_SYNC_PROBE_MAX_CONSECUTIVE_MISSES,
            probe_max_ids: DEFAULT_SYNC_PROBE_MAX_IDS,
        }
    }
}

impl RefreshConfig {
    fn from_env() -> Self {
        Self {
            secret: env::var("PROBLEMS_REFRESH_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
