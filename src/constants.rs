//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 4000;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Rows per multi-row INSERT statement (keeps bind count under the protocol limit)
pub const INSERT_BATCH_SIZE: usize = 1000;

// =============================================================================
// CODEFORCES API
// =============================================================================

/// Base URL of the Codeforces REST API
pub const DEFAULT_CODEFORCES_API_URL: &str = "https://codeforces.com/api";

/// Default per-call timeout for upstream requests
pub const DEFAULT_CODEFORCES_TIMEOUT_SECS: u64 = 30;

/// Timeout for the (large) problemset download
pub const DEFAULT_PROBLEMSET_TIMEOUT_SECS: u64 = 20;

/// Verdict string the upstream uses for an accepted submission
pub const VERDICT_ACCEPTED: &str = "OK";

// =============================================================================
// CACHE DEFAULTS
// =============================================================================

/// Default problems cache time-to-live (one hour)
pub const DEFAULT_PROBLEMS_CACHE_TTL_MS: i64 = 60 * 60 * 1000;

/// Default location of the problems cache file
pub const DEFAULT_PROBLEMS_CACHE_FILE: &str = "cache/problems.cache.json";

/// Default location of the contest sync snapshot file
pub const DEFAULT_CONTESTS_CACHE_FILE: &str = "cache/contests.cache.json";

/// Age after which the contest store is reported as needing a sync (six hours)
pub const DEFAULT_CONTESTS_CACHE_TTL_SECS: i64 = 6 * 60 * 60;

/// How long a stored user profile snapshot is kept
pub const DEFAULT_PROGRESS_INFO_TTL_SECS: u64 = 24 * 60 * 60;

/// Cache status header name
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Header carrying the force-refresh secret
pub const REFRESH_SECRET_HEADER: &str = "x-refresh-secret";

// =============================================================================
// SYNC DEFAULTS
// =============================================================================

/// Delay between serial per-contest fetches during a watermark sync
pub const DEFAULT_SYNC_REQUEST_DELAY_MS: u64 = 300;

/// Worker pool size for the probe sync
pub const DEFAULT_SYNC_PROBE_CONCURRENCY: usize = 5;

/// Consecutive missing ids after which the probe sync stops
pub const DEFAULT_SYNC_PROBE_MAX_CONSECUTIVE_MISSES: u32 = 10;

/// Hard cap on ids probed in one request
pub const DEFAULT_SYNC_PROBE_MAX_IDS: u32 = 200;

// =============================================================================
// QUERY LIMITS
// =============================================================================

/// Default page size for the contest list
pub const DEFAULT_CONTEST_LIST_LIMIT: i64 = 100;

/// Largest page the contest list will serve
pub const MAX_CONTEST_LIST_LIMIT: i64 = 1000;

/// Default per-bucket cap for the category breakdown
pub const DEFAULT_CATEGORY_LIMIT: usize = 50;

/// Number of contests in the stats overview
pub const STATS_OVERVIEW_LIMIT: i64 = 100;

/// Default cap for the cross-contest problem search
pub const DEFAULT_PROBLEM_SEARCH_LIMIT: i64 = 100;

/// Largest cap for the cross-contest problem search
pub const MAX_PROBLEM_SEARCH_LIMIT: i64 = 5000;

// =============================================================================
// LADDER SETTINGS
// =============================================================================

/// Lowest rung of the rating ladder
pub const LADDER_MIN_RATING: i32 = 800;

/// Highest rung of the rating ladder
pub const LADDER_MAX_RATING: i32 = 3500;

/// Distance between ladder rungs
pub const LADDER_RATING_STEP: i32 = 100;

/// Default ladder page size
pub const DEFAULT_LADDER_PER_PAGE: usize = 30;

/// Largest ladder page size
pub const MAX_LADDER_PER_PAGE: usize = 200;

/// Longest accepted Codeforces handle
pub const MAX_HANDLE_LENGTH: usize = 24;

/// Attempted-but-unsolved problems kept per handle, most recent first
pub const MAX_ATTEMPTED_UNSOLVED: usize = 40;

// =============================================================================
// CONTEST PHASES
// =============================================================================

/// Upstream contest phase identifiers
pub mod phases {
    pub const BEFORE: &str = "BEFORE";
    pub const CODING: &str = "CODING";
    pub const PENDING_SYSTEM_TEST: &str = "PENDING_SYSTEM_TEST";
    pub const SYSTEM_TEST: &str = "SYSTEM_TEST";
    pub const FINISHED: &str = "FINISHED";
}

// =============================================================================
// REDIS KEYS
// =============================================================================

/// Redis key builders for per-user progress
pub mod redis_keys {
    /// Set of solved problem keys for a handle
    pub fn solved(handle: &str) -> String {
        format!("progress:{}:solved", handle)
    }

    /// Serialized profile snapshot for a handle
    pub fn info(handle: &str) -> String {
        format!("progress:{}:info", handle)
    }

    /// Serialized attempted-but-unsolved list for a handle
    pub fn attempted(handle: &str) -> String {
        format!("progress:{}:attempted", handle)
    }
}
