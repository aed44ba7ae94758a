//! Contest response DTOs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Contest, ContestCategory, ContestStats, ContestSummary, ProblemSearchRow};

/// Contest list response
#[derive(Debug, Serialize)]
pub struct ContestsListResponse {
    pub success: bool,
    pub count: usize,
    pub total: i64,
    pub contests: Vec<Contest>,
}

/// Single contest response
#[derive(Debug, Serialize)]
pub struct ContestResponse {
    pub success: bool,
    pub contest: Contest,
}

/// Contests bucketed by category
#[derive(Debug, Serialize)]
pub struct ContestsByCategoryResponse {
    pub success: bool,
    pub counts: CategoryCounts,
    pub categories: BTreeMap<ContestCategory, Vec<ContestSummary>>,
}

/// Bucket sizes after capping, plus the number of contests classified
#[derive(Debug, Serialize)]
pub struct CategoryCounts {
    #[serde(flatten)]
    pub buckets: BTreeMap<ContestCategory, usize>,
    pub total: usize,
}

/// Stats overview response
#[derive(Debug, Serialize)]
pub struct ContestStatsResponse {
    pub success: bool,
    pub stats: Vec<ContestStats>,
}

/// Cross-contest problem search response
#[derive(Debug, Serialize)]
pub struct ProblemSearchResponse {
    pub success: bool,
    pub count: usize,
    pub problems: Vec<ProblemSearchRow>,
}

/// Outcome of a sync run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub success: bool,
    pub contests_inserted: u64,
    pub contests_updated: u64,
    pub total_problems: usize,
    pub new_contests_count: usize,
    pub strategy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Sync freshness
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusResponse {
    pub success: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub contest_count: i64,
    pub needs_sync: bool,
}

/// Single contest refresh response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshContestResponse {
    pub success: bool,
    pub contest: Contest,
    pub problems_count: usize,
}
