//! Contest model

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::problem::{Problem, sort_by_index};
use crate::codeforces::CfContest;

/// Contest database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub contest_type: String,
    pub phase: String,
    pub frozen: bool,
    pub duration_seconds: i64,
    pub start_time_seconds: i64,
    pub relative_time_seconds: Option<i64>,
    #[sqlx(json)]
    pub problems: Vec<Problem>,
    pub prepared_by: Option<String>,
    pub website_url: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<i32>,
    pub kind: Option<String>,
    pub icpc_region: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub season: Option<String>,
    pub last_synced: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A contest ready to be written to the store
///
/// Problems are sorted by index on construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContest {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub contest_type: String,
    pub phase: String,
    pub frozen: bool,
    pub duration_seconds: i64,
    pub start_time_seconds: i64,
    pub relative_time_seconds: Option<i64>,
    pub problems: Vec<Problem>,
    pub prepared_by: Option<String>,
    pub website_url: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<i32>,
    pub kind: Option<String>,
    pub icpc_region: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub season: Option<String>,
    pub last_synced: DateTime<Utc>,
}

impl NewContest {
    pub fn from_upstream(contest: CfContest, mut problems: Vec<Problem>, synced_at: DateTime<Utc>) -> Self {
        sort_by_index(&mut problems);

        Self {
            id: contest.id,
            name: contest.name,
            contest_type: contest.contest_type,
            phase: contest.phase.as_str().to_string(),
            frozen: contest.frozen,
            duration_seconds: contest.duration_seconds,
            start_time_seconds: contest.start_time_seconds.unwrap_or(0),
            relative_time_seconds: contest.relative_time_seconds,
            problems,
            prepared_by: contest.prepared_by,
            website_url: contest.website_url,
            description: contest.description,
            difficulty: contest.difficulty,
            kind: contest.kind,
            icpc_region: contest.icpc_region,
            country: contest.country,
            city: contest.city,
            season: contest.season,
            last_synced: synced_at,
        }
    }
}

/// Projection used by the category breakdown
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestSummary {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub contest_type: String,
    pub phase: String,
    pub start_time_seconds: i64,
    pub problem_count: i32,
    /// Start time as a timestamp, `None` when the upstream gave none
    pub date: Option<DateTime<Utc>>,
}

/// Projection used by the stats overview
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestStats {
    pub id: i64,
    pub name: String,
    pub phase: String,
    pub start_time_seconds: i64,
    pub duration_seconds: i64,
    pub problem_count: i32,
}

/// One problem of the cross-contest search
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSearchRow {
    pub contest_id: i64,
    pub contest_name: String,
    #[serde(rename = "index")]
    pub problem_index: String,
    pub name: String,
    pub rating: Option<i32>,
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub problem_type: Option<String>,
}

/// Category buckets for the contest breakdown, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContestCategory {
    Div1Div2,
    Div1,
    Div2,
    Div3,
    Div4,
    Global,
    Educational,
    Others,
}

impl ContestCategory {
    pub const ALL: [ContestCategory; 8] = [
        Self::Div1Div2,
        Self::Div1,
        Self::Div2,
        Self::Div3,
        Self::Div4,
        Self::Global,
        Self::Educational,
        Self::Others,
    ];
}

static DIVISION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdiv(?:ision)?\.?\s*([1-4])\b").expect("valid regex"));

/// Classify a contest by its name
///
/// Division markers take precedence over "global" and "educational"; a name
/// carrying both division 1 and 2 is the combined bucket.
pub fn categorize(name: &str) -> ContestCategory {
    let divisions: BTreeSet<&str> = DIVISION_RE
        .captures_iter(name)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    if divisions.contains("1") && divisions.contains("2") {
        return ContestCategory::Div1Div2;
    }
    if divisions.contains("1") {
        return ContestCategory::Div1;
    }
    if divisions.contains("2") {
        return ContestCategory::Div2;
    }
    if divisions.contains("3") {
        return ContestCategory::Div3;
    }
    if divisions.contains("4") {
        return ContestCategory::Div4;
    }

    let lower = name.to_lowercase();
    if lower.contains("global") {
        ContestCategory::Global
    } else if lower.contains("educational") {
        ContestCategory::Educational
    } else {
        ContestCategory::Others
    }
}
