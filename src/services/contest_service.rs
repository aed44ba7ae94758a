//! Contest query service

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::{
    codeforces::ContestPhase,
    constants::{
        DEFAULT_CATEGORY_LIMIT, DEFAULT_CONTEST_LIST_LIMIT, DEFAULT_PROBLEM_SEARCH_LIMIT,
        STATS_OVERVIEW_LIMIT,
    },
    db::repositories::{ContestRepository, ProblemSearch},
    error::{AppError, AppResult},
    handlers::contests::{
        request::{ListContestsQuery, ProblemSearchQuery},
        response::{
            CategoryCounts, ContestResponse, ContestStatsResponse, ContestsByCategoryResponse,
            ContestsListResponse, ProblemSearchResponse, SyncStatusResponse,
        },
    },
    models::{ContestCategory, ContestSummary, categorize},
};

/// Contest service for read-side business logic
pub struct ContestService;

impl ContestService {
    /// List contests, newest first
    pub async fn list_contests(pool: &PgPool, query: &ListContestsQuery) -> AppResult<ContestsListResponse> {
        let phase = query
            .phase
            .as_deref()
            .map(|p| {
                p.parse::<ContestPhase>()
                    .map_err(|_| AppError::InvalidInput(format!("Unknown contest phase: {}", p)))
            })
            .transpose()?;
        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let (contests, total) = ContestRepository::list(
            pool,
            phase.as_ref().map(ContestPhase::as_str),
            search,
            query.limit.unwrap_or(DEFAULT_CONTEST_LIST_LIMIT),
            query.offset.unwrap_or(0),
        )
        .await?;

        Ok(ContestsListResponse {
            success: true,
            count: contests.len(),
            total,
            contests,
        })
    }

    /// Get contest by ID
    pub async fn get_contest(pool: &PgPool, id: i64) -> AppResult<ContestResponse> {
        let contest = ContestRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        Ok(ContestResponse {
            success: true,
            contest,
        })
    }

    /// Every contest bucketed by category
    pub async fn contests_by_category(pool: &PgPool, limit: Option<usize>) -> AppResult<ContestsByCategoryResponse> {
        let summaries = ContestRepository::summaries(pool).await?;
        Ok(group_by_category(summaries, limit.unwrap_or(DEFAULT_CATEGORY_LIMIT)))
    }

    /// Most recent contests with problem counts
    pub async fn stats_overview(pool: &PgPool) -> AppResult<ContestStatsResponse> {
        let stats = ContestRepository::stats_overview(pool, STATS_OVERVIEW_LIMIT).await?;
        Ok(ContestStatsResponse { success: true, stats })
    }

    /// Problems across every stored contest
    pub async fn search_problems(pool: &PgPool, query: &ProblemSearchQuery) -> AppResult<ProblemSearchResponse> {
        if let (Some(min), Some(max)) = (query.min_rating, query.max_rating) {
            if min > max {
                return Err(AppError::InvalidInput(
                    "minRating must not exceed maxRating".to_string(),
                ));
            }
        }

        let search = ProblemSearch {
            min_rating: query.min_rating,
            max_rating: query.max_rating,
            tags: query.tag_list(),
            limit: query.limit.unwrap_or(DEFAULT_PROBLEM_SEARCH_LIMIT),
        };
        let problems = ContestRepository::search_problems(pool, &search).await?;

        Ok(ProblemSearchResponse {
            success: true,
            count: problems.len(),
            problems,
        })
    }

    /// Whether the store is due for another sync
    pub async fn sync_status(pool: &PgPool, max_age: Duration) -> AppResult<SyncStatusResponse> {
        let (last_sync, contest_count) = ContestRepository::sync_status(pool).await?;

        Ok(SyncStatusResponse {
            success: true,
            last_sync,
            contest_count,
            needs_sync: needs_sync(last_sync, Utc::now(), max_age),
        })
    }
}

/// Bucket contests by category, capping each bucket at `limit`
///
/// Every bucket is present in the output, empty or not. `total` counts all
/// classified contests before capping.
pub fn group_by_category(summaries: Vec<ContestSummary>, limit: usize) -> ContestsByCategoryResponse {
    let total = summaries.len();
    let mut categories: BTreeMap<ContestCategory, Vec<ContestSummary>> =
        ContestCategory::ALL.iter().map(|c| (*c, Vec::new())).collect();

    for summary in summaries {
        let bucket = categories.entry(categorize(&summary.name)).or_default();
        if bucket.len() < limit {
            bucket.push(summary);
        }
    }

    let buckets = categories.iter().map(|(c, list)| (*c, list.len())).collect();

    ContestsByCategoryResponse {
        success: true,
        counts: CategoryCounts { buckets, total },
        categories,
    }
}

/// A store never synced, or synced longer than `max_age` ago, needs a sync
pub fn needs_sync(last_sync: Option<DateTime<Utc>>, now: DateTime<Utc>, max_age: Duration) -> bool {
    match last_sync {
        Some(at) => now - at > max_age,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: i64, name: &str) -> ContestSummary {
        ContestSummary {
            id,
            name: name.to_string(),
            contest_type: "CF".to_string(),
            phase: "FINISHED".to_string(),
            start_time_seconds: id * 10,
            problem_count: 6,
            date: DateTime::from_timestamp(id * 10, 0),
        }
    }

    #[test]
    fn test_group_by_category_caps_buckets() {
        let summaries = vec![
            summary(1, "Codeforces Round 1 (Div. 2)"),
            summary(2, "Codeforces Round 2 (Div. 2)"),
            summary(3, "Codeforces Round 3 (Div. 2)"),
            summary(4, "Educational Codeforces Round 50"),
            summary(5, "Codeforces Round 1900 (Div. 1 + Div. 2)"),
            summary(6, "Kotlin Heroes"),
        ];

        let grouped = group_by_category(summaries, 2);

        assert_eq!(grouped.categories[&ContestCategory::Div2].len(), 2);
        assert_eq!(grouped.categories[&ContestCategory::Educational].len(), 1);
        assert_eq!(grouped.categories[&ContestCategory::Div1Div2].len(), 1);
        assert_eq!(grouped.categories[&ContestCategory::Others].len(), 1);
        assert!(grouped.categories[&ContestCategory::Div4].is_empty());
        assert_eq!(grouped.counts.buckets[&ContestCategory::Div2], 2);
        assert_eq!(grouped.counts.total, 6);
    }

    #[test]
    fn test_category_counts_serialize_flat() {
        let grouped = group_by_category(vec![summary(1, "Codeforces Global Round 1")], 10);
        let json = serde_json::to_value(&grouped.counts).unwrap();

        assert_eq!(json["GLOBAL"], 1);
        assert_eq!(json["DIV3"], 0);
        assert_eq!(json["total"], 1);
    }

    #[test]
    fn test_category_entries_carry_date() {
        let mut undated = summary(2, "Codeforces Round 2 (Div. 3)");
        undated.date = None;
        let grouped = group_by_category(vec![summary(1_700_000, "Codeforces Round 1 (Div. 3)"), undated], 10);
        let json = serde_json::to_value(&grouped.categories[&ContestCategory::Div3]).unwrap();

        assert_eq!(json[0]["date"], "1970-07-16T18:13:20Z");
        assert!(json[1]["date"].is_null());
    }

    #[test]
    fn test_needs_sync() {
        let now = Utc::now();
        let max_age = Duration::hours(6);

        assert!(needs_sync(None, now, max_age));
        assert!(!needs_sync(Some(now - Duration::hours(1)), now, max_age));
        assert!(needs_sync(Some(now - Duration::hours(7)), now, max_age));
    }
}
