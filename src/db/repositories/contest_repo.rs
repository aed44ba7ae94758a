//! Contest repository

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, types::Json};

use crate::{
    constants::INSERT_BATCH_SIZE,
    error::AppResult,
    models::{Contest, ContestStats, ContestSummary, NewContest, ProblemSearchRow},
};

/// Contest row returned by an upsert, flagged with whether it was new
#[derive(Debug, FromRow)]
pub struct UpsertedContest {
    #[sqlx(flatten)]
    pub contest: Contest,
    pub inserted: bool,
}

/// Filters for the problem search across all contests
#[derive(Debug, Default, Clone)]
pub struct ProblemSearch {
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    /// Match problems carrying any of these tags
    pub tags: Option<Vec<String>>,
    pub limit: i64,
}

/// Repository for contest database operations
pub struct ContestRepository;

impl ContestRepository {
    /// Highest stored start time, 0 when the table is empty
    pub async fn latest_start_time(pool: &PgPool) -> AppResult<i64> {
        let latest: i64 =
            sqlx::query_scalar(r#"SELECT COALESCE(MAX(start_time_seconds), 0) FROM contests"#)
                .fetch_one(pool)
                .await?;

        Ok(latest)
    }

    /// Highest stored contest id, 0 when the table is empty
    pub async fn max_id(pool: &PgPool) -> AppResult<i64> {
        let max: i64 = sqlx::query_scalar(r#"SELECT COALESCE(MAX(id), 0) FROM contests"#)
            .fetch_one(pool)
            .await?;

        Ok(max)
    }

    /// Which of `ids` are already stored
    pub async fn existing_ids(pool: &PgPool, ids: &[i64]) -> AppResult<HashSet<i64>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let found: Vec<i64> = sqlx::query_scalar(r#"SELECT id FROM contests WHERE id = ANY($1)"#)
            .bind(ids)
            .fetch_all(pool)
            .await?;

        Ok(found.into_iter().collect())
    }

    /// Batch insert, skipping ids that already exist
    ///
    /// Returns the number of rows actually inserted.
    pub async fn insert_many(pool: &PgPool, contests: &[NewContest]) -> AppResult<u64> {
        let mut inserted = 0;
        let mut tx = pool.begin().await?;

        for chunk in contests.chunks(INSERT_BATCH_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"INSERT INTO contests (
                    id, name, type, phase, frozen, duration_seconds, start_time_seconds,
                    relative_time_seconds, problems, prepared_by, website_url, description,
                    difficulty, kind, icpc_region, country, city, season, last_synced
                ) "#,
            );

            builder.push_values(chunk, |mut row, c| {
                row.push_bind(c.id)
                    .push_bind(&c.name)
                    .push_bind(&c.contest_type)
                    .push_bind(&c.phase)
                    .push_bind(c.frozen)
                    .push_bind(c.duration_seconds)
                    .push_bind(c.start_time_seconds)
                    .push_bind(c.relative_time_seconds)
                    .push_bind(Json(&c.problems))
                    .push_bind(&c.prepared_by)
                    .push_bind(&c.website_url)
                    .push_bind(&c.description)
                    .push_bind(c.difficulty)
                    .push_bind(&c.kind)
                    .push_bind(&c.icpc_region)
                    .push_bind(&c.country)
                    .push_bind(&c.city)
                    .push_bind(&c.season)
                    .push_bind(c.last_synced);
            });
            builder.push(" ON CONFLICT (id) DO NOTHING");

            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Replace every upstream field of an existing contest
    ///
    /// Returns false when the id is not stored.
    pub async fn update(pool: &PgPool, contest: &NewContest) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE contests
            SET
                name = $2,
                type = $3,
                phase = $4,
                frozen = $5,
                duration_seconds = $6,
                start_time_seconds = $7,
                relative_time_seconds = $8,
                problems = $9,
                prepared_by = $10,
                website_url = $11,
                description = $12,
                difficulty = $13,
                kind = $14,
                icpc_region = $15,
                country = $16,
                city = $17,
                season = $18,
                last_synced = $19,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(contest.id)
        .bind(&contest.name)
        .bind(&contest.contest_type)
        .bind(&contest.phase)
        .bind(contest.frozen)
        .bind(contest.duration_seconds)
        .bind(contest.start_time_seconds)
        .bind(contest.relative_time_seconds)
        .bind(Json(&contest.problems))
        .bind(&contest.prepared_by)
        .bind(&contest.website_url)
        .bind(&contest.description)
        .bind(contest.difficulty)
        .bind(&contest.kind)
        .bind(&contest.icpc_region)
        .bind(&contest.country)
        .bind(&contest.city)
        .bind(&contest.season)
        .bind(contest.last_synced)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert or fully replace a contest by id
    pub async fn upsert(pool: &PgPool, contest: &NewContest) -> AppResult<UpsertedContest> {
        let row = sqlx::query_as::<_, UpsertedContest>(
            r#"
            INSERT INTO contests (
                id, name, type, phase, frozen, duration_seconds, start_time_seconds,
                relative_time_seconds, problems, prepared_by, website_url, description,
                difficulty, kind, icpc_region, country, city, season, last_synced
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                type = EXCLUDED.type,
                phase = EXCLUDED.phase,
                frozen = EXCLUDED.frozen,
                duration_seconds = EXCLUDED.duration_seconds,
                start_time_seconds = EXCLUDED.start_time_seconds,
                relative_time_seconds = EXCLUDED.relative_time_seconds,
                problems = EXCLUDED.problems,
                prepared_by = EXCLUDED.prepared_by,
                website_url = EXCLUDED.website_url,
                description = EXCLUDED.description,
                difficulty = EXCLUDED.difficulty,
                kind = EXCLUDED.kind,
                icpc_region = EXCLUDED.icpc_region,
                country = EXCLUDED.country,
                city = EXCLUDED.city,
                season = EXCLUDED.season,
                last_synced = EXCLUDED.last_synced,
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(contest.id)
        .bind(&contest.name)
        .bind(&contest.contest_type)
        .bind(&contest.phase)
        .bind(contest.frozen)
        .bind(contest.duration_seconds)
        .bind(contest.start_time_seconds)
        .bind(contest.relative_time_seconds)
        .bind(Json(&contest.problems))
        .bind(&contest.prepared_by)
        .bind(&contest.website_url)
        .bind(&contest.description)
        .bind(contest.difficulty)
        .bind(&contest.kind)
        .bind(&contest.icpc_region)
        .bind(&contest.country)
        .bind(&contest.city)
        .bind(&contest.season)
        .bind(contest.last_synced)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    /// Find contest by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> AppResult<Option<Contest>> {
        let contest = sqlx::query_as::<_, Contest>(r#"SELECT * FROM contests WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(contest)
    }

    /// List contests with pagination
    ///
    /// `search` is a case-insensitive substring match on the name, taken literally.
    pub async fn list(
        pool: &PgPool,
        phase: Option<&str>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Contest>, i64)> {
        let contests = sqlx::query_as::<_, Contest>(
            r#"
            SELECT * FROM contests
            WHERE
                ($1::text IS NULL OR phase = $1)
                AND ($2::text IS NULL OR POSITION(LOWER($2) IN LOWER(name)) > 0)
            ORDER BY start_time_seconds DESC
            OFFSET $3 LIMIT $4
            "#,
        )
        .bind(phase)
        .bind(search)
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM contests
            WHERE
                ($1::text IS NULL OR phase = $1)
                AND ($2::text IS NULL OR POSITION(LOWER($2) IN LOWER(name)) > 0)
            "#,
        )
        .bind(phase)
        .bind(search)
        .fetch_one(pool)
        .await?;

        Ok((contests, total))
    }

    /// Lightweight projection of every contest, newest first
    pub async fn summaries(pool: &PgPool) -> AppResult<Vec<ContestSummary>> {
        let summaries = sqlx::query_as::<_, ContestSummary>(
            r#"
            SELECT id, name, type, phase, start_time_seconds,
                   jsonb_array_length(problems) AS problem_count,
                   CASE WHEN start_time_seconds > 0 THEN to_timestamp(start_time_seconds) END AS date
            FROM contests
            ORDER BY start_time_seconds DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(summaries)
    }

    /// Most recent contests with their problem counts
    pub async fn stats_overview(pool: &PgPool, limit: i64) -> AppResult<Vec<ContestStats>> {
        let stats = sqlx::query_as::<_, ContestStats>(
            r#"
            SELECT id, name, phase, start_time_seconds, duration_seconds,
                   jsonb_array_length(problems) AS problem_count
            FROM contests
            ORDER BY start_time_seconds DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(stats)
    }

    /// Problems across all contests filtered by rating range and tags
    pub async fn search_problems(pool: &PgPool, search: &ProblemSearch) -> AppResult<Vec<ProblemSearchRow>> {
        let rows = sqlx::query_as::<_, ProblemSearchRow>(
            r#"
            SELECT
                c.id AS contest_id,
                c.name AS contest_name,
                p->>'index' AS problem_index,
                p->>'name' AS name,
                (p->>'rating')::int AS rating,
                ARRAY(SELECT jsonb_array_elements_text(COALESCE(p->'tags', '[]'::jsonb))) AS tags,
                p->>'type' AS problem_type
            FROM contests c
            CROSS JOIN LATERAL jsonb_array_elements(c.problems) AS p
            WHERE
                ($1::int IS NULL OR (p->>'rating')::int >= $1)
                AND ($2::int IS NULL OR (p->>'rating')::int <= $2)
                AND ($3::text[] IS NULL OR COALESCE(p->'tags', '[]'::jsonb) ?| $3)
            ORDER BY c.start_time_seconds DESC, p->>'index'
            LIMIT $4
            "#,
        )
        .bind(search.min_rating)
        .bind(search.max_rating)
        .bind(search.tags.as_deref())
        .bind(search.limit)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Latest sync time and number of stored contests
    pub async fn sync_status(pool: &PgPool) -> AppResult<(Option<DateTime<Utc>>, i64)> {
        let status: (Option<DateTime<Utc>>, i64) =
            sqlx::query_as(r#"SELECT MAX(last_synced), COUNT(*) FROM contests"#)
                .fetch_one(pool)
                .await?;

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::Problem, test_utils::pg_pool};

    fn problem(contest_id: i64, index: &str, rating: Option<i32>, tags: &[&str]) -> Problem {
        Problem {
            contest_id,
            index: index.to_string(),
            name: format!("Problem {}", index),
            problem_type: "PROGRAMMING".to_string(),
            rating,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            points: None,
            solved_count: None,
        }
    }

    fn contest(id: i64, name: &str, phase: &str, problems: Vec<Problem>) -> NewContest {
        NewContest {
            id,
            name: name.to_string(),
            contest_type: "CF".to_string(),
            phase: phase.to_string(),
            frozen: false,
            duration_seconds: 7200,
            start_time_seconds: 1_700_000_000 + id,
            relative_time_seconds: None,
            problems,
            prepared_by: None,
            website_url: None,
            description: None,
            difficulty: None,
            kind: None,
            icpc_region: None,
            country: None,
            city: None,
            season: None,
            last_synced: Utc::now(),
        }
    }

    /// Remove rows left over from an earlier run against the same database
    async fn reset(pool: &PgPool, ids: &[i64]) {
        sqlx::query("DELETE FROM contests WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await
            .unwrap();
    }

    async fn count(pool: &PgPool, ids: &[i64]) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM contests WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_many_counts_only_new_rows() {
        let Some(pool) = pg_pool().await else { return };
        let ids = [910_001, 910_002, 910_003];
        reset(&pool, &ids).await;

        let first = vec![
            contest(910_001, "Batch One", "FINISHED", vec![]),
            contest(910_002, "Batch Two", "FINISHED", vec![]),
        ];
        assert_eq!(ContestRepository::insert_many(&pool, &first).await.unwrap(), 2);

        let second = vec![
            contest(910_002, "Batch Two Again", "FINISHED", vec![]),
            contest(910_003, "Batch Three", "FINISHED", vec![]),
        ];
        assert_eq!(ContestRepository::insert_many(&pool, &second).await.unwrap(), 1);

        assert_eq!(count(&pool, &ids).await, 3);
        let kept = ContestRepository::find_by_id(&pool, 910_002).await.unwrap().unwrap();
        assert_eq!(kept.name, "Batch Two");

        let existing = ContestRepository::existing_ids(&pool, &[910_001, 910_003, 910_999]).await.unwrap();
        assert_eq!(existing, HashSet::from([910_001, 910_003]));
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row_per_id() {
        let Some(pool) = pg_pool().await else { return };
        reset(&pool, &[911_001]).await;

        let original = contest(911_001, "Upsert Round", "CODING", vec![]);
        let first = ContestRepository::upsert(&pool, &original).await.unwrap();
        assert!(first.inserted);
        assert_eq!(first.contest.phase, "CODING");

        let replaced = contest(
            911_001,
            "Upsert Round (renamed)",
            "FINISHED",
            vec![problem(911_001, "A", Some(800), &["math"])],
        );
        let second = ContestRepository::upsert(&pool, &replaced).await.unwrap();
        assert!(!second.inserted);
        assert_eq!(second.contest.name, "Upsert Round (renamed)");
        assert_eq!(second.contest.problems.len(), 1);

        assert_eq!(count(&pool, &[911_001]).await, 1);
    }

    #[tokio::test]
    async fn test_update_reports_missing_id() {
        let Some(pool) = pg_pool().await else { return };
        reset(&pool, &[912_001]).await;

        let absent = contest(912_001, "Never Stored", "FINISHED", vec![]);
        assert!(!ContestRepository::update(&pool, &absent).await.unwrap());

        ContestRepository::insert_many(&pool, std::slice::from_ref(&absent)).await.unwrap();
        let renamed = contest(912_001, "Stored Now", "FINISHED", vec![]);
        assert!(ContestRepository::update(&pool, &renamed).await.unwrap());
        assert_eq!(
            ContestRepository::find_by_id(&pool, 912_001).await.unwrap().unwrap().name,
            "Stored Now"
        );
    }

    #[tokio::test]
    async fn test_list_filters_by_phase_and_name() {
        let Some(pool) = pg_pool().await else { return };
        let ids = [913_001, 913_002];
        reset(&pool, &ids).await;

        let contests = vec![
            contest(913_001, "Zeta Lantern Cup 913", "FINISHED", vec![]),
            contest(913_002, "Zeta Lantern Cup 913 Mirror", "CODING", vec![]),
        ];
        ContestRepository::insert_many(&pool, &contests).await.unwrap();

        let (found, total) = ContestRepository::list(&pool, None, Some("zeta LANTERN"), 10, 0)
            .await
            .unwrap();
        assert_eq!(total, 2);
        // newest first
        assert_eq!(found.iter().map(|c| c.id).collect::<Vec<_>>(), vec![913_002, 913_001]);

        let (found, total) = ContestRepository::list(&pool, Some("FINISHED"), Some("Zeta Lantern"), 10, 0)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0].id, 913_001);

        let (found, total) = ContestRepository::list(&pool, None, Some("Zeta Lantern"), 1, 1)
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 913_001);
    }

    #[tokio::test]
    async fn test_search_problems_rating_bounds_and_any_tag() {
        let Some(pool) = pg_pool().await else { return };
        reset(&pool, &[914_001]).await;

        let graphs = "graphs-914";
        let dp = "dp-914";
        let problems = vec![
            problem(914_001, "A", Some(800), &[graphs]),
            problem(914_001, "B", Some(1500), &[dp]),
            problem(914_001, "C", Some(2400), &[graphs, dp]),
            problem(914_001, "D", None, &[graphs]),
            problem(914_001, "E", Some(1600), &["strings-914"]),
        ];
        ContestRepository::insert_many(&pool, &[contest(914_001, "Search Round", "FINISHED", problems)])
            .await
            .unwrap();

        let indices = |rows: Vec<ProblemSearchRow>| -> Vec<String> {
            rows.into_iter().map(|r| r.problem_index).collect()
        };

        let bounded = ContestRepository::search_problems(
            &pool,
            &ProblemSearch {
                min_rating: Some(1000),
                max_rating: Some(2500),
                tags: Some(vec![graphs.to_string(), dp.to_string()]),
                limit: 100,
            },
        )
        .await
        .unwrap();
        assert_eq!(indices(bounded), vec!["B", "C"]);

        let any_tag = ContestRepository::search_problems(
            &pool,
            &ProblemSearch {
                min_rating: None,
                max_rating: None,
                tags: Some(vec![graphs.to_string()]),
                limit: 100,
            },
        )
        .await
        .unwrap();
        assert_eq!(indices(any_tag.clone()), vec!["A", "C", "D"]);
        assert_eq!(any_tag[0].contest_name, "Search Round");
        assert_eq!(any_tag[0].rating, Some(800));
        assert_eq!(any_tag[2].rating, None);
    }

    #[tokio::test]
    async fn test_summaries_date_follows_start_time() {
        let Some(pool) = pg_pool().await else { return };
        let ids = [915_001, 915_002];
        reset(&pool, &ids).await;

        let mut unscheduled = contest(915_002, "Unscheduled Cup", "BEFORE", vec![]);
        unscheduled.start_time_seconds = 0;
        let contests = vec![
            contest(915_001, "Dated Cup", "FINISHED", vec![problem(915_001, "A", None, &[])]),
            unscheduled,
        ];
        ContestRepository::insert_many(&pool, &contests).await.unwrap();

        let summaries = ContestRepository::summaries(&pool).await.unwrap();
        let dated = summaries.iter().find(|s| s.id == 915_001).unwrap();
        assert_eq!(dated.problem_count, 1);
        assert_eq!(dated.date, DateTime::from_timestamp(1_700_000_000 + 915_001, 0));

        let undated = summaries.iter().find(|s| s.id == 915_002).unwrap();
        assert_eq!(undated.date, None);
    }
}
