//! Per-user progress repository (Redis)

use std::collections::BTreeSet;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::{
    constants::redis_keys,
    error::{AppError, AppResult},
    models::{AttemptedProblem, SolvedKey, UserInfo},
};

/// Repository for solved sets and profile snapshots
pub struct ProgressRepository;

impl ProgressRepository {
    /// Stored solved keys for a handle, empty when unknown
    pub async fn solved(redis: &mut ConnectionManager, handle: &str) -> AppResult<BTreeSet<SolvedKey>> {
        let members: Vec<String> = redis.smembers(redis_keys::solved(handle)).await?;
        Ok(members.into_iter().map(SolvedKey::from).collect())
    }

    /// Add keys to the solved set; returns how many were new
    pub async fn add_solved<'a>(
        redis: &mut ConnectionManager,
        handle: &str,
        keys: impl IntoIterator<Item = &'a SolvedKey>,
    ) -> AppResult<usize> {
        let members: Vec<&str> = keys.into_iter().map(SolvedKey::as_str).collect();
        if members.is_empty() {
            return Ok(0);
        }

        let added: usize = redis.sadd(redis_keys::solved(handle), members).await?;
        Ok(added)
    }

    /// Stored profile snapshot
    pub async fn info(redis: &mut ConnectionManager, handle: &str) -> AppResult<Option<UserInfo>> {
        let raw: Option<String> = redis.get(redis_keys::info(handle)).await?;

        raw.map(|raw| {
            serde_json::from_str(&raw)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt profile snapshot: {}", e)))
        })
        .transpose()
    }

    /// Replace the profile snapshot, expiring after `ttl_secs`
    pub async fn set_info(
        redis: &mut ConnectionManager,
        handle: &str,
        info: &UserInfo,
        ttl_secs: u64,
    ) -> AppResult<()> {
        let raw = serde_json::to_string(info).map_err(|e| AppError::Internal(e.into()))?;
        redis
            .set_ex::<_, _, ()>(redis_keys::info(handle), raw, ttl_secs)
            .await?;
        Ok(())
    }

    /// Stored attempted-but-unsolved list, empty when unknown
    pub async fn attempted(redis: &mut ConnectionManager, handle: &str) -> AppResult<Vec<AttemptedProblem>> {
        let raw: Option<String> = redis.get(redis_keys::attempted(handle)).await?;

        match raw {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt attempted list: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the attempted-but-unsolved list
    pub async fn set_attempted(
        redis: &mut ConnectionManager,
        handle: &str,
        attempted: &[AttemptedProblem],
    ) -> AppResult<()> {
        let raw = serde_json::to_string(attempted).map_err(|e| AppError::Internal(e.into()))?;
        redis.set::<_, _, ()>(redis_keys::attempted(handle), raw).await?;
        Ok(())
    }

    /// Forget everything stored for a handle; returns whether anything existed
    pub async fn clear(redis: &mut ConnectionManager, handle: &str) -> AppResult<bool> {
        let removed: usize = redis
            .del(vec![
                redis_keys::solved(handle),
                redis_keys::info(handle),
                redis_keys::attempted(handle),
            ])
            .await?;
        Ok(removed > 0)
    }
}
