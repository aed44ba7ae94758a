//! Problemset service

use crate::{
    error::AppResult,
    handlers::problems::response::{RefreshProblemsResponse, TagCountsResponse},
    models::{MergedProblem, tag_counts},
    state::AppState,
};

/// Problemset service over the shared cache
pub struct ProblemService;

impl ProblemService {
    /// Rated problems, or everything when `all`
    pub fn select(problems: &[MergedProblem], all: bool) -> Vec<&MergedProblem> {
        problems.iter().filter(|p| all || p.is_rated()).collect()
    }

    /// Refetch the problemset unconditionally
    pub async fn refresh(state: &AppState) -> AppResult<RefreshProblemsResponse> {
        let problems = state.problems().refresh().await?;
        tracing::info!(count = problems.len(), "Problemset force-refreshed");

        Ok(RefreshProblemsResponse {
            ok: true,
            count: problems.len(),
        })
    }

    /// Tag counts over the rated part of the cached problemset
    pub async fn tag_counts(state: &AppState) -> AppResult<TagCountsResponse> {
        let read = state.problems().get().await?;
        let rated = Self::select(&read.problems, false);

        Ok(TagCountsResponse {
            success: true,
            total: rated.len(),
            tags: tag_counts(rated),
        })
    }
}
