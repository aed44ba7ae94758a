//! Rating ladder service

use std::collections::BTreeSet;

use crate::{
    constants::DEFAULT_LADDER_PER_PAGE,
    db::repositories::ProgressRepository,
    error::{AppError, AppResult},
    handlers::ladder::{
        request::{LadderQuery, LadderSort},
        response::{LadderEntry, LadderResponse},
    },
    models::{MergedProblem, SolvedKey, tag_counts},
    state::AppState,
    utils::{normalize_handle, validate_ladder_rating},
};

/// Ladder parameters after validation and defaults
#[derive(Debug, Clone)]
pub struct LadderParams {
    pub rating: i32,
    pub tag: Option<String>,
    pub sort: LadderSort,
    pub hide_solved: bool,
    pub page: usize,
    pub per_page: usize,
}

/// Rating ladder service
pub struct LadderService;

impl LadderService {
    pub async fn ladder(state: &AppState, query: LadderQuery) -> AppResult<LadderResponse> {
        validate_ladder_rating(query.rating).map_err(|e| AppError::Validation(e.to_string()))?;

        let solved = match query.handle.as_deref() {
            Some(handle) => {
                let handle = normalize_handle(handle).map_err(|e| AppError::Validation(e.to_string()))?;
                let mut redis = state.redis();
                ProgressRepository::solved(&mut redis, &handle).await?
            }
            None => BTreeSet::new(),
        };

        let params = LadderParams {
            rating: query.rating,
            tag: query.tag.filter(|t| !t.trim().is_empty()),
            sort: query.sort.unwrap_or_default(),
            hide_solved: query.hide_solved.unwrap_or(false),
            page: query.page.unwrap_or(1),
            per_page: query.per_page.unwrap_or(DEFAULT_LADDER_PER_PAGE),
        };

        let read = state.problems().get().await?;
        Ok(build_ladder(&read.problems, &solved, &params))
    }
}

/// Filter, sort and paginate the problemset for one ladder rung
///
/// The page is clamped into `1..=total_pages`; an empty rung has one empty page.
pub fn build_ladder(problems: &[MergedProblem], solved: &BTreeSet<SolvedKey>, params: &LadderParams) -> LadderResponse {
    let is_solved = |p: &MergedProblem| p.key().is_some_and(|k| solved.contains(&k));

    let at_rating: Vec<&MergedProblem> = problems
        .iter()
        .filter(|p| p.rating == Some(params.rating))
        .collect();
    let counts = tag_counts(at_rating.iter().copied());

    let mut selected: Vec<&MergedProblem> = at_rating
        .into_iter()
        .filter(|p| params.tag.as_ref().is_none_or(|tag| p.tags.contains(tag)))
        .filter(|p| !params.hide_solved || !is_solved(p))
        .collect();

    match params.sort {
        LadderSort::New => selected.sort_by(|a, b| b.contest_id.unwrap_or(0).cmp(&a.contest_id.unwrap_or(0))),
        LadderSort::Old => selected.sort_by(|a, b| a.contest_id.unwrap_or(0).cmp(&b.contest_id.unwrap_or(0))),
        LadderSort::Acceptance => selected.sort_by(|a, b| b.solved_count.cmp(&a.solved_count)),
    }

    let per_page = params.per_page.max(1);
    let total = selected.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = params.page.clamp(1, total_pages);

    let entries = selected
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .map(|p| LadderEntry {
            solved: is_solved(p),
            problem: p.clone(),
        })
        .collect();

    LadderResponse {
        success: true,
        rating: params.rating,
        tag: params.tag.clone(),
        sort: params.sort,
        page,
        per_page,
        total,
        total_pages,
        tag_counts: counts,
        problems: entries,
    }
}
