//! Contest request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::{MAX_CONTEST_LIST_LIMIT, MAX_PROBLEM_SEARCH_LIMIT};

/// Query parameters for listing contests
#[derive(Debug, Deserialize, Validate)]
pub struct ListContestsQuery {
    /// Upstream phase, e.g. FINISHED
    pub phase: Option<String>,

    /// Case-insensitive substring of the contest name
    pub search: Option<String>,

    #[validate(range(min = 1, max = MAX_CONTEST_LIST_LIMIT))]
    pub limit: Option<i64>,

    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}

/// Query parameters for the category breakdown
#[derive(Debug, Deserialize, Validate)]
pub struct ByCategoryQuery {
    /// Cap on contests returned per bucket
    #[validate(range(min = 1))]
    pub limit: Option<usize>,
}

/// Query parameters for the cross-contest problem search
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSearchQuery {
    #[validate(range(min = 0))]
    pub min_rating: Option<i32>,

    #[validate(range(min = 0))]
    pub max_rating: Option<i32>,

    /// Comma-separated tags; a problem matches when it carries any of them
    pub tags: Option<String>,

    #[validate(range(min = 1, max = MAX_PROBLEM_SEARCH_LIMIT))]
    pub limit: Option<i64>,
}

impl ProblemSearchQuery {
    /// Split `tags` on commas, dropping blanks
    pub fn tag_list(&self) -> Option<Vec<String>> {
        let tags: Vec<String> = self
            .tags
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        if tags.is_empty() { None } else { Some(tags) }
    }
}
