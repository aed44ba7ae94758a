//! Ladder request DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::MAX_LADDER_PER_PAGE;

/// Ladder ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LadderSort {
    /// Highest contest id first
    #[default]
    New,
    /// Lowest contest id first
    Old,
    /// Most solved first
    Acceptance,
}

/// Query parameters for the ladder
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LadderQuery {
    pub rating: i32,

    /// Only problems carrying this tag
    pub tag: Option<String>,

    pub sort: Option<LadderSort>,

    /// Drop problems the handle has solved
    pub hide_solved: Option<bool>,

    #[validate(length(min = 1))]
    pub handle: Option<String>,

    #[validate(range(min = 1))]
    pub page: Option<usize>,

    #[validate(range(min = 1, max = MAX_LADDER_PER_PAGE))]
    pub per_page: Option<usize>,
}
