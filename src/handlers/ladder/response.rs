//! Ladder response DTOs

use std::collections::BTreeMap;

use serde::Serialize;

use super::request::LadderSort;
use crate::models::MergedProblem;

/// One ladder row
#[derive(Debug, Clone, Serialize)]
pub struct LadderEntry {
    #[serde(flatten)]
    pub problem: MergedProblem,
    pub solved: bool,
}

/// A page of the ladder for one rating
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderResponse {
    pub success: bool,
    pub rating: i32,
    pub tag: Option<String>,
    pub sort: LadderSort,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    /// Tag -> problem count at this rating, before the tag filter
    pub tag_counts: BTreeMap<String, usize>,
    pub problems: Vec<LadderEntry>,
}
