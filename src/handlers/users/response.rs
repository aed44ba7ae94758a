//! User progress response DTOs

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{AttemptedProblem, SolvedKey, UserInfo};

/// Stored progress for a handle
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgressResponse {
    pub success: bool,
    pub handle: String,
    pub info: Option<UserInfo>,
    pub solved: BTreeSet<SolvedKey>,
    pub solved_count: usize,
    /// Rated problems in the problemset not yet solved
    pub unsolved_count: Option<usize>,
    /// Keys added by this request
    pub newly_solved: usize,
    /// Attempted but never accepted, latest attempt first
    pub attempted_unsolved: Vec<AttemptedProblem>,
}

/// Result of forgetting a handle
#[derive(Debug, Serialize)]
pub struct ForgetProgressResponse {
    pub success: bool,
    pub handle: String,
    pub removed: bool,
}
