//! Problemset response DTOs

use std::collections::BTreeMap;

use serde::Serialize;

/// Force refresh response
#[derive(Debug, Serialize)]
pub struct RefreshProblemsResponse {
    pub ok: bool,
    pub count: usize,
}

/// Tag counts over the rated problemset
#[derive(Debug, Serialize)]
pub struct TagCountsResponse {
    pub success: bool,
    pub total: usize,
    pub tags: BTreeMap<String, usize>,
}
