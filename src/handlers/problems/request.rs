//! Problemset request DTOs

use serde::Deserialize;

/// Query parameters for the problemset
#[derive(Debug, Default, Deserialize)]
pub struct ListProblemsQuery {
    /// Include problems without a rating
    #[serde(default)]
    pub all: bool,
}
