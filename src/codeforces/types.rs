//! Wire types of the Codeforces API
//!
//! Every response is an envelope `{"status": "OK", "result": ...}` or
//! `{"status": "FAILED", "comment": ...}`. It is parsed into [`ApiResponse`]
//! and turned into a `Result` before anything else looks at it.

use serde::{Deserialize, Serialize};

use super::UpstreamError;

/// Response envelope
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum ApiResponse<T> {
    Ok {
        result: T,
    },
    Failed {
        #[serde(default)]
        comment: String,
    },
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> Result<T, UpstreamError> {
        match self {
            Self::Ok { result } => Ok(result),
            Self::Failed { comment } => Err(UpstreamError::from_comment(comment)),
        }
    }
}

/// Parse a raw body into the envelope's result
pub fn parse_response<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, UpstreamError> {
    serde_json::from_slice::<ApiResponse<T>>(body)?.into_result()
}

/// Contest phase as reported upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContestPhase {
    Before,
    Coding,
    PendingSystemTest,
    SystemTest,
    Finished,
}

impl ContestPhase {
    pub fn as_str(&self) -> &'static str {
        use crate::constants::phases;
        match self {
            Self::Before => phases::BEFORE,
            Self::Coding => phases::CODING,
            Self::PendingSystemTest => phases::PENDING_SYSTEM_TEST,
            Self::SystemTest => phases::SYSTEM_TEST,
            Self::Finished => phases::FINISHED,
        }
    }
}

impl std::str::FromStr for ContestPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BEFORE" => Ok(Self::Before),
            "CODING" => Ok(Self::Coding),
            "PENDING_SYSTEM_TEST" => Ok(Self::PendingSystemTest),
            "SYSTEM_TEST" => Ok(Self::SystemTest),
            "FINISHED" => Ok(Self::Finished),
            other => Err(format!("unknown contest phase '{}'", other)),
        }
    }
}

impl std::fmt::Display for ContestPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `contest.list` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfContest {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub contest_type: String,
    pub phase: ContestPhase,
    #[serde(default)]
    pub frozen: bool,
    pub duration_seconds: i64,
    pub start_time_seconds: Option<i64>,
    pub relative_time_seconds: Option<i64>,
    pub prepared_by: Option<String>,
    pub website_url: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<i32>,
    pub kind: Option<String>,
    pub icpc_region: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub season: Option<String>,
}

/// Problem as returned by `contest.standings` and `problemset.problems`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfProblem {
    pub contest_id: Option<i64>,
    pub problemset_name: Option<String>,
    pub index: String,
    pub name: String,
    #[serde(rename = "type", default = "default_problem_type")]
    pub problem_type: String,
    pub points: Option<f64>,
    pub rating: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_problem_type() -> String {
    "PROGRAMMING".to_string()
}

/// `problemset.problems` statistics entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfProblemStatistics {
    pub contest_id: Option<i64>,
    pub index: String,
    #[serde(default)]
    pub solved_count: i64,
    /// Not always present upstream; treated as zero when missing
    #[serde(default)]
    pub attempt_count: Option<i64>,
}

/// `problemset.problems` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemsetResult {
    #[serde(default)]
    pub problems: Vec<CfProblem>,
    #[serde(default)]
    pub problem_statistics: Vec<CfProblemStatistics>,
}

/// `contest.standings` result (rows are ignored)
#[derive(Debug, Clone, Deserialize)]
pub struct StandingsResult {
    pub contest: CfContest,
    #[serde(default)]
    pub problems: Vec<CfProblem>,
}

/// `user.status` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfSubmission {
    pub id: i64,
    pub contest_id: Option<i64>,
    pub problem: CfProblem,
    pub verdict: Option<String>,
    #[serde(default)]
    pub creation_time_seconds: i64,
}

/// `user.info` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfUser {
    pub handle: String,
    pub rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub rank: Option<String>,
    pub max_rank: Option<String>,
    pub title_photo: Option<String>,
}
