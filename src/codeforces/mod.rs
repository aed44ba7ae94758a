//! Codeforces API access
//!
//! The rest of the crate talks to the upstream through [`CodeforcesApi`] so
//! the sync and cache code can be exercised against a mock.

mod client;
mod error;
pub mod types;

pub use client::CodeforcesClient;
pub use error::UpstreamError;
pub use types::{
    CfContest, CfProblem, CfProblemStatistics, CfSubmission, CfUser, ContestPhase,
    ProblemsetResult, StandingsResult,
};

use async_trait::async_trait;

/// Read-only view of the upstream API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeforcesApi: Send + Sync {
    /// `contest.list` (regular contests, no gyms)
    async fn contest_list(&self) -> Result<Vec<CfContest>, UpstreamError>;

    /// `contest.standings` limited to one row; used for the problem list
    async fn contest_standings(&self, contest_id: i64) -> Result<StandingsResult, UpstreamError>;

    /// `problemset.problems` with statistics
    async fn problemset(&self) -> Result<ProblemsetResult, UpstreamError>;

    /// `user.status` for a handle
    async fn user_status(&self, handle: &str) -> Result<Vec<CfSubmission>, UpstreamError>;

    /// `user.info` for a single handle
    async fn user_info(&self, handle: &str) -> Result<CfUser, UpstreamError>;
}
