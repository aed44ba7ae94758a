//! HTTP client for the Codeforces API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{
    CodeforcesApi, UpstreamError,
    types::{CfContest, CfSubmission, CfUser, ProblemsetResult, StandingsResult, parse_response},
};
use crate::config::CodeforcesConfig;

/// reqwest-backed [`CodeforcesApi`]
pub struct CodeforcesClient {
    base_url: String,
    client: Client,
    problemset_timeout: Duration,
}

impl CodeforcesClient {
    pub fn new(config: &CodeforcesConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .gzip(true)
            .timeout(config.timeout)
            .user_agent(concat!("cfladder/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
            problemset_timeout: config.problemset_timeout,
        })
    }

    /// Call `method` and unwrap the envelope
    ///
    /// FAILED answers come back with a 4xx status, so the body is parsed
    /// before the status is looked at.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, String)],
        timeout: Option<Duration>,
    ) -> Result<T, UpstreamError> {
        let url = format!("{}/{}", self.base_url, method);
        tracing::debug!(method, ?query, "Calling Codeforces API");

        let mut request = self.client.get(&url).query(query);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        let body = response.bytes().await.map_err(classify)?;

        match parse_response(&body) {
            Ok(result) => Ok(result),
            Err(UpstreamError::Malformed(_)) if !status.is_success() => Err(UpstreamError::Status {
                status: status.as_u16(),
            }),
            Err(e) => Err(e),
        }
    }
}

fn classify(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Http(err)
    }
}

#[async_trait]
impl CodeforcesApi for CodeforcesClient {
    async fn contest_list(&self) -> Result<Vec<CfContest>, UpstreamError> {
        let contests: Vec<CfContest> = self.call("contest.list", &[], None).await?;
        tracing::info!(count = contests.len(), "Fetched contest list");
        Ok(contests)
    }

    async fn contest_standings(&self, contest_id: i64) -> Result<StandingsResult, UpstreamError> {
        self.call(
            "contest.standings",
            &[
                ("contestId", contest_id.to_string()),
                ("from", "1".to_string()),
                ("count", "1".to_string()),
            ],
            None,
        )
        .await
    }

    async fn problemset(&self) -> Result<ProblemsetResult, UpstreamError> {
        let result: ProblemsetResult = self
            .call("problemset.problems", &[], Some(self.problemset_timeout))
            .await?;
        tracing::info!(count = result.problems.len(), "Fetched problemset");
        Ok(result)
    }

    async fn user_status(&self, handle: &str) -> Result<Vec<CfSubmission>, UpstreamError> {
        self.call("user.status", &[("handle", handle.to_string())], None)
            .await
    }

    async fn user_info(&self, handle: &str) -> Result<CfUser, UpstreamError> {
        let users: Vec<CfUser> = self
            .call("user.info", &[("handles", handle.to_string())], None)
            .await?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::NotFound(format!("User {} not found", handle)))
    }
}
