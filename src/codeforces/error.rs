//! Upstream API errors

/// Failure talking to the Codeforces API
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// `status: "FAILED"` with the upstream comment
    #[error("API call failed: {0}")]
    Failed(String),

    /// The API answered FAILED because the requested entity does not exist
    #[error("{0}")]
    NotFound(String),

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl UpstreamError {
    /// Classify a FAILED comment
    pub fn from_comment(comment: String) -> Self {
        if comment.to_ascii_lowercase().contains("not found") {
            Self::NotFound(comment)
        } else {
            Self::Failed(comment)
        }
    }

    /// Whether the upstream answered at the API level (as opposed to a transport failure)
    pub fn is_api_answer(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Failed(_))
    }
}
