use reqwest::StatusCode;
use serde_json::Error as SerdeError;
use thiserror::Error;

/// Errors that can occur while querying the offence lookup API
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("rate limited (429): too many requests, try again later")]
    RateLimited,

    #[error("unexpected status code: {}", .0.as_u16())]
    UnexpectedStatus(StatusCode),

    #[error("post request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("decode response: {0}")]
    Decode(#[from] SerdeError),
}

impl LookupError {
    /// Rate limiting is retryable later, unlike the other kinds
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LookupError::RateLimited)
    }
}
