use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single upstream attempt. None of these reach the HTTP caller.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response contained no text")]
    EmptyReply,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("all {tried} candidate models failed")]
    Exhausted { tried: usize },

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn status(status: StatusCode, body: &str) -> Self {
        ApiError::Status {
            status,
            body: body.chars().take(500).collect(),
        }
    }
}
