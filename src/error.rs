use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("feed returned HTTP {0}")]
    Status(StatusCode),

    #[error("feed too large: {0} bytes")]
    TooLarge(usize),

    #[error("failed to parse feed: {0}")]
    Parse(String),
}
