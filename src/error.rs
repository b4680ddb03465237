use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to retrieve pull request changes: {0}")]
    Retrieval(String),

    #[error("Reviewer backend error: {0}")]
    Backend(String),

    #[error("Failed to publish review: {0}")]
    Publish(String),

    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;
