//! Error types for sentiment analysis

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalysisError {
    /// True for failures raised by the remote endpoint or the transport
    /// underneath it.
    pub fn is_upstream(&self) -> bool {
        matches!(self, AnalysisError::Upstream(_) | AnalysisError::Http(_))
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::MalformedResponse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
