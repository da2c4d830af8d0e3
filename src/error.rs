// Error taxonomy for page resolution

use thiserror::Error;

/// Why a resolution (or one strategy of it) failed
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Missing or unparseable URL
    #[error("{0}")]
    InvalidInput(String),

    /// Network failure, timeout or non-2xx from a dependency
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// Page fetched but nothing usable in it
    #[error("{0}")]
    ParseFailure(String),

    /// Every strategy failed; carries one message per attempt
    #[error("Could not extract Facebook page information from any method. Errors: {}", .0.join("; "))]
    AllStrategiesExhausted(Vec<String>),
}

impl ResolveError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseFailure(msg.into())
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs may carry credentials in the query string
        let err = err.without_url();
        if err.is_timeout() {
            Self::UpstreamUnavailable(format!("request timed out: {}", err))
        } else {
            Self::UpstreamUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseFailure(format!("invalid JSON: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
