//! Provider client errors

use application::ApplicationError;
use thiserror::Error;

/// Errors from a single upstream weather provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection to the provider failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the provider failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse the provider's response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Provider is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Provider rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}

impl ProviderError {
    /// Map a non-success HTTP status to the matching error
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Option<Self> {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Some(Self::RateLimitExceeded);
        }
        if status.is_server_error() {
            return Some(Self::ServiceUnavailable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Some(Self::RequestFailed(format!("HTTP {status}")));
        }
        None
    }

    /// Map a reqwest transport error
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::ConnectionFailed(err.to_string())
        }
    }
}

impl From<ProviderError> for ApplicationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimitExceeded => Self::RateLimited,
            other => Self::ExternalService(other.to_string()),
        }
    }
}
