//! Overpass client errors
//!
//! `OverpassError` is `Clone` because a single upstream failure is handed to
//! every caller sharing a coalesced in-flight request.

use thiserror::Error;

/// Errors from the Overpass street geometry fetcher
#[derive(Debug, Clone, Error)]
pub enum OverpassError {
    /// Connection to the Overpass API failed
    #[error("Overpass connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the Overpass API failed
    #[error("Overpass request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse the Overpass response
    #[error("Overpass parse error: {0}")]
    ParseError(String),

    /// Overpass instance is temporarily unavailable
    #[error("Overpass service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Overpass rate limit exceeded
    #[error("Overpass rate limit exceeded")]
    RateLimitExceeded,

    /// Request timed out
    #[error("Overpass request timed out")]
    Timeout,
}

impl OverpassError {
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
