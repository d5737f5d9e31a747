// Error types for the search proxy.
// Covers request validation, upstream GitHub failures, and cache errors.

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("unsupported github api version: {0}")]
    UnsupportedApiVersion(String),

    #[error("{0} parameter is not supported")]
    UnsupportedParameter(String),

    #[error("{value} sorting is not supported [{allowed}] allowed")]
    UnsupportedSort { value: String, allowed: String },

    #[error("parameter limit {value} is exceeding max limit of {max}")]
    InvalidLimit { value: i64, max: u32 },

    #[error("page parameter {0} must be greater than 0")]
    InvalidPage(i64),

    #[error("invalid {0} parameter")]
    MalformedParameter(String),

    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("{0}")]
    Other(String),
}

impl ProxyError {
    /// Whether this error comes from rejecting client input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ProxyError::UnsupportedParameter(_)
                | ProxyError::UnsupportedSort { .. }
                | ProxyError::InvalidLimit { .. }
                | ProxyError::InvalidPage(_)
                | ProxyError::MalformedParameter(_)
        )
    }

    /// HTTP status reported to clients for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::UnsupportedApiVersion(_) => StatusCode::SERVICE_UNAVAILABLE,
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
