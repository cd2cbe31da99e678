//! Error types for the library layer.

use std::fmt;

use thiserror::Error;

/// Failure of one upstream fetch after the retry policy has run its course.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Network error, timeout, or non-2xx status on every attempt.
    #[error("upstream request failed after {attempts} attempt(s): {cause}")]
    Transport {
        attempts: u32,
        #[source]
        cause: fmp_api::Error,
    },
    /// The provider answered but flagged an application-level error. Not retried.
    #[error("upstream provider error: {0}")]
    Provider(String),
    /// The body was not JSON, or lacked a field the reshaping step requires.
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

/// Errors surfaced at the query-function boundary.
///
/// Every query returns one of these instead of panicking; none of them leave
/// a cache entry behind.
#[derive(Debug)]
pub enum StratdeskError {
    /// The upstream fetch failed.
    Upstream(UpstreamError),
    /// The upstream returned an empty result set for a lookup.
    NotFound(String),
    /// User-provided input failed validation. No upstream call was made.
    InvalidInput(String),
    /// A cached payload could not be decoded.
    Cache(String),
}

impl StratdeskError {
    /// Short machine-readable tag for structured error output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Upstream(UpstreamError::Transport { .. }) => "transport",
            Self::Upstream(UpstreamError::Provider(_)) => "provider",
            Self::Upstream(UpstreamError::Malformed(_)) => "malformed",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "validation",
            Self::Cache(_) => "cache",
        }
    }
}

impl fmt::Display for StratdeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upstream(e) => write!(f, "Upstream error: {}", e),
            Self::NotFound(what) => write!(f, "Not found: {}", what),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::Cache(msg) => write!(f, "Cache error: {}", msg),
        }
    }
}

impl std::error::Error for StratdeskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Upstream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UpstreamError> for StratdeskError {
    fn from(e: UpstreamError) -> Self {
        Self::Upstream(e)
    }
}
