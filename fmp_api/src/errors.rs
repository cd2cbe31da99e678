//! Error types for the API client.

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request never produced a response (connect failure, timeout, body read).
    #[error("Request failed: {0}")]
    RequestFailed(String),
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The provider answered 2xx but flagged an application-level error.
    #[error("Provider error: {0}")]
    Provider(String),
    /// The response body was not valid JSON.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl Error {
    /// True for failures worth another attempt: no response at all, or a non-2xx status.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::RequestFailed(_) | Self::HttpStatus { .. })
    }
}
