//! ClickHouse transport error types

use thiserror::Error;

/// Errors that can occur when talking to ClickHouse over HTTP
#[derive(Error, Debug)]
pub enum ClickHouseError {
    /// Server could not be reached
    #[error("ClickHouse unavailable")]
    Unavailable,

    /// Request failed for another transport reason
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("ClickHouse error {status}: {message}")]
    Api { status: u16, message: String },

    /// Query exceeded the configured timeout
    #[error("Query timeout")]
    Timeout,

    /// HTTP client could not be built
    #[error("Client error: {0}")]
    Client(String),
}

impl ClickHouseError {
    /// Classify a reqwest error the same way for every call site
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClickHouseError::Timeout
        } else if err.is_connect() {
            ClickHouseError::Unavailable
        } else {
            ClickHouseError::Request(err)
        }
    }
}

/// Result type alias for ClickHouse operations
pub type ClickHouseResult<T> = Result<T, ClickHouseError>;
