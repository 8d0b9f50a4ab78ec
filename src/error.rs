//! Error types for OnApp API operations.

use thiserror::Error;

/// Errors that can occur during OnApp API operations.
#[derive(Debug, Error)]
pub enum OnAppError {
    /// Configuration is missing or incomplete.
    #[error("OnApp configuration required: {0}")]
    ConfigMissing(String),

    /// Invalid identifier or argument supplied by the caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Entity not found.
    #[error("{entity_type} '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The credentials were rejected.
    #[error("OnApp rejected the credentials (HTTP {status_code})")]
    Unauthorized { status_code: u16 },

    /// The API refused the request body (HTTP 422).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// API request failed.
    #[error("OnApp API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// A response body was not wrapped in the expected envelope key.
    #[error("Expected '{expected}' envelope in response")]
    Envelope { expected: &'static str },

    /// A transaction finished without completing.
    #[error("Transaction {id} ({action}) finished with status '{status}'")]
    TransactionFailed {
        id: u64,
        action: String,
        status: String,
    },

    /// Polling gave up before the operation finished.
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },
}

impl OnAppError {
    /// Returns the HTTP status code carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Unauthorized { status_code } => Some(*status_code),
            Self::Validation(_) => Some(422),
            Self::ApiError { status_code, .. } => *status_code,
            Self::RateLimited { .. } => Some(429),
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether this error means the requested entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for OnApp operations.
pub type Result<T> = core::result::Result<T, OnAppError>;
