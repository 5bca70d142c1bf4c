//! Error types for the Asgardeo SDK

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for Asgardeo SDK operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the Asgardeo SDK
#[derive(Error, Debug)]
pub enum Error {
    /// Client configuration is missing or invalid. Raised before any request is sent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Response payload could not be decoded into the expected model
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Resource not found (404, or a lookup with zero matches)
    #[error("Not found: {0}")]
    NotFound(String),

    /// A lookup by a key expected to be unique matched more than one resource
    #[error("Ambiguous result: {matches} {resource} resources match {key}")]
    Ambiguous {
        resource: &'static str,
        key: String,
        matches: usize,
    },

    /// The request context was cancelled
    #[error("Request cancelled")]
    Canceled,

    /// The request context deadline or the client timeout elapsed
    #[error("Request timed out")]
    Timeout,

    /// Authentication failed (401 or token endpoint failure)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Caller supplied arguments the API cannot accept
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network or HTTP-layer failure
    #[error("Transport error{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<StatusCode>,
        message: String,
    },
}

fn status_suffix(status: &Option<StatusCode>) -> String {
    match status {
        Some(status) => format!(" (HTTP {})", status.as_u16()),
        None => String::new(),
    }
}

impl Error {
    /// Create an error from an HTTP status code and response body
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status.as_u16() {
            401 => Error::Authentication(message),
            404 => Error::NotFound(message),
            _ => Error::Transport {
                status: Some(status),
                message,
            },
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Transport { status, .. } => *status,
            Error::NotFound(_) => Some(StatusCode::NOT_FOUND),
            Error::Authentication(_) => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// Check if a caller-side retry could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout => true,
            Error::Transport { status: None, .. } => true,
            Error::Transport {
                status: Some(status),
                ..
            } => *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Error::Timeout;
        }
        Error::Transport {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(DecodeError::Json(err))
    }
}

/// Failure to decode a response payload.
///
/// `path` is a JSON path relative to the response root, e.g. `data.steps[1].options[0].idp`.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("missing field `{path}`")]
    MissingField { path: String },

    #[error("field `{path}` has wrong type: expected {expected}, found {found}")]
    InvalidType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field `{path}` has unknown value `{value}`")]
    UnknownVariant { path: String, value: String },

    #[error("missing response header `{0}`")]
    MissingHeader(&'static str),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
