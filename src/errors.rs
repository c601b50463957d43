use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Convenience alias for fallible SDK results.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error for any transport failure or non-2xx response.
///
/// Callers are not expected to distinguish network failures from remote
/// 4xx/5xx outcomes beyond this single kind; `status` and `message` carry
/// whatever detail the failure produced.
#[derive(Debug)]
pub struct RequestError {
    /// HTTP status code, when the request reached the server.
    pub status: Option<u16>,
    pub message: String,
    /// Underlying transport error, when one exists.
    pub source: Option<reqwest::Error>,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self {
            status: None,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "request failed ({}): {}", status, self.message),
            None => write!(f, "request failed: {}", self.message),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// Unified error type surfaced by the SDK.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Request(#[from] RequestError),

    /// A required parameter was absent, e.g. no session id in existing mode.
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    /// The (resource, operation) pair does not name a known action.
    #[error("unsupported operation: {resource}.{operation}")]
    UnsupportedOperation { resource: String, operation: String },

    /// Client-side abort of a chat completion call.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
