//! Error types for request execution.

use reqwest::StatusCode;
use serde_json::Value;

/// Errors that can occur while building or executing a request.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be assembled into a valid HTTP request.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what is wrong with the request.
        message: String,
    },

    /// The request failed below the HTTP layer (connect, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Upstream returned {status}: {message}")]
    Status {
        /// HTTP status code of the response.
        status: u16,
        /// Error message extracted from the response body, or the status
        /// reason phrase when the body carries none.
        message: String,
    },

    /// The response body could not be decoded as JSON.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },
}

impl ClientError {
    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Builds a `Status` error from a response status and raw body.
    ///
    /// Looks for a JSON `{"message": "..."}` shape in the body and falls back
    /// to the status reason phrase.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .as_ref()
            .and_then(|value| value.get("message"))
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

        Self::Status {
            status: status.as_u16(),
            message,
        }
    }

    /// HTTP status carried by this error, if it came from an HTTP response.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for failures below the HTTP layer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Type alias for request execution results.
pub type ClientResult<T> = Result<T, ClientError>;
