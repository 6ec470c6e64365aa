//! Authentication and authorization error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors that can occur during session authentication operations.
///
/// The route gate itself never surfaces these: credential failures degrade to
/// "no credential" and become redirects. They are raised by the session API
/// (login, current-session lookup) and by configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No session credential was presented.
    #[error("Missing credential")]
    MissingCredential,

    /// The presented credential failed the signature or shape check.
    #[error("Invalid credential: {message}")]
    InvalidCredential {
        /// Description of why the credential is invalid.
        message: String,
    },

    /// The credential is past its expiry timestamp.
    #[error("Credential expired")]
    CredentialExpired,

    /// The supplied username/password pair was rejected.
    #[error("Invalid credentials: {message}")]
    InvalidCredentials {
        /// Description of the rejection.
        message: String,
    },

    /// The user directory could not be reached.
    #[error("Directory unavailable: {message}")]
    DirectoryUnavailable {
        /// Description of the failure.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidCredential` error.
    #[must_use]
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::InvalidCredential {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidCredentials` error.
    #[must_use]
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            message: message.into(),
        }
    }

    /// Creates a new `DirectoryUnavailable` error.
    #[must_use]
    pub fn directory_unavailable(message: impl Into<String>) -> Self {
        Self::DirectoryUnavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns `true` if the error means the caller is unauthenticated,
    /// as opposed to a server-side failure.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential
                | Self::InvalidCredential { .. }
                | Self::CredentialExpired
                | Self::InvalidCredentials { .. }
        )
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredential
            | Self::InvalidCredential { .. }
            | Self::CredentialExpired
            | Self::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            Self::DirectoryUnavailable { .. } => StatusCode::BAD_GATEWAY,
            Self::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": error_code(&self),
            "message": self.to_string(),
        });

        if status == StatusCode::UNAUTHORIZED {
            (status, [("WWW-Authenticate", "Cookie")], Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

fn error_code(error: &AuthError) -> &'static str {
    match error {
        AuthError::MissingCredential => "missing_credential",
        AuthError::InvalidCredential { .. } => "invalid_credential",
        AuthError::CredentialExpired => "credential_expired",
        AuthError::InvalidCredentials { .. } => "invalid_credentials",
        AuthError::DirectoryUnavailable { .. } => "directory_unavailable",
        AuthError::Configuration { .. } => "configuration_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::invalid_credential("bad signature");
        assert_eq!(err.to_string(), "Invalid credential: bad signature");

        let err = AuthError::MissingCredential;
        assert_eq!(err.to_string(), "Missing credential");

        let err = AuthError::configuration("secret too short");
        assert_eq!(err.to_string(), "Configuration error: secret too short");
    }

    #[test]
    fn test_is_unauthenticated() {
        assert!(AuthError::MissingCredential.is_unauthenticated());
        assert!(AuthError::CredentialExpired.is_unauthenticated());
        assert!(AuthError::invalid_credentials("nope").is_unauthenticated());
        assert!(!AuthError::configuration("bad").is_unauthenticated());
        assert!(!AuthError::directory_unavailable("down").is_unauthenticated());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::MissingCredential.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::directory_unavailable("down").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AuthError::configuration("bad").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_unauthorized_response_has_www_authenticate() {
        let response = AuthError::MissingCredential.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("WWW-Authenticate"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "missing_credential");
    }
}
