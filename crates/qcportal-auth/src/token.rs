//! Session token signing and verification.
//!
//! The portal signs session credentials with HMAC-SHA-256 over a single
//! shared secret. Verification failures are deliberately fine-grained here
//! (expired vs. bad signature vs. malformed); the route gate collapses all of
//! them to "no credential", but the session API and logs want the detail.
//!
//! # Example
//!
//! ```ignore
//! use qcportal_auth::token::TokenService;
//! use qcportal_auth::claims::SessionClaims;
//!
//! let service = TokenService::new("a-shared-secret-of-decent-length");
//! let claims = SessionClaims::builder("op-17", "inspector").build();
//!
//! let token = service.encode(&claims)?;
//! let decoded = service.decode(&token)?;
//! assert_eq!(decoded.sub, "op-17");
//! ```

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::claims::SessionClaims;

/// Errors that can occur during token operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature does not match the shared secret.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token is structurally invalid (not a JWT, bad base64, bad JSON).
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the shape problem.
        message: String,
    },
}

impl TokenError {
    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Returns `true` for verification failures, the cases the gate treats
    /// as an absent credential.
    #[must_use]
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::Expired | Self::InvalidSignature | Self::Malformed { .. }
        )
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            _ => Self::malformed(err.to_string()),
        }
    }
}

/// Service for signing and verifying session tokens.
///
/// Thread-safe and cheap to share behind an `Arc`.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Creates a token service over the given shared secret.
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Signs the claims into a compact JWT string.
    ///
    /// # Errors
    /// Returns an error if serialization of the claims fails.
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::encoding(e.to_string()))
    }

    /// Verifies the signature and expiry, returning the decoded claims.
    ///
    /// # Errors
    /// Returns [`TokenError::Expired`], [`TokenError::InvalidSignature`] or
    /// [`TokenError::Malformed`] depending on what failed.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::from)
    }
}
