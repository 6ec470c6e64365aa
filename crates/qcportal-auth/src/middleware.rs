//! Navigation gate middleware and session extractor.
//!
//! The gate runs on every page navigation, reads the session cookie, and
//! applies the routing rules from [`crate::gate`]. Requests that are allowed
//! through carry a [`SessionContext`] extension so handlers can read the
//! decoded claims without touching the cookie again.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware, routing::get};
//! use qcportal_auth::middleware::{CurrentSession, GateState, session_gate};
//!
//! async fn whoami(CurrentSession(session): CurrentSession) -> String {
//!     session.subject().to_string()
//! }
//!
//! let app = Router::new()
//!     .route("/api/auth/session", get(whoami))
//!     .layer(middleware::from_fn_with_state(gate_state.clone(), session_gate))
//!     .with_state(gate_state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header::COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::claims::SessionClaims;
use crate::cookie::CookieConfig;
use crate::error::AuthError;
use crate::gate::{self, GateDecision, PathClass};
use crate::role::Role;
use crate::token::{TokenError, TokenService};

/// State required by the navigation gate and the session extractor.
///
/// Include this in your application state and expose it via `FromRef`.
#[derive(Clone)]
pub struct GateState {
    /// Verifies and decodes session tokens.
    pub tokens: Arc<TokenService>,
    /// Cookie settings, including the cookie name to read.
    pub cookie: CookieConfig,
}

impl GateState {
    /// Creates gate state from a token service and cookie settings.
    #[must_use]
    pub fn new(tokens: Arc<TokenService>, cookie: CookieConfig) -> Self {
        Self { tokens, cookie }
    }
}

/// Decoded session attached to allowed requests.
///
/// Cloning is cheap: the claims are behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SessionContext {
    claims: Arc<SessionClaims>,
}

impl SessionContext {
    /// Wraps decoded claims for request extensions.
    #[must_use]
    pub fn new(claims: SessionClaims) -> Self {
        Self {
            claims: Arc::new(claims),
        }
    }

    /// The decoded session claims.
    #[must_use]
    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }

    /// The subject (user identifier) of the session.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    /// The session role, if the stored tag is recognized.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.claims.parsed_role()
    }
}

/// Axum middleware that guards page navigations.
///
/// Behavior per request:
/// 1. API, asset, and favicon requests pass through untouched.
/// 2. The session cookie is read and decoded. Any decode failure is treated
///    the same as an absent cookie.
/// 3. [`gate::decide`] picks the outcome: either the request continues (with
///    a [`SessionContext`] extension when a valid session exists) or the
///    client is redirected.
///
/// The gate never returns an error response. Unauthenticated traffic is
/// redirected, not rejected.
pub async fn session_gate(
    State(state): State<GateState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    if gate::classify(&path) == PathClass::Excluded {
        return next.run(request).await;
    }

    let claims = extract_cookie_token(request.headers(), &state.cookie.name).and_then(|token| {
        match state.tokens.decode(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!(error = %e, path = %path, "Session token rejected");
                None
            }
        }
    });

    match gate::decide(&path, claims.as_ref()) {
        GateDecision::Continue => {
            if let Some(claims) = claims {
                request.extensions_mut().insert(SessionContext::new(claims));
            }
            next.run(request).await
        }
        GateDecision::Redirect(target) => {
            tracing::debug!(path = %path, target = %target, "Navigation redirected");
            Redirect::temporary(target).into_response()
        }
    }
}

/// Axum extractor for the current session.
///
/// Handlers behind the gate get the already-decoded [`SessionContext`] from
/// the request extensions. API handlers, which the gate skips, fall back to
/// reading and decoding the session cookie directly.
///
/// # Errors
///
/// Returns `AuthError` (which implements `IntoResponse`) if no session
/// cookie is present or the token fails decoding.
#[derive(Debug)]
pub struct CurrentSession(pub SessionContext);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    GateState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // The navigation gate may already have decoded the token.
        if let Some(session) = parts.extensions.get::<SessionContext>() {
            return Ok(CurrentSession(session.clone()));
        }

        let gate_state = GateState::from_ref(state);

        let token = extract_cookie_token(&parts.headers, &gate_state.cookie.name)
            .ok_or(AuthError::MissingCredential)?;

        let claims = gate_state.tokens.decode(&token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode session token");
            match e {
                TokenError::Expired => AuthError::CredentialExpired,
                other => AuthError::invalid_credential(other.to_string()),
            }
        })?;

        Ok(CurrentSession(SessionContext::new(claims)))
    }
}

/// Extracts the session token from the `Cookie` header.
///
/// Parses the simple `key=value; key=value` format and returns the value of
/// the named cookie, skipping empty values.
fn extract_cookie_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let cookie_header = headers.get(COOKIE)?.to_str().ok()?;

    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=')
            && name.trim() == cookie_name
        {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}
