//! # qcportal-auth
//!
//! Session authentication and route authorization for the QC portal.
//!
//! This crate provides:
//! - JWT session token encoding and validation
//! - Session cookie construction and parsing
//! - Role parsing and per-role landing pages
//! - The navigation gate: a pure routing decision plus Axum middleware
//!
//! ## Overview
//!
//! The portal keeps its session in a signed cookie. Every page navigation
//! passes through the gate, which reads the cookie, decodes the token, and
//! either lets the request continue or redirects the browser. Invalid tokens
//! are treated exactly like absent ones; the gate never errors out.
//!
//! ## Modules
//!
//! - [`claims`] - Session claims and their builder
//! - [`cookie`] - Session cookie configuration
//! - [`error`] - Authentication error type
//! - [`gate`] - Path classification and the routing decision table
//! - [`middleware`] - Axum middleware and session extractor
//! - [`role`] - Portal roles and their landing pages
//! - [`token`] - JWT encoding/decoding service

pub mod claims;
pub mod cookie;
pub mod error;
pub mod gate;
pub mod middleware;
pub mod role;
pub mod token;

pub use claims::{SessionClaims, SessionClaimsBuilder};
pub use cookie::CookieConfig;
pub use error::AuthError;
pub use gate::{
    DEFAULT_ROLE_HOME, FORBIDDEN_PATH, GateDecision, LOGIN_PATH, PathClass, classify, decide,
    role_home,
};
pub use middleware::{CurrentSession, GateState, SessionContext, session_gate};
pub use role::Role;
pub use token::{TokenError, TokenService};

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use qcportal_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::claims::{SessionClaims, SessionClaimsBuilder};
    pub use crate::cookie::CookieConfig;
    pub use crate::error::AuthError;
    pub use crate::gate::{GateDecision, PathClass, classify, decide, role_home};
    pub use crate::middleware::{CurrentSession, GateState, SessionContext, session_gate};
    pub use crate::role::Role;
    pub use crate::token::{TokenError, TokenService};
}
