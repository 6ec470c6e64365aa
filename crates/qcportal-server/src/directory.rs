//! User directory abstraction for login.
//!
//! The portal does not keep its own user table. Credentials are verified
//! against the upstream QC service, behind the [`Directory`] trait so tests
//! can substitute a canned implementation.

use std::sync::Arc;

use async_trait::async_trait;
use qcportal_auth::{AuthError, AuthResult};
use qcportal_client::{ApiClient, ClientError};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A user as the upstream QC service reports it after authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalUser {
    /// Login name, used as the session subject.
    pub username: String,
    /// Role tag, stored verbatim in the session token.
    pub role: String,
    /// Production area the user is assigned to, if any.
    #[serde(rename = "areaId", skip_serializing_if = "Option::is_none", default)]
    pub area_id: Option<String>,
    /// Display name of the assigned area.
    #[serde(rename = "areaName", skip_serializing_if = "Option::is_none", default)]
    pub area_name: Option<String>,
}

/// Verifies username/password pairs.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Checks the pair and returns the matching user.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` when the pair is rejected and
    /// `DirectoryUnavailable` when the directory cannot be reached or
    /// answers with something unusable.
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult<PortalUser>;
}

/// Directory backed by the upstream QC service's login endpoint.
pub struct UpstreamDirectory {
    api: Arc<ApiClient>,
}

impl UpstreamDirectory {
    /// Creates a directory that posts credentials to `/auth/login` on the
    /// given client's base URL.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Directory for UpstreamDirectory {
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult<PortalUser> {
        let response = self
            .api
            .post(
                "/auth/login",
                json!({"username": username, "password": password}),
            )
            .await
            .map_err(|e| match &e {
                ClientError::Status { status, message } if *status == 401 || *status == 403 => {
                    AuthError::invalid_credentials(message.clone())
                }
                _ => {
                    tracing::warn!(error = %e, "Directory call failed");
                    AuthError::directory_unavailable(e.to_string())
                }
            })?;

        response
            .json::<PortalUser>()
            .map_err(|e| AuthError::directory_unavailable(format!("unexpected login payload: {e}")))
    }
}
