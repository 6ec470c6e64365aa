//! Session credential claims.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::role::Role;

/// Claims carried by a portal session credential.
///
/// The role is kept as the raw tag rather than a [`Role`] so that tokens
/// with tags outside the known set still decode; the gate decides how to
/// treat those.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject identifier (the username).
    pub sub: String,

    /// Role tag, e.g. `inspector`.
    pub role: String,

    /// Production area the user is assigned to, if any.
    #[serde(rename = "areaId", skip_serializing_if = "Option::is_none", default)]
    pub area_id: Option<String>,

    /// Display name of the assigned area.
    #[serde(rename = "areaName", skip_serializing_if = "Option::is_none", default)]
    pub area_name: Option<String>,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl SessionClaims {
    /// Creates a new builder for session claims.
    #[must_use]
    pub fn builder(subject: impl Into<String>, role: impl Into<String>) -> SessionClaimsBuilder {
        SessionClaimsBuilder::new(subject, role)
    }

    /// The parsed role, or `None` when the tag is outside the known set.
    #[must_use]
    pub fn parsed_role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    /// Returns `true` if `exp` is in the past.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.exp < OffsetDateTime::now_utc().unix_timestamp()
    }
}

/// Builder for [`SessionClaims`].
pub struct SessionClaimsBuilder {
    sub: String,
    role: String,
    area_id: Option<String>,
    area_name: Option<String>,
    iat: i64,
    exp: i64,
}

impl SessionClaimsBuilder {
    fn new(subject: impl Into<String>, role: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            sub: subject.into(),
            role: role.into(),
            area_id: None,
            area_name: None,
            iat: now,
            exp: now + 43_200, // Default 12 hours
        }
    }

    /// Sets the assigned area.
    #[must_use]
    pub fn area(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.area_id = Some(id.into());
        self.area_name = Some(name.into());
        self
    }

    /// Sets the expiration time in seconds from issuance. Negative values
    /// produce an already-expired credential, which the tests rely on.
    #[must_use]
    pub fn expires_in_seconds(mut self, seconds: i64) -> Self {
        self.exp = self.iat + seconds;
        self
    }

    /// Builds the session claims.
    #[must_use]
    pub fn build(self) -> SessionClaims {
        SessionClaims {
            sub: self.sub,
            role: self.role,
            area_id: self.area_id,
            area_name: self.area_name,
            iat: self.iat,
            exp: self.exp,
        }
    }
}
