//! Session cookie configuration and construction.

use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::error::AuthError;

/// Configuration for the session cookie the portal issues at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie name the credential is stored under.
    #[serde(default = "default_cookie_name")]
    pub name: String,

    /// Sets the `Secure` attribute. Enable in production behind TLS.
    #[serde(default)]
    pub secure: bool,

    /// Sets the `HttpOnly` attribute.
    #[serde(default = "default_http_only")]
    pub http_only: bool,

    /// `SameSite` attribute: `strict`, `lax` or `none`.
    #[serde(default = "default_same_site")]
    pub same_site: String,

    /// Cookie path.
    #[serde(default = "default_cookie_path")]
    pub path: String,

    /// Optional cookie domain.
    #[serde(default)]
    pub domain: Option<String>,
}

fn default_cookie_name() -> String {
    "qc_token".into()
}
fn default_http_only() -> bool {
    true
}
fn default_same_site() -> String {
    "lax".into()
}
fn default_cookie_path() -> String {
    "/".into()
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            secure: false,
            http_only: default_http_only(),
            same_site: default_same_site(),
            path: default_cookie_path(),
            domain: None,
        }
    }
}

impl CookieConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns a configuration error for an empty name or an unknown
    /// `same_site` value.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.name.is_empty() {
            return Err(AuthError::configuration("cookie.name must not be empty"));
        }
        match self.same_site.to_ascii_lowercase().as_str() {
            "strict" | "lax" | "none" => Ok(()),
            other => Err(AuthError::configuration(format!(
                "cookie.same_site must be one of strict, lax, none (got '{other}')"
            ))),
        }
    }

    /// Builds the session cookie for a freshly signed credential.
    #[must_use]
    pub fn build(&self, token: &str, max_age: Duration) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name.clone(), token.to_string()))
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.parsed_same_site())
            .path(self.path.clone())
            .max_age(max_age);

        if let Some(ref domain) = self.domain {
            builder = builder.domain(domain.clone());
        }

        builder.build()
    }

    /// Builds an immediately expiring cookie that clears the credential.
    #[must_use]
    pub fn build_clear(&self) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name.clone(), String::new()))
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.parsed_same_site())
            .path(self.path.clone())
            .max_age(Duration::ZERO);

        if let Some(ref domain) = self.domain {
            builder = builder.domain(domain.clone());
        }

        builder.build()
    }

    fn parsed_same_site(&self) -> SameSite {
        match self.same_site.to_ascii_lowercase().as_str() {
            "strict" => SameSite::Strict,
            "none" => SameSite::None,
            _ => SameSite::Lax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_cookie_carries_flags() {
        let config = CookieConfig {
            secure: true,
            same_site: "strict".into(),
            ..CookieConfig::default()
        };

        let cookie = config.build("my_token_value", Duration::seconds(3600));
        let rendered = cookie.to_string();

        assert!(rendered.starts_with("qc_token=my_token_value"));
        assert!(rendered.contains("Max-Age=3600"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("SameSite=Strict"));
        assert!(rendered.contains("Path=/"));
    }

    #[test]
    fn test_build_clear_cookie_expires_immediately() {
        let config = CookieConfig::default();
        let cookie = config.build_clear();
        let rendered = cookie.to_string();

        assert!(rendered.starts_with("qc_token="));
        assert!(rendered.contains("Max-Age=0"));
        assert_eq!(cookie.value(), "");
    }

    #[test]
    fn test_domain_applied_when_configured() {
        let config = CookieConfig {
            domain: Some("portal.example.com".into()),
            ..CookieConfig::default()
        };
        let cookie = config.build("t", Duration::seconds(60));
        assert_eq!(cookie.domain(), Some("portal.example.com"));
    }

    #[test]
    fn test_validate_rejects_bad_same_site() {
        let config = CookieConfig {
            same_site: "sideways".into(),
            ..CookieConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CookieConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let config = CookieConfig {
            name: String::new(),
            ..CookieConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
