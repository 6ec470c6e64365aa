//! Route authorization decisions.
//!
//! The gate is a pure function from `(request path, verified claims)` to a
//! decision: continue, or redirect to `/login`, `/403`, or a role home. Token
//! extraction and verification happen in the middleware
//! ([`crate::middleware`]); by the time [`decide`] runs, an invalid or
//! expired credential has already been collapsed to `None`, which is exactly
//! how the transition table treats it.

use crate::claims::SessionClaims;
use crate::role::Role;

/// The login page path.
pub const LOGIN_PATH: &str = "/login";

/// The forbidden page path.
pub const FORBIDDEN_PATH: &str = "/403";

/// Home path used when a valid credential carries a role tag with no home of
/// its own (the legacy `user` role or an unrecognized tag).
///
/// This mirrors the portal's historical fall-through to the administrative
/// home. Least-privilege would redirect such users to `/403` instead; kept
/// as-is pending product sign-off, but centralized here so the policy is one
/// line to change.
pub const DEFAULT_ROLE_HOME: &str = "/admin/dashboard";

/// Paths the gate never evaluates: the portal API surface, static assets and
/// the favicon.
const EXCLUDED_PREFIXES: &[&str] = &["/api/", "/assets/"];
const EXCLUDED_PATHS: &[&str] = &["/api", "/favicon.ico"];

/// Pages reachable without a credential.
const PUBLIC_PATHS: &[&str] = &[FORBIDDEN_PATH];

/// Management prefixes barred to the lowest tier.
const RESTRICTED_PREFIXES: &[&str] = &[
    "/admin",
    "/area-management",
    "/device-management",
    "/user-management",
];

/// How a request path relates to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Never gated: API routes, static assets, favicon.
    Excluded,
    /// The login page.
    Login,
    /// Reachable with or without a credential.
    Public,
    /// Everything else; requires a valid credential.
    Protected,
}

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the navigation through.
    Continue,
    /// Redirect to the given path.
    Redirect(&'static str),
}

/// Classifies a request path.
#[must_use]
pub fn classify(path: &str) -> PathClass {
    if EXCLUDED_PATHS.contains(&path)
        || EXCLUDED_PREFIXES.iter().any(|p| path.starts_with(p))
    {
        return PathClass::Excluded;
    }
    if path == LOGIN_PATH {
        return PathClass::Login;
    }
    if PUBLIC_PATHS.contains(&path) {
        return PathClass::Public;
    }
    PathClass::Protected
}

/// Resolves the post-login home for a role tag.
///
/// Unrecognized tags and the homeless `user` role land on
/// [`DEFAULT_ROLE_HOME`].
#[must_use]
pub fn role_home(tag: &str) -> &'static str {
    Role::parse(tag)
        .and_then(|role| role.home_path())
        .unwrap_or(DEFAULT_ROLE_HOME)
}

/// Evaluates the transition table for one navigation.
///
/// `claims` must be the result of signature verification: `None` both for an
/// absent credential and for one that failed the check. The distinction never
/// changes the decision, and in particular an invalid token on the login page
/// continues rather than redirecting to a role home.
#[must_use]
pub fn decide(path: &str, claims: Option<&SessionClaims>) -> GateDecision {
    match classify(path) {
        PathClass::Excluded | PathClass::Public => GateDecision::Continue,
        PathClass::Login => match claims {
            Some(claims) => GateDecision::Redirect(role_home(&claims.role)),
            None => GateDecision::Continue,
        },
        PathClass::Protected => match claims {
            None => GateDecision::Redirect(LOGIN_PATH),
            Some(claims) if is_restricted(path) && !may_manage(&claims.role) => {
                GateDecision::Redirect(FORBIDDEN_PATH)
            }
            Some(_) => GateDecision::Continue,
        },
    }
}

/// Returns `true` when the path sits under a management prefix.
fn is_restricted(path: &str) -> bool {
    RESTRICTED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Whether a role tag may enter the management prefixes. Unrecognized tags
/// are denied: the safe default for access checks, unlike the login
/// redirect's home fallback.
fn may_manage(tag: &str) -> bool {
    Role::parse(tag).is_some_and(|role| !role.is_lowest_tier())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_for(role: &str) -> SessionClaims {
        SessionClaims::builder("op-17", role).build()
    }

    #[test]
    fn test_classify_paths() {
        assert_eq!(classify("/api/data/master/customers"), PathClass::Excluded);
        assert_eq!(classify("/api"), PathClass::Excluded);
        assert_eq!(classify("/assets/app.js"), PathClass::Excluded);
        assert_eq!(classify("/favicon.ico"), PathClass::Excluded);
        assert_eq!(classify("/login"), PathClass::Login);
        assert_eq!(classify("/403"), PathClass::Public);
        assert_eq!(classify("/dashboard"), PathClass::Protected);
        assert_eq!(classify("/"), PathClass::Protected);
    }

    #[test]
    fn test_no_token_protected_redirects_to_login() {
        assert_eq!(
            decide("/admin/dashboard", None),
            GateDecision::Redirect(LOGIN_PATH)
        );
        assert_eq!(decide("/", None), GateDecision::Redirect(LOGIN_PATH));
    }

    #[test]
    fn test_no_token_login_and_public_continue() {
        assert_eq!(decide("/login", None), GateDecision::Continue);
        assert_eq!(decide("/403", None), GateDecision::Continue);
        assert_eq!(decide("/favicon.ico", None), GateDecision::Continue);
        assert_eq!(decide("/api/health", None), GateDecision::Continue);
    }

    #[test]
    fn test_valid_token_on_login_redirects_to_role_home() {
        let claims = claims_for("inspector");
        assert_eq!(
            decide("/login", Some(&claims)),
            GateDecision::Redirect("/inspector/dashboard")
        );

        let claims = claims_for("checker");
        assert_eq!(
            decide("/login", Some(&claims)),
            GateDecision::Redirect("/checker/dashboard")
        );

        let claims = claims_for("approver");
        assert_eq!(
            decide("/login", Some(&claims)),
            GateDecision::Redirect("/approver/dashboard")
        );

        let claims = claims_for("super_admin");
        assert_eq!(
            decide("/login", Some(&claims)),
            GateDecision::Redirect("/admin/dashboard")
        );
    }

    #[test]
    fn test_unrecognized_role_on_login_falls_back_to_admin_home() {
        let claims = claims_for("shift_lead");
        assert_eq!(
            decide("/login", Some(&claims)),
            GateDecision::Redirect(DEFAULT_ROLE_HOME)
        );

        // The legacy lowest tier has no home of its own either.
        let claims = claims_for("user");
        assert_eq!(
            decide("/login", Some(&claims)),
            GateDecision::Redirect(DEFAULT_ROLE_HOME)
        );
    }

    #[test]
    fn test_lowest_tier_on_management_prefix_is_forbidden() {
        let claims = claims_for("User");
        assert_eq!(
            decide("/user-management", Some(&claims)),
            GateDecision::Redirect(FORBIDDEN_PATH)
        );
        assert_eq!(
            decide("/admin/dashboard", Some(&claims)),
            GateDecision::Redirect(FORBIDDEN_PATH)
        );
        assert_eq!(
            decide("/device-management/scanners", Some(&claims)),
            GateDecision::Redirect(FORBIDDEN_PATH)
        );
    }

    #[test]
    fn test_unrecognized_role_denied_on_management_prefix() {
        let claims = claims_for("shift_lead");
        assert_eq!(
            decide("/area-management", Some(&claims)),
            GateDecision::Redirect(FORBIDDEN_PATH)
        );
    }

    #[test]
    fn test_valid_token_continues_elsewhere() {
        let claims = claims_for("checker");
        assert_eq!(decide("/dashboard", Some(&claims)), GateDecision::Continue);
        assert_eq!(
            decide("/checksheets/daily/42", Some(&claims)),
            GateDecision::Continue
        );

        // Non-lowest tiers pass the management prefixes; the upstream API is
        // the authoritative check for what they may do there.
        assert_eq!(
            decide("/admin/dashboard", Some(&claims)),
            GateDecision::Continue
        );
    }

    #[test]
    fn test_prefix_match_requires_segment_boundary() {
        let claims = claims_for("user");
        // "/administration" is not under "/admin".
        assert_eq!(
            decide("/administration", Some(&claims)),
            GateDecision::Continue
        );
    }

    #[test]
    fn test_role_home_resolution() {
        assert_eq!(role_home("inspector"), "/inspector/dashboard");
        assert_eq!(role_home("SUPER_ADMIN"), "/admin/dashboard");
        assert_eq!(role_home("admin"), "/admin/dashboard");
        assert_eq!(role_home("nobody-knows"), DEFAULT_ROLE_HOME);
    }
}
