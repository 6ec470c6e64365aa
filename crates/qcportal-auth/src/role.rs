//! Portal role tags and their navigation homes.

use std::fmt;

/// Closed set of role tags carried in session credentials.
///
/// `super_admin`, `inspector`, `checker` and `approver` are the roles the
/// portal issues today; `admin` and `user` still appear in tokens minted by
/// older deployments and are accepted for compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Full administrative access.
    SuperAdmin,
    /// Legacy administrative role, treated like `super_admin` for navigation.
    Admin,
    /// Reviews and approves checksheets.
    Approver,
    /// Performs checksheet checks.
    Checker,
    /// Performs inspections.
    Inspector,
    /// Legacy lowest-tier role with no management access.
    User,
}

impl Role {
    /// Parses a role tag, ignoring case. Returns `None` for tags outside the
    /// known set; callers decide how to treat those.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "super_admin" => Some(Self::SuperAdmin),
            "admin" => Some(Self::Admin),
            "approver" => Some(Self::Approver),
            "checker" => Some(Self::Checker),
            "inspector" => Some(Self::Inspector),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    /// Canonical tag as stored in credentials.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Approver => "approver",
            Self::Checker => "checker",
            Self::Inspector => "inspector",
            Self::User => "user",
        }
    }

    /// Dashboard path this role lands on after login.
    ///
    /// `User` has no home of its own; the gate falls back to
    /// [`DEFAULT_ROLE_HOME`](crate::gate::DEFAULT_ROLE_HOME) for it, the same
    /// way it does for unrecognized tags.
    #[must_use]
    pub fn home_path(&self) -> Option<&'static str> {
        match self {
            Self::SuperAdmin | Self::Admin => Some("/admin/dashboard"),
            Self::Approver => Some("/approver/dashboard"),
            Self::Checker => Some("/checker/dashboard"),
            Self::Inspector => Some("/inspector/dashboard"),
            Self::User => None,
        }
    }

    /// Returns `true` for the lowest-tier role, which is barred from the
    /// management prefixes.
    #[must_use]
    pub fn is_lowest_tier(&self) -> bool {
        matches!(self, Self::User)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Role::parse("super_admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("SUPER_ADMIN"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("Inspector"), Some(Role::Inspector));
        assert_eq!(Role::parse("User"), Some(Role::User));
        assert_eq!(Role::parse("operator"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_round_trip_through_as_str() {
        for role in [
            Role::SuperAdmin,
            Role::Admin,
            Role::Approver,
            Role::Checker,
            Role::Inspector,
            Role::User,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_home_paths() {
        assert_eq!(Role::SuperAdmin.home_path(), Some("/admin/dashboard"));
        assert_eq!(Role::Admin.home_path(), Some("/admin/dashboard"));
        assert_eq!(Role::Inspector.home_path(), Some("/inspector/dashboard"));
        assert_eq!(Role::Checker.home_path(), Some("/checker/dashboard"));
        assert_eq!(Role::Approver.home_path(), Some("/approver/dashboard"));
        assert_eq!(Role::User.home_path(), None);
    }

    #[test]
    fn test_lowest_tier() {
        assert!(Role::User.is_lowest_tier());
        assert!(!Role::Checker.is_lowest_tier());
        assert!(!Role::SuperAdmin.is_lowest_tier());
    }
}
