//! User role model.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Access role assigned to a user record.
///
/// Wire names match variant names exactly (`Normal`, `Management`, `Admin`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Regular staff access.
    Normal,
    /// Division management access.
    Management,
    /// Full administrative access, required to edit other users.
    Admin,
}

impl Role {
    /// All roles in selector display order.
    pub const ALL: [Role; 3] = [Role::Normal, Role::Management, Role::Admin];

    /// Stable wire/display string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Management => "Management",
            Self::Admin => "Admin",
        }
    }

    pub fn is_admin(self) -> bool {
        self == Self::Admin
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role parse error for operator/CLI input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleParseError(pub String);

impl Display for RoleParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported role `{}`; expected Normal|Management|Admin",
            self.0
        )
    }
}

impl Error for RoleParseError {}

impl FromStr for Role {
    type Err = RoleParseError;

    /// Parses a role name, ignoring case and surrounding whitespace.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| RoleParseError(normalized.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn parses_known_roles_case_insensitively() {
        assert_eq!(" admin ".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("MANAGEMENT".parse::<Role>().unwrap(), Role::Management);
        assert_eq!("Normal".parse::<Role>().unwrap(), Role::Normal);
    }

    #[test]
    fn rejects_unknown_role() {
        let err = "owner".parse::<Role>().unwrap_err();
        assert!(err.to_string().contains("owner"));
    }

    #[test]
    fn serializes_with_variant_names() {
        assert_eq!(serde_json::to_value(Role::Management).unwrap(), "Management");
        let decoded: Role = serde_json::from_str("\"Admin\"").unwrap();
        assert_eq!(decoded, Role::Admin);
    }
}
