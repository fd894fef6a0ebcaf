use serde::{Deserialize, Serialize};

/// Closed set of platform roles. Every identity carries exactly one; the
/// absence of an authenticated identity is the `Anonymous` role, never a
/// null state, so access checks always have a role to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Parent,
    Guardian,
    Student,
    InstitutionAdmin,
    SuperAdmin,
    Support,
    Finance,
    Merchant,
    Anonymous,
}

/// Every signed-in role.
pub const AUTHENTICATED_ROLES: &[Role] = &[
    Role::Parent,
    Role::Guardian,
    Role::Student,
    Role::InstitutionAdmin,
    Role::SuperAdmin,
    Role::Support,
    Role::Finance,
    Role::Merchant,
];

/// Roles with access to the admin area.
pub const ADMIN_ROLES: &[Role] = &[
    Role::InstitutionAdmin,
    Role::SuperAdmin,
    Role::Support,
    Role::Finance,
    Role::Merchant,
];

/// Payer-facing roles (guardians and the students they pay for).
pub const PAYER_ROLES: &[Role] = &[Role::Parent, Role::Guardian, Role::Student];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Parent => "parent",
            Role::Guardian => "guardian",
            Role::Student => "student",
            Role::InstitutionAdmin => "institution_admin",
            Role::SuperAdmin => "super_admin",
            Role::Support => "support",
            Role::Finance => "finance",
            Role::Merchant => "merchant",
            Role::Anonymous => "anonymous",
        }
    }

    /// Parse a stored role string. Unrecognized values map to `Anonymous`
    /// (zero grants) rather than erroring.
    pub fn parse(value: &str) -> Role {
        match value {
            "parent" => Role::Parent,
            "guardian" => Role::Guardian,
            "student" => Role::Student,
            "institution_admin" => Role::InstitutionAdmin,
            "super_admin" => Role::SuperAdmin,
            "support" => Role::Support,
            "finance" => Role::Finance,
            "merchant" => Role::Merchant,
            _ => Role::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        *self != Role::Anonymous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_authenticated_role() {
        for role in AUTHENTICATED_ROLES {
            assert_eq!(Role::parse(role.as_str()), *role);
        }
    }

    #[test]
    fn parse_is_fail_closed() {
        assert_eq!(Role::parse("anonymous"), Role::Anonymous);
        assert_eq!(Role::parse("root"), Role::Anonymous);
        assert_eq!(Role::parse(""), Role::Anonymous);
        assert_eq!(Role::parse("Parent"), Role::Anonymous);
    }

    #[test]
    fn role_groups_cover_expected_members() {
        assert_eq!(AUTHENTICATED_ROLES.len(), 8);
        assert!(!AUTHENTICATED_ROLES.contains(&Role::Anonymous));
        assert!(ADMIN_ROLES.contains(&Role::SuperAdmin));
        assert!(!ADMIN_ROLES.contains(&Role::Parent));
        assert!(PAYER_ROLES.contains(&Role::Student));
    }
}
