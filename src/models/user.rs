use serde::Serialize;

use crate::auth::ability::{Field, Subject, SubjectKind};
use crate::models::role::Role;

/// Internal user record — includes the password hash, never serialized.
///
/// This is the authenticated identity the rule builder consumes: role,
/// optional institution scope, and held permission flags form an
/// independent axis on top of the role.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub institution_id: Option<String>,
    pub permissions: Vec<String>,
    pub password_hash: String,
}

impl User {
    /// Whether the user holds a named permission flag. Super admins hold
    /// every flag implicitly.
    pub fn has_permission(&self, code: &str) -> bool {
        if self.role == Role::SuperAdmin {
            return true;
        }
        self.permissions.iter().any(|p| p == code)
    }
}

/// Safe projection for responses — no password hash.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub institution_id: Option<String>,
    pub permissions: Vec<String>,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Profile {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            institution_id: user.institution_id.clone(),
            permissions: user.permissions.clone(),
        }
    }
}

impl Subject for User {
    fn kind(&self) -> SubjectKind {
        SubjectKind::User
    }

    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Id => Some(&self.id),
            Field::InstitutionId => self.institution_id.as_deref(),
            Field::Role => Some(self.role.as_str()),
            Field::StudentId => None,
        }
    }
}
