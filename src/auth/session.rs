//! Session-backed identity resolution.
//!
//! The cookie session stores the signed-in user id, the role string, and
//! the linked student ids as CSV. The directory remains the source of
//! truth for the full records; the session only carries enough to resolve
//! them per request. Role is written once at sign-in and never mutated;
//! changing role means signing in again as a different identity.

use std::sync::Arc;

use actix_session::Session;

use crate::auth::ability::Ability;
use crate::auth::cache::AbilityCache;
use crate::directory::Directory;
use crate::errors::AppError;
use crate::models::role::Role;
use crate::models::student::Student;
use crate::models::user::User;

const USER_ID_KEY: &str = "user_id";
const ROLE_KEY: &str = "role";
const STUDENT_IDS_KEY: &str = "student_ids";

/// Establish a session for a verified user and their linked students.
pub fn sign_in(session: &Session, user: &User, students: &[Student]) -> Result<(), AppError> {
    let ids_csv = students
        .iter()
        .map(|s| s.id.as_str())
        .collect::<Vec<_>>()
        .join(",");
    session
        .insert(USER_ID_KEY, &user.id)
        .and_then(|_| session.insert(ROLE_KEY, user.role.as_str()))
        .and_then(|_| session.insert(STUDENT_IDS_KEY, &ids_csv))
        .map_err(|e| AppError::Session(format!("Failed to establish session: {e}")))?;
    Ok(())
}

/// Drop every session entry, returning the request to anonymous.
pub fn sign_out(session: &Session) {
    session.purge();
}

pub fn current_user_id(session: &Session) -> Option<String> {
    session.get::<String>(USER_ID_KEY).unwrap_or(None)
}

/// The session role, `Anonymous` when absent or unrecognized.
pub fn current_role(session: &Session) -> Role {
    session
        .get::<String>(ROLE_KEY)
        .unwrap_or(None)
        .map(|value| Role::parse(&value))
        .unwrap_or(Role::Anonymous)
}

/// Resolve the full user record for the session, if any.
pub fn current_user(session: &Session, directory: &Directory) -> Option<User> {
    let id = current_user_id(session)?;
    directory.find_user(&id).cloned()
}

/// Everything a handler needs to answer permission queries: the resolved
/// identity, its linked students, and the (cached) computed ability.
pub struct AbilityContext {
    pub user: Option<User>,
    pub students: Vec<Student>,
    pub ability: Arc<Ability>,
}

impl AbilityContext {
    /// Load the context for the current session. Anonymous sessions get
    /// the empty ability.
    pub fn load(session: &Session, directory: &Directory, cache: &AbilityCache) -> Self {
        let Some(user) = current_user(session, directory) else {
            return AbilityContext {
                user: None,
                students: Vec::new(),
                ability: cache.anonymous(),
            };
        };
        let students = directory.students_linked_to(&user);
        let ability = cache.ability_for(&user, &students);
        AbilityContext { user: Some(user), students, ability }
    }

    pub fn role(&self) -> Role {
        self.user.as_ref().map(|u| u.role).unwrap_or(Role::Anonymous)
    }

    /// The signed-in user, or a 401 session error.
    pub fn require_user(&self) -> Result<&User, AppError> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::Session("Not authenticated".to_string()))
    }
}
