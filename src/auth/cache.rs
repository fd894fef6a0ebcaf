//! Memoized ability lookup.
//!
//! The rule builder is pure, so the cache key is exactly its inputs: the
//! identity fields the rules read plus the linked student ids. Any change
//! to either produces a different key and therefore a fresh rule list;
//! there is no invalidation protocol and no way to observe a stale set
//! after a role or permission change. Cached abilities are shared as
//! immutable `Arc` values, replaced wholesale, never mutated in place.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::auth::ability::Ability;
use crate::auth::rules::define_rules_for;
use crate::models::role::Role;
use crate::models::student::Student;
use crate::models::user::User;

/// Entry cap. The demo directory holds a handful of identities; the cap
/// only guards against a pathological session churn filling the map.
const MAX_ENTRIES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    user_id: String,
    role: Role,
    institution_id: Option<String>,
    permissions: Vec<String>,
    student_ids: Vec<String>,
}

impl CacheKey {
    fn for_inputs(user: &User, students: &[Student]) -> Self {
        CacheKey {
            user_id: user.id.clone(),
            role: user.role,
            institution_id: user.institution_id.clone(),
            permissions: user.permissions.clone(),
            student_ids: students.iter().map(|s| s.id.clone()).collect(),
        }
    }
}

/// Shared, cloneable cache of computed abilities.
#[derive(Clone, Default)]
pub struct AbilityCache {
    entries: Arc<Mutex<HashMap<CacheKey, Arc<Ability>>>>,
}

impl AbilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the ability for this identity and its linked students,
    /// computing it on first use.
    pub fn ability_for(&self, user: &User, students: &[Student]) -> Arc<Ability> {
        let key = CacheKey::for_inputs(user, students);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ability) = entries.get(&key) {
            return Arc::clone(ability);
        }
        if entries.len() >= MAX_ENTRIES {
            entries.clear();
        }
        let ability = Arc::new(define_rules_for(Some(user), students));
        entries.insert(key, Arc::clone(&ability));
        ability
    }

    /// The empty ability for unauthenticated requests.
    pub fn anonymous(&self) -> Arc<Ability> {
        Arc::new(Ability::default())
    }
}
