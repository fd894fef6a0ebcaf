//! Conditional-inclusion primitives for composing responses.
//!
//! Handlers build page documents from fragments that should only appear
//! when an ability query passes (or, for its dual, when it fails). The
//! fragment closure runs only when its branch is chosen, so callers can
//! put non-trivial assembly work behind the check.

use crate::auth::ability::{Ability, Action, Subject};

/// Include a fragment only when the identity can perform the action.
pub fn when<T>(
    ability: &Ability,
    action: Action,
    subject: &dyn Subject,
    fragment: impl FnOnce() -> T,
) -> Option<T> {
    ability.can(action, subject).then(fragment)
}

/// Like [`when`], with a fallback fragment for the denied branch.
pub fn when_or<T>(
    ability: &Ability,
    action: Action,
    subject: &dyn Subject,
    fragment: impl FnOnce() -> T,
    fallback: impl FnOnce() -> T,
) -> T {
    if ability.can(action, subject) { fragment() } else { fallback() }
}

/// Include a fragment only when the identity cannot perform the action:
/// the dual of [`when`], for read-only notices and upgrade prompts.
pub fn unless<T>(
    ability: &Ability,
    action: Action,
    subject: &dyn Subject,
    fragment: impl FnOnce() -> T,
) -> Option<T> {
    ability.cannot(action, subject).then(fragment)
}

/// Like [`unless`], with a fallback for the permitted branch.
pub fn unless_or<T>(
    ability: &Ability,
    action: Action,
    subject: &dyn Subject,
    fragment: impl FnOnce() -> T,
    fallback: impl FnOnce() -> T,
) -> T {
    if ability.cannot(action, subject) { fragment() } else { fallback() }
}
