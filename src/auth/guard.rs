//! Route guarding.
//!
//! A static table maps URL path patterns to the roles allowed through.
//! [`decide`] is the pure decision core: the middleware resolves the
//! session role first (identity resolution is synchronous, so no request
//! is ever evaluated in a half-resolved state) and then maps the decision
//! to a redirect or passes the request on.
//!
//! Unmatched paths are AUTHORIZED. This fail-open default is deliberate
//! and inherited policy: every protected route must be enumerated in
//! [`ROUTE_ACCESS`] explicitly, and adding a new sensitive route without a
//! table entry leaves it open. Flagged in DESIGN.md as a policy decision
//! requiring sign-off, not a bug to silently fix.

use crate::auth::ability::{Ability, Action, SubjectKind};
use crate::models::role::{ADMIN_ROLES, AUTHENTICATED_ROLES, Role};

/// Who a route rule lets through.
#[derive(Debug, Clone, Copy)]
pub enum Allow {
    /// Any role, anonymous included.
    Any,
    /// Only the listed roles.
    Roles(&'static [Role]),
}

/// One static route-access entry. Patterns may contain one `[id]` segment
/// matching a single dynamic path segment; matching is by longest prefix.
#[derive(Debug, Clone, Copy)]
pub struct RouteRule {
    pub pattern: &'static str,
    pub allow: Allow,
    pub allow_anonymous: bool,
}

const fn roles(list: &'static [Role]) -> Allow {
    Allow::Roles(list)
}

/// Routes that bypass the table entirely (exact match).
pub const PUBLIC_ROUTES: &[&str] = &[
    "/",
    "/login",
    "/register",
    "/forgot-password",
    "/reset-password",
];

/// Where unauthenticated requests are sent.
pub const SIGN_IN_PATH: &str = "/login";
/// Default landing page for authenticated-but-unauthorized requests.
pub const LANDING_PATH: &str = "/dashboard";

/// The route-access table. Data, not code: ordering only breaks ties
/// between equally specific patterns.
pub const ROUTE_ACCESS: &[RouteRule] = &[
    // Shared pages
    RouteRule { pattern: "/dashboard", allow: roles(AUTHENTICATED_ROLES), allow_anonymous: false },
    RouteRule { pattern: "/profile", allow: roles(AUTHENTICATED_ROLES), allow_anonymous: true },
    RouteRule { pattern: "/notifications", allow: roles(AUTHENTICATED_ROLES), allow_anonymous: false },
    RouteRule { pattern: "/settings", allow: roles(AUTHENTICATED_ROLES), allow_anonymous: false },
    // Payments & invoices
    RouteRule {
        pattern: "/invoices/[id]",
        allow: roles(&[
            Role::Parent,
            Role::Guardian,
            Role::Student,
            Role::InstitutionAdmin,
            Role::SuperAdmin,
            Role::Support,
            Role::Finance,
        ]),
        allow_anonymous: false,
    },
    RouteRule {
        pattern: "/invoices",
        allow: roles(&[
            Role::Parent,
            Role::Guardian,
            Role::Student,
            Role::InstitutionAdmin,
            Role::SuperAdmin,
            Role::Support,
            Role::Finance,
        ]),
        allow_anonymous: false,
    },
    RouteRule {
        pattern: "/payments",
        allow: roles(&[
            Role::Parent,
            Role::Guardian,
            Role::InstitutionAdmin,
            Role::SuperAdmin,
            Role::Finance,
            Role::Merchant,
        ]),
        allow_anonymous: false,
    },
    RouteRule {
        pattern: "/payment-history",
        allow: roles(&[
            Role::Parent,
            Role::Guardian,
            Role::Student,
            Role::InstitutionAdmin,
            Role::SuperAdmin,
            Role::Support,
            Role::Finance,
        ]),
        allow_anonymous: false,
    },
    RouteRule {
        pattern: "/fees",
        allow: roles(&[Role::Student, Role::Parent, Role::Guardian]),
        allow_anonymous: false,
    },
    // Admin area
    RouteRule { pattern: "/admin/dashboard", allow: roles(ADMIN_ROLES), allow_anonymous: false },
    RouteRule {
        pattern: "/admin/reports/global",
        allow: roles(&[Role::SuperAdmin, Role::Finance]),
        allow_anonymous: false,
    },
    RouteRule { pattern: "/admin/reports", allow: roles(ADMIN_ROLES), allow_anonymous: false },
    RouteRule {
        pattern: "/admin/reconciliation",
        allow: roles(&[Role::Finance, Role::Merchant, Role::InstitutionAdmin, Role::SuperAdmin]),
        allow_anonymous: false,
    },
    RouteRule {
        pattern: "/admin/fee-structure",
        allow: roles(&[Role::InstitutionAdmin, Role::SuperAdmin]),
        allow_anonymous: false,
    },
    RouteRule {
        pattern: "/admin/fee-schedules",
        allow: roles(&[Role::InstitutionAdmin, Role::SuperAdmin]),
        allow_anonymous: false,
    },
    RouteRule {
        pattern: "/admin/fee-assignments",
        allow: roles(&[Role::InstitutionAdmin, Role::SuperAdmin]),
        allow_anonymous: false,
    },
    RouteRule {
        pattern: "/admin/students",
        allow: roles(&[Role::InstitutionAdmin, Role::SuperAdmin]),
        allow_anonymous: false,
    },
    RouteRule {
        pattern: "/admin/institutions/[id]/edit",
        allow: roles(&[Role::SuperAdmin]),
        allow_anonymous: false,
    },
    RouteRule {
        pattern: "/admin/institutions",
        allow: roles(&[Role::SuperAdmin]),
        allow_anonymous: false,
    },
    RouteRule { pattern: "/admin/admins", allow: roles(&[Role::SuperAdmin]), allow_anonymous: false },
    RouteRule {
        pattern: "/admin/support/tickets",
        allow: roles(&[Role::Support, Role::SuperAdmin]),
        allow_anonymous: false,
    },
    RouteRule {
        pattern: "/admin/finance/transactions",
        allow: roles(&[Role::Finance, Role::SuperAdmin]),
        allow_anonymous: false,
    },
    RouteRule {
        pattern: "/admin/merchants/onboarding",
        allow: roles(&[Role::Merchant, Role::SuperAdmin]),
        allow_anonymous: false,
    },
];

/// Terminal guard states for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Authorized,
    /// Send to sign-in, preserving the originally requested path so the
    /// login flow can return there.
    RedirectToLogin { original: String },
    /// Send to the landing page, tagging the denied path.
    RedirectToLanding { denied: String },
}

/// Number of pattern segments matched when `path` falls under `pattern`,
/// or `None`. Prefix semantics: the path may continue past the pattern.
/// A `[...]` segment matches exactly one non-empty path segment.
fn match_specificity(pattern: &str, path: &str) -> Option<usize> {
    let pattern_segs: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_segs: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if path_segs.len() < pattern_segs.len() {
        return None;
    }
    for (pat, seg) in pattern_segs.iter().zip(&path_segs) {
        let dynamic = pat.starts_with('[') && pat.ends_with(']');
        if !dynamic && pat != seg {
            return None;
        }
    }
    Some(pattern_segs.len())
}

/// Find the most specific matching rule: longest pattern wins, table order
/// breaks ties.
pub fn find_rule(path: &str) -> Option<&'static RouteRule> {
    let mut best: Option<(usize, &RouteRule)> = None;
    for rule in ROUTE_ACCESS {
        if let Some(specificity) = match_specificity(rule.pattern, path) {
            if best.is_none_or(|(len, _)| specificity > len) {
                best = Some((specificity, rule));
            }
        }
    }
    best.map(|(_, rule)| rule)
}

/// Decide one navigation for a resolved role.
pub fn decide(path: &str, role: Role) -> RouteDecision {
    if PUBLIC_ROUTES.contains(&path) {
        return RouteDecision::Authorized;
    }

    // Unlisted routes are open — see the module docs.
    let Some(rule) = find_rule(path) else {
        return RouteDecision::Authorized;
    };

    let authenticated = role.is_authenticated();
    if !authenticated && !rule.allow_anonymous {
        return RouteDecision::RedirectToLogin { original: path.to_string() };
    }

    match rule.allow {
        Allow::Any => RouteDecision::Authorized,
        Allow::Roles(allowed) => {
            if !authenticated && rule.allow_anonymous {
                return RouteDecision::Authorized;
            }
            if allowed.contains(&role) {
                RouteDecision::Authorized
            } else {
                RouteDecision::RedirectToLanding { denied: path.to_string() }
            }
        }
    }
}

/// What an in-page gate lets through.
#[derive(Debug, Clone)]
pub enum GateAllow {
    Any,
    Authenticated,
    Roles(Vec<Role>),
    /// A direct ability query instead of a role list.
    Ability(Action, SubjectKind),
}

/// Outcome of an in-page gate. `Fallback` means render the caller's
/// substitute content in place instead of navigating away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Render,
    Fallback,
    RedirectToLogin { original: String },
    RedirectToLanding { denied: String },
}

/// Per-region access gate for page composition. Mirrors the route guard
/// but can suppress redirects for regions that should hide rather than
/// navigate when denied.
#[derive(Debug, Clone)]
pub struct RoleGate {
    allow: GateAllow,
    allow_anonymous: bool,
    suppress_redirect: bool,
}

impl RoleGate {
    pub fn authenticated() -> Self {
        Self::allowing(GateAllow::Authenticated)
    }

    pub fn any() -> Self {
        Self::allowing(GateAllow::Any)
    }

    pub fn for_roles(allowed: impl Into<Vec<Role>>) -> Self {
        Self::allowing(GateAllow::Roles(allowed.into()))
    }

    pub fn for_ability(action: Action, subject: SubjectKind) -> Self {
        Self::allowing(GateAllow::Ability(action, subject))
    }

    fn allowing(allow: GateAllow) -> Self {
        Self { allow, allow_anonymous: false, suppress_redirect: false }
    }

    pub fn allow_anonymous(mut self) -> Self {
        self.allow_anonymous = true;
        self
    }

    pub fn suppress_redirect(mut self) -> Self {
        self.suppress_redirect = true;
        self
    }

    /// Evaluate the gate for a resolved identity. `path` is only used to
    /// tag redirect outcomes.
    pub fn evaluate(&self, role: Role, ability: &Ability, path: &str) -> GateOutcome {
        let authenticated = role.is_authenticated();
        let can_access = match &self.allow {
            GateAllow::Any => true,
            GateAllow::Authenticated => {
                authenticated || (self.allow_anonymous && role == Role::Anonymous)
            }
            GateAllow::Roles(allowed) => {
                if allowed.contains(&role) {
                    role != Role::Anonymous || self.allow_anonymous
                } else {
                    false
                }
            }
            GateAllow::Ability(action, subject) => ability.can_kind(*action, *subject),
        };

        if can_access {
            return GateOutcome::Render;
        }
        if self.suppress_redirect {
            return GateOutcome::Fallback;
        }
        if !authenticated && !self.allow_anonymous {
            GateOutcome::RedirectToLogin { original: path.to_string() }
        } else {
            GateOutcome::RedirectToLanding { denied: path.to_string() }
        }
    }
}
