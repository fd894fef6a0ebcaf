//! Declarative permission rules and their evaluator.
//!
//! An [`Ability`] is an ordered list of [`Rule`]s computed for one identity
//! (see `auth::rules`). Rules pair an action verb with a subject kind and an
//! optional set of field conditions; a rule may be inverted, turning it into
//! an explicit deny that outranks every grant on the same query.
//!
//! Evaluation is structural: subject instances expose their scoping fields
//! through the [`Subject`] trait and conditions compare field values, so the
//! same rule applies to any record shaped like its subject kind. The rule
//! list is an immutable value, rebuilt from scratch whenever the
//! identity or its linked students change, never patched in place.

/// Action verbs. `Manage` is the semantic superset: a `Manage` rule matches
/// a query for any other action on its subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Pay,
    Download,
    Approve,
    Cancel,
    Reconcile,
    Void,
    Refund,
    Export,
    Manage,
}

/// Every concrete action verb, for exhaustive checks.
pub const ALL_ACTIONS: &[Action] = &[
    Action::Read,
    Action::Create,
    Action::Update,
    Action::Delete,
    Action::Pay,
    Action::Download,
    Action::Approve,
    Action::Cancel,
    Action::Reconcile,
    Action::Void,
    Action::Refund,
    Action::Export,
    Action::Manage,
];

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Pay => "pay",
            Action::Download => "download",
            Action::Approve => "approve",
            Action::Cancel => "cancel",
            Action::Reconcile => "reconcile",
            Action::Void => "void",
            Action::Refund => "refund",
            Action::Export => "export",
            Action::Manage => "manage",
        }
    }
}

/// Subject nouns. `All` is the wildcard kind: a rule on `All` matches a
/// query for any subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    Invoice,
    Payment,
    PaymentPlan,
    Student,
    FeeSchedule,
    FeeStructure,
    FeeAssignment,
    Institution,
    User,
    Report,
    Reconciliation,
    SupportTicket,
    Merchant,
    Clearance,
    All,
}

/// Every concrete subject kind, for exhaustive checks.
pub const ALL_SUBJECTS: &[SubjectKind] = &[
    SubjectKind::Invoice,
    SubjectKind::Payment,
    SubjectKind::PaymentPlan,
    SubjectKind::Student,
    SubjectKind::FeeSchedule,
    SubjectKind::FeeStructure,
    SubjectKind::FeeAssignment,
    SubjectKind::Institution,
    SubjectKind::User,
    SubjectKind::Report,
    SubjectKind::Reconciliation,
    SubjectKind::SupportTicket,
    SubjectKind::Merchant,
    SubjectKind::Clearance,
];

/// Fields a rule condition may constrain on a subject instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    StudentId,
    InstitutionId,
    Role,
}

/// Predicate over a single field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Eq(String),
    In(Vec<String>),
}

impl Matcher {
    fn matches(&self, value: &str) -> bool {
        match self {
            Matcher::Eq(expected) => expected == value,
            Matcher::In(allowed) => allowed.iter().any(|v| v == value),
        }
    }
}

/// Field conditions of one rule; every entry must hold.
pub type Conditions = Vec<(Field, Matcher)>;

/// Equality condition helper.
pub fn eq(field: Field, value: impl Into<String>) -> (Field, Matcher) {
    (field, Matcher::Eq(value.into()))
}

/// Set-membership condition helper.
pub fn one_of<I, S>(field: Field, values: I) -> (Field, Matcher)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    (field, Matcher::In(values.into_iter().map(Into::into).collect()))
}

/// One computed permission rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub action: Action,
    pub subject: SubjectKind,
    /// Empty means the rule applies to every instance of the subject kind.
    pub conditions: Conditions,
    /// Explicit deny; outranks any matching grant.
    pub inverted: bool,
}

/// Structural view of a record the evaluator can inspect. Returning `None`
/// for a field the record does not carry makes any condition on that field
/// unsatisfied; a missing field can never pass an equality or membership
/// check.
pub trait Subject {
    fn kind(&self) -> SubjectKind;
    fn field(&self, field: Field) -> Option<&str>;
}

/// A subject assembled from explicit field values, for checks where the
/// caller has scoping data but no full record (e.g. a route parameter
/// standing in for the owning student id).
#[derive(Debug, Clone)]
pub struct SubjectFields {
    kind: SubjectKind,
    fields: Vec<(Field, String)>,
}

impl SubjectFields {
    pub fn new(kind: SubjectKind) -> Self {
        Self { kind, fields: Vec::new() }
    }

    /// Snapshot an existing instance so callers can overlay extra fields on
    /// top of what the record already carries.
    pub fn over(base: &dyn Subject) -> Self {
        let mut fields = Vec::new();
        for field in [Field::Id, Field::StudentId, Field::InstitutionId, Field::Role] {
            if let Some(value) = base.field(field) {
                fields.push((field, value.to_string()));
            }
        }
        Self { kind: base.kind(), fields }
    }

    /// Set or override a field value.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        let value = value.into();
        if let Some(entry) = self.fields.iter_mut().find(|(f, _)| *f == field) {
            entry.1 = value;
        } else {
            self.fields.push((field, value));
        }
        self
    }
}

impl Subject for SubjectFields {
    fn kind(&self) -> SubjectKind {
        self.kind
    }

    fn field(&self, field: Field) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }
}

/// The computed permission set for one identity.
///
/// Default is the empty ability: no rules, every query false.
#[derive(Debug, Clone, Default)]
pub struct Ability {
    rules: Vec<Rule>,
}

impl Ability {
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Instance-level query: may the identity perform `action` on this
    /// record? Any matching deny forces false; otherwise at least one
    /// matching grant with satisfied conditions is required.
    pub fn can(&self, action: Action, subject: &dyn Subject) -> bool {
        self.query(action, subject.kind(), Some(subject))
    }

    /// Strict negation of [`Ability::can`].
    pub fn cannot(&self, action: Action, subject: &dyn Subject) -> bool {
        !self.can(action, subject)
    }

    /// Type-level query. Conditioned rules cannot be satisfied without
    /// concrete instance data, so only unconditional rules are considered.
    pub fn can_kind(&self, action: Action, kind: SubjectKind) -> bool {
        self.query(action, kind, None)
    }

    pub fn cannot_kind(&self, action: Action, kind: SubjectKind) -> bool {
        !self.can_kind(action, kind)
    }

    /// Narrow a fetched collection to the items the identity may act on,
    /// preserving the original order.
    pub fn filter_accessible<T: Subject>(&self, action: Action, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .filter(|item| self.can(action, item))
            .collect()
    }

    fn query(&self, action: Action, kind: SubjectKind, instance: Option<&dyn Subject>) -> bool {
        let mut granted = false;
        for rule in &self.rules {
            if !action_covers(rule.action, action) || !subject_covers(rule.subject, kind) {
                continue;
            }
            let applies = match instance {
                Some(subject) => conditions_hold(&rule.conditions, subject),
                None => rule.conditions.is_empty(),
            };
            if !applies {
                continue;
            }
            if rule.inverted {
                // Deny wins no matter how many grants also match.
                return false;
            }
            granted = true;
        }
        granted
    }
}

fn action_covers(rule_action: Action, queried: Action) -> bool {
    rule_action == queried || rule_action == Action::Manage
}

fn subject_covers(rule_subject: SubjectKind, queried: SubjectKind) -> bool {
    rule_subject == queried || rule_subject == SubjectKind::All
}

fn conditions_hold(conditions: &Conditions, subject: &dyn Subject) -> bool {
    conditions.iter().all(|(field, matcher)| {
        subject
            .field(*field)
            .is_some_and(|value| matcher.matches(value))
    })
}

/// Accumulates rules in declaration order and produces an [`Ability`].
#[derive(Debug, Default)]
pub struct AbilityBuilder {
    rules: Vec<Rule>,
}

impl AbilityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional grant.
    pub fn can(&mut self, action: Action, subject: SubjectKind) {
        self.push(action, subject, Vec::new(), false);
    }

    /// Grant scoped by field conditions.
    pub fn can_when(&mut self, action: Action, subject: SubjectKind, conditions: Conditions) {
        self.push(action, subject, conditions, false);
    }

    /// Unconditional deny.
    pub fn cannot(&mut self, action: Action, subject: SubjectKind) {
        self.push(action, subject, Vec::new(), true);
    }

    /// Deny scoped by field conditions.
    pub fn cannot_when(&mut self, action: Action, subject: SubjectKind, conditions: Conditions) {
        self.push(action, subject, conditions, true);
    }

    pub fn build(self) -> Ability {
        Ability { rules: self.rules }
    }

    fn push(&mut self, action: Action, subject: SubjectKind, conditions: Conditions, inverted: bool) {
        self.rules.push(Rule { action, subject, conditions, inverted });
    }
}
