//! Per-role rule definition.
//!
//! [`define_rules_for`] is the single place permissions are declared. It is
//! pure and deterministic: the same identity and linked students always
//! produce the same rule list, regardless of call order or prior state.
//! Consumers re-invoke it (through `auth::cache`) whenever the identity or
//! its linked students change; the produced [`Ability`] is an immutable
//! value replaced wholesale, so readers never observe a partial rule set.
//!
//! Blocks append in a fixed order and later blocks never retract earlier
//! grants; retraction is the evaluator's deny precedence, not ordering.

use crate::auth::ability::{Ability, AbilityBuilder, Action, Field, SubjectKind, eq, one_of};
use crate::models::role::Role;
use crate::models::student::Student;
use crate::models::user::User;

/// Permission flag letting institution staff approve fee schedules.
pub const PERM_APPROVE_FEES: &str = "approve_fees";
/// Permission flag granting student management outside the admin role.
pub const PERM_MANAGE_STUDENTS: &str = "manage_students";
/// Permission flag exposing financial reports.
pub const PERM_VIEW_FINANCE: &str = "view_finance";
/// Permission flag for administering staff accounts.
pub const PERM_MANAGE_ADMINS: &str = "manage_admins";
/// Escalation flag letting support void invoices, refund payments, and
/// edit user/student records outside normal scoping.
pub const PERM_SUPPORT_OVERRIDE: &str = "support_override";

/// Build the full rule list for an identity and its linked students.
///
/// No identity, the anonymous role, or an unrecognized role yields the
/// empty ability: zero grants, every query false.
pub fn define_rules_for(user: Option<&User>, students: &[Student]) -> Ability {
    let Some(user) = user else {
        return Ability::default();
    };
    if user.role == Role::Anonymous {
        return Ability::default();
    }

    let mut b = AbilityBuilder::new();

    // Super admin: one universal grant, nothing else to build.
    if user.role == Role::SuperAdmin {
        b.can(Action::Manage, SubjectKind::All);
        return b.build();
    }

    linked_entity_rules(&mut b, user, students);
    institution_admin_rules(&mut b, user);
    operational_rules(&mut b, user);

    // Self profile: every authenticated role may view and edit its own
    // user record.
    b.can_when(Action::Read, SubjectKind::User, vec![eq(Field::Id, user.id.as_str())]);
    b.can_when(Action::Update, SubjectKind::User, vec![eq(Field::Id, user.id.as_str())]);

    held_permission_rules(&mut b, user);

    b.build()
}

/// Grants scoped to the students the identity is linked to: a guardian's
/// dependents, or the student's own record.
fn linked_entity_rules(b: &mut AbilityBuilder, user: &User, students: &[Student]) {
    match user.role {
        Role::Parent | Role::Guardian => {
            let ids: Vec<&str> = students.iter().map(|s| s.id.as_str()).collect();
            if ids.is_empty() {
                return;
            }
            let owned = |field| one_of(field, ids.iter().copied());

            b.can_when(Action::Read, SubjectKind::Invoice, vec![owned(Field::StudentId)]);
            b.can_when(Action::Download, SubjectKind::Invoice, vec![owned(Field::StudentId)]);
            b.can_when(Action::Pay, SubjectKind::Invoice, vec![owned(Field::StudentId)]);

            b.can_when(Action::Create, SubjectKind::Payment, vec![owned(Field::StudentId)]);
            b.can_when(Action::Read, SubjectKind::Payment, vec![owned(Field::StudentId)]);
            b.can_when(Action::Download, SubjectKind::Payment, vec![owned(Field::StudentId)]);

            b.can_when(Action::Read, SubjectKind::PaymentPlan, vec![owned(Field::StudentId)]);
            b.can_when(Action::Create, SubjectKind::PaymentPlan, vec![owned(Field::StudentId)]);
            b.can_when(Action::Update, SubjectKind::PaymentPlan, vec![owned(Field::StudentId)]);
            b.can_when(Action::Cancel, SubjectKind::PaymentPlan, vec![owned(Field::StudentId)]);

            b.can_when(Action::Read, SubjectKind::Student, vec![owned(Field::Id)]);
            b.can_when(Action::Read, SubjectKind::FeeSchedule, vec![owned(Field::StudentId)]);
            b.can_when(Action::Read, SubjectKind::FeeAssignment, vec![owned(Field::StudentId)]);

            b.can_when(Action::Read, SubjectKind::Clearance, vec![owned(Field::StudentId)]);
            b.can_when(Action::Download, SubjectKind::Clearance, vec![owned(Field::StudentId)]);
        }
        Role::Student => {
            // Read-only over the student's own data; the identity id is the
            // owning student id.
            let own = |field| eq(field, user.id.as_str());

            b.can_when(Action::Read, SubjectKind::Invoice, vec![own(Field::StudentId)]);
            b.can_when(Action::Download, SubjectKind::Invoice, vec![own(Field::StudentId)]);

            b.can_when(Action::Read, SubjectKind::Payment, vec![own(Field::StudentId)]);
            b.can_when(Action::Download, SubjectKind::Payment, vec![own(Field::StudentId)]);

            b.can_when(Action::Read, SubjectKind::FeeSchedule, vec![own(Field::StudentId)]);
            b.can_when(Action::Read, SubjectKind::FeeAssignment, vec![own(Field::StudentId)]);

            b.can_when(Action::Read, SubjectKind::Clearance, vec![own(Field::StudentId)]);
            b.can_when(Action::Download, SubjectKind::Clearance, vec![own(Field::StudentId)]);

            b.can_when(Action::Read, SubjectKind::Student, vec![own(Field::Id)]);
        }
        _ => {}
    }
}

/// Tenant-scoped grants for institution admins. Requires an institution
/// affiliation; without one the whole block is omitted and the identity
/// falls back to the self-profile block.
fn institution_admin_rules(b: &mut AbilityBuilder, user: &User) {
    if user.role != Role::InstitutionAdmin {
        return;
    }
    let Some(institution_id) = user.institution_id.as_deref() else {
        return;
    };
    let tenant = || vec![eq(Field::InstitutionId, institution_id)];

    b.can_when(Action::Manage, SubjectKind::Student, tenant());
    b.can_when(Action::Manage, SubjectKind::FeeStructure, tenant());
    b.can_when(Action::Manage, SubjectKind::FeeSchedule, tenant());
    b.can_when(Action::Manage, SubjectKind::FeeAssignment, tenant());

    b.can_when(Action::Read, SubjectKind::Invoice, tenant());
    b.can_when(Action::Download, SubjectKind::Invoice, tenant());
    b.can_when(Action::Read, SubjectKind::Payment, tenant());
    b.can_when(Action::Download, SubjectKind::Payment, tenant());
    b.can_when(Action::Read, SubjectKind::PaymentPlan, tenant());

    b.can_when(Action::Reconcile, SubjectKind::Payment, tenant());
    b.can_when(Action::Read, SubjectKind::Reconciliation, tenant());
    b.can_when(Action::Create, SubjectKind::Reconciliation, tenant());

    b.can_when(Action::Read, SubjectKind::Report, tenant());
    b.can_when(Action::Export, SubjectKind::Report, tenant());
}

/// Cross-tenant grants for the operational roles: support, finance,
/// merchant. These read across institutions as their function requires.
fn operational_rules(b: &mut AbilityBuilder, user: &User) {
    match user.role {
        Role::Support => {
            b.can(Action::Read, SubjectKind::Invoice);
            b.can(Action::Read, SubjectKind::Payment);
            b.can(Action::Read, SubjectKind::PaymentPlan);
            b.can(Action::Read, SubjectKind::User);
            b.can(Action::Read, SubjectKind::Student);
            b.can(Action::Read, SubjectKind::Report);

            b.can(Action::Manage, SubjectKind::SupportTicket);

            if user.has_permission(PERM_SUPPORT_OVERRIDE) {
                // Escalation path: void/refund/edit outside normal scoping.
                b.can(Action::Void, SubjectKind::Invoice);
                b.can(Action::Refund, SubjectKind::Payment);
                b.can(Action::Update, SubjectKind::User);
                b.can(Action::Update, SubjectKind::Student);
            }
        }
        Role::Finance => {
            b.can(Action::Read, SubjectKind::Payment);
            b.can(Action::Read, SubjectKind::Invoice);
            b.can(Action::Read, SubjectKind::PaymentPlan);
            b.can(Action::Download, SubjectKind::Payment);
            b.can(Action::Download, SubjectKind::Invoice);

            b.can(Action::Reconcile, SubjectKind::Payment);
            b.can(Action::Read, SubjectKind::Reconciliation);
            b.can(Action::Create, SubjectKind::Reconciliation);
            b.can(Action::Update, SubjectKind::Reconciliation);

            b.can(Action::Read, SubjectKind::Report);
            b.can(Action::Export, SubjectKind::Report);
            b.can(Action::Export, SubjectKind::Payment);
            b.can(Action::Export, SubjectKind::Invoice);

            b.can(Action::Read, SubjectKind::User);
            b.can(Action::Read, SubjectKind::Institution);
        }
        Role::Merchant => {
            b.can(Action::Manage, SubjectKind::Merchant);
            b.can(Action::Read, SubjectKind::Reconciliation);
            b.can(Action::Read, SubjectKind::Payment);
        }
        _ => {}
    }
}

/// Supplemental grants from held permission flags, independent of role.
/// Flags scope to the identity's institution when it has one.
fn held_permission_rules(b: &mut AbilityBuilder, user: &User) {
    let tenant_scope = |action: Action, subject: SubjectKind, b: &mut AbilityBuilder| {
        match user.institution_id.as_deref() {
            Some(institution_id) => {
                b.can_when(action, subject, vec![eq(Field::InstitutionId, institution_id)]);
            }
            None => b.can(action, subject),
        }
    };

    if user.has_permission(PERM_MANAGE_STUDENTS) {
        tenant_scope(Action::Manage, SubjectKind::Student, b);
    }
    if user.has_permission(PERM_APPROVE_FEES) {
        tenant_scope(Action::Approve, SubjectKind::FeeSchedule, b);
    }
    if user.has_permission(PERM_VIEW_FINANCE) {
        tenant_scope(Action::Read, SubjectKind::Report, b);
    }
    if user.has_permission(PERM_MANAGE_ADMINS) {
        let staff = || {
            vec![one_of(
                Field::Role,
                [
                    Role::InstitutionAdmin.as_str(),
                    Role::Support.as_str(),
                    Role::Finance.as_str(),
                    Role::Merchant.as_str(),
                ],
            )]
        };
        b.can_when(Action::Manage, SubjectKind::User, staff());
        b.can_when(Action::Read, SubjectKind::User, staff());
        b.can_when(Action::Create, SubjectKind::User, staff());
        b.can_when(Action::Update, SubjectKind::User, staff());
        b.can_when(Action::Delete, SubjectKind::User, staff());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ability::{ALL_ACTIONS, ALL_SUBJECTS, SubjectFields};

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{id}@example.com"),
            role,
            institution_id: None,
            permissions: Vec::new(),
            password_hash: String::new(),
        }
    }

    fn student(id: &str, institution_id: &str, guardian_id: Option<&str>) -> Student {
        Student {
            id: id.to_string(),
            name: id.to_string(),
            grade: "JSS 2".to_string(),
            admission_no: format!("ADM-{id}"),
            institution_id: institution_id.to_string(),
            guardian_id: guardian_id.map(String::from),
        }
    }

    fn invoice_owned_by(student_id: &str) -> SubjectFields {
        SubjectFields::new(SubjectKind::Invoice)
            .with(Field::Id, format!("inv-{student_id}"))
            .with(Field::StudentId, student_id)
            .with(Field::InstitutionId, "sch-1")
    }

    #[test]
    fn no_identity_means_no_grants() {
        let ability = define_rules_for(None, &[]);
        assert!(ability.is_empty());
        for action in ALL_ACTIONS {
            for kind in ALL_SUBJECTS {
                assert!(!ability.can_kind(*action, *kind));
            }
        }
    }

    #[test]
    fn anonymous_role_means_no_grants() {
        let ability = define_rules_for(Some(&user("u-1", Role::Anonymous)), &[]);
        assert!(ability.is_empty());
    }

    #[test]
    fn builder_is_deterministic() {
        let guardian = user("par-1", Role::Parent);
        let linked = vec![student("stu-a", "sch-1", Some("par-1"))];
        let first = define_rules_for(Some(&guardian), &linked);
        let second = define_rules_for(Some(&guardian), &linked);
        assert_eq!(first.rules(), second.rules());
    }

    #[test]
    fn super_admin_holds_every_action_on_every_subject() {
        let ability = define_rules_for(Some(&user("adm-1", Role::SuperAdmin)), &[]);
        assert_eq!(ability.rules().len(), 1);
        for action in ALL_ACTIONS {
            for kind in ALL_SUBJECTS {
                let foreign = SubjectFields::new(*kind)
                    .with(Field::InstitutionId, "sch-other")
                    .with(Field::StudentId, "stu-other");
                assert!(ability.can(*action, &foreign), "{action:?} on {kind:?}");
            }
        }
    }

    #[test]
    fn parent_is_scoped_to_linked_students() {
        let guardian = user("par-1", Role::Parent);
        let linked = vec![
            student("stu-a", "sch-1", Some("par-1")),
            student("stu-b", "sch-1", Some("par-1")),
        ];
        let ability = define_rules_for(Some(&guardian), &linked);

        assert!(ability.can(Action::Read, &invoice_owned_by("stu-a")));
        assert!(ability.can(Action::Read, &invoice_owned_by("stu-b")));
        assert!(ability.can(Action::Pay, &invoice_owned_by("stu-a")));
        assert!(!ability.can(Action::Read, &invoice_owned_by("stu-c")));
        assert!(!ability.can(Action::Pay, &invoice_owned_by("stu-c")));
    }

    #[test]
    fn parent_without_linked_students_keeps_only_self_profile() {
        let guardian = user("par-1", Role::Parent);
        let ability = define_rules_for(Some(&guardian), &[]);

        assert!(!ability.can(Action::Read, &invoice_owned_by("stu-a")));
        let own = SubjectFields::new(SubjectKind::User).with(Field::Id, "par-1");
        assert!(ability.can(Action::Read, &own));
        assert!(ability.can(Action::Update, &own));
    }

    #[test]
    fn student_reads_own_data_but_cannot_pay() {
        let learner = user("stu-a", Role::Student);
        let ability = define_rules_for(Some(&learner), &[]);

        assert!(ability.can(Action::Read, &invoice_owned_by("stu-a")));
        assert!(ability.can(Action::Download, &invoice_owned_by("stu-a")));
        assert!(!ability.can(Action::Pay, &invoice_owned_by("stu-a")));
        assert!(!ability.can(Action::Read, &invoice_owned_by("stu-b")));

        let clearance = SubjectFields::new(SubjectKind::Clearance)
            .with(Field::StudentId, "stu-a");
        assert!(ability.can(Action::Download, &clearance));
    }

    #[test]
    fn institution_admin_is_tenant_scoped() {
        let mut admin = user("iadm-1", Role::InstitutionAdmin);
        admin.institution_id = Some("sch-1".to_string());
        let ability = define_rules_for(Some(&admin), &[]);

        let own_student = SubjectFields::new(SubjectKind::Student)
            .with(Field::Id, "stu-a")
            .with(Field::InstitutionId, "sch-1");
        let other_student = SubjectFields::new(SubjectKind::Student)
            .with(Field::Id, "stu-z")
            .with(Field::InstitutionId, "sch-2");

        assert!(ability.can(Action::Manage, &own_student));
        assert!(ability.can(Action::Delete, &own_student));
        assert!(!ability.can(Action::Read, &other_student));

        let own_payment = SubjectFields::new(SubjectKind::Payment)
            .with(Field::InstitutionId, "sch-1");
        assert!(ability.can(Action::Reconcile, &own_payment));
        assert!(!ability.can(Action::Refund, &own_payment));
    }

    #[test]
    fn institution_admin_without_institution_gets_no_tenant_block() {
        let admin = user("iadm-1", Role::InstitutionAdmin);
        let ability = define_rules_for(Some(&admin), &[]);

        let anyone = SubjectFields::new(SubjectKind::Student)
            .with(Field::Id, "stu-a")
            .with(Field::InstitutionId, "sch-1");
        assert!(!ability.can(Action::Manage, &anyone));

        // Self profile still applies.
        let own = SubjectFields::new(SubjectKind::User).with(Field::Id, "iadm-1");
        assert!(ability.can(Action::Update, &own));
    }

    #[test]
    fn support_override_gates_void_and_refund() {
        let plain = user("sup-1", Role::Support);
        let ability = define_rules_for(Some(&plain), &[]);
        assert!(ability.can(Action::Read, &invoice_owned_by("stu-a")));
        assert!(!ability.can(Action::Void, &invoice_owned_by("stu-a")));

        let mut escalated = user("sup-1", Role::Support);
        escalated.permissions.push(PERM_SUPPORT_OVERRIDE.to_string());
        let ability = define_rules_for(Some(&escalated), &[]);
        assert!(ability.can(Action::Void, &invoice_owned_by("stu-a")));
        let payment = SubjectFields::new(SubjectKind::Payment)
            .with(Field::StudentId, "stu-a");
        assert!(ability.can(Action::Refund, &payment));
    }

    #[test]
    fn finance_reconciles_and_exports_across_tenants() {
        let ability = define_rules_for(Some(&user("fin-1", Role::Finance)), &[]);

        assert!(ability.can_kind(Action::Reconcile, SubjectKind::Payment));
        assert!(ability.can_kind(Action::Export, SubjectKind::Report));
        assert!(ability.can_kind(Action::Read, SubjectKind::Institution));
        assert!(!ability.can_kind(Action::Refund, SubjectKind::Payment));
    }

    #[test]
    fn merchant_manages_merchants_only() {
        let ability = define_rules_for(Some(&user("mer-1", Role::Merchant)), &[]);

        assert!(ability.can_kind(Action::Manage, SubjectKind::Merchant));
        assert!(ability.can_kind(Action::Read, SubjectKind::Reconciliation));
        assert!(ability.can_kind(Action::Read, SubjectKind::Payment));
        assert!(!ability.can_kind(Action::Read, SubjectKind::Invoice));
        assert!(!ability.can_kind(Action::Read, SubjectKind::User));
    }

    #[test]
    fn self_profile_holds_for_every_role_and_only_self() {
        for role in [
            Role::Parent,
            Role::Guardian,
            Role::Student,
            Role::InstitutionAdmin,
            Role::Support,
            Role::Finance,
            Role::Merchant,
        ] {
            let me = user("me-1", role);
            let ability = define_rules_for(Some(&me), &[]);
            let own = SubjectFields::new(SubjectKind::User).with(Field::Id, "me-1");
            let other = SubjectFields::new(SubjectKind::User).with(Field::Id, "someone-else");
            assert!(ability.can(Action::Read, &own), "read own profile as {role:?}");
            assert!(ability.can(Action::Update, &own), "update own profile as {role:?}");
            assert!(!ability.can(Action::Update, &other), "update other as {role:?}");
        }
    }

    #[test]
    fn approve_fees_flag_scopes_to_institution_when_present() {
        let mut admin = user("iadm-1", Role::InstitutionAdmin);
        admin.institution_id = Some("sch-1".to_string());
        admin.permissions.push(PERM_APPROVE_FEES.to_string());
        let ability = define_rules_for(Some(&admin), &[]);

        let own_schedule = SubjectFields::new(SubjectKind::FeeSchedule)
            .with(Field::InstitutionId, "sch-1");
        let other_schedule = SubjectFields::new(SubjectKind::FeeSchedule)
            .with(Field::InstitutionId, "sch-2");
        assert!(ability.can(Action::Approve, &own_schedule));
        assert!(!ability.can(Action::Approve, &other_schedule));
    }

    #[test]
    fn manage_admins_flag_is_limited_to_staff_roles() {
        let mut sup = user("sup-1", Role::Support);
        sup.permissions.push(PERM_MANAGE_ADMINS.to_string());
        let ability = define_rules_for(Some(&sup), &[]);

        let finance_user = SubjectFields::new(SubjectKind::User)
            .with(Field::Id, "fin-9")
            .with(Field::Role, Role::Finance.as_str());
        let parent_user = SubjectFields::new(SubjectKind::User)
            .with(Field::Id, "par-9")
            .with(Field::Role, Role::Parent.as_str());
        assert!(ability.can(Action::Update, &finance_user));
        assert!(ability.can(Action::Delete, &finance_user));
        assert!(!ability.can(Action::Delete, &parent_user));
    }
}
