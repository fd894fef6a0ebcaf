//! In-memory demo dataset.
//!
//! Stands in for the platform's data services, which are outside this
//! core: one demo account per role, two institutions, linked students,
//! and enough billing records to exercise every permission path. The
//! dataset is immutable after seeding: handlers validate authorization
//! against it and answer with receipt documents rather than mutating it.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::models::fees::{FeeAssignment, FeeSchedule, FeeStructure};
use crate::models::invoice::{Invoice, InvoiceStatus};
use crate::models::ops::{
    Clearance, Institution, Merchant, Reconciliation, Report, SupportTicket, TicketStatus,
};
use crate::models::payment::{Payment, PaymentPlan, PaymentStatus, PlanStatus};
use crate::models::role::Role;
use crate::models::student::Student;
use crate::models::user::User;
use crate::auth::rules::{PERM_APPROVE_FEES, PERM_SUPPORT_OVERRIDE};

pub struct Directory {
    users: Vec<User>,
    students: Vec<Student>,
    institutions: Vec<Institution>,
    invoices: Vec<Invoice>,
    payments: Vec<Payment>,
    plans: Vec<PaymentPlan>,
    fee_structures: Vec<FeeStructure>,
    fee_schedules: Vec<FeeSchedule>,
    fee_assignments: Vec<FeeAssignment>,
    tickets: Vec<SupportTicket>,
    reconciliations: Vec<Reconciliation>,
    clearances: Vec<Clearance>,
    merchants: Vec<Merchant>,
    reports: Vec<Report>,
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid seed date")
}

fn timestamp(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid seed timestamp")
}

impl Directory {
    /// Seed the demo dataset. Every demo account shares `password_hash`
    /// (one argon2 hash computed at startup).
    pub fn seed(password_hash: &str) -> Self {
        let user = |id: &str, name: &str, email: &str, role: Role| User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            institution_id: None,
            permissions: Vec::new(),
            password_hash: password_hash.to_string(),
        };

        let mut institution_admin = user(
            "iadm-1",
            "Adaeze Okafor",
            "admin@harmony.payng.app",
            Role::InstitutionAdmin,
        );
        institution_admin.institution_id = Some("sch-1".to_string());
        institution_admin.permissions.push(PERM_APPROVE_FEES.to_string());

        let mut support_escalated = user(
            "sup-2",
            "Tunde Balogun",
            "support.lead@payng.app",
            Role::Support,
        );
        support_escalated
            .permissions
            .push(PERM_SUPPORT_OVERRIDE.to_string());

        let users = vec![
            user("par-1", "Ngozi Eze", "parent@demo.payng.app", Role::Parent),
            user("gua-1", "Chidi Obi", "guardian@demo.payng.app", Role::Guardian),
            user("stu-1", "Amara Eze", "student@demo.payng.app", Role::Student),
            institution_admin,
            user("sadm-1", "Platform Root", "root@payng.app", Role::SuperAdmin),
            user("sup-1", "Kemi Adesina", "support@payng.app", Role::Support),
            support_escalated,
            user("fin-1", "Yusuf Bello", "finance@payng.app", Role::Finance),
            user("mer-1", "Funke Alade", "merchant@payng.app", Role::Merchant),
        ];

        let student = |id: &str, name: &str, grade: &str, adm: &str, sch: &str, guardian: Option<&str>| {
            Student {
                id: id.to_string(),
                name: name.to_string(),
                grade: grade.to_string(),
                admission_no: adm.to_string(),
                institution_id: sch.to_string(),
                guardian_id: guardian.map(String::from),
            }
        };

        let students = vec![
            student("stu-1", "Amara Eze", "JSS 2", "HSS/2024/041", "sch-1", Some("par-1")),
            student("stu-2", "Obinna Eze", "SS 1", "HSS/2022/017", "sch-1", Some("par-1")),
            student("stu-3", "Ifeoma Obi", "JSS 3", "HSS/2023/088", "sch-1", Some("gua-1")),
            student("stu-4", "Sola Akin", "SS 2", "UC/2021/112", "sch-2", None),
        ];

        let institutions = vec![
            Institution {
                id: "sch-1".to_string(),
                name: "Harmony Secondary School".to_string(),
                state: "Lagos".to_string(),
            },
            Institution {
                id: "sch-2".to_string(),
                name: "Unity College".to_string(),
                state: "Abuja".to_string(),
            },
        ];

        let invoice = |id: &str, reference: &str, stu: &str, sch: &str, desc: &str, cents: i64, due: NaiveDate, status: InvoiceStatus| {
            Invoice {
                id: id.to_string(),
                reference: reference.to_string(),
                student_id: stu.to_string(),
                institution_id: sch.to_string(),
                description: desc.to_string(),
                amount_cents: cents,
                due_date: due,
                status,
            }
        };

        let invoices = vec![
            invoice("inv-1001", "INV-2026-1001", "stu-1", "sch-1", "Second term tuition", 18_500_000, date(2026, 2, 15), InvoiceStatus::Pending),
            invoice("inv-1002", "INV-2026-1002", "stu-2", "sch-1", "Second term tuition", 21_000_000, date(2026, 2, 15), InvoiceStatus::Paid),
            invoice("inv-1003", "INV-2026-1003", "stu-3", "sch-1", "Boarding fees", 9_500_000, date(2026, 1, 31), InvoiceStatus::Overdue),
            invoice("inv-2001", "INV-2026-2001", "stu-4", "sch-2", "Second term tuition", 24_000_000, date(2026, 2, 28), InvoiceStatus::Pending),
        ];

        let payment = |id: &str, inv: &str, stu: &str, sch: &str, cents: i64, method: &str, status: PaymentStatus, at: DateTime<Utc>| {
            Payment {
                id: id.to_string(),
                invoice_id: inv.to_string(),
                student_id: stu.to_string(),
                institution_id: sch.to_string(),
                amount_cents: cents,
                method: method.to_string(),
                status,
                paid_at: at,
            }
        };

        let payments = vec![
            payment("pay-1", "inv-1002", "stu-2", "sch-1", 21_000_000, "card", PaymentStatus::Completed, timestamp(2026, 1, 12, 9)),
            payment("pay-2", "inv-1003", "stu-3", "sch-1", 4_000_000, "transfer", PaymentStatus::Completed, timestamp(2026, 1, 20, 14)),
            payment("pay-3", "inv-2001", "stu-4", "sch-2", 24_000_000, "ussd", PaymentStatus::Pending, timestamp(2026, 2, 2, 16)),
        ];

        let plans = vec![PaymentPlan {
            id: "plan-1".to_string(),
            invoice_id: "inv-1001".to_string(),
            student_id: "stu-1".to_string(),
            institution_id: "sch-1".to_string(),
            installments: 3,
            installments_paid: 1,
            status: PlanStatus::Active,
        }];

        let fee_structures = vec![
            FeeStructure {
                id: "fstr-1".to_string(),
                institution_id: "sch-1".to_string(),
                category: "tuition".to_string(),
                description: "Termly tuition".to_string(),
            },
            FeeStructure {
                id: "fstr-2".to_string(),
                institution_id: "sch-2".to_string(),
                category: "boarding".to_string(),
                description: "Boarding and feeding".to_string(),
            },
        ];

        let fee_schedules = vec![
            FeeSchedule {
                id: "fsch-1".to_string(),
                institution_id: "sch-1".to_string(),
                class_name: "JSS 2".to_string(),
                term: "2026-T2".to_string(),
                amount_cents: 18_500_000,
                approved: false,
            },
            FeeSchedule {
                id: "fsch-2".to_string(),
                institution_id: "sch-1".to_string(),
                class_name: "SS 1".to_string(),
                term: "2026-T2".to_string(),
                amount_cents: 21_000_000,
                approved: true,
            },
            FeeSchedule {
                id: "fsch-3".to_string(),
                institution_id: "sch-2".to_string(),
                class_name: "SS 2".to_string(),
                term: "2026-T2".to_string(),
                amount_cents: 24_000_000,
                approved: true,
            },
        ];

        let fee_assignments = vec![
            FeeAssignment {
                id: "fa-1".to_string(),
                fee_schedule_id: "fsch-1".to_string(),
                student_id: "stu-1".to_string(),
                institution_id: "sch-1".to_string(),
            },
            FeeAssignment {
                id: "fa-2".to_string(),
                fee_schedule_id: "fsch-2".to_string(),
                student_id: "stu-2".to_string(),
                institution_id: "sch-1".to_string(),
            },
            FeeAssignment {
                id: "fa-3".to_string(),
                fee_schedule_id: "fsch-3".to_string(),
                student_id: "stu-4".to_string(),
                institution_id: "sch-2".to_string(),
            },
        ];

        let tickets = vec![
            SupportTicket {
                id: "tick-1".to_string(),
                opened_by: "par-1".to_string(),
                subject_line: "Receipt not received after card payment".to_string(),
                status: TicketStatus::Open,
            },
            SupportTicket {
                id: "tick-2".to_string(),
                opened_by: "gua-1".to_string(),
                subject_line: "Wrong amount on boarding invoice".to_string(),
                status: TicketStatus::InProgress,
            },
        ];

        let reconciliations = vec![
            Reconciliation {
                id: "rec-1".to_string(),
                institution_id: "sch-1".to_string(),
                payment_id: "pay-1".to_string(),
                matched: true,
            },
            Reconciliation {
                id: "rec-2".to_string(),
                institution_id: "sch-2".to_string(),
                payment_id: "pay-3".to_string(),
                matched: false,
            },
        ];

        let clearances = vec![Clearance {
            id: "clr-1".to_string(),
            student_id: "stu-2".to_string(),
            institution_id: "sch-1".to_string(),
            issued_on: date(2026, 1, 15),
        }];

        let merchants = vec![Merchant {
            id: "mcht-1".to_string(),
            name: "Alade Payments Ltd".to_string(),
            onboarded: false,
        }];

        let reports = vec![
            Report {
                id: "rep-1".to_string(),
                institution_id: Some("sch-1".to_string()),
                kind: "collections".to_string(),
                title: "Collections — Harmony Secondary School".to_string(),
            },
            Report {
                id: "rep-2".to_string(),
                institution_id: None,
                kind: "platform".to_string(),
                title: "Platform settlement summary".to_string(),
            },
        ];

        Directory {
            users,
            students,
            institutions,
            invoices,
            payments,
            plans,
            fee_structures,
            fee_schedules,
            fee_assignments,
            tickets,
            reconciliations,
            clearances,
            merchants,
            reports,
        }
    }

    pub fn find_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email.eq_ignore_ascii_case(email))
    }

    /// The students an identity is linked to: a guardian's dependents, or
    /// the student's own record. Other roles have none.
    pub fn students_linked_to(&self, user: &User) -> Vec<Student> {
        match user.role {
            Role::Parent | Role::Guardian => self
                .students
                .iter()
                .filter(|s| s.guardian_id.as_deref() == Some(user.id.as_str()))
                .cloned()
                .collect(),
            Role::Student => self
                .students
                .iter()
                .filter(|s| s.id == user.id)
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn institutions(&self) -> &[Institution] {
        &self.institutions
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn find_invoice(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn find_payment(&self, id: &str) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id == id)
    }

    pub fn plans(&self) -> &[PaymentPlan] {
        &self.plans
    }

    pub fn fee_structures(&self) -> &[FeeStructure] {
        &self.fee_structures
    }

    pub fn fee_schedules(&self) -> &[FeeSchedule] {
        &self.fee_schedules
    }

    pub fn find_fee_schedule(&self, id: &str) -> Option<&FeeSchedule> {
        self.fee_schedules.iter().find(|f| f.id == id)
    }

    pub fn fee_assignments(&self) -> &[FeeAssignment] {
        &self.fee_assignments
    }

    pub fn tickets(&self) -> &[SupportTicket] {
        &self.tickets
    }

    pub fn reconciliations(&self) -> &[Reconciliation] {
        &self.reconciliations
    }

    pub fn clearances(&self) -> &[Clearance] {
        &self.clearances
    }

    pub fn merchants(&self) -> &[Merchant] {
        &self.merchants
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }
}
