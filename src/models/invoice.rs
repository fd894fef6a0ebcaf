use chrono::NaiveDate;
use serde::Serialize;

use crate::auth::ability::{Field, Subject, SubjectKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    PartiallyPaid,
    Paid,
    Overdue,
    Voided,
}

/// A fee invoice issued to a student.
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub id: String,
    /// Public reference printed on receipts, e.g. "INV-2026-0001".
    pub reference: String,
    pub student_id: String,
    pub institution_id: String,
    pub description: String,
    pub amount_cents: i64,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
}

impl Invoice {
    pub fn is_payable(&self) -> bool {
        matches!(
            self.status,
            InvoiceStatus::Pending | InvoiceStatus::PartiallyPaid | InvoiceStatus::Overdue
        )
    }
}

impl Subject for Invoice {
    fn kind(&self) -> SubjectKind {
        SubjectKind::Invoice
    }

    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Id => Some(&self.id),
            Field::StudentId => Some(&self.student_id),
            Field::InstitutionId => Some(&self.institution_id),
            Field::Role => None,
        }
    }
}
