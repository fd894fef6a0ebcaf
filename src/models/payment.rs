use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::ability::{Field, Subject, SubjectKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
    Pending,
    Failed,
    Refunded,
}

/// A payment recorded against an invoice.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: String,
    pub invoice_id: String,
    pub student_id: String,
    pub institution_id: String,
    pub amount_cents: i64,
    pub method: String,
    pub status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
}

impl Subject for Payment {
    fn kind(&self) -> SubjectKind {
        SubjectKind::Payment
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Active,
    Completed,
    Cancelled,
}

/// An installment plan spreading an invoice over several payments.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentPlan {
    pub id: String,
    pub invoice_id: String,
    pub student_id: String,
    pub institution_id: String,
    pub installments: u32,
    pub installments_paid: u32,
    pub status: PlanStatus,
}

impl Subject for PaymentPlan {
    fn kind(&self) -> SubjectKind {
        SubjectKind::PaymentPlan
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
