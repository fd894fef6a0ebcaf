//! Operational records: institutions, reports, reconciliation, support
//! tickets, merchants, clearance certificates.

use chrono::NaiveDate;
use serde::Serialize;

use crate::auth::ability::{Field, Subject, SubjectKind};

#[derive(Debug, Clone, Serialize)]
pub struct Institution {
    pub id: String,
    pub name: String,
    pub state: String,
}

impl Subject for Institution {
    fn kind(&self) -> SubjectKind {
        SubjectKind::Institution
    }

    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Id => Some(&self.id),
            Field::InstitutionId => Some(&self.id),
            Field::StudentId | Field::Role => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub id: String,
    pub institution_id: Option<String>,
    pub kind: String,
    pub title: String,
}

impl Subject for Report {
    fn kind(&self) -> SubjectKind {
        SubjectKind::Report
    }

    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Id => Some(&self.id),
            Field::InstitutionId => self.institution_id.as_deref(),
            Field::StudentId | Field::Role => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub id: String,
    pub institution_id: String,
    pub payment_id: String,
    pub matched: bool,
}

impl Subject for Reconciliation {
    fn kind(&self) -> SubjectKind {
        SubjectKind::Reconciliation
    }

    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Id => Some(&self.id),
            Field::InstitutionId => Some(&self.institution_id),
            Field::StudentId | Field::Role => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportTicket {
    pub id: String,
    pub opened_by: String,
    pub subject_line: String,
    pub status: TicketStatus,
}

impl Subject for SupportTicket {
    fn kind(&self) -> SubjectKind {
        SubjectKind::SupportTicket
    }

    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Id => Some(&self.id),
            Field::StudentId | Field::InstitutionId | Field::Role => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    pub onboarded: bool,
}

impl Subject for Merchant {
    fn kind(&self) -> SubjectKind {
        SubjectKind::Merchant
    }

    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Id => Some(&self.id),
            Field::StudentId | Field::InstitutionId | Field::Role => None,
        }
    }
}

/// Certificate that a student has no outstanding balance.
#[derive(Debug, Clone, Serialize)]
pub struct Clearance {
    pub id: String,
    pub student_id: String,
    pub institution_id: String,
    pub issued_on: NaiveDate,
}

impl Subject for Clearance {
    fn kind(&self) -> SubjectKind {
        SubjectKind::Clearance
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
