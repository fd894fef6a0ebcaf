use serde::Serialize;

use crate::auth::ability::{Field, Subject, SubjectKind};

/// A fee category defined by an institution (tuition, boarding, transport).
#[derive(Debug, Clone, Serialize)]
pub struct FeeStructure {
    pub id: String,
    pub institution_id: String,
    pub category: String,
    pub description: String,
}

impl Subject for FeeStructure {
    fn kind(&self) -> SubjectKind {
        SubjectKind::FeeStructure
    }

    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Id => Some(&self.id),
            Field::InstitutionId => Some(&self.institution_id),
            Field::StudentId | Field::Role => None,
        }
    }
}

/// A priced fee for a class and term, pending approval before billing.
#[derive(Debug, Clone, Serialize)]
pub struct FeeSchedule {
    pub id: String,
    pub institution_id: String,
    pub class_name: String,
    pub term: String,
    pub amount_cents: i64,
    pub approved: bool,
}

impl Subject for FeeSchedule {
    fn kind(&self) -> SubjectKind {
        SubjectKind::FeeSchedule
    }

    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Id => Some(&self.id),
            Field::InstitutionId => Some(&self.institution_id),
            Field::StudentId | Field::Role => None,
        }
    }
}

/// Assignment of a fee schedule to a specific student.
#[derive(Debug, Clone, Serialize)]
pub struct FeeAssignment {
    pub id: String,
    pub fee_schedule_id: String,
    pub student_id: String,
    pub institution_id: String,
}

impl Subject for FeeAssignment {
    fn kind(&self) -> SubjectKind {
        SubjectKind::FeeAssignment
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
