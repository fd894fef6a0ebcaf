use serde::Serialize;

use crate::auth::ability::{Field, Subject, SubjectKind};

/// A student record. For guardians this is a linked dependent; a student
/// identity is its own single implicit linked entity.
#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub grade: String,
    /// Admission number shown on invoices and receipts.
    pub admission_no: String,
    pub institution_id: String,
    pub guardian_id: Option<String>,
}

impl Subject for Student {
    fn kind(&self) -> SubjectKind {
        SubjectKind::Student
    }

    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Id => Some(&self.id),
            // A student record's owning student is itself.
            Field::StudentId => Some(&self.id),
            Field::InstitutionId => Some(&self.institution_id),
            Field::Role => None,
        }
    }
}
