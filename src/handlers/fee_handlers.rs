use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::auth::ability::{Action, Field, SubjectFields};
use crate::auth::cache::AbilityCache;
use crate::auth::csrf;
use crate::auth::session::AbilityContext;
use crate::directory::Directory;
use crate::errors::AppError;

/// Payer fee view: per linked student, the fee assignments and their
/// schedules. Schedule records carry no student id, so the check overlays
/// the assignment's student onto the schedule subject.
pub async fn payer_fees(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let assignments = ctx
        .ability
        .filter_accessible(Action::Read, directory.fee_assignments().to_vec());

    let mut per_student = Vec::new();
    for student in &ctx.students {
        let own: Vec<_> = assignments
            .iter()
            .filter(|a| a.student_id == student.id)
            .collect();
        let schedules: Vec<_> = own
            .iter()
            .filter_map(|a| directory.find_fee_schedule(&a.fee_schedule_id))
            .filter(|schedule| {
                let scoped = SubjectFields::over(*schedule).with(Field::StudentId, &student.id);
                ctx.ability.can(Action::Read, &scoped)
            })
            .collect();
        per_student.push(json!({
            "student": student,
            "assignments": own,
            "schedules": schedules,
        }));
    }

    Ok(HttpResponse::Ok().json(json!({ "fees": per_student })))
}

/// Admin fee-schedule list, narrowed to what the identity may read.
pub async fn admin_schedules(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let visible = ctx
        .ability
        .filter_accessible(Action::Read, directory.fee_schedules().to_vec());
    Ok(HttpResponse::Ok().json(json!({ "fee_schedules": visible })))
}

/// Approve a fee schedule. Requires the approve grant, which only the
/// `approve_fees` permission flag (or the super admin) confers.
pub async fn approve_schedule(
    req: HttpRequest,
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_header(&req, &session)?;

    let ctx = AbilityContext::load(&session, &directory, &abilities);
    let user = ctx.require_user()?;

    let schedule = directory.find_fee_schedule(&path).ok_or(AppError::NotFound)?;
    if ctx.ability.cannot(Action::Approve, schedule) {
        return Err(AppError::PermissionDenied("fee_schedule.approve".to_string()));
    }
    if schedule.approved {
        return Ok(HttpResponse::Conflict().json(json!({ "error": "already_approved" })));
    }

    log::info!("fee schedule {} approved by {}", schedule.id, user.id);
    Ok(HttpResponse::Ok().json(json!({
        "status": "approved",
        "fee_schedule_id": schedule.id,
        "approved_by": user.id,
    })))
}
