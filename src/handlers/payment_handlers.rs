use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::auth::ability::{Action, SubjectKind};
use crate::auth::cache::AbilityCache;
use crate::auth::csrf;
use crate::auth::session::AbilityContext;
use crate::directory::Directory;
use crate::errors::AppError;
use crate::models::payment::Payment;

fn find_payment<'a>(directory: &'a Directory, id: &str) -> Result<&'a Payment, AppError> {
    directory.find_payment(id).ok_or(AppError::NotFound)
}

pub async fn list(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let visible = ctx
        .ability
        .filter_accessible(Action::Read, directory.payments().to_vec());
    Ok(HttpResponse::Ok().json(json!({ "count": visible.len(), "payments": visible })))
}

/// Payment history groups the visible payments with their plans.
pub async fn history(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let payments = ctx
        .ability
        .filter_accessible(Action::Read, directory.payments().to_vec());
    let plans = ctx
        .ability
        .filter_accessible(Action::Read, directory.plans().to_vec());
    Ok(HttpResponse::Ok().json(json!({ "payments": payments, "plans": plans })))
}

pub async fn refund(
    req: HttpRequest,
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_header(&req, &session)?;

    let ctx = AbilityContext::load(&session, &directory, &abilities);
    let user = ctx.require_user()?;

    let payment = find_payment(&directory, &path)?;
    if ctx.ability.cannot(Action::Refund, payment) {
        return Err(AppError::PermissionDenied("payment.refund".to_string()));
    }

    log::info!("payment {} refunded by {}", payment.id, user.id);
    Ok(HttpResponse::Ok().json(json!({
        "status": "refund_initiated",
        "payment_id": payment.id,
        "amount_cents": payment.amount_cents,
    })))
}

pub async fn reconcile(
    req: HttpRequest,
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_header(&req, &session)?;

    let ctx = AbilityContext::load(&session, &directory, &abilities);
    let user = ctx.require_user()?;

    let payment = find_payment(&directory, &path)?;
    if ctx.ability.cannot(Action::Reconcile, payment) {
        return Err(AppError::PermissionDenied("payment.reconcile".to_string()));
    }

    let existing = directory
        .reconciliations()
        .iter()
        .find(|r| r.payment_id == payment.id);
    Ok(HttpResponse::Ok().json(json!({
        "status": "reconciled",
        "payment_id": payment.id,
        "reconciled_by": user.id,
        "previous": existing,
    })))
}

/// CSV-style export of the visible payments. Requires the export grant,
/// which plain read access does not imply.
pub async fn export(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    if ctx.ability.cannot_kind(Action::Export, SubjectKind::Payment) {
        return Err(AppError::PermissionDenied("payment.export".to_string()));
    }

    let rows: Vec<String> = directory
        .payments()
        .iter()
        .map(|p| format!("{},{},{},{}", p.id, p.student_id, p.amount_cents, p.method))
        .collect();
    Ok(HttpResponse::Ok().json(json!({
        "format": "csv",
        "header": "payment_id,student_id,amount_cents,method",
        "rows": rows,
    })))
}
