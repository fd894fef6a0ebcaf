use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::auth::ability::Action;
use crate::auth::cache::AbilityCache;
use crate::auth::csrf;
use crate::auth::session::AbilityContext;
use crate::directory::Directory;
use crate::errors::AppError;
use crate::models::invoice::Invoice;

fn find_invoice<'a>(directory: &'a Directory, id: &str) -> Result<&'a Invoice, AppError> {
    directory.find_invoice(id).ok_or(AppError::NotFound)
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
        .filter_accessible(Action::Read, directory.invoices().to_vec());
    Ok(HttpResponse::Ok().json(json!({ "count": visible.len(), "invoices": visible })))
}

pub async fn detail(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let invoice = find_invoice(&directory, &path)?;
    if ctx.ability.cannot(Action::Read, invoice) {
        return Err(AppError::PermissionDenied("invoice.read".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "invoice": invoice,
        "allowed": {
            "pay": ctx.ability.can(Action::Pay, invoice),
            "download": ctx.ability.can(Action::Download, invoice),
            "void": ctx.ability.can(Action::Void, invoice),
        },
    })))
}

pub async fn pay(
    req: HttpRequest,
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_header(&req, &session)?;

    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let invoice = find_invoice(&directory, &path)?;
    if ctx.ability.cannot(Action::Pay, invoice) {
        return Err(AppError::PermissionDenied("invoice.pay".to_string()));
    }
    if !invoice.is_payable() {
        return Ok(HttpResponse::Conflict().json(json!({ "error": "not_payable" })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "status": "payment_initiated",
        "invoice_id": invoice.id,
        "reference": invoice.reference,
        "amount_cents": invoice.amount_cents,
    })))
}

pub async fn void(
    req: HttpRequest,
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_header(&req, &session)?;

    let ctx = AbilityContext::load(&session, &directory, &abilities);
    let user = ctx.require_user()?;

    let invoice = find_invoice(&directory, &path)?;
    if ctx.ability.cannot(Action::Void, invoice) {
        return Err(AppError::PermissionDenied("invoice.void".to_string()));
    }

    log::info!("invoice {} voided by {}", invoice.id, user.id);
    Ok(HttpResponse::Ok().json(json!({
        "status": "voided",
        "invoice_id": invoice.id,
        "voided_by": user.id,
    })))
}

pub async fn download(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let invoice = find_invoice(&directory, &path)?;
    if ctx.ability.cannot(Action::Download, invoice) {
        return Err(AppError::PermissionDenied("invoice.download".to_string()));
    }

    // Receipt rendering lives outside this core; answer with the document
    // descriptor the renderer would consume.
    Ok(HttpResponse::Ok().json(json!({
        "document": "invoice_statement",
        "reference": invoice.reference,
        "student_id": invoice.student_id,
        "amount_cents": invoice.amount_cents,
        "due_date": invoice.due_date,
    })))
}
