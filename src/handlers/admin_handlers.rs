use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

use crate::auth::ability::Action;
use crate::auth::cache::AbilityCache;
use crate::auth::csrf;
use crate::auth::session::AbilityContext;
use crate::directory::Directory;
use crate::errors::AppError;
use crate::models::user::Profile;

pub async fn students(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let visible = ctx
        .ability
        .filter_accessible(Action::Read, directory.students().to_vec());
    Ok(HttpResponse::Ok().json(json!({ "count": visible.len(), "students": visible })))
}

pub async fn institutions(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let visible = ctx
        .ability
        .filter_accessible(Action::Read, directory.institutions().to_vec());
    Ok(HttpResponse::Ok().json(json!({ "institutions": visible })))
}

pub async fn support_tickets(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let visible = ctx
        .ability
        .filter_accessible(Action::Read, directory.tickets().to_vec());
    Ok(HttpResponse::Ok().json(json!({ "tickets": visible })))
}

pub async fn finance_transactions(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let payments = ctx
        .ability
        .filter_accessible(Action::Read, directory.payments().to_vec());
    let invoices = ctx
        .ability
        .filter_accessible(Action::Read, directory.invoices().to_vec());
    Ok(HttpResponse::Ok().json(json!({ "payments": payments, "invoices": invoices })))
}

pub async fn reconciliation(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let visible = ctx
        .ability
        .filter_accessible(Action::Read, directory.reconciliations().to_vec());
    Ok(HttpResponse::Ok().json(json!({ "reconciliations": visible })))
}

pub async fn merchants(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let visible = ctx
        .ability
        .filter_accessible(Action::Read, directory.merchants().to_vec());
    Ok(HttpResponse::Ok().json(json!({ "merchants": visible })))
}

pub async fn reports(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let visible = ctx
        .ability
        .filter_accessible(Action::Read, directory.reports().to_vec());
    Ok(HttpResponse::Ok().json(json!({ "reports": visible })))
}

/// Staff accounts the identity may administer. Exercises the role-field
/// condition from the `manage_admins` permission flag.
pub async fn admins(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let manageable: Vec<Profile> = directory
        .users()
        .iter()
        .filter(|candidate| ctx.ability.can(Action::Update, *candidate))
        .map(Profile::from)
        .collect();
    Ok(HttpResponse::Ok().json(json!({ "admins": manageable })))
}

#[derive(Deserialize)]
pub struct UserUpdateForm {
    pub name: String,
}

/// Update another user's record. The route table does not list this
/// path, so enforcement here is purely ability-level (self,
/// `manage_admins` holders, or support with the override flag).
pub async fn update_user(
    req: HttpRequest,
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
    path: web::Path<String>,
    form: web::Json<UserUpdateForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_header(&req, &session)?;

    let ctx = AbilityContext::load(&session, &directory, &abilities);
    ctx.require_user()?;

    let target = directory.find_user(&path).ok_or(AppError::NotFound)?;
    if ctx.ability.cannot(Action::Update, target) {
        return Err(AppError::PermissionDenied("user.update".to_string()));
    }

    let mut profile = Profile::from(target);
    profile.name = form.name.trim().to_string();
    Ok(HttpResponse::Ok().json(json!({ "updated": true, "profile": profile })))
}
