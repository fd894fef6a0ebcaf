use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

use crate::auth::ability::Action;
use crate::auth::cache::AbilityCache;
use crate::auth::guard::{GateOutcome, RoleGate};
use crate::auth::rate_limit::RateLimiter;
use crate::auth::session::{self, AbilityContext};
use crate::auth::{csrf, password};
use crate::directory::Directory;
use crate::errors::AppError;
use crate::models::user::Profile;

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub redirect: Option<String>,
}

#[derive(Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub csrf_token: String,
}

/// Only same-site absolute paths are honored for post-login redirects.
fn safe_redirect_target(target: Option<&str>) -> &str {
    match target {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/dashboard",
    }
}

pub async fn login_page(session: Session) -> Result<HttpResponse, AppError> {
    // Already signed in: straight to the dashboard.
    if session::current_user_id(&session).is_some() {
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/dashboard"))
            .finish());
    }
    let csrf_token = csrf::get_or_create_token(&session);
    Ok(HttpResponse::Ok().json(json!({ "page": "login", "csrf_token": csrf_token })))
}

pub async fn login_submit(
    req: HttpRequest,
    directory: web::Data<Directory>,
    session: Session,
    form: web::Form<LoginForm>,
    query: web::Query<LoginQuery>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    // Rate-limit check before any credential work.
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or_else(|| std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));

    if limiter.is_blocked(ip) {
        return Ok(HttpResponse::TooManyRequests().json(json!({
            "error": "too_many_attempts",
            "message": "Too many failed login attempts. Please try again later.",
        })));
    }

    if let Some(user) = directory.find_user_by_email(&form.email) {
        if password::verify_password(&form.password, &user.password_hash)? {
            limiter.clear(ip);
            let students = directory.students_linked_to(user);
            session::sign_in(&session, user, &students)?;

            let target = safe_redirect_target(query.redirect.as_deref());
            return Ok(HttpResponse::SeeOther()
                .insert_header(("Location", target.to_string()))
                .finish());
        }
    }

    limiter.record_failure(ip);
    Ok(HttpResponse::Unauthorized().json(json!({ "error": "invalid_credentials" })))
}

pub async fn logout(session: Session) -> Result<HttpResponse, AppError> {
    session::sign_out(&session);
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/login"))
        .finish())
}

/// Self profile. The route table allows anonymous here, so the gate
/// renders a signed-out document instead of redirecting.
pub async fn profile(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);

    let gate = RoleGate::authenticated().allow_anonymous().suppress_redirect();
    if gate.evaluate(ctx.role(), &ctx.ability, "/profile") != GateOutcome::Render
        || ctx.user.is_none()
    {
        return Ok(HttpResponse::Ok().json(json!({ "signed_in": false, "profile": null })));
    }

    let user = ctx.require_user()?;
    Ok(HttpResponse::Ok().json(json!({
        "signed_in": true,
        "profile": Profile::from(user),
        "students": ctx.students,
    })))
}

pub async fn profile_update(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
    form: web::Form<ProfileForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let ctx = AbilityContext::load(&session, &directory, &abilities);
    let user = ctx.require_user()?;
    if ctx.ability.cannot(Action::Update, user) {
        return Err(AppError::PermissionDenied("user.update".to_string()));
    }

    let mut profile = Profile::from(user);
    profile.name = form.name.trim().to_string();
    Ok(HttpResponse::Ok().json(json!({ "updated": true, "profile": profile })))
}
