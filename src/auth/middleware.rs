//! Actix binding for the route guard.

use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

use crate::auth::guard::{self, RouteDecision};
use crate::models::role::Role;

/// Middleware function applying the route-access table to every request.
/// The session role is resolved before any decision is made; a missing or
/// unreadable session is the anonymous role.
pub async fn route_guard(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let session = req.get_session();
    let role = session
        .get::<String>("role")
        .unwrap_or(None)
        .map(|value| Role::parse(&value))
        .unwrap_or(Role::Anonymous);

    match guard::decide(req.path(), role) {
        RouteDecision::Authorized => next.call(req).await.map(|res| res.map_into_left_body()),
        RouteDecision::RedirectToLogin { original } => {
            let location = format!("{}?redirect={original}", guard::SIGN_IN_PATH);
            let response = HttpResponse::SeeOther()
                .insert_header(("Location", location))
                .finish();
            Ok(req.into_response(response).map_into_right_body())
        }
        RouteDecision::RedirectToLanding { denied } => {
            log::info!("denied {} for role {}", denied, role.as_str());
            let location = format!("{}?denied={denied}", guard::LANDING_PATH);
            let response = HttpResponse::SeeOther()
                .insert_header(("Location", location))
                .finish();
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}
