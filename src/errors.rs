use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Session(String),
    PermissionDenied(String),
    Csrf,
    Hash(String),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::PermissionDenied(what) => write!(f, "Permission denied: {what}"),
            AppError::Csrf => write!(f, "Invalid or missing CSRF token"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Session(_) => {
                HttpResponse::Unauthorized().json(json!({ "error": "not_authenticated" }))
            }
            AppError::PermissionDenied(what) => HttpResponse::Forbidden()
                .json(json!({ "error": "forbidden", "denied": what })),
            AppError::Csrf => HttpResponse::Forbidden()
                .json(json!({ "error": "invalid_csrf_token" })),
            AppError::NotFound => {
                HttpResponse::NotFound().json(json!({ "error": "not_found" }))
            }
            AppError::Hash(_) => {
                log::error!("{self}");
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "internal_error" }))
            }
        }
    }
}
