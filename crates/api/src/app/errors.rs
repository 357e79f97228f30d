//! Domain-error to HTTP-response translation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use stockline_auth::AuthzError;
use stockline_core::DomainError;

/// Maps a [`DomainError`] onto the wire contract: a status code plus a
/// `{ "error": <code>, "message": <text> }` body.
pub fn domain_error_to_response(err: DomainError) -> Response {
    let (status, code) = match &err {
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        DomainError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        DomainError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
        DomainError::InsufficientStock { .. } => (StatusCode::CONFLICT, "insufficient_stock"),
        DomainError::EditWindowExpired => {
            (StatusCode::UNPROCESSABLE_ENTITY, "edit_window_expired")
        }
        DomainError::Busy => (StatusCode::SERVICE_UNAVAILABLE, "busy"),
    };
    json_error(status, code, err.to_string())
}

pub fn authz_error_to_response(err: AuthzError) -> Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    let body = json!({
        "error": code,
        "message": message.into(),
    });
    (status, axum::Json(body)).into_response()
}
