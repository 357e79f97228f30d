//! Liveness endpoint, outside the auth boundary.

use axum::http::StatusCode;

pub async fn health() -> StatusCode {
    StatusCode::OK
}
