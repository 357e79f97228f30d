//! Bearer-token authentication middleware.
//!
//! Every `/api` route passes through here. Requests without a resolvable
//! token are rejected with 401 before any handler runs; successful
//! resolution attaches an [`ActorContext`] to the request extensions.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

use stockline_auth::TokenDirectory;

use crate::context::ActorContext;

#[derive(Clone)]
pub struct AuthState {
    pub directory: Arc<TokenDirectory>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(request.headers()).ok_or(StatusCode::UNAUTHORIZED)?;
    let actor = state
        .directory
        .resolve(&token)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(ActorContext::new(actor));
    Ok(next.run(request).await)
}

/// Pulls the token out of `Authorization: Bearer <token>`. Returns `None`
/// for a missing header, a non-Bearer scheme, or an empty token.
fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
