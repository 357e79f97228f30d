//! Application wiring: router construction and shared state.

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router};
use tower::ServiceBuilder;

use stockline_auth::TokenDirectory;

use crate::middleware::{auth_middleware, AuthState};
use self::services::AppServices;

/// Builds the full application router.
///
/// `/health` is public; everything under `/api` sits behind the bearer
/// middleware and sees the shared [`AppServices`] via an extension.
pub fn build_app(services: Arc<AppServices>, directory: Arc<TokenDirectory>) -> Router {
    let auth_state = AuthState { directory };

    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
