//! Product catalogue endpoints.

use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Utc;

use stockline_auth::{require_role, Role};

use crate::app::dto::{DeactivateProductsRequest, DeactivateProductsResponse, ProductResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::ActorContext;

const DEACTIVATE_ROLES: &[Role] = &[Role::Admin];

pub fn router() -> Router {
    Router::new().route("/", get(list_products).delete(deactivate_products))
}

/// Active products of the caller's company. Any authenticated role.
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> Response {
    let products: Vec<ProductResponse> = services
        .products
        .list_active(ctx.actor().company_id)
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Json(products).into_response()
}

/// Soft-delete products by id. Admin only; ids outside the caller's company
/// (or already inactive) are ignored, and the count of rows actually
/// deactivated is returned.
pub async fn deactivate_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<DeactivateProductsRequest>,
) -> Response {
    let actor = ctx.actor();
    if let Err(err) = require_role(&actor, DEACTIVATE_ROLES) {
        return errors::authz_error_to_response(err);
    }

    match services
        .products
        .deactivate(&body.ids, actor.company_id, Utc::now())
    {
        Ok(deactivated) => Json(DeactivateProductsResponse { deactivated }).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}
