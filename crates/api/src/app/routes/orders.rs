//! Order lifecycle endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Extension, Json, Router};
use chrono::Utc;

use stockline_auth::{require_role, Role};
use stockline_core::OrderId;
use stockline_export::orders_to_csv;
use stockline_orders::OrderPatch;

use crate::app::dto::{CreateOrderBody, OrderResponse, UpdateOrderRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::ActorContext;

const CREATE_ROLES: &[Role] = &[Role::Admin, Role::Operator];
const UPDATE_ROLES: &[Role] = &[Role::Operator];

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_orders))
        .route("/export", get(export_orders))
        .route("/:id", patch(update_order))
}

/// Create one order or a batch. Each order reserves stock atomically on its
/// own; in the batch form the first failure aborts the request with that
/// error, and orders already created by the same request stand.
pub async fn create_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<CreateOrderBody>,
) -> Response {
    let actor = ctx.actor();
    if let Err(err) = require_role(&actor, CREATE_ROLES) {
        return errors::authz_error_to_response(err);
    }

    match body {
        CreateOrderBody::One(request) => {
            match services.lifecycle.create_order(
                actor.company_id,
                actor.user_id,
                request.into(),
                Utc::now(),
            ) {
                Ok(order) => {
                    (StatusCode::CREATED, Json(OrderResponse::from(order))).into_response()
                }
                Err(err) => errors::domain_error_to_response(err),
            }
        }
        CreateOrderBody::Many(requests) => {
            let mut created = Vec::with_capacity(requests.len());
            for request in requests {
                match services.lifecycle.create_order(
                    actor.company_id,
                    actor.user_id,
                    request.into(),
                    Utc::now(),
                ) {
                    Ok(order) => created.push(OrderResponse::from(order)),
                    Err(err) => return errors::domain_error_to_response(err),
                }
            }
            (StatusCode::CREATED, Json(created)).into_response()
        }
    }
}

/// Partial update of one order: product, quantity and/or status. Stock is
/// rebalanced atomically; the first move into `success` stamps the shipment
/// timestamp and emits a confirmation.
pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateOrderRequest>,
) -> Response {
    let actor = ctx.actor();
    if let Err(err) = require_role(&actor, UPDATE_ROLES) {
        return errors::authz_error_to_response(err);
    }

    let order_id = match id.parse::<OrderId>() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id")
        }
    };

    match services.lifecycle.update_order(
        order_id,
        actor.company_id,
        actor.user_id,
        OrderPatch::from(body),
        Utc::now(),
    ) {
        Ok(order) => Json(OrderResponse::from(order)).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

/// CSV snapshot of the caller's company orders. Any authenticated role.
pub async fn export_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> Response {
    let company_id = ctx.actor().company_id;
    let orders = services.orders.list(company_id);

    // Product names come from the unfiltered view so rows pointing at a
    // deactivated product still export by name.
    let names: HashMap<_, _> = services
        .products
        .list_all(company_id)
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    let csv = orders_to_csv(&orders, |id| names.get(&id).cloned());

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"orders.csv\"",
            ),
        ],
        csv,
    )
        .into_response()
}
