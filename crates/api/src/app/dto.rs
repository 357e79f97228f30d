//! Wire-format request and response bodies.
//!
//! Domain types stay off the wire; these shapes are the compatibility
//! contract with existing clients and change independently of the domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_core::{OrderId, ProductId, UserId};
use stockline_inventory::Product;
use stockline_orders::{NewOrder, Order, OrderPatch, OrderStatus};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl From<CreateOrderRequest> for NewOrder {
    fn from(req: CreateOrderRequest) -> Self {
        NewOrder {
            product_id: req.product_id,
            quantity: req.quantity,
        }
    }
}

/// Order creation accepts either one order object or an array of them;
/// clients batching a day's intake post the array form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreateOrderBody {
    Many(Vec<CreateOrderRequest>),
    One(CreateOrderRequest),
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl From<UpdateOrderRequest> for OrderPatch {
    fn from(req: UpdateOrderRequest) -> Self {
        OrderPatch {
            product_id: req.product_id,
            quantity: req.quantity,
            status: req.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub status: OrderStatus,
    pub shipped_at: Option<DateTime<Utc>>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            product_id: order.product_id,
            quantity: order.quantity,
            status: order.status,
            shipped_at: order.shipped_at,
            created_by: order.created_by,
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub price: u64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            stock: product.stock,
            created_at: product.created_at,
            last_updated_at: product.last_updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeactivateProductsRequest {
    pub ids: Vec<ProductId>,
}

#[derive(Debug, Serialize)]
pub struct DeactivateProductsResponse {
    pub deactivated: usize,
}
