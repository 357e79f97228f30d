use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stockline_core::{CompanyId, OrderId, ProductId, UserId};

/// Message emitted exactly once per order, at the moment the order first
/// transitions into its successful terminal status.
///
/// `shipped_at` carries the same timestamp that was stamped onto the order
/// row in the emitting transaction, so downstream consumers and the row
/// never disagree about when the shipment happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentConfirmation {
    pub order_id: OrderId,
    pub company_id: CompanyId,
    pub product_id: ProductId,
    /// Units shipped; the order's quantity at the time of the transition.
    pub quantity: i64,
    /// Operator whose update triggered the transition.
    pub actor_id: UserId,
    pub shipped_at: DateTime<Utc>,
}
