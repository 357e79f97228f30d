use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_core::{CompanyId, DomainError, DomainResult, OrderId, ProductId, UserId};

/// Lifecycle state of an order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Success,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Success => "success",
            OrderStatus::Failed => "failed",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order drawing stock from one product of the owning company.
///
/// Rows are never physically deleted. `shipped_at` is stamped exactly once,
/// on the first transition into `Success`, and never cleared or re-stamped
/// afterwards, even if the status later changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub company_id: CompanyId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub status: OrderStatus,
    pub shipped_at: Option<DateTime<Utc>>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        company_id: CompanyId,
        created_by: UserId,
        product_id: ProductId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(Self {
            id: OrderId::new(),
            company_id,
            product_id,
            quantity,
            status: OrderStatus::Pending,
            shipped_at: None,
            created_by,
            created_at: now,
        })
    }

    /// Orders may only be edited on the calendar day (UTC) they were created.
    pub fn edit_window_open(&self, now: DateTime<Utc>) -> bool {
        self.created_at.date_naive() == now.date_naive()
    }
}

/// Creation request, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Partial update; every field optional, missing fields keep their value.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub product_id: Option<ProductId>,
    pub quantity: Option<i64>,
    pub status: Option<OrderStatus>,
}
