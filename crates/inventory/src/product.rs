use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_core::{CompanyId, DomainError, DomainResult, ProductId, UserId};

/// A sellable product owned by one company.
///
/// `stock` is the on-hand unit count; every committed state satisfies
/// `stock >= 0`. Soft delete flips `active`; the row itself is never
/// removed, and order logic only ever sees active rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub company_id: CompanyId,
    /// Unique within the owning company.
    pub name: String,
    /// Unit price in the smallest currency unit.
    pub price: u64,
    pub stock: i64,
    pub active: bool,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        company_id: CompanyId,
        created_by: UserId,
        name: impl Into<String>,
        price: u64,
        stock: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if stock < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        Ok(Self {
            id: ProductId::new(),
            company_id,
            name,
            price,
            stock,
            active: true,
            created_by,
            created_at: now,
            last_updated_at: now,
        })
    }

    /// Whether order logic is allowed to see this row for `company_id`.
    pub fn visible_to(&self, company_id: CompanyId) -> bool {
        self.active && self.company_id == company_id
    }
}
