//! Domain error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// One kind per caller-visible failure. Storage and lock internals are mapped
/// into these before crossing the domain boundary and never leak further.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. non-positive quantity, malformed id).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Product or order absent, inactive, or foreign to the caller's company.
    ///
    /// Deliberately collapsed into one kind so callers cannot probe for the
    /// existence of another company's rows.
    #[error("not found")]
    NotFound,

    /// A debit would drive the product's stock counter below zero.
    #[error("insufficient stock for product {product}")]
    InsufficientStock { product: ProductId },

    /// Update attempted on an order not created today (reference time zone).
    #[error("order is outside its edit window")]
    EditWindowExpired,

    /// Cross-company access attempt on an order.
    #[error("forbidden")]
    Forbidden,

    /// A row lock could not be acquired within the configured wait budget.
    #[error("resource busy, retry later")]
    Busy,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn insufficient_stock(product: ProductId) -> Self {
        Self::InsufficientStock { product }
    }
}
