//! Stock ledger operations.
//!
//! The only code paths that change a product's stock. Both run against a
//! held [`ProductLock`], so the adjustment is applied to the value the lock
//! read under its own token, never to a stale snapshot. A debit that would
//! take stock negative is refused outright; there is no post-hoc clamping.

use chrono::{DateTime, Utc};

use stockline_core::{DomainError, DomainResult};

use crate::store::ProductLock;

/// Remove `quantity` units from the locked product's stock.
///
/// Fails with `InsufficientStock` when the working copy holds fewer units
/// than requested; the working copy is left untouched in that case, so an
/// aborted transaction has nothing to roll back here.
pub fn debit(lock: &mut ProductLock, quantity: i64, now: DateTime<Utc>) -> DomainResult<()> {
    if quantity <= 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }
    let product = lock.product_mut();
    if product.stock < quantity {
        return Err(DomainError::insufficient_stock(product.id));
    }
    product.stock -= quantity;
    product.last_updated_at = now;
    Ok(())
}

/// Return `quantity` units to the locked product's stock.
pub fn credit(lock: &mut ProductLock, quantity: i64, now: DateTime<Utc>) -> DomainResult<()> {
    if quantity <= 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }
    let product = lock.product_mut();
    product.stock += quantity;
    product.last_updated_at = now;
    Ok(())
}
