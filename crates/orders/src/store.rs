use std::time::Duration;

use stockline_core::{CompanyId, DomainError, DomainResult, OrderId};
use stockline_store::{RowGuard, StoreError, Table, Txn};

use crate::order::Order;

fn map_lock_error(err: StoreError) -> DomainError {
    match err {
        StoreError::LockTimeout(wait) => {
            tracing::warn!(?wait, "order row lock timed out");
            DomainError::Busy
        }
    }
}

/// Order storage. Rows are inserted and mutated exclusively through held
/// [`OrderLock`]s, so edits of one order are totally ordered.
pub struct OrderStore {
    rows: Table<OrderId, Order>,
}

impl OrderStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            rows: Table::new(lock_timeout),
        }
    }

    /// Committed read. No lock taken.
    pub fn get(&self, id: OrderId) -> Option<Order> {
        self.rows.get(&id)
    }

    /// Committed orders of one company, oldest first.
    pub fn list(&self, company_id: CompanyId) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .rows
            .scan()
            .into_iter()
            .filter(|o| o.company_id == company_id)
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        orders
    }

    /// Reserve the row for a brand-new order and load it as the working
    /// copy. The row is invisible to readers until the lock is staged and
    /// its transaction commits.
    pub fn lock_new(&self, order: Order) -> DomainResult<OrderLock> {
        let guard = self.rows.lock_row(&order.id).map_err(map_lock_error)?;
        if guard.get().is_some() {
            return Err(DomainError::validation("order already exists"));
        }
        Ok(OrderLock { order, guard })
    }

    /// Exclusive lock on an existing order row; `NotFound` when absent.
    /// Company scoping is the caller's check, since it needs the row's
    /// content to make it.
    pub fn lock_existing(&self, id: OrderId) -> DomainResult<OrderLock> {
        let guard = self.rows.lock_row(&id).map_err(map_lock_error)?;
        let order = match guard.get() {
            Some(order) => order.clone(),
            None => return Err(DomainError::NotFound),
        };
        Ok(OrderLock { order, guard })
    }
}

/// Held exclusive lock over one order row, carrying the working copy.
pub struct OrderLock {
    order: Order,
    guard: RowGuard<Order>,
}

impl OrderLock {
    pub fn order(&self) -> &Order {
        &self.order
    }

    pub(crate) fn order_mut(&mut self) -> &mut Order {
        &mut self.order
    }

    /// Stage the working copy into `txn`; the row token stays held until
    /// the transaction commits or drops.
    pub fn stage_into(mut self, txn: &mut Txn) {
        self.guard.set(self.order.clone());
        txn.stage(self.guard);
    }
}
