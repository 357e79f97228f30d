use std::time::Duration;

use chrono::{DateTime, Utc};

use stockline_core::{CompanyId, DomainError, DomainResult, ProductId};
use stockline_store::{RowGuard, StoreError, Table, Txn};

use crate::product::Product;

fn map_lock_error(err: StoreError) -> DomainError {
    match err {
        StoreError::LockTimeout(wait) => {
            tracing::warn!(?wait, "product row lock timed out");
            DomainError::Busy
        }
    }
}

/// Company-scoped product storage.
///
/// Two views on the same rows: the active view (`get_active`, `list_active`,
/// `lock_active`) that order logic uses, which hides inactive rows and rows
/// of other companies, and the all view (`get_any`, `list_all`) for
/// administration, which only hides other companies.
pub struct ProductStore {
    rows: Table<ProductId, Product>,
}

impl ProductStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            rows: Table::new(lock_timeout),
        }
    }

    /// Provision a new product row.
    pub fn insert(&self, product: Product) -> DomainResult<()> {
        let taken = self
            .rows
            .scan()
            .into_iter()
            .any(|p| p.company_id == product.company_id && p.name == product.name);
        if taken {
            return Err(DomainError::validation("product name already in use"));
        }

        let mut guard = self.rows.lock_row(&product.id).map_err(map_lock_error)?;
        if guard.get().is_some() {
            return Err(DomainError::validation("product already exists"));
        }
        guard.set(product);

        let mut txn = Txn::begin();
        txn.stage(guard);
        txn.commit();
        Ok(())
    }

    /// Committed read through the active view. No lock taken.
    pub fn get_active(&self, id: ProductId, company_id: CompanyId) -> Option<Product> {
        self.rows.get(&id).filter(|p| p.visible_to(company_id))
    }

    /// Committed read scoped to the company, inactive rows included.
    pub fn get_any(&self, id: ProductId, company_id: CompanyId) -> Option<Product> {
        self.rows.get(&id).filter(|p| p.company_id == company_id)
    }

    /// Active products of one company, ordered by name.
    pub fn list_active(&self, company_id: CompanyId) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .rows
            .scan()
            .into_iter()
            .filter(|p| p.visible_to(company_id))
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }

    /// Every product of one company, inactive included, ordered by name.
    pub fn list_all(&self, company_id: CompanyId) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .rows
            .scan()
            .into_iter()
            .filter(|p| p.company_id == company_id)
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }

    /// Exclusive lock on an active product row, scoped to the caller's
    /// company. Absent, inactive and foreign rows all collapse into
    /// `NotFound` so callers cannot probe another company's catalogue.
    /// A lock wait past the store's timeout surfaces `Busy`.
    pub fn lock_active(&self, id: ProductId, company_id: CompanyId) -> DomainResult<ProductLock> {
        let guard = self.rows.lock_row(&id).map_err(map_lock_error)?;
        let product = match guard.get() {
            Some(p) if p.visible_to(company_id) => p.clone(),
            _ => return Err(DomainError::NotFound),
        };
        Ok(ProductLock { product, guard })
    }

    /// Soft-delete the given products of one company in a single
    /// transaction. Ids that are foreign, unknown or already inactive are
    /// filtered out, not errors. Returns how many rows were deactivated.
    pub fn deactivate(
        &self,
        ids: &[ProductId],
        company_id: CompanyId,
        now: DateTime<Utc>,
    ) -> DomainResult<usize> {
        let mut ids = ids.to_vec();
        // Ascending id order keeps concurrent batch deletes from deadlocking
        // each other; dedup because each row token is non-reentrant.
        ids.sort();
        ids.dedup();

        let mut txn = Txn::begin();
        let mut count = 0usize;
        for id in ids {
            let mut guard = self.rows.lock_row(&id).map_err(map_lock_error)?;
            let mut product = match guard.get() {
                Some(p) if p.visible_to(company_id) => p.clone(),
                _ => continue,
            };
            product.active = false;
            product.last_updated_at = now;
            guard.set(product);
            txn.stage(guard);
            count += 1;
        }
        txn.commit();
        Ok(count)
    }
}

/// Held exclusive lock over one active product row.
///
/// Carries a working copy that ledger operations mutate in place; nothing
/// is visible to other readers until the lock is staged into a transaction
/// and that transaction commits. Dropping the lock discards the working
/// copy and releases the row.
pub struct ProductLock {
    product: Product,
    guard: RowGuard<Product>,
}

impl ProductLock {
    /// Working copy as of this transaction.
    pub fn product(&self) -> &Product {
        &self.product
    }

    pub(crate) fn product_mut(&mut self) -> &mut Product {
        &mut self.product
    }

    /// Stage the working copy into `txn`. The row token stays held until
    /// the transaction commits or drops.
    pub fn stage_into(mut self, txn: &mut Txn) {
        self.guard.set(self.product.clone());
        txn.stage(self.guard);
    }
}
