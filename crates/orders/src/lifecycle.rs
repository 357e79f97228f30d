//! Order lifecycle orchestration.
//!
//! The controller coordinates the three stores that one order operation
//! touches: the order row, the product row(s) whose stock moves, and the
//! confirmation sink. Every operation follows the same transactional shape:
//!
//! ```text
//! lock rows (order first, then old product, then new product)
//!   ↓
//! apply ledger movements + field changes to the working copies
//!   ↓
//! commit all staged rows while the tokens are held,
//! or bail out with ? and let the dropped guards roll everything back
//! and release the locks
//! ```
//!
//! The shipment confirmation is emitted after commit, from inside the same
//! call: the order row token is held from the first read to the commit, so
//! only one transaction can ever observe the transition into `Success`, and
//! the message carries the same `shipped_at` that was stamped on the row.
//! Emission is best-effort; a sink failure is logged and never undoes the
//! committed transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use stockline_core::{CompanyId, DomainError, DomainResult, OrderId, UserId};
use stockline_events::{ConfirmationSink, ShipmentConfirmation};
use stockline_inventory::{ProductStore, ledger};
use stockline_store::Txn;

use crate::order::{NewOrder, Order, OrderPatch, OrderStatus};
use crate::store::OrderStore;

/// Coordinates order state with stock movements.
///
/// Generic over the confirmation sink so tests can capture emissions and
/// deployments can swap transports without touching the flow.
pub struct OrderLifecycle<E> {
    products: Arc<ProductStore>,
    orders: Arc<OrderStore>,
    sink: E,
}

impl<E> OrderLifecycle<E> {
    pub fn new(products: Arc<ProductStore>, orders: Arc<OrderStore>, sink: E) -> Self {
        Self {
            products,
            orders,
            sink,
        }
    }
}

impl<E: ConfirmationSink> OrderLifecycle<E> {
    /// Create an order, debiting its quantity from the product's stock.
    ///
    /// The debit and the new order row commit atomically; on any failure
    /// nothing is persisted. The created order starts `Pending` with no
    /// shipment timestamp, and no confirmation is emitted.
    pub fn create_order(
        &self,
        company_id: CompanyId,
        created_by: UserId,
        request: NewOrder,
        now: DateTime<Utc>,
    ) -> DomainResult<Order> {
        // 1) Validate the request shape before touching any row.
        let order = Order::new(
            company_id,
            created_by,
            request.product_id,
            request.quantity,
            now,
        )?;

        // 2) Lock the product through the active view (absent, inactive and
        //    foreign all collapse into NotFound).
        let mut product = self.products.lock_active(request.product_id, company_id)?;

        // 3) Debit. Insufficient stock aborts with nothing staged.
        ledger::debit(&mut product, order.quantity, now)?;

        // 4) Reserve the new order row.
        let order_lock = self.orders.lock_new(order.clone())?;

        // 5) Commit the stock movement and the new row together.
        let mut txn = Txn::begin();
        product.stage_into(&mut txn);
        order_lock.stage_into(&mut txn);
        txn.commit();

        Ok(order)
    }

    /// Apply a partial update to an order, rebalancing stock accordingly.
    ///
    /// The order's current quantity is credited back to its current product
    /// and the patched quantity debited from the patched product (one lock
    /// when they are the same product, old before new when they differ).
    /// The first transition into `Success` stamps `shipped_at` and emits a
    /// confirmation; later saves never re-stamp or re-emit.
    pub fn update_order(
        &self,
        order_id: OrderId,
        company_id: CompanyId,
        actor_id: UserId,
        patch: OrderPatch,
        now: DateTime<Utc>,
    ) -> DomainResult<Order> {
        // 1) Lock the order row first: edits of one order are serialized,
        //    and the stamp/emit decision below reads committed truth.
        let mut order_lock = self.orders.lock_existing(order_id)?;
        let prev = order_lock.order().clone();

        // 2) Tenant check before anything about the row can leak.
        if prev.company_id != company_id {
            return Err(DomainError::Forbidden);
        }

        // 3) Orders are only editable on their creation day (UTC calendar
        //    date, not elapsed time).
        if !prev.edit_window_open(now) {
            return Err(DomainError::EditWindowExpired);
        }

        // 4) Patched quantity must stay positive.
        if let Some(quantity) = patch.quantity {
            if quantity <= 0 {
                return Err(DomainError::validation("quantity must be positive"));
            }
        }

        let target_product_id = patch.product_id.unwrap_or(prev.product_id);
        let target_quantity = patch.quantity.unwrap_or(prev.quantity);
        let target_status = patch.status.unwrap_or(prev.status);

        let mut txn = Txn::begin();

        // 5) Old product first: give back what the order currently holds.
        let mut old_product = self.products.lock_active(prev.product_id, company_id)?;
        ledger::credit(&mut old_product, prev.quantity, now)?;

        // 6) New product second, or the same lock when unchanged. The debit
        //    sees post-credit stock; if it fails, the credit above was never
        //    staged and rolls back with everything else.
        if target_product_id == prev.product_id {
            ledger::debit(&mut old_product, target_quantity, now)?;
            old_product.stage_into(&mut txn);
        } else {
            let mut new_product = self.products.lock_active(target_product_id, company_id)?;
            ledger::debit(&mut new_product, target_quantity, now)?;
            old_product.stage_into(&mut txn);
            new_product.stage_into(&mut txn);
        }

        // 7) Apply the patch to the working copy of the order row.
        {
            let order = order_lock.order_mut();
            order.product_id = target_product_id;
            order.quantity = target_quantity;
            order.status = target_status;
        }

        // 8) The first transition into Success stamps the shipment time.
        //    A row that ever shipped keeps its original timestamp forever.
        let confirmation = if target_status == OrderStatus::Success
            && prev.status != OrderStatus::Success
            && prev.shipped_at.is_none()
        {
            order_lock.order_mut().shipped_at = Some(now);
            Some(ShipmentConfirmation {
                order_id,
                company_id,
                product_id: target_product_id,
                quantity: target_quantity,
                actor_id,
                shipped_at: now,
            })
        } else {
            None
        };

        let updated = order_lock.order().clone();
        order_lock.stage_into(&mut txn);

        // 9) Publish the product row(s) and the order row together.
        txn.commit();

        // 10) Best-effort emission, only after the transaction committed.
        if let Some(confirmation) = confirmation {
            if let Err(err) = self.sink.emit(confirmation) {
                tracing::warn!(%order_id, ?err, "failed to emit shipment confirmation");
            }
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use proptest::prelude::*;
    use std::thread;
    use std::time::Duration;
    use stockline_core::ProductId;
    use stockline_events::InMemorySink;
    use stockline_inventory::Product;

    struct Fixture {
        products: Arc<ProductStore>,
        orders: Arc<OrderStore>,
        sink: Arc<InMemorySink>,
        lifecycle: Arc<OrderLifecycle<Arc<InMemorySink>>>,
        company: CompanyId,
        user: UserId,
    }

    fn fixture_with_timeout(timeout: Duration) -> Fixture {
        let products = Arc::new(ProductStore::new(timeout));
        let orders = Arc::new(OrderStore::new(timeout));
        let sink = Arc::new(InMemorySink::new());
        let lifecycle = Arc::new(OrderLifecycle::new(
            Arc::clone(&products),
            Arc::clone(&orders),
            Arc::clone(&sink),
        ));
        Fixture {
            products,
            orders,
            sink,
            lifecycle,
            company: CompanyId::new(),
            user: UserId::new(),
        }
    }

    fn fixture() -> Fixture {
        fixture_with_timeout(Duration::from_millis(200))
    }

    fn seed_product(f: &Fixture, name: &str, stock: i64) -> ProductId {
        seed_product_for(f, f.company, name, stock)
    }

    fn seed_product_for(f: &Fixture, company: CompanyId, name: &str, stock: i64) -> ProductId {
        let product = Product::new(company, f.user, name, 1_000, stock, Utc::now()).unwrap();
        let id = product.id;
        f.products.insert(product).unwrap();
        id
    }

    fn stock_of(f: &Fixture, id: ProductId) -> i64 {
        f.products.get_any(id, f.company).unwrap().stock
    }

    fn create(f: &Fixture, product_id: ProductId, quantity: i64) -> Order {
        f.lifecycle
            .create_order(
                f.company,
                f.user,
                NewOrder {
                    product_id,
                    quantity,
                },
                Utc::now(),
            )
            .unwrap()
    }

    fn patch_status(status: OrderStatus) -> OrderPatch {
        OrderPatch {
            status: Some(status),
            ..OrderPatch::default()
        }
    }

    #[test]
    fn create_debits_stock_and_starts_pending() {
        let f = fixture();
        let product = seed_product(&f, "Widget", 10);

        let order = create(&f, product, 4);

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.shipped_at, None);
        assert_eq!(stock_of(&f, product), 6);
        assert_eq!(f.orders.get(order.id).unwrap(), order);
        assert!(f.sink.emitted().is_empty());
    }

    #[test]
    fn create_rejects_oversell_and_persists_nothing() {
        let f = fixture();
        let product = seed_product(&f, "Widget", 3);

        let err = f
            .lifecycle
            .create_order(
                f.company,
                f.user,
                NewOrder {
                    product_id: product,
                    quantity: 5,
                },
                Utc::now(),
            )
            .unwrap_err();

        assert_eq!(err, DomainError::InsufficientStock { product });
        assert_eq!(stock_of(&f, product), 3);
        assert!(f.orders.list(f.company).is_empty());
    }

    #[test]
    fn create_validates_quantity_before_touching_rows() {
        let f = fixture();
        let product = seed_product(&f, "Widget", 3);

        for quantity in [0, -2] {
            let err = f
                .lifecycle
                .create_order(
                    f.company,
                    f.user,
                    NewOrder {
                        product_id: product,
                        quantity,
                    },
                    Utc::now(),
                )
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[test]
    fn create_cannot_see_inactive_or_foreign_products() {
        let f = fixture();
        let inactive = seed_product(&f, "Retired", 10);
        f.products
            .deactivate(&[inactive], f.company, Utc::now())
            .unwrap();
        let foreign = seed_product_for(&f, CompanyId::new(), "Foreign", 10);

        for product_id in [inactive, foreign] {
            let err = f
                .lifecycle
                .create_order(
                    f.company,
                    f.user,
                    NewOrder {
                        product_id,
                        quantity: 1,
                    },
                    Utc::now(),
                )
                .unwrap_err();
            assert_eq!(err, DomainError::NotFound);
        }
    }

    #[test]
    fn update_quantity_rebalances_through_credit_then_debit() {
        let f = fixture();
        let product = seed_product(&f, "Widget", 10);
        let order = create(&f, product, 4);
        assert_eq!(stock_of(&f, product), 6);

        let updated = f
            .lifecycle
            .update_order(
                order.id,
                f.company,
                f.user,
                OrderPatch {
                    quantity: Some(9),
                    ..OrderPatch::default()
                },
                Utc::now(),
            )
            .unwrap();

        // Credit 4 back to 10, then debit 9.
        assert_eq!(updated.quantity, 9);
        assert_eq!(stock_of(&f, product), 1);
    }

    #[test]
    fn update_swaps_products_atomically() {
        let f = fixture();
        let first = seed_product(&f, "First", 10);
        let third = seed_product(&f, "Third", 10);
        let order = create(&f, first, 4);
        assert_eq!(stock_of(&f, first), 6);

        let updated = f
            .lifecycle
            .update_order(
                order.id,
                f.company,
                f.user,
                OrderPatch {
                    product_id: Some(third),
                    quantity: Some(2),
                    ..OrderPatch::default()
                },
                Utc::now(),
            )
            .unwrap();

        assert_eq!(updated.product_id, third);
        assert_eq!(updated.quantity, 2);
        assert_eq!(stock_of(&f, first), 10);
        assert_eq!(stock_of(&f, third), 8);
    }

    #[test]
    fn failed_swap_rolls_back_the_credit() {
        let f = fixture();
        let first = seed_product(&f, "First", 10);
        let scarce = seed_product(&f, "Scarce", 1);
        let order = create(&f, first, 4);

        let err = f
            .lifecycle
            .update_order(
                order.id,
                f.company,
                f.user,
                OrderPatch {
                    product_id: Some(scarce),
                    quantity: Some(2),
                    ..OrderPatch::default()
                },
                Utc::now(),
            )
            .unwrap_err();

        assert_eq!(err, DomainError::InsufficientStock { product: scarce });
        // Nothing moved: the credit of 4 onto First was never committed.
        assert_eq!(stock_of(&f, first), 6);
        assert_eq!(stock_of(&f, scarce), 1);
        let untouched = f.orders.get(order.id).unwrap();
        assert_eq!(untouched.product_id, first);
        assert_eq!(untouched.quantity, 4);
    }

    #[test]
    fn first_success_transition_stamps_and_emits_once() {
        let f = fixture();
        let product = seed_product(&f, "Widget", 10);
        let order = create(&f, product, 4);
        let shipped_at = Utc::now();

        let updated = f
            .lifecycle
            .update_order(
                order.id,
                f.company,
                f.user,
                patch_status(OrderStatus::Success),
                shipped_at,
            )
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Success);
        assert_eq!(updated.shipped_at, Some(shipped_at));

        let emitted = f.sink.emitted();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].order_id, order.id);
        assert_eq!(emitted[0].company_id, f.company);
        assert_eq!(emitted[0].product_id, product);
        assert_eq!(emitted[0].quantity, 4);
        assert_eq!(emitted[0].actor_id, f.user);
        assert_eq!(emitted[0].shipped_at, shipped_at);

        // A later save that keeps Success must not re-stamp or re-emit.
        let later = shipped_at + ChronoDuration::minutes(5);
        let again = f
            .lifecycle
            .update_order(
                order.id,
                f.company,
                f.user,
                patch_status(OrderStatus::Success),
                later,
            )
            .unwrap();
        assert_eq!(again.shipped_at, Some(shipped_at));
        assert_eq!(f.sink.emitted().len(), 1);
    }

    #[test]
    fn success_failed_success_never_emits_twice() {
        let f = fixture();
        let product = seed_product(&f, "Widget", 10);
        let order = create(&f, product, 1);
        let now = Utc::now();

        for status in [
            OrderStatus::Success,
            OrderStatus::Failed,
            OrderStatus::Success,
        ] {
            f.lifecycle
                .update_order(order.id, f.company, f.user, patch_status(status), now)
                .unwrap();
        }

        let final_order = f.orders.get(order.id).unwrap();
        assert_eq!(final_order.status, OrderStatus::Success);
        assert_eq!(final_order.shipped_at, Some(now));
        assert_eq!(f.sink.emitted().len(), 1);
    }

    #[test]
    fn yesterdays_order_is_no_longer_editable() {
        let f = fixture();
        let product = seed_product(&f, "Widget", 10);
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 23, 50, 0).unwrap();
        let order = f
            .lifecycle
            .create_order(
                f.company,
                f.user,
                NewOrder {
                    product_id: product,
                    quantity: 1,
                },
                created,
            )
            .unwrap();

        let next_day = Utc.with_ymd_and_hms(2024, 3, 6, 0, 10, 0).unwrap();
        let err = f
            .lifecycle
            .update_order(
                order.id,
                f.company,
                f.user,
                patch_status(OrderStatus::Success),
                next_day,
            )
            .unwrap_err();

        assert_eq!(err, DomainError::EditWindowExpired);
        assert_eq!(f.orders.get(order.id).unwrap().status, OrderStatus::Pending);
    }

    #[test]
    fn foreign_company_gets_forbidden_before_any_other_answer() {
        let f = fixture();
        let product = seed_product(&f, "Widget", 10);
        // Created yesterday, so the edit window is expired too; the tenant
        // check must still win.
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let order = f
            .lifecycle
            .create_order(
                f.company,
                f.user,
                NewOrder {
                    product_id: product,
                    quantity: 1,
                },
                created,
            )
            .unwrap();

        let next_day = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
        let err = f
            .lifecycle
            .update_order(
                order.id,
                CompanyId::new(),
                f.user,
                patch_status(OrderStatus::Success),
                next_day,
            )
            .unwrap_err();
        assert_eq!(err, DomainError::Forbidden);
    }

    #[test]
    fn updating_an_absent_order_is_not_found() {
        let f = fixture();
        let err = f
            .lifecycle
            .update_order(
                OrderId::new(),
                f.company,
                f.user,
                OrderPatch::default(),
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn update_fails_when_the_orders_product_was_deactivated() {
        let f = fixture();
        let product = seed_product(&f, "Widget", 10);
        let order = create(&f, product, 2);
        f.products
            .deactivate(&[product], f.company, Utc::now())
            .unwrap();

        let err = f
            .lifecycle
            .update_order(
                order.id,
                f.company,
                f.user,
                OrderPatch {
                    quantity: Some(3),
                    ..OrderPatch::default()
                },
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
        assert_eq!(f.orders.get(order.id).unwrap().quantity, 2);
    }

    #[test]
    fn patching_to_a_foreign_product_is_not_found() {
        let f = fixture();
        let product = seed_product(&f, "Widget", 10);
        let foreign = seed_product_for(&f, CompanyId::new(), "Foreign", 10);
        let order = create(&f, product, 2);

        let err = f
            .lifecycle
            .update_order(
                order.id,
                f.company,
                f.user,
                OrderPatch {
                    product_id: Some(foreign),
                    ..OrderPatch::default()
                },
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
        assert_eq!(stock_of(&f, product), 8);
    }

    #[test]
    fn empty_patch_is_a_committed_no_op() {
        let f = fixture();
        let product = seed_product(&f, "Widget", 10);
        let order = create(&f, product, 4);

        let updated = f
            .lifecycle
            .update_order(
                order.id,
                f.company,
                f.user,
                OrderPatch::default(),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(updated.product_id, order.product_id);
        assert_eq!(updated.quantity, order.quantity);
        assert_eq!(updated.status, OrderStatus::Pending);
        assert_eq!(stock_of(&f, product), 6);
        assert!(f.sink.emitted().is_empty());
    }

    #[test]
    fn concurrent_creates_never_oversell() {
        let f = fixture();
        let product = seed_product(&f, "Widget", 10);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lifecycle = Arc::clone(&f.lifecycle);
                let company = f.company;
                let user = f.user;
                thread::spawn(move || {
                    lifecycle.create_order(
                        company,
                        user,
                        NewOrder {
                            product_id: product,
                            quantity: 2,
                        },
                        Utc::now(),
                    )
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let oversold = results
            .iter()
            .filter(|r| matches!(r, Err(DomainError::InsufficientStock { .. })))
            .count();

        assert_eq!(succeeded, 5, "exactly enough creates fit the stock");
        assert_eq!(oversold, 3);
        assert_eq!(stock_of(&f, product), 0);
        assert_eq!(f.orders.list(f.company).len(), 5);
    }

    #[test]
    fn concurrent_success_updates_emit_exactly_once() {
        let f = fixture();
        let product = seed_product(&f, "Widget", 10);
        let order = create(&f, product, 1);
        let now = Utc::now();

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let lifecycle = Arc::clone(&f.lifecycle);
                let company = f.company;
                let user = f.user;
                let order_id = order.id;
                thread::spawn(move || {
                    lifecycle.update_order(
                        order_id,
                        company,
                        user,
                        patch_status(OrderStatus::Success),
                        now,
                    )
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(f.sink.emitted().len(), 1);
        assert_eq!(f.orders.get(order.id).unwrap().shipped_at, Some(now));
    }

    #[test]
    fn held_product_lock_surfaces_busy() {
        let f = fixture_with_timeout(Duration::from_millis(50));
        let product = seed_product(&f, "Widget", 10);

        let held = f.products.lock_active(product, f.company).unwrap();
        let lifecycle = Arc::clone(&f.lifecycle);
        let company = f.company;
        let user = f.user;
        let blocked = thread::spawn(move || {
            lifecycle.create_order(
                company,
                user,
                NewOrder {
                    product_id: product,
                    quantity: 1,
                },
                Utc::now(),
            )
        });

        assert_eq!(blocked.join().unwrap().unwrap_err(), DomainError::Busy);
        drop(held);
        assert_eq!(stock_of(&f, product), 10);
    }

    #[test]
    fn sink_failure_does_not_undo_the_transition() {
        struct FailingSink;
        impl ConfirmationSink for FailingSink {
            type Error = &'static str;
            fn emit(&self, _confirmation: ShipmentConfirmation) -> Result<(), Self::Error> {
                Err("sink down")
            }
        }

        let products = Arc::new(ProductStore::new(Duration::from_millis(200)));
        let orders = Arc::new(OrderStore::new(Duration::from_millis(200)));
        let lifecycle =
            OrderLifecycle::new(Arc::clone(&products), Arc::clone(&orders), FailingSink);

        let company = CompanyId::new();
        let user = UserId::new();
        let product = Product::new(company, user, "Widget", 1_000, 10, Utc::now()).unwrap();
        let product_id = product.id;
        products.insert(product).unwrap();

        let now = Utc::now();
        let order = lifecycle
            .create_order(
                company,
                user,
                NewOrder {
                    product_id,
                    quantity: 2,
                },
                now,
            )
            .unwrap();
        let updated = lifecycle
            .update_order(order.id, company, user, patch_status(OrderStatus::Success), now)
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Success);
        assert_eq!(updated.shipped_at, Some(now));
        assert_eq!(orders.get(order.id).unwrap().shipped_at, Some(now));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: across any same-day sequence of status patches, the
        /// shipment timestamp is stamped exactly on the first transition
        /// into Success and exactly one confirmation is emitted iff the
        /// order ever reached Success.
        #[test]
        fn stamp_and_emission_are_exactly_once(
            statuses in prop::collection::vec(
                prop::sample::select(vec![
                    OrderStatus::Pending,
                    OrderStatus::Success,
                    OrderStatus::Failed,
                ]),
                1..12,
            )
        ) {
            let f = fixture();
            let product = seed_product(&f, "Widget", 100);
            let now = Utc::now();
            let order = f
                .lifecycle
                .create_order(
                    f.company,
                    f.user,
                    NewOrder { product_id: product, quantity: 1 },
                    now,
                )
                .unwrap();

            let mut ever_success = false;
            for status in statuses {
                let updated = f
                    .lifecycle
                    .update_order(order.id, f.company, f.user, patch_status(status), now)
                    .unwrap();
                if status == OrderStatus::Success {
                    ever_success = true;
                }
                prop_assert_eq!(updated.shipped_at.is_some(), ever_success);
            }

            let expected = usize::from(ever_success);
            prop_assert_eq!(f.sink.emitted().len(), expected);
        }
    }
}
