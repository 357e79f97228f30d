//! Shared service state and demo provisioning.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use stockline_auth::{Actor, Role, TokenDirectory};
use stockline_core::{CompanyId, UserId};
use stockline_events::InMemorySink;
use stockline_inventory::{Product, ProductStore};
use stockline_orders::{OrderLifecycle, OrderStore};

/// Everything the handlers need, built once at startup and shared behind an
/// `Arc` via a request extension.
pub struct AppServices {
    pub products: Arc<ProductStore>,
    pub orders: Arc<OrderStore>,
    pub sink: Arc<InMemorySink>,
    pub lifecycle: OrderLifecycle<Arc<InMemorySink>>,
}

pub fn build_services(lock_timeout: Duration) -> AppServices {
    let products = Arc::new(ProductStore::new(lock_timeout));
    let orders = Arc::new(OrderStore::new(lock_timeout));
    let sink = Arc::new(InMemorySink::new());
    let lifecycle = OrderLifecycle::new(
        Arc::clone(&products),
        Arc::clone(&orders),
        Arc::clone(&sink),
    );

    AppServices {
        products,
        orders,
        sink,
        lifecycle,
    }
}

/// Logs every shipment confirmation the sink carries. The thread ends when
/// the sink (and with it the subscription's sender) is dropped.
pub fn spawn_confirmation_log(sink: &InMemorySink) {
    let subscription = sink.subscribe();
    std::thread::spawn(move || {
        while let Ok(confirmation) = subscription.recv() {
            tracing::info!(
                order_id = %confirmation.order_id,
                company_id = %confirmation.company_id,
                product_id = %confirmation.product_id,
                quantity = confirmation.quantity,
                "shipment confirmed"
            );
        }
    });
}

/// Provision demo tenants so a fresh server is usable out of the box:
/// three companies, a fixed bearer token per role, and a small catalogue
/// each. Tokens are logged at startup; this is development data, not an
/// account system.
pub fn seed_demo(services: &AppServices, directory: &mut TokenDirectory) {
    let now = Utc::now();
    let companies = [
        ("Aurora Retail", "aurora"),
        ("Borealis Supply", "borealis"),
        ("Cascade Goods", "cascade"),
    ];
    let catalogue: [(&str, u64, i64); 7] = [
        ("Anvil", 18_900, 25),
        ("Bolt Pack", 450, 400),
        ("Crate", 2_300, 60),
        ("Dolly", 7_800, 12),
        ("Engine Oil", 1_250, 150),
        ("Gasket Set", 3_400, 40),
        ("Pallet Wrap", 990, 80),
    ];

    for (name, slug) in companies {
        let company_id = CompanyId::new();
        let admin = Actor::new(UserId::new(), company_id, Role::Admin);

        for (suffix, actor) in [
            ("admin", admin),
            ("operator1", Actor::new(UserId::new(), company_id, Role::Operator)),
            ("operator2", Actor::new(UserId::new(), company_id, Role::Operator)),
            ("viewer", Actor::new(UserId::new(), company_id, Role::Viewer)),
        ] {
            let token = format!("{slug}-{suffix}");
            tracing::info!(company = name, %token, role = %actor.role, "registered demo token");
            directory.register(token, actor);
        }

        for (product, price, stock) in catalogue {
            match Product::new(company_id, admin.user_id, product, price, stock, now) {
                Ok(product) => {
                    if let Err(err) = services.products.insert(product) {
                        tracing::warn!(company = name, ?err, "failed to seed product");
                    }
                }
                Err(err) => tracing::warn!(company = name, ?err, "invalid seed product"),
            }
        }
        tracing::info!(company = name, products = catalogue.len(), "seeded demo company");
    }
}
