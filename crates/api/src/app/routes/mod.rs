//! Route modules, one per resource area.

pub mod orders;
pub mod products;
pub mod system;

use axum::Router;

/// Everything that lives behind the bearer middleware.
pub fn router() -> Router {
    Router::new()
        .nest("/api/products", products::router())
        .nest("/api/orders", orders::router())
}
