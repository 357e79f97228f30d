//! Order domain module.
//!
//! Owns the order record, the order store and the lifecycle controller that
//! coordinates stock movements with order state. All stock effects of an
//! order operation commit atomically with the order row itself.

pub mod lifecycle;
pub mod order;
pub mod store;

pub use lifecycle::OrderLifecycle;
pub use order::{NewOrder, Order, OrderPatch, OrderStatus};
pub use store::{OrderLock, OrderStore};
