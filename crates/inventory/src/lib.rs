//! Inventory domain module.
//!
//! This crate owns the product record, the company-scoped product store and
//! the stock ledger. Stock only ever changes through [`ledger`] operations
//! applied to a held [`store::ProductLock`], so a committed product can
//! never show negative stock.

pub mod ledger;
pub mod product;
pub mod store;

pub use product::Product;
pub use store::{ProductLock, ProductStore};
