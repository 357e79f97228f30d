//! In-memory row store with exclusive row locks and staged writes.
//!
//! Readers only ever see committed values. A writer acquires a row's
//! exclusive token, stages a new value in the returned [`RowGuard`], and
//! publishes it through a [`Txn`] together with the rest of the rows it
//! touched. Nothing staged is visible before commit, and dropping the
//! transaction (or an individual guard) discards the staged state, so a
//! failed operation leaves every row exactly as it found it.

pub mod error;
pub mod table;
pub mod txn;

pub use error::StoreError;
pub use table::{RowGuard, Table, DEFAULT_LOCK_TIMEOUT};
pub use txn::Txn;
