//! CSV rendering of committed orders.
//!
//! Read-only reporting over whatever rows the caller hands in; nothing here
//! locks or mutates. Column set and timestamp rendering follow the
//! operations team's existing spreadsheet imports, so they are part of the
//! output contract.

pub mod csv;

pub use csv::orders_to_csv;
