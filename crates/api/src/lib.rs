//! `stockline-api` — HTTP surface for the reservation engine.
//!
//! Thin axum layer: bearer-token middleware resolves an [`ActorContext`],
//! route handlers translate JSON bodies into domain calls and domain errors
//! into JSON error responses. All business rules live in the domain crates.

pub mod app;
pub mod context;
pub mod middleware;

pub use context::ActorContext;
