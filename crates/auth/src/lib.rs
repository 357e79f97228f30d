//! `stockline-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. The API
//! layer resolves a bearer token to an [`Actor`] via the [`TokenDirectory`]
//! and enforces role requirements with [`require_role`]; company scoping of
//! individual rows stays in the domain layer.

pub mod actor;
pub mod authorize;
pub mod directory;
pub mod roles;

pub use actor::Actor;
pub use authorize::{AuthzError, require_role};
pub use directory::TokenDirectory;
pub use roles::Role;
