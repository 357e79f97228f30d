use thiserror::Error;

use crate::{Actor, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: requires one of {required:?}")]
    Forbidden { required: Vec<Role> },
}

/// Authorize an actor for an operation gated on a role set.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn require_role(actor: &Actor, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            required: allowed.to_vec(),
        })
    }
}
