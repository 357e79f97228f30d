use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the row store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The exclusive row token was not acquired within the wait budget.
    /// Callers are expected to map this to a retryable condition rather
    /// than waiting indefinitely.
    #[error("row lock not acquired within {0:?}")]
    LockTimeout(Duration),
}
