//! Shipment confirmation messages and the sinks that carry them.

pub mod confirmation;
pub mod in_memory;
pub mod sink;

pub use confirmation::ShipmentConfirmation;
pub use in_memory::{InMemorySink, InMemorySinkError};
pub use sink::{ConfirmationSink, Subscription};
