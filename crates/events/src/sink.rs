//! Delivery seam for shipment confirmations.
//!
//! The order lifecycle emits a [`ShipmentConfirmation`] after it has stamped
//! the shipped timestamp inside the committing transaction. The sink is the
//! transport boundary: in-memory fan-out for tests and single-process
//! deployments, something durable behind the same trait later.
//!
//! Delivery is best-effort. The stock debit and the status change are the
//! source of truth; a sink failure is logged by the caller and never fails
//! the operation, so consumers must tolerate a missing message but will
//! never see a duplicate for the same order.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::confirmation::ShipmentConfirmation;

/// A subscription to the stream of emitted confirmations.
///
/// Each subscriber receives a copy of every confirmation emitted after it
/// subscribed. Intended for single-threaded consumption.
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<ShipmentConfirmation>,
}

impl Subscription {
    pub fn new(receiver: Receiver<ShipmentConfirmation>) -> Self {
        Self { receiver }
    }

    /// Block until the next confirmation is available.
    pub fn recv(&self) -> Result<ShipmentConfirmation, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Receive without blocking.
    pub fn try_recv(&self) -> Result<ShipmentConfirmation, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a confirmation.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<ShipmentConfirmation, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Outbound transport for shipment confirmations.
///
/// Implementations must be safe to call from concurrent order operations.
/// `emit` failures are surfaced to the caller, which treats them as
/// non-fatal; implementations should not panic.
pub trait ConfirmationSink: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn emit(&self, confirmation: ShipmentConfirmation) -> Result<(), Self::Error>;
}

impl<S> ConfirmationSink for Arc<S>
where
    S: ConfirmationSink + ?Sized,
{
    type Error = S::Error;

    fn emit(&self, confirmation: ShipmentConfirmation) -> Result<(), Self::Error> {
        (**self).emit(confirmation)
    }
}
