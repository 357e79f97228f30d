//! In-memory confirmation sink for tests and single-process runs.

use std::sync::{Mutex, mpsc};

use crate::confirmation::ShipmentConfirmation;
use crate::sink::{ConfirmationSink, Subscription};

#[derive(Debug)]
pub enum InMemorySinkError {
    /// Emit failed due to internal lock poisoning.
    Poisoned,
}

/// Records every emitted confirmation and fans it out to subscribers.
///
/// - No IO / no async
/// - Best-effort fan-out; dead subscribers are dropped on emit
/// - `emitted()` is the full record, independent of subscriptions
#[derive(Debug, Default)]
pub struct InMemorySink {
    emitted: Mutex<Vec<ShipmentConfirmation>>,
    subscribers: Mutex<Vec<mpsc::Sender<ShipmentConfirmation>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every confirmation emitted so far, in emission order.
    pub fn emitted(&self) -> Vec<ShipmentConfirmation> {
        self.emitted
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned the subscription is still returned;
        // it just never receives anything.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}

impl ConfirmationSink for InMemorySink {
    type Error = InMemorySinkError;

    fn emit(&self, confirmation: ShipmentConfirmation) -> Result<(), Self::Error> {
        let mut log = self
            .emitted
            .lock()
            .map_err(|_| InMemorySinkError::Poisoned)?;
        log.push(confirmation.clone());
        drop(log);

        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| InMemorySinkError::Poisoned)?;
        subs.retain(|tx| tx.send(confirmation.clone()).is_ok());

        Ok(())
    }
}
