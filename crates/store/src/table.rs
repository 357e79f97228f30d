use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex, RwLock};

use crate::error::StoreError;

/// Wait budget applied when a table is built without an explicit one.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(5_000);

type TokenGuard = ArcMutexGuard<RawMutex, ()>;

/// One row: an exclusive acquisition token plus the committed value.
///
/// `committed` is `None` for a slot that was materialized by an in-flight
/// insert and never published; such a slot reads as absent.
struct RowSlot<V> {
    token: Arc<Mutex<()>>,
    committed: RwLock<Option<V>>,
}

impl<V> RowSlot<V> {
    fn vacant() -> Self {
        Self {
            token: Arc::new(Mutex::new(())),
            committed: RwLock::new(None),
        }
    }
}

/// In-memory table with row-level exclusive locking.
///
/// Plain reads ([`Table::get`], [`Table::scan`]) return committed values and
/// never wait on writers. Writers call [`Table::lock_row`], mutate the
/// returned [`RowGuard`], and publish through a [`crate::Txn`], so a staged
/// value is never observable before its transaction commits.
pub struct Table<K, V> {
    rows: RwLock<HashMap<K, Arc<RowSlot<V>>>>,
    lock_timeout: Duration,
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            lock_timeout,
        }
    }

    /// Committed value for `key`, if the row exists. Takes no row token, so
    /// it cannot block behind a writer holding the row.
    pub fn get(&self, key: &K) -> Option<V> {
        let rows = self.rows.read();
        let slot = rows.get(key)?;
        slot.committed.read().clone()
    }

    /// Snapshot of every committed row. Each row is read atomically; the
    /// snapshot as a whole is not a point-in-time cut across rows.
    pub fn scan(&self) -> Vec<V> {
        let rows = self.rows.read();
        rows.values()
            .filter_map(|slot| slot.committed.read().clone())
            .collect()
    }

    /// Number of committed rows.
    pub fn len(&self) -> usize {
        let rows = self.rows.read();
        rows.values()
            .filter(|slot| slot.committed.read().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Acquire the exclusive token for `key`, waiting at most the table's
    /// configured timeout. An unknown key materializes a vacant slot, which
    /// is how inserts reserve their row before first publish.
    ///
    /// Tokens are not reentrant: locking a row twice from one thread times
    /// out. The token is released when the guard is dropped or when the
    /// transaction it was staged into commits.
    pub fn lock_row(&self, key: &K) -> Result<RowGuard<V>, StoreError> {
        let slot = {
            let rows = self.rows.read();
            rows.get(key).cloned()
        };
        let slot = match slot {
            Some(slot) => slot,
            None => {
                let mut rows = self.rows.write();
                rows.entry(key.clone())
                    .or_insert_with(|| Arc::new(RowSlot::vacant()))
                    .clone()
            }
        };

        let token = Arc::clone(&slot.token);
        match token.try_lock_arc_for(self.lock_timeout) {
            Some(token) => {
                // Safe to snapshot: publishes require the token we now hold.
                let snapshot = slot.committed.read().clone();
                Ok(RowGuard {
                    slot,
                    snapshot,
                    staged: None,
                    _token: token,
                })
            }
            None => Err(StoreError::LockTimeout(self.lock_timeout)),
        }
    }
}

/// Exclusive view of a single row, valid while its token is held.
///
/// Reads see the staged value if one exists, otherwise the value that was
/// committed when the token was acquired. Staged writes become visible to
/// other readers only when the guard is committed through a [`crate::Txn`];
/// dropping the guard discards them and releases the token.
pub struct RowGuard<V> {
    slot: Arc<RowSlot<V>>,
    snapshot: Option<V>,
    staged: Option<V>,
    _token: TokenGuard,
}

impl<V: Clone> RowGuard<V> {
    /// Row value as this transaction sees it.
    pub fn get(&self) -> Option<&V> {
        self.staged.as_ref().or(self.snapshot.as_ref())
    }

    /// Stage a new value. Not visible outside this guard until commit.
    pub fn set(&mut self, value: V) {
        self.staged = Some(value);
    }

    pub fn is_dirty(&self) -> bool {
        self.staged.is_some()
    }

    /// Publish the staged value into the committed cell. Called by
    /// [`crate::Txn::commit`] while the token is still held.
    pub(crate) fn publish(&mut self) {
        if let Some(value) = self.staged.take() {
            *self.slot.committed.write() = Some(value.clone());
            self.snapshot = Some(value);
        }
    }
}
