use crate::table::RowGuard;

/// Type-erased staged write so one transaction can span tables of
/// different value types.
trait StagedWrite {
    fn publish(&mut self);
}

impl<V: Clone> StagedWrite for RowGuard<V> {
    fn publish(&mut self) {
        RowGuard::publish(self);
    }
}

/// The commit set of one operation.
///
/// Guards staged into a transaction keep their row tokens held. `commit`
/// publishes every staged write while all tokens are still held and releases
/// them afterwards, so concurrent readers observe either none or all of the
/// transaction's writes on any given row. Dropping the transaction without
/// committing discards all staged state and releases the tokens; rollback is
/// the default outcome, not an action.
#[derive(Default)]
pub struct Txn {
    writes: Vec<Box<dyn StagedWrite>>,
}

impl Txn {
    pub fn begin() -> Self {
        Self { writes: Vec::new() }
    }

    /// Move a row guard into the commit set. The row token stays held until
    /// the transaction commits or drops.
    pub fn stage<V: Clone + 'static>(&mut self, guard: RowGuard<V>) {
        self.writes.push(Box::new(guard));
    }

    /// Publish every staged write, then release all row tokens.
    pub fn commit(mut self) {
        for write in &mut self.writes {
            write.publish();
        }
        // Dropping `self` drops the guards, releasing the tokens only now
        // that every write is committed.
    }

    /// Discard all staged writes. Equivalent to dropping the transaction;
    /// spelled out for call sites where the abort is the point.
    pub fn rollback(self) {}
}
