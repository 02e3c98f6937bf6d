//! Synchronized single-value cells.

use parking_lot::RwLock;

/// A mutable scalar readable and writable from any thread.
///
/// One reader/writer lock guards one slot: concurrent readers never observe
/// a torn write, and a write is visible to every subsequent reader. Mutation
/// frequency in practice is at most once per frame, so the lock is the whole
/// story - there is no lock-free fast path.
#[derive(Debug, Default)]
pub struct SyncCell<T> {
    slot: RwLock<T>,
}

impl<T: Copy> SyncCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            slot: RwLock::new(value),
        }
    }

    /// Read the current value.
    pub fn read(&self) -> T {
        *self.slot.read()
    }

    /// Replace the value.
    pub fn write(&self, value: T) {
        *self.slot.write() = value;
    }
}

impl SyncCell<bool> {
    /// Flip the flag, returning the new value.
    pub fn toggle(&self) -> bool {
        let mut slot = self.slot.write();
        *slot = !*slot;
        *slot
    }
}
