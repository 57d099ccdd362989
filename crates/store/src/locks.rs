//! Per-key lock table serializing compound operations on one document key.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{ArcMutexGuard, Mutex, RawMutex};

type LockTable = DashMap<String, Arc<Mutex<()>>>;

/// Lock table keyed by document key.
///
/// Entries are created on first use and reclaimed when the last guard for a
/// key is dropped, so the table only holds keys with an operation in flight.
#[derive(Debug, Default, Clone)]
pub struct KeyLocks {
    table: Arc<LockTable>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the lock for `key` is held.
    ///
    /// Not reentrant: locking the same key twice on one thread deadlocks.
    pub fn lock(&self, key: &str) -> KeyGuard {
        // clone out of the map first, the shard lock must not be held while waiting
        let mutex = self
            .table
            .entry(key.to_string())
            .or_default()
            .value()
            .clone();
        let guard = mutex.lock_arc();
        KeyGuard {
            key: key.to_string(),
            table: Arc::clone(&self.table),
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or waited on.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Holds the lock for one key until dropped.
pub struct KeyGuard {
    key: String,
    table: Arc<LockTable>,
    guard: Option<ArcMutexGuard<RawMutex, ()>>,
}

impl KeyGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for KeyGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGuard").field("key", &self.key).finish()
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // only the table's own reference left means nobody holds or waits
        self.table
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
