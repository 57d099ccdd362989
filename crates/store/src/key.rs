//! Document keys: allocation and validation.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Source of fresh document keys for creates that don't supply one.
pub trait KeyAllocator: Send + Sync {
    fn allocate(&self) -> String;
}

/// Random v4 UUID keys. Collisions are improbable enough to skip a pre-check.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKeys;

impl KeyAllocator for UuidKeys {
    fn allocate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `prefix-N` keys, for tests and scripted imports.
#[derive(Debug)]
pub struct SequentialKeys {
    prefix: String,
    next: AtomicU64,
}

impl SequentialKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(0),
        }
    }
}

impl KeyAllocator for SequentialKeys {
    fn allocate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, n)
    }
}

/// Check that a key can name a file directly under the document root.
///
/// Rejects the empty key, `.` and `..`, and anything containing a path
/// separator or NUL.
pub fn validate_key(key: &str) -> bool {
    !key.is_empty() && key != "." && key != ".." && !key.contains(['/', '\\', '\0'])
}
