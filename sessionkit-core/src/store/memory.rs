//! In-memory implementations of the store traits.
//!
//! Useful for tests, previews and hosts that want session-only persistence with the same
//! wiring as production.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::error::{StoreError, StoreResult};
use super::traits::{PersistentStore, VolatileStore};

/// Counts mutations and can be told to refuse them.
#[derive(Default)]
struct WriteGate {
    writes: AtomicU64,
    fail_writes: AtomicBool,
}

impl WriteGate {
    fn admit(&self) -> bool {
        if self.fail_writes.load(Ordering::SeqCst) {
            return false;
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        true
    }
}

fn lock(entries: &Mutex<HashMap<String, String>>) -> MutexGuard<'_, HashMap<String, String>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Page-scoped store backed by a `HashMap`.
#[derive(Default, uniffi::Object)]
pub struct MemoryVolatileStore {
    entries: Mutex<HashMap<String, String>>,
    gate: WriteGate,
}

#[uniffi::export]
impl MemoryVolatileStore {
    /// Creates an empty store.
    #[uniffi::constructor]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set_item`/`remove_item` calls so far.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.gate.writes.load(Ordering::SeqCst)
    }

    /// Makes every subsequent write fail, to exercise degraded paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.gate.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Drops every entry, as a page navigation would.
    pub fn reset(&self) {
        lock(&self.entries).clear();
    }
}

impl VolatileStore for MemoryVolatileStore {
    fn get_item(&self, key: String) -> Option<String> {
        lock(&self.entries).get(&key).cloned()
    }

    fn set_item(&self, key: String, value: String) -> StoreResult<()> {
        if !self.gate.admit() {
            return Err(StoreError::Volatile("writes disabled".to_string()));
        }
        lock(&self.entries).insert(key, value);
        Ok(())
    }

    fn remove_item(&self, key: String) -> StoreResult<()> {
        if !self.gate.admit() {
            return Err(StoreError::Volatile("writes disabled".to_string()));
        }
        lock(&self.entries).remove(&key);
        Ok(())
    }
}

/// Host-side store backed by a `HashMap`. Survives as long as the value is kept alive, which
/// lets tests model a cold start by pairing it with a fresh [`MemoryVolatileStore`].
#[derive(Default, uniffi::Object)]
pub struct MemoryPersistentStore {
    entries: Mutex<HashMap<String, String>>,
    gate: WriteGate,
}

#[uniffi::export]
impl MemoryPersistentStore {
    /// Creates an empty store.
    #[uniffi::constructor]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set`/`remove` calls so far.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.gate.writes.load(Ordering::SeqCst)
    }

    /// Makes every subsequent write fail, to exercise degraded paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.gate.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the stored value without going through the async interface.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }
}

#[async_trait::async_trait]
impl PersistentStore for MemoryPersistentStore {
    async fn get(&self, key: String) -> StoreResult<Option<String>> {
        Ok(lock(&self.entries).get(&key).cloned())
    }

    async fn set(&self, key: String, value: String) -> StoreResult<()> {
        if !self.gate.admit() {
            return Err(StoreError::Persistent("writes disabled".to_string()));
        }
        lock(&self.entries).insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: String) -> StoreResult<()> {
        if !self.gate.admit() {
            return Err(StoreError::Persistent("writes disabled".to_string()));
        }
        lock(&self.entries).remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volatile_round_trip_and_reset() {
        let store = MemoryVolatileStore::new();
        store.set_item("token".into(), "t".into()).unwrap();
        assert_eq!(store.get_item("token".into()).as_deref(), Some("t"));

        store.reset();
        assert_eq!(store.get_item("token".into()), None);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_volatile_failed_writes_are_not_counted() {
        let store = MemoryVolatileStore::new();
        store.set_fail_writes(true);

        let err = store.set_item("token".into(), "t".into()).unwrap_err();
        assert!(matches!(err, StoreError::Volatile(_)));
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.get_item("token".into()), None);
    }

    #[tokio::test]
    async fn test_persistent_remove_absent_key_is_ok() {
        let store = MemoryPersistentStore::new();
        store.remove("auth_token".into()).await.unwrap();
        assert_eq!(store.get("auth_token".into()).await.unwrap(), None);
    }
}
