//! Host interfaces for session storage.

use super::error::StoreResult;

/// Page-scoped key/value storage (the web view's `localStorage`).
///
/// Hosted content reads and writes the same keys directly, so values may change between
/// any two calls. Implementations must be synchronous.
#[uniffi::export(with_foreign)]
pub trait VolatileStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get_item(&self, key: String) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the page refuses the write.
    fn set_item(&self, key: String, value: String) -> StoreResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the page refuses the removal.
    fn remove_item(&self, key: String) -> StoreResult<()>;
}

/// Host key/value storage that survives app restarts (Capacitor `Preferences`,
/// `SharedPreferences`, `UserDefaults`).
///
/// Only reachable asynchronously. A host without such a store passes `None` wherever a
/// persistent store is accepted; the bridge then keeps sessions in the page only.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait PersistentStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    async fn get(&self, key: String) -> StoreResult<Option<String>>;

    /// Writes `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn set(&self, key: String, value: String) -> StoreResult<()>;

    /// Deletes `key`. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    async fn remove(&self, key: String) -> StoreResult<()>;
}
