//! Mediates between the page's volatile store and the host's persistent store.

use std::sync::Arc;

use serde::Serialize;

use crate::store::{
    PersistentStore, StoreResult, VolatileStore, PERSISTENT_TOKEN_KEY, PERSISTENT_USER_KEY,
    VOLATILE_TOKEN_KEY, VOLATILE_USER_KEY,
};

/// A bearer token and the serialized user it belongs to.
///
/// Either both halves exist or the session is absent; empty strings count as absent.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct SessionRecord {
    /// Opaque bearer token issued by the backend.
    pub token: String,
    /// The user object, serialized as JSON.
    pub user: String,
}

impl SessionRecord {
    /// Builds a record from two optional halves, rejecting partial or empty ones.
    #[must_use]
    pub fn from_parts(token: Option<String>, user: Option<String>) -> Option<Self> {
        match (token, user) {
            (Some(token), Some(user)) if !token.is_empty() && !user.is_empty() => {
                Some(Self { token, user })
            }
            _ => None,
        }
    }
}

/// Result of [`SessionManager::check_and_restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum RestoreOutcome {
    /// A persisted session was copied into the page.
    Restored,
    /// Nothing complete was persisted, the persistent store is absent, or restoring failed.
    NotRestored,
}

/// How far a [`SessionManager::save`] got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, uniffi::Enum)]
#[serde(rename_all = "camelCase")]
pub enum SessionDurability {
    /// Written to the page and to the persistent store.
    Durable,
    /// Only the page holds the session; it is lost on reload or cold start.
    PageOnly,
}

/// Reconciles the volatile and persistent stores. Holds no session state of its own.
///
/// Every operation is safe to call redundantly and never fails: store errors are logged and
/// folded into the returned outcome.
///
/// ```rust
/// use std::sync::Arc;
/// use sessionkit_core::{RestoreOutcome, SessionManager};
/// use sessionkit_core::store::{MemoryPersistentStore, MemoryVolatileStore};
///
/// # tokio_test::block_on(async {
/// let prefs = Arc::new(MemoryPersistentStore::new());
/// let first_page = SessionManager::new(Arc::new(MemoryVolatileStore::new()), Some(prefs.clone()));
/// first_page.save("t1".to_string(), r#"{"id":1}"#.to_string()).await;
///
/// // Cold start: fresh page storage, same host preferences.
/// let next_page = SessionManager::new(Arc::new(MemoryVolatileStore::new()), Some(prefs));
/// assert_eq!(next_page.check_and_restore().await, RestoreOutcome::Restored);
/// # });
/// ```
#[derive(Clone)]
pub struct SessionManager {
    volatile: Arc<dyn VolatileStore>,
    persistent: Option<Arc<dyn PersistentStore>>,
}

impl SessionManager {
    /// Creates a manager. Pass `None` when the host has no persistent store.
    #[must_use]
    pub fn new(
        volatile: Arc<dyn VolatileStore>,
        persistent: Option<Arc<dyn PersistentStore>>,
    ) -> Self {
        Self {
            volatile,
            persistent,
        }
    }

    /// Whether a persistent store is wired in.
    #[must_use]
    pub fn has_persistent_store(&self) -> bool {
        self.persistent.is_some()
    }

    /// The session currently visible to the page, if complete.
    #[must_use]
    pub fn volatile_session(&self) -> Option<SessionRecord> {
        SessionRecord::from_parts(
            self.volatile.get_item(VOLATILE_TOKEN_KEY.to_string()),
            self.volatile.get_item(VOLATILE_USER_KEY.to_string()),
        )
    }

    /// Whether the page currently holds a non-empty token, regardless of the user half.
    #[must_use]
    pub fn volatile_token_present(&self) -> bool {
        self.volatile
            .get_item(VOLATILE_TOKEN_KEY.to_string())
            .is_some_and(|token| !token.is_empty())
    }

    /// Copies a persisted session into the page.
    pub async fn check_and_restore(&self) -> RestoreOutcome {
        log::debug!("[Session] Checking for saved session");
        let Some(persistent) = &self.persistent else {
            log::info!("[Session] Persistent store not available, page storage only");
            return RestoreOutcome::NotRestored;
        };

        match self.restore_from(persistent.as_ref()).await {
            Ok(true) => {
                log::info!("[Session] Restored saved session");
                RestoreOutcome::Restored
            }
            Ok(false) => {
                log::debug!("[Session] No complete saved session");
                RestoreOutcome::NotRestored
            }
            Err(e) => {
                log::error!("[Session] Error restoring: {e}");
                RestoreOutcome::NotRestored
            }
        }
    }

    async fn restore_from(&self, persistent: &dyn PersistentStore) -> StoreResult<bool> {
        let token = persistent.get(PERSISTENT_TOKEN_KEY.to_string()).await?;
        let user = persistent.get(PERSISTENT_USER_KEY.to_string()).await?;
        let Some(record) = SessionRecord::from_parts(token, user) else {
            return Ok(false);
        };

        self.write_volatile(&record)?;
        Ok(true)
    }

    /// Writes the session into the page and, when available, into the persistent store.
    ///
    /// A failed persistent write leaves the page copy in place.
    pub async fn save(&self, token: String, user: String) -> SessionDurability {
        let record = SessionRecord { token, user };
        log::debug!("[Session] Saving session to page storage");
        if let Err(e) = self.write_volatile(&record) {
            log::error!("[Session] Error saving to page storage: {e}");
        }

        let Some(persistent) = &self.persistent else {
            log::info!("[Session] Persistent store not available, page storage only");
            return SessionDurability::PageOnly;
        };

        match write_persistent(persistent.as_ref(), record).await {
            Ok(()) => {
                log::debug!("[Session] Saved to persistent store");
                SessionDurability::Durable
            }
            Err(e) => {
                log::error!("[Session] Error saving to persistent store: {e}");
                SessionDurability::PageOnly
            }
        }
    }

    /// Removes the session from the page and from the persistent store.
    pub async fn clear(&self) {
        log::info!("[Session] Clearing session");
        for key in [VOLATILE_TOKEN_KEY, VOLATILE_USER_KEY] {
            if let Err(e) = self.volatile.remove_item(key.to_string()) {
                log::error!("[Session] Error clearing page storage key {key}: {e}");
            }
        }

        let Some(persistent) = &self.persistent else {
            return;
        };
        for key in [PERSISTENT_TOKEN_KEY, PERSISTENT_USER_KEY] {
            if let Err(e) = persistent.remove(key.to_string()).await {
                log::error!("[Session] Error clearing persistent key {key}: {e}");
            }
        }
    }

    /// Writes both halves, or neither: a failed user write takes the token back out.
    fn write_volatile(&self, record: &SessionRecord) -> StoreResult<()> {
        self.volatile
            .set_item(VOLATILE_TOKEN_KEY.to_string(), record.token.clone())?;
        let result = self
            .volatile
            .set_item(VOLATILE_USER_KEY.to_string(), record.user.clone());
        if result.is_err() {
            if let Err(e) = self.volatile.remove_item(VOLATILE_TOKEN_KEY.to_string()) {
                log::error!("[Session] Error removing half-written page token: {e}");
            }
        }
        result
    }
}

async fn write_persistent(
    persistent: &dyn PersistentStore,
    record: SessionRecord,
) -> StoreResult<()> {
    persistent
        .set(PERSISTENT_TOKEN_KEY.to_string(), record.token)
        .await?;
    persistent
        .set(PERSISTENT_USER_KEY.to_string(), record.user)
        .await
}
