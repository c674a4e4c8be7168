//! Page classification and the once-per-load reconciliation of the two session stores.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tokio::sync::watch;

use crate::config::BridgeConfig;
use crate::session::{RestoreOutcome, SessionDurability, SessionManager};

/// Host capabilities the bridge needs from the web view.
#[uniffi::export(with_foreign)]
pub trait PageHost: Send + Sync {
    /// Loads `location` in the web view, replacing the current page.
    fn navigate(&self, location: String);

    /// Shows `message` to the user (a JavaScript `alert` in the reference shells).
    fn alert(&self, message: String);
}

/// Which reconciliation branch a page load takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum PageContext {
    /// A login or signup page.
    LoginSurface,
    /// Any other page of the hosted application.
    GeneralSurface,
}

impl PageContext {
    /// Classifies `location` by looking for any of `login_paths` in its path.
    ///
    /// Locations that do not parse as absolute URLs are matched as raw strings.
    #[must_use]
    pub fn classify(location: &str, login_paths: &[String]) -> Self {
        let path = Url::parse(location)
            .map_or_else(|_| location.to_string(), |url| url.path().to_string());

        if login_paths
            .iter()
            .any(|login| !login.is_empty() && path.contains(login.as_str()))
        {
            Self::LoginSurface
        } else {
            Self::GeneralSurface
        }
    }
}

/// One-shot signal fired by the hosted page once its own startup code has finished writing
/// page storage. Reconciliation waits for it instead of guessing a settle delay.
#[derive(uniffi::Object)]
pub struct PageReady {
    tx: watch::Sender<bool>,
}

#[uniffi::export]
impl PageReady {
    /// Creates an unfired signal. Create one per page load.
    #[uniffi::constructor]
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Fires the signal. Firing more than once has no further effect.
    pub fn mark_ready(&self) {
        self.tx.send_replace(true);
    }

    /// Whether the signal has fired.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for PageReady {
    fn default() -> Self {
        Self::new()
    }
}

impl PageReady {
    /// Waits until the signal fires.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

/// What a page-load reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum ReconcileOutcome {
    /// Login page with a page token and a persisted session: restored and redirected.
    Restored {
        /// Where the page was sent.
        redirect_to: String,
    },
    /// Login page with a page token but nothing to restore; no navigation.
    RestoreMissed,
    /// Login page without a page token: every stored copy of the session was purged.
    PurgedStale,
    /// Application page with a complete page session: mirrored into the persistent store.
    Propagated {
        /// How far the write got.
        durability: SessionDurability,
    },
    /// Application page without a page session: nothing to do.
    Untouched,
}

/// Runs once per page load and decides between restore, propagate and clear.
pub struct PageLoadReconciler {
    sessions: SessionManager,
    config: Arc<BridgeConfig>,
    host: Arc<dyn PageHost>,
}

impl PageLoadReconciler {
    /// Creates a reconciler over `sessions`.
    #[must_use]
    pub fn new(
        sessions: SessionManager,
        config: Arc<BridgeConfig>,
        host: Arc<dyn PageHost>,
    ) -> Self {
        Self {
            sessions,
            config,
            host,
        }
    }

    /// Reconciles once `ready` fires, or after the configured timeout if the page never
    /// signals.
    pub async fn reconcile_when_ready(&self, location: &str, ready: &PageReady) -> ReconcileOutcome {
        let timeout = Duration::from_millis(self.config.ready_timeout_ms);
        if tokio::time::timeout(timeout, ready.wait()).await.is_err() {
            log::warn!(
                "[Session] Page did not signal ready within {timeout:?}, reconciling anyway"
            );
        }
        self.reconcile(location).await
    }

    /// Reconciles immediately.
    pub async fn reconcile(&self, location: &str) -> ReconcileOutcome {
        match PageContext::classify(location, &self.config.login_paths) {
            PageContext::LoginSurface => self.reconcile_login_surface().await,
            PageContext::GeneralSurface => self.reconcile_general_surface().await,
        }
    }

    async fn reconcile_login_surface(&self) -> ReconcileOutcome {
        if !self.sessions.volatile_token_present() {
            log::info!("[Session] On login page without token, clearing any persisted session");
            self.sessions.clear().await;
            return ReconcileOutcome::PurgedStale;
        }

        log::info!("[Session] On login page with token, attempting auto-login");
        match self.sessions.check_and_restore().await {
            RestoreOutcome::Restored => {
                let redirect_to = self.config.landing_location.clone();
                log::info!("[Session] Auto-login successful, redirecting to {redirect_to}");
                self.host.navigate(redirect_to.clone());
                ReconcileOutcome::Restored { redirect_to }
            }
            RestoreOutcome::NotRestored => ReconcileOutcome::RestoreMissed,
        }
    }

    async fn reconcile_general_surface(&self) -> ReconcileOutcome {
        match self.sessions.volatile_session() {
            Some(record) => {
                let durability = self.sessions.save(record.token, record.user).await;
                ReconcileOutcome::Propagated { durability }
            }
            None => ReconcileOutcome::Untouched,
        }
    }
}
