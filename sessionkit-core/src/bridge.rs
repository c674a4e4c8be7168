use std::sync::Arc;

use crate::{
    config::BridgeConfig,
    credential_bridge::{CredentialBridge, SignInOutcome},
    error::SessionKitError,
    intercept::{ClickAction, ClickDisposition, ClickEvent, ClickInterceptor},
    messages,
    page::{PageHost, PageLoadReconciler, PageReady, ReconcileOutcome},
    session::{RestoreOutcome, SessionDurability, SessionManager},
    sign_in::{GoogleSignInPlugin, NativeSignIn, SignOutResult},
    store::{PersistentStore, VolatileStore},
};

/// What running a [`ClickAction`] did.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum ActionOutcome {
    /// Every stored copy of the session was purged.
    SessionCleared,
    /// A native sign-in ran.
    SignIn {
        /// How it ended.
        outcome: SignInOutcome,
    },
}

/// The single entry point a native shell talks to.
///
/// One bridge lives as long as the web view. Per page load the shell calls
/// [`SessionBridge::reconcile_when_ready`]; per click it asks
/// [`SessionBridge::classify_click`] synchronously (to decide on `preventDefault`) and then
/// hands the action to [`SessionBridge::perform`].
#[derive(uniffi::Object)]
pub struct SessionBridge {
    config: Arc<BridgeConfig>,
    sessions: SessionManager,
    reconciler: PageLoadReconciler,
    interceptor: ClickInterceptor,
    credentials: CredentialBridge,
    native: Arc<dyn NativeSignIn>,
}

#[uniffi::export(async_runtime = "tokio")]
impl SessionBridge {
    /// Wires the bridge to the host's capabilities.
    ///
    /// Pass `None` for `persistent` when the host has no durable storage; sessions then live
    /// only as long as the page.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `config` does not validate.
    #[uniffi::constructor]
    pub fn new(
        config: BridgeConfig,
        volatile: Arc<dyn VolatileStore>,
        persistent: Option<Arc<dyn PersistentStore>>,
        native: Arc<dyn NativeSignIn>,
        host: Arc<dyn PageHost>,
    ) -> Result<Self, SessionKitError> {
        config.validate()?;
        let config = Arc::new(config);
        let sessions = SessionManager::new(volatile, persistent);
        if !sessions.has_persistent_store() {
            log::warn!("[Session] No persistent store, sessions will not survive restarts");
        }

        Ok(Self {
            reconciler: PageLoadReconciler::new(sessions.clone(), config.clone(), host.clone()),
            interceptor: ClickInterceptor::from_config(&config),
            credentials: CredentialBridge::new(
                sessions.clone(),
                native.clone(),
                config.clone(),
                host,
            ),
            sessions,
            native,
            config,
        })
    }

    /// Like [`SessionBridge::new`], signing in through the bundled [`GoogleSignInPlugin`].
    ///
    /// # Errors
    /// Returns `InvalidInput` if `config` does not validate.
    #[uniffi::constructor]
    pub fn with_google_plugin(
        config: BridgeConfig,
        volatile: Arc<dyn VolatileStore>,
        persistent: Option<Arc<dyn PersistentStore>>,
        plugin: Arc<GoogleSignInPlugin>,
        host: Arc<dyn PageHost>,
    ) -> Result<Self, SessionKitError> {
        Self::new(config, volatile, persistent, plugin, host)
    }

    /// The configuration the bridge runs with.
    #[must_use]
    pub fn config(&self) -> BridgeConfig {
        (*self.config).clone()
    }

    /// Reconciles the stores for a freshly loaded `location` once `ready` fires, or after
    /// the configured timeout.
    #[allow(clippy::needless_pass_by_value)]
    pub async fn reconcile_when_ready(
        &self,
        location: &str,
        ready: Arc<PageReady>,
    ) -> ReconcileOutcome {
        self.reconciler.reconcile_when_ready(location, &ready).await
    }

    /// Reconciles the stores for `location` immediately.
    pub async fn reconcile_page(&self, location: &str) -> ReconcileOutcome {
        self.reconciler.reconcile(location).await
    }

    /// Classifies a click without running anything.
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn classify_click(&self, event: ClickEvent) -> ClickDisposition {
        self.interceptor.classify(&event)
    }

    /// Runs the native side of a classified click.
    pub async fn perform(&self, action: ClickAction) -> ActionOutcome {
        match action {
            ClickAction::Logout => {
                log::info!("[Session] Logout detected, clearing session");
                self.sessions.clear().await;
                ActionOutcome::SessionCleared
            }
            ClickAction::NativeGoogleSignIn { href } => {
                log::info!("[Native Bridge] Intercepted Google login link");
                ActionOutcome::SignIn {
                    outcome: self.credentials.sign_in(&href).await,
                }
            }
        }
    }

    /// Classifies a click and runs its action, for shells that route clicks natively.
    #[allow(clippy::needless_pass_by_value)]
    pub async fn handle_click(&self, event: ClickEvent) -> ClickDisposition {
        let disposition = self.interceptor.classify(&event);
        if let Some(action) = disposition.action.clone() {
            self.perform(action).await;
        }
        disposition
    }

    /// Copies the persisted session into the page.
    pub async fn check_and_restore(&self) -> RestoreOutcome {
        self.sessions.check_and_restore().await
    }

    /// Stores a session in both stores.
    pub async fn save(&self, token: String, user: String) -> SessionDurability {
        self.sessions.save(token, user).await
    }

    /// Forgets the session everywhere.
    pub async fn clear(&self) {
        self.sessions.clear().await;
    }

    /// Answers a JSON [`crate::BridgeRequest`] from the page with a JSON
    /// [`crate::BridgeResponse`].
    pub async fn handle_message(&self, json: &str) -> String {
        messages::dispatch_json(&self.sessions, json).await
    }

    /// Signs out of the native Google account and forgets the session everywhere.
    ///
    /// The session is cleared even when the native sign-out fails.
    ///
    /// # Errors
    /// Returns the native sign-out failure, after clearing.
    pub async fn sign_out(&self) -> Result<SignOutResult, SessionKitError> {
        let result = self.native.sign_out().await;
        self.sessions.clear().await;
        result.map_err(SessionKitError::from)
    }
}
