//! Recording hosts and scripted sign-in used across unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::page::PageHost;
use crate::sign_in::{
    IdentityAssertion, NativeSignIn, SignInError, SignInStage, SignOutResult,
};
use crate::store::{MemoryPersistentStore, MemoryVolatileStore};
use crate::{BridgeConfig, SessionManager};

#[derive(Default)]
pub struct RecordingHost {
    navigations: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl PageHost for RecordingHost {
    fn navigate(&self, location: String) {
        self.navigations.lock().unwrap().push(location);
    }

    fn alert(&self, message: String) {
        self.alerts.lock().unwrap().push(message);
    }
}

/// Replays queued sign-in results, then reports cancellation.
#[derive(Default)]
pub struct ScriptedSignIn {
    results: Mutex<VecDeque<Result<IdentityAssertion, SignInError>>>,
    calls: AtomicUsize,
}

impl ScriptedSignIn {
    pub fn resolving(id_token: &str) -> Self {
        Self::with(Ok(IdentityAssertion {
            id_token: id_token.to_string(),
            email: "coach@example.com".to_string(),
            display_name: "Coach".to_string(),
            photo_url: None,
        }))
    }

    pub fn with(result: Result<IdentityAssertion, SignInError>) -> Self {
        Self {
            results: Mutex::new(VecDeque::from([result])),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl NativeSignIn for ScriptedSignIn {
    async fn sign_in_with_google(&self) -> Result<IdentityAssertion, SignInError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SignInError::Cancelled {
                stage: SignInStage::Picker,
            }))
    }

    async fn sign_out(&self) -> Result<SignOutResult, SignInError> {
        Ok(SignOutResult { success: true })
    }
}

/// Stores, host and sign-in shared by a test.
pub struct Harness {
    pub page: Arc<MemoryVolatileStore>,
    pub prefs: Arc<MemoryPersistentStore>,
    pub host: Arc<RecordingHost>,
    pub native: Arc<ScriptedSignIn>,
    pub config: Arc<BridgeConfig>,
}

impl Harness {
    pub fn new(native: ScriptedSignIn, config: BridgeConfig) -> Self {
        Self {
            page: Arc::new(MemoryVolatileStore::new()),
            prefs: Arc::new(MemoryPersistentStore::new()),
            host: Arc::new(RecordingHost::default()),
            native: Arc::new(native),
            config: Arc::new(config),
        }
    }

    pub fn sessions(&self) -> SessionManager {
        SessionManager::new(self.page.clone(), Some(self.prefs.clone()))
    }

    pub fn store_writes(&self) -> u64 {
        self.page.write_count() + self.prefs.write_count()
    }
}

/// A config pointing the backend at a mock server.
pub fn config_for(server_url: &str) -> BridgeConfig {
    BridgeConfig {
        backend_origin: server_url.to_string(),
        max_retries: 0,
        ..BridgeConfig::default()
    }
}
