//! The bundled `GoogleSignInPlugin` wired into a `SessionBridge`, against a scripted
//! platform. None of these attempts reach the backend.

use std::sync::{Arc, Mutex};

use sessionkit_core::sign_in::{
    GoogleAccount, GoogleSignInOptions, LaunchOutcome, PickerResult, SignInState, SignOutStep,
};
use sessionkit_core::store::{MemoryPersistentStore, MemoryVolatileStore};
use sessionkit_core::{
    ActionOutcome, BridgeConfig, ClickAction, GoogleSignInPlatform, GoogleSignInPlugin,
    NativeSignIn, PageHost, SessionBridge, SignInError, SignInOutcome,
};

struct ScriptedPlatform {
    cached_account: bool,
    picker: PickerResult,
    configured: Mutex<Option<GoogleSignInOptions>>,
}

impl ScriptedPlatform {
    fn new(cached_account: bool, picker: PickerResult) -> Self {
        Self {
            cached_account,
            picker,
            configured: Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl GoogleSignInPlatform for ScriptedPlatform {
    fn configure(&self, options: GoogleSignInOptions) {
        *self.configured.lock().unwrap() = Some(options);
    }

    fn has_cached_account(&self) -> bool {
        self.cached_account
    }

    async fn sign_out(&self) -> SignOutStep {
        SignOutStep::Completed
    }

    fn launch_picker(&self) -> LaunchOutcome {
        LaunchOutcome::Launched
    }

    async fn picker_result(&self) -> PickerResult {
        self.picker.clone()
    }
}

#[derive(Default)]
struct Host {
    navigations: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl PageHost for Host {
    fn navigate(&self, location: String) {
        self.navigations.lock().unwrap().push(location);
    }

    fn alert(&self, message: String) {
        self.alerts.lock().unwrap().push(message);
    }
}

struct Setup {
    platform: Arc<ScriptedPlatform>,
    plugin: Arc<GoogleSignInPlugin>,
    prefs: Arc<MemoryPersistentStore>,
    host: Arc<Host>,
    bridge: SessionBridge,
}

fn setup(cached_account: bool, picker: PickerResult) -> Setup {
    let platform = Arc::new(ScriptedPlatform::new(cached_account, picker));
    let plugin = Arc::new(GoogleSignInPlugin::new(
        platform.clone(),
        GoogleSignInOptions::new("1234-web.apps.googleusercontent.com"),
    ));
    let prefs = Arc::new(MemoryPersistentStore::new());
    let host = Arc::new(Host::default());
    let bridge = SessionBridge::with_google_plugin(
        BridgeConfig::default(),
        Arc::new(MemoryVolatileStore::new()),
        Some(prefs.clone()),
        plugin.clone(),
        host.clone(),
    )
    .unwrap();
    Setup {
        platform,
        plugin,
        prefs,
        host,
        bridge,
    }
}

fn google_link() -> ClickAction {
    ClickAction::NativeGoogleSignIn {
        href: "/auth/google/login?return_url=%2Fdashboard".to_string(),
    }
}

#[test]
fn test_plugin_configures_platform_on_load() {
    let setup = setup(false, PickerResult::Cancelled);
    let options = setup.platform.configured.lock().unwrap().clone().unwrap();
    assert_eq!(options.server_client_id, "1234-web.apps.googleusercontent.com");
    assert!(options.request_email);
}

#[tokio::test]
async fn test_cancelled_picker_after_sign_out_is_silent() {
    let setup = setup(true, PickerResult::Cancelled);

    let outcome = setup.bridge.perform(google_link()).await;

    assert_eq!(
        outcome,
        ActionOutcome::SignIn {
            outcome: SignInOutcome::Cancelled
        }
    );
    assert_eq!(
        setup.plugin.last_attempt_trail(),
        vec![
            SignInState::Idle,
            SignInState::SigningOut,
            SignInState::Launching,
            SignInState::AwaitingResult,
            SignInState::Rejected,
        ]
    );
    assert!(setup.host.alerts.lock().unwrap().is_empty());
    assert!(setup.host.navigations.lock().unwrap().is_empty());
    assert_eq!(setup.prefs.write_count(), 0);
}

#[tokio::test]
async fn test_account_without_id_token_is_treated_as_cancellation() {
    let setup = setup(
        false,
        PickerResult::Completed {
            account: GoogleAccount {
                email: Some("coach@example.com".to_string()),
                ..GoogleAccount::default()
            },
        },
    );

    let identity = setup.plugin.sign_in_with_google().await.unwrap();
    assert!(identity.id_token.is_empty());
    assert_eq!(identity.email, "coach@example.com");

    let outcome = setup.bridge.perform(google_link()).await;
    assert_eq!(
        outcome,
        ActionOutcome::SignIn {
            outcome: SignInOutcome::Cancelled
        }
    );
    assert_eq!(setup.prefs.write_count(), 0);
}

#[tokio::test]
async fn test_picker_error_is_alerted() {
    let setup = setup(
        false,
        PickerResult::Failed {
            status_code: 12500,
            message: "SIGN_IN_FAILED".to_string(),
        },
    );

    let err = setup.plugin.sign_in_with_google().await.unwrap_err();
    assert!(matches!(err, SignInError::Platform { status_code: 12500, .. }));

    let outcome = setup.bridge.perform(google_link()).await;
    let message = "Login error: Google Sign-In failed: 12500 - SIGN_IN_FAILED".to_string();
    assert_eq!(
        outcome,
        ActionOutcome::SignIn {
            outcome: SignInOutcome::Failed {
                message: message.clone()
            }
        }
    );
    assert_eq!(*setup.host.alerts.lock().unwrap(), vec![message]);
    assert_eq!(setup.prefs.write_count(), 0);
}
