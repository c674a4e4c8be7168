use std::sync::{Arc, Mutex, PoisonError};

use super::{IdentityAssertion, NativeSignIn, SignInError, SignInStage, SignOutResult};

/// Google Sign-In client configuration pushed to the platform at load time.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct GoogleSignInOptions {
    /// The *Web* OAuth client id; ID tokens are minted for this audience so the backend can
    /// verify them.
    pub server_client_id: String,
    /// Ask for the account email.
    pub request_email: bool,
    /// Ask for the basic profile (name, photo).
    pub request_profile: bool,
}

impl GoogleSignInOptions {
    /// Options requesting an ID token plus email and profile.
    #[must_use]
    pub fn new(server_client_id: impl Into<String>) -> Self {
        Self {
            server_client_id: server_client_id.into(),
            request_email: true,
            request_profile: true,
        }
    }
}

/// The account the picker returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct GoogleAccount {
    /// ID token, when the platform produced one.
    pub id_token: Option<String>,
    /// Account email.
    pub email: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// Profile photo URL.
    pub photo_url: Option<String>,
}

/// Outcome of the platform sign-out step.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum SignOutStep {
    /// The cached account is gone.
    Completed,
    /// The user interrupted the sign-out.
    Cancelled,
    /// The platform failed to sign out.
    Failed {
        /// Platform status code.
        status_code: i32,
        /// Platform message.
        message: String,
    },
}

/// Outcome of asking the platform to show the picker.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum LaunchOutcome {
    /// The picker is on screen; a result will follow.
    Launched,
    /// The picker could not be shown (no presenting view controller, no activity).
    Failed {
        /// Platform status code.
        status_code: i32,
        /// Platform message.
        message: String,
    },
}

/// What the picker reported once dismissed.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum PickerResult {
    /// The user chose an account.
    Completed {
        /// The chosen account.
        account: GoogleAccount,
    },
    /// The user dismissed the picker (`RESULT_CANCELED`).
    Cancelled,
    /// The platform returned an error (`ApiException`).
    Failed {
        /// Platform status code.
        status_code: i32,
        /// Platform message.
        message: String,
    },
}

/// Raw platform Google Sign-In primitives (`GoogleSignInClient`, `GIDSignIn`).
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait GoogleSignInPlatform: Send + Sync {
    /// Applies the client configuration. Called once when the plugin loads.
    fn configure(&self, options: GoogleSignInOptions);

    /// Whether an account from a previous sign-in is still cached.
    fn has_cached_account(&self) -> bool;

    /// Signs the cached account out.
    async fn sign_out(&self) -> SignOutStep;

    /// Starts the account picker. Must not wait for the user.
    fn launch_picker(&self) -> LaunchOutcome;

    /// Waits for the picker started by `launch_picker` to finish.
    async fn picker_result(&self) -> PickerResult;
}

/// States of one sign-in attempt.
///
/// `Idle → [SigningOut →] Launching → AwaitingResult → Resolved | Rejected`; any
/// non-terminal state may also move straight to `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum SignInState {
    /// Not started.
    Idle,
    /// Dropping the cached account to force the picker.
    SigningOut,
    /// Asking the platform to show the picker.
    Launching,
    /// Picker on screen.
    AwaitingResult,
    /// An identity was obtained.
    Resolved,
    /// Cancelled or failed.
    Rejected,
}

impl SignInState {
    const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::SigningOut | Self::Launching)
                | (Self::SigningOut, Self::Launching)
                | (Self::Launching, Self::AwaitingResult)
                | (Self::AwaitingResult, Self::Resolved)
                | (
                    Self::Idle | Self::SigningOut | Self::Launching | Self::AwaitingResult,
                    Self::Rejected
                )
        )
    }

    /// Whether the attempt has finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }
}

/// Tracks the states one attempt went through.
struct SignInAttempt {
    trail: Vec<SignInState>,
}

impl SignInAttempt {
    fn start() -> Self {
        Self {
            trail: vec![SignInState::Idle],
        }
    }

    fn state(&self) -> SignInState {
        self.trail.last().copied().unwrap_or(SignInState::Idle)
    }

    fn advance(&mut self, next: SignInState) {
        debug_assert!(
            self.state().can_advance_to(next),
            "illegal sign-in transition {:?} -> {next:?}",
            self.state()
        );
        log::debug!("[NativeAuth] {:?} -> {next:?}", self.state());
        self.trail.push(next);
    }

    fn reject(&mut self, error: SignInError) -> SignInError {
        self.advance(SignInState::Rejected);
        error
    }
}

/// Native Google sign-in that always shows the account picker.
///
/// A cached account is signed out first so the user can pick a different one instead of
/// being signed in silently. Attempts are independent; concurrent calls are not merged.
#[derive(uniffi::Object)]
pub struct GoogleSignInPlugin {
    platform: Arc<dyn GoogleSignInPlatform>,
    last_trail: Mutex<Vec<SignInState>>,
}

#[uniffi::export]
impl GoogleSignInPlugin {
    /// Loads the plugin, configuring the platform with `options`.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(platform: Arc<dyn GoogleSignInPlatform>, options: GoogleSignInOptions) -> Self {
        platform.configure(options);
        Self {
            platform,
            last_trail: Mutex::new(Vec::new()),
        }
    }

    /// States the most recently finished attempt went through.
    #[must_use]
    pub fn last_attempt_trail(&self) -> Vec<SignInState> {
        self.last_trail
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl GoogleSignInPlugin {
    async fn run_attempt(&self, attempt: &mut SignInAttempt) -> Result<IdentityAssertion, SignInError> {
        if self.platform.has_cached_account() {
            log::debug!("[NativeAuth] Cached account found, signing out to force the picker");
            attempt.advance(SignInState::SigningOut);
            match self.platform.sign_out().await {
                SignOutStep::Completed => {}
                SignOutStep::Cancelled => {
                    return Err(attempt.reject(SignInError::Cancelled {
                        stage: SignInStage::SignOut,
                    }));
                }
                SignOutStep::Failed {
                    status_code,
                    message,
                } => {
                    return Err(attempt.reject(SignInError::Platform {
                        stage: SignInStage::SignOut,
                        status_code,
                        message,
                    }));
                }
            }
        }

        attempt.advance(SignInState::Launching);
        if let LaunchOutcome::Failed {
            status_code,
            message,
        } = self.platform.launch_picker()
        {
            return Err(attempt.reject(SignInError::Platform {
                stage: SignInStage::Picker,
                status_code,
                message,
            }));
        }

        attempt.advance(SignInState::AwaitingResult);
        match self.platform.picker_result().await {
            PickerResult::Completed { account } => {
                attempt.advance(SignInState::Resolved);
                log::info!(
                    "[NativeAuth] Sign-In successful, ID token present: {}",
                    account.id_token.as_deref().is_some_and(|t| !t.is_empty())
                );
                Ok(IdentityAssertion {
                    id_token: account.id_token.unwrap_or_default(),
                    email: account.email.unwrap_or_default(),
                    display_name: account.display_name.unwrap_or_default(),
                    photo_url: account.photo_url.filter(|url| !url.is_empty()),
                })
            }
            PickerResult::Cancelled => Err(attempt.reject(SignInError::Cancelled {
                stage: SignInStage::Picker,
            })),
            PickerResult::Failed {
                status_code,
                message,
            } => Err(attempt.reject(SignInError::Platform {
                stage: SignInStage::Picker,
                status_code,
                message,
            })),
        }
    }
}

#[async_trait::async_trait]
impl NativeSignIn for GoogleSignInPlugin {
    async fn sign_in_with_google(&self) -> Result<IdentityAssertion, SignInError> {
        log::debug!("[NativeAuth] Starting Google Sign-In");
        let mut attempt = SignInAttempt::start();
        let result = self.run_attempt(&mut attempt).await;
        if let Err(e) = &result {
            log::info!("[NativeAuth] Sign-In rejected: {e}");
        }
        *self
            .last_trail
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = attempt.trail;
        result
    }

    async fn sign_out(&self) -> Result<SignOutResult, SignInError> {
        let success = matches!(self.platform.sign_out().await, SignOutStep::Completed);
        Ok(SignOutResult { success })
    }
}
