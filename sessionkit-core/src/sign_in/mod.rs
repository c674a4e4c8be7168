//! Native Google sign-in: the capability surface the bridge consumes and a bundled plugin
//! implementing it on top of the platform's account picker.

mod plugin;

pub use plugin::{
    GoogleAccount, GoogleSignInOptions, GoogleSignInPlatform, GoogleSignInPlugin, LaunchOutcome,
    PickerResult, SignInState, SignOutStep,
};

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

/// Token and profile returned by a successful native sign-in.
///
/// Handed to the backend exchange exactly once and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentityAssertion {
    /// Google ID token (a JWT minted for the server client id). Empty when the platform
    /// returned none.
    pub id_token: String,
    /// Account email.
    pub email: String,
    /// Account display name.
    pub display_name: String,
    /// Profile photo, when the account has one.
    pub photo_url: Option<String>,
}

/// Result of a native sign-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct SignOutResult {
    /// Whether the platform confirmed the sign-out.
    pub success: bool,
}

/// The step of a sign-in attempt that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, uniffi::Enum)]
#[strum(serialize_all = "snake_case")]
pub enum SignInStage {
    /// Dropping the cached account so the picker is shown.
    SignOut,
    /// Showing the account picker and waiting for the user.
    Picker,
}

/// Why a native sign-in did not produce an identity.
#[derive(Debug, Clone, PartialEq, Eq, Error, uniffi::Error)]
pub enum SignInError {
    /// The user dismissed the flow. Expected; not shown to the user.
    #[error("User cancelled sign-in ({stage})")]
    Cancelled {
        /// Where the user backed out.
        stage: SignInStage,
    },
    /// The platform reported a failure.
    #[error("Google Sign-In failed: {status_code} - {message}")]
    Platform {
        /// Where it failed.
        stage: SignInStage,
        /// Platform status code (`ApiException.getStatusCode()` on Android).
        status_code: i32,
        /// Platform message.
        message: String,
    },
    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {reason}")]
    UnexpectedUniFFICallbackError {
        /// Reason given by the bindings.
        reason: String,
    },
}

impl SignInError {
    /// Whether this is a user cancellation rather than a failure.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for SignInError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError {
            reason: error.reason,
        }
    }
}

/// The native sign-in capability the credential bridge calls.
///
/// [`GoogleSignInPlugin`] implements it; hosts with their own plugin can implement it
/// directly.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait NativeSignIn: Send + Sync {
    /// Shows the account picker and resolves with the chosen account's identity.
    ///
    /// # Errors
    ///
    /// Returns [`SignInError::Cancelled`] when the user backs out and
    /// [`SignInError::Platform`] when the platform fails.
    async fn sign_in_with_google(&self) -> Result<IdentityAssertion, SignInError>;

    /// Signs out of the platform account. Does not touch any session store.
    ///
    /// # Errors
    ///
    /// Implementations may fail; the bundled plugin never does.
    async fn sign_out(&self) -> Result<SignOutResult, SignInError>;
}
