//! Replaces the web Google OAuth redirect with the native picker plus a token exchange.

use std::sync::Arc;

use crate::{
    config::BridgeConfig,
    error::SessionKitError,
    exchange::{resolve_return_location, TokenExchange},
    page::PageHost,
    session::SessionManager,
    sign_in::NativeSignIn,
};

/// How a native sign-in attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum SignInOutcome {
    /// The session is installed and the page was sent to `redirect_to`.
    SignedIn {
        /// The resolved return location.
        redirect_to: String,
    },
    /// The user backed out, or the platform returned no ID token. Nothing was shown.
    Cancelled,
    /// The attempt failed; `message` was shown to the user. No session was written.
    Failed {
        /// The alert text.
        message: String,
    },
}

/// Runs the native credential flow for an intercepted sign-in link.
pub struct CredentialBridge {
    sessions: SessionManager,
    native: Arc<dyn NativeSignIn>,
    exchange: TokenExchange,
    config: Arc<BridgeConfig>,
    host: Arc<dyn PageHost>,
}

impl CredentialBridge {
    /// Creates a bridge.
    #[must_use]
    pub fn new(
        sessions: SessionManager,
        native: Arc<dyn NativeSignIn>,
        config: Arc<BridgeConfig>,
        host: Arc<dyn PageHost>,
    ) -> Self {
        Self {
            sessions,
            exchange: TokenExchange::new(&config),
            native,
            config,
            host,
        }
    }

    /// Signs in natively for the link `href`, exchanges the identity with the backend,
    /// saves the session and navigates to the link's return location.
    ///
    /// Every failure is logged and, unless it is a cancellation, shown via
    /// [`PageHost::alert`]. No store is written unless the exchange succeeds.
    pub async fn sign_in(&self, href: &str) -> SignInOutcome {
        let redirect_to = resolve_return_location(href, &self.config);
        log::info!("[Native Bridge] Will redirect to: {redirect_to}");

        log::info!("[Native Bridge] Triggering native Google Sign-In");
        let identity = match self.native.sign_in_with_google().await {
            Ok(identity) => identity,
            Err(e) if e.is_cancellation() => {
                log::info!("[Native Bridge] Native sign-in cancelled: {e}");
                return SignInOutcome::Cancelled;
            }
            Err(e) => return self.fail(&SessionKitError::from(e)),
        };

        if identity.id_token.is_empty() {
            log::info!("[Native Bridge] No ID token received, user may have cancelled");
            return SignInOutcome::Cancelled;
        }

        let session = match self.exchange.exchange(&identity.id_token).await {
            Ok(session) => session,
            Err(e) => return self.fail(&e),
        };

        self.sessions.save(session.token, session.user).await;
        log::info!("[Native Bridge] Redirecting to: {redirect_to}");
        self.host.navigate(redirect_to.clone());
        SignInOutcome::SignedIn { redirect_to }
    }

    fn fail(&self, error: &SessionKitError) -> SignInOutcome {
        log::error!("[Native Bridge] Error during native sign-in: {error}");
        let message = match error {
            SessionKitError::ExchangeRejected { body, .. } => format!("Login failed: {body}"),
            other => format!("Login error: {other}"),
        };
        self.host.alert(message.clone());
        SignInOutcome::Failed { message }
    }
}
