use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::SessionKitError;

/// Origin of the hosted web application and of the native token-exchange endpoint.
pub const DEFAULT_BACKEND_ORIGIN: &str = "https://app.my-coach-finder.com";

/// Where users land after a restored or freshly exchanged session.
pub const DEFAULT_LANDING_LOCATION: &str = "https://app.my-coach-finder.com/";

/// How many elements (the click target included) the interceptor inspects per click.
pub const DEFAULT_ANCESTOR_DEPTH: u32 = 5;

/// Lowercase substrings identifying a logout control. Matched against an element's text,
/// class, id and link target.
const DEFAULT_LOGOUT_INDICATORS: &[&str] = &[
    "logout",
    "log out",
    "log-out",
    "signout",
    "sign out",
    "sign-out",
    "abmelden",
    "ausloggen",
    "déconnexion",
    "se déconnecter",
    "cerrar sesión",
    "disconnetti",
    "uitloggen",
    "afmelden",
    "wyloguj",
];

/// Everything the bridge needs to know about the hosted application.
///
/// Missing fields fall back to the defaults when deserializing, so hosts only need to
/// override what differs from production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct BridgeConfig {
    /// Scheme and host of the backend, e.g. `https://app.my-coach-finder.com`.
    pub backend_origin: String,
    /// Absolute location to navigate to after a restore or a sign-in without `return_url`.
    pub landing_location: String,
    /// Path fragments that classify a page as a login surface.
    pub login_paths: Vec<String>,
    /// Path fragment of the web OAuth entry point that native sign-in replaces.
    pub google_login_route: String,
    /// Path of the backend endpoint exchanging a Google ID token for a session.
    pub native_exchange_path: String,
    /// Query parameter of the intercepted link carrying the post-login location.
    pub return_parameter: String,
    /// Lowercase substrings identifying logout controls.
    pub logout_indicators: Vec<String>,
    /// Enables the logout recognizer.
    pub detect_logout: bool,
    /// Enables the native Google sign-in recognizer.
    pub intercept_google_sign_in: bool,
    /// Number of elements inspected per click, starting at the target.
    pub max_ancestor_depth: u32,
    /// Upper bound to wait for the page's ready signal before reconciling anyway.
    pub ready_timeout_ms: u64,
    /// Timeout for a single backend request.
    pub request_timeout_ms: u64,
    /// Retries for backend requests that provably did not reach the endpoint.
    pub max_retries: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            backend_origin: DEFAULT_BACKEND_ORIGIN.to_string(),
            landing_location: DEFAULT_LANDING_LOCATION.to_string(),
            login_paths: vec!["/auth/login".to_string(), "/auth/signup".to_string()],
            google_login_route: "/auth/google/login".to_string(),
            native_exchange_path: "/auth/google/native".to_string(),
            return_parameter: "return_url".to_string(),
            logout_indicators: DEFAULT_LOGOUT_INDICATORS
                .iter()
                .map(ToString::to_string)
                .collect(),
            detect_logout: true,
            intercept_google_sign_in: true,
            max_ancestor_depth: DEFAULT_ANCESTOR_DEPTH,
            ready_timeout_ms: 2_000,
            request_timeout_ms: 10_000,
            max_retries: 2,
        }
    }
}

impl BridgeConfig {
    /// Checks the configuration is usable.
    ///
    /// # Errors
    /// Returns `InvalidInput` naming the first offending attribute.
    pub fn validate(&self) -> Result<(), SessionKitError> {
        let origin = self.origin_url()?;
        #[cfg(not(test))]
        if origin.scheme() != "https" {
            return Err(invalid("backend_origin", "must use https"));
        }
        if origin.host_str().is_none() {
            return Err(invalid("backend_origin", "must include a host"));
        }

        let landing = Url::parse(&self.landing_location)
            .map_err(|e| invalid("landing_location", &e.to_string()))?;
        if !matches!(landing.scheme(), "http" | "https") {
            return Err(invalid("landing_location", "must be an http(s) location"));
        }

        if self.google_login_route.trim().is_empty() {
            return Err(invalid("google_login_route", "must not be empty"));
        }
        if self.max_ancestor_depth == 0 {
            return Err(invalid("max_ancestor_depth", "must be at least 1"));
        }
        Ok(())
    }

    /// The backend origin as a parsed URL.
    pub(crate) fn origin_url(&self) -> Result<Url, SessionKitError> {
        Url::parse(&self.backend_origin).map_err(|e| invalid("backend_origin", &e.to_string()))
    }

    /// The backend origin without a trailing slash, ready for path concatenation.
    pub(crate) fn origin_prefix(&self) -> &str {
        self.backend_origin.trim_end_matches('/')
    }
}

fn invalid(attribute: &str, reason: &str) -> SessionKitError {
    SessionKitError::InvalidInput {
        attribute: attribute.to_string(),
        reason: reason.to_string(),
    }
}

/// Returns the production configuration.
#[uniffi::export]
#[must_use]
pub fn default_bridge_config() -> BridgeConfig {
    BridgeConfig::default()
}

/// Deserializes a [`BridgeConfig`] from JSON, filling omitted fields with defaults.
///
/// # Errors
/// Returns an error if the JSON is invalid or the resulting configuration fails validation.
#[uniffi::export]
pub fn config_from_json(json: &str) -> Result<BridgeConfig, SessionKitError> {
    let config: BridgeConfig =
        serde_json::from_str(json).map_err(|e| SessionKitError::SerializationError {
            error: format!("invalid bridge config json: {e}"),
        })?;
    config.validate()?;
    Ok(config)
}
