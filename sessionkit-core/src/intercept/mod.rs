//! Page-wide click classification.
//!
//! The in-page shim listens for clicks in the capturing phase, snapshots the target and its
//! ancestors, and asks the [`ClickInterceptor`] what to do before any page handler runs.

mod recognizers;

pub use recognizers::{GoogleSignInRecognizer, LogoutRecognizer, Recognizer};

use serde::{Deserialize, Serialize};

use crate::config::BridgeConfig;

/// The parts of a DOM element the recognizers look at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementSnapshot {
    /// `tagName`; `None` for nodes without one (text nodes, the document).
    pub tag: Option<String>,
    /// `textContent`.
    pub text: String,
    /// `className`.
    pub class_name: String,
    /// `id`.
    pub id: String,
    /// The raw `href` attribute.
    pub href: Option<String>,
}

impl ElementSnapshot {
    /// Lowercase tag name, if any.
    #[must_use]
    pub fn tag_lowercase(&self) -> Option<String> {
        self.tag.as_deref().map(str::to_lowercase)
    }
}

/// A click as seen by the capturing listener: the target first, then its ancestors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct ClickEvent {
    /// `path[0]` is the event target, `path[1]` its parent, and so on.
    pub path: Vec<ElementSnapshot>,
}

/// Native behavior substituted for a click.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum ClickAction {
    /// The user is logging out; purge every stored session. Navigation proceeds.
    Logout,
    /// The user started the web Google OAuth flow; run the native flow instead.
    NativeGoogleSignIn {
        /// The intercepted link's `href`, carrying the optional return location.
        href: String,
    },
}

/// The interceptor's verdict for one click.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ClickDisposition {
    /// What to run natively, if anything.
    pub action: Option<ClickAction>,
    /// Index in the event path of the element that matched.
    pub matched_depth: Option<u32>,
    /// Whether the shim must call `preventDefault()`.
    pub prevent_default: bool,
    /// Whether the shim must call `stopPropagation()`.
    pub stop_propagation: bool,
}

impl ClickDisposition {
    /// A click the bridge does not care about.
    #[must_use]
    pub const fn ignored() -> Self {
        Self {
            action: None,
            matched_depth: None,
            prevent_default: false,
            stop_propagation: false,
        }
    }

    fn matched(action: ClickAction, depth: u32) -> Self {
        let suppress = matches!(action, ClickAction::NativeGoogleSignIn { .. });
        Self {
            action: Some(action),
            matched_depth: Some(depth),
            prevent_default: suppress,
            stop_propagation: suppress,
        }
    }
}

/// Walks the click path through a list of pluggable [`Recognizer`]s.
pub struct ClickInterceptor {
    recognizers: Vec<Box<dyn Recognizer>>,
    max_depth: usize,
}

impl ClickInterceptor {
    /// Creates an interceptor with no recognizers.
    #[must_use]
    pub const fn new(max_depth: usize) -> Self {
        Self {
            recognizers: Vec::new(),
            max_depth,
        }
    }

    /// Creates an interceptor with the built-in recognizers the config enables.
    ///
    /// Sign-in links are checked before logout indicators so a "sign in with Google" link is
    /// never mistaken for a logout control.
    #[must_use]
    pub fn from_config(config: &BridgeConfig) -> Self {
        let mut interceptor = Self::new(config.max_ancestor_depth as usize);
        if config.intercept_google_sign_in {
            interceptor = interceptor.with_recognizer(Box::new(GoogleSignInRecognizer::new(
                &config.google_login_route,
            )));
        }
        if config.detect_logout {
            interceptor = interceptor.with_recognizer(Box::new(LogoutRecognizer::new(
                config.logout_indicators.iter().map(String::as_str),
            )));
        }
        interceptor
    }

    /// Appends a recognizer; earlier recognizers win ties on the same element.
    #[must_use]
    pub fn with_recognizer(mut self, recognizer: Box<dyn Recognizer>) -> Self {
        self.recognizers.push(recognizer);
        self
    }

    /// Names of the active recognizers, in evaluation order.
    #[must_use]
    pub fn recognizer_names(&self) -> Vec<&'static str> {
        self.recognizers.iter().map(|r| r.name()).collect()
    }

    /// Classifies a click. Stops at the first match, at the depth limit, or at an element
    /// without a tag.
    #[must_use]
    pub fn classify(&self, event: &ClickEvent) -> ClickDisposition {
        for (depth, element) in event.path.iter().take(self.max_depth).enumerate() {
            if element.tag.as_deref().is_none_or(str::is_empty) {
                break;
            }
            for recognizer in &self.recognizers {
                if let Some(action) = recognizer.recognize(element) {
                    log::debug!(
                        "[Native Bridge] {} matched at depth {depth}",
                        recognizer.name()
                    );
                    #[allow(clippy::cast_possible_truncation)]
                    return ClickDisposition::matched(action, depth as u32);
                }
            }
        }
        ClickDisposition::ignored()
    }
}
