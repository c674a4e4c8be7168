use super::{ClickAction, ElementSnapshot};

/// A predicate over a single element of the click path.
pub trait Recognizer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Returns the action this element stands for, if it is one this recognizer knows.
    fn recognize(&self, element: &ElementSnapshot) -> Option<ClickAction>;
}

/// Elements that can plausibly act as a logout control.
const LOGOUT_TAGS: &[&str] = &["button", "a", "div", "span"];

/// Recognizes logout controls by free-text indicators in text, class, id or link target.
pub struct LogoutRecognizer {
    indicators: Vec<String>,
}

impl LogoutRecognizer {
    /// Creates a recognizer; indicators are matched case-insensitively as substrings.
    pub fn new<'a>(indicators: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            indicators: indicators
                .into_iter()
                .map(str::trim)
                .filter(|indicator| !indicator.is_empty())
                .map(str::to_lowercase)
                .collect(),
        }
    }

    fn mentions_logout(&self, haystack: &str) -> bool {
        let haystack = haystack.trim().to_lowercase();
        !haystack.is_empty()
            && self
                .indicators
                .iter()
                .any(|indicator| haystack.contains(indicator.as_str()))
    }
}

impl Recognizer for LogoutRecognizer {
    fn name(&self) -> &'static str {
        "logout"
    }

    fn recognize(&self, element: &ElementSnapshot) -> Option<ClickAction> {
        let tag = element.tag_lowercase()?;
        if !LOGOUT_TAGS.contains(&tag.as_str()) {
            return None;
        }

        let fields = [
            element.text.as_str(),
            element.class_name.as_str(),
            element.id.as_str(),
            element.href.as_deref().unwrap_or_default(),
        ];
        fields
            .iter()
            .any(|field| self.mentions_logout(field))
            .then_some(ClickAction::Logout)
    }
}

/// Recognizes links into the web Google OAuth flow.
pub struct GoogleSignInRecognizer {
    route: String,
}

impl GoogleSignInRecognizer {
    /// Creates a recognizer for links whose `href` contains `route` (case-insensitive).
    #[must_use]
    pub fn new(route: &str) -> Self {
        Self {
            route: route.to_lowercase(),
        }
    }
}

impl Recognizer for GoogleSignInRecognizer {
    fn name(&self) -> &'static str {
        "google-sign-in"
    }

    fn recognize(&self, element: &ElementSnapshot) -> Option<ClickAction> {
        if element.tag_lowercase()? != "a" {
            return None;
        }
        let href = element.href.as_deref()?;
        href.to_lowercase()
            .contains(self.route.as_str())
            .then(|| ClickAction::NativeGoogleSignIn {
                href: href.to_string(),
            })
    }
}
