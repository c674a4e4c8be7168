//! Web-view plumbing shared by the native shells: which navigations stay in the web view,
//! platform tagging of app URLs, user agents and deep-link ingress.

use reqwest::Url;

use crate::config::BridgeConfig;

/// Registrable domain of the hosted application. Subdomains count as the app.
pub const APP_DOMAIN: &str = "my-coach-finder.com";

/// Host of the web OAuth flow that native sign-in replaces.
pub const GOOGLE_ACCOUNTS_HOST: &str = "accounts.google.com";

/// Product name in the app marker added to web-view user agents.
const APP_USER_AGENT_PRODUCT: &str = "MyCoachFinder";

/// Browser token appended to web-view user agents that lack one.
const CHROME_MOBILE_TOKEN: &str = "Chrome/120.0.0.0 Mobile Safari/537.36";

/// What the web view should do with a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum NavigationDecision {
    /// Load it in the web view.
    AllowInWebView,
    /// Drop it; native code handles the flow instead.
    Block,
    /// Let the shell framework decide (usually: open externally).
    PlatformDefault,
}

/// Routes web-view navigations.
#[derive(Debug, Clone, uniffi::Object)]
pub struct NavigationPolicy {
    app_host: String,
    keep_all_in_web_view: bool,
}

#[uniffi::export]
impl NavigationPolicy {
    /// Creates a policy for the app served from `config.backend_origin`.
    ///
    /// With `keep_all_in_web_view`, foreign URLs load in the web view too instead of being
    /// left to the platform.
    #[uniffi::constructor]
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(config: BridgeConfig, keep_all_in_web_view: bool) -> Self {
        let app_host = config
            .origin_url()
            .ok()
            .and_then(|url| url.host_str().map(str::to_lowercase))
            .unwrap_or_else(|| APP_DOMAIN.to_string());
        Self {
            app_host,
            keep_all_in_web_view,
        }
    }

    /// Decides what to do with a navigation to `url`.
    #[must_use]
    pub fn decide(&self, url: &str) -> NavigationDecision {
        let host = Url::parse(url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_lowercase));

        match host.as_deref() {
            Some(host) if host == self.app_host => NavigationDecision::AllowInWebView,
            Some(GOOGLE_ACCOUNTS_HOST) => {
                log::debug!("[Shell] Blocking web OAuth navigation");
                NavigationDecision::Block
            }
            _ if self.keep_all_in_web_view => NavigationDecision::AllowInWebView,
            _ => NavigationDecision::PlatformDefault,
        }
    }
}

/// Appends `os=<os>` to URLs of the app domain that do not carry an `os` parameter yet.
///
/// Other hosts and unparsable input come back unchanged.
#[uniffi::export]
#[must_use]
pub fn add_os_parameter(url: &str, os: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let on_app_domain = parsed.host_str().is_some_and(|host| {
        host == APP_DOMAIN || host.ends_with(&format!(".{APP_DOMAIN}"))
    });
    if !on_app_domain || parsed.query_pairs().any(|(key, _)| key == "os") {
        return url.to_string();
    }

    parsed.query_pairs_mut().append_pair("os", os);
    parsed.into()
}

/// Turns an Android web-view user agent into one OAuth providers accept: drops the `wv`
/// marker and makes sure a Chrome mobile token is present.
#[uniffi::export]
#[must_use]
pub fn browser_user_agent(web_view_user_agent: &str) -> String {
    let mut user_agent = web_view_user_agent
        .replace("; wv)", ")")
        .replace("; wv;", ";");
    if !user_agent.contains("Chrome/") {
        if !user_agent.is_empty() {
            user_agent.push(' ');
        }
        user_agent.push_str(CHROME_MOBILE_TOKEN);
    }
    user_agent
}

/// Appends the app marker `MyCoachFinder-<platform>/<version>` to a web-view user agent so
/// the backend can tell shell traffic from browsers. An agent already carrying the marker
/// comes back unchanged.
#[uniffi::export]
#[must_use]
pub fn app_user_agent(web_view_user_agent: &str, platform: &str, version: &str) -> String {
    let marker = format!("{APP_USER_AGENT_PRODUCT}-{platform}/{version}");
    let user_agent = web_view_user_agent.trim();
    if user_agent.split_whitespace().any(|token| token == marker) {
        return user_agent.to_string();
    }
    if user_agent.is_empty() {
        marker
    } else {
        format!("{user_agent} {marker}")
    }
}

/// The location to load for a deep link, or `None` when there is nothing loadable.
#[uniffi::export]
#[must_use]
pub fn resolve_deep_link(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    match Url::parse(url) {
        Ok(_) => Some(url.to_string()),
        Err(e) => {
            log::warn!("[Shell] Ignoring deep link that is not an absolute URL: {e}");
            None
        }
    }
}
