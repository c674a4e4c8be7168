//! Backend exchange of a Google ID token for an application session.

use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::{config::BridgeConfig, error::SessionKitError, http_request::Request, SessionRecord};

/// Success body of the native exchange endpoint.
#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    access_token: Option<String>,
    /// Older backends name the field `token`.
    token: Option<String>,
    user: Option<Value>,
}

impl ExchangeResponse {
    fn into_session(self) -> Result<SessionRecord, SessionKitError> {
        let token = self
            .access_token
            .filter(|token| !token.is_empty())
            .or(self.token.filter(|token| !token.is_empty()))
            .ok_or(SessionKitError::MissingAccessToken)?;
        let user = self
            .user
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        Ok(SessionRecord {
            token,
            user: serde_json::to_string(&user)?,
        })
    }
}

/// Client for `POST {origin}/auth/google/native?id_token=…`.
pub struct TokenExchange {
    endpoint: String,
    request: Request,
}

impl TokenExchange {
    /// Creates a client for the endpoint described by `config`.
    #[must_use]
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            endpoint: format!("{}{}", config.origin_prefix(), config.native_exchange_path),
            request: Request::new(
                Duration::from_millis(config.request_timeout_ms),
                config.max_retries,
            ),
        }
    }

    /// Trades `id_token` for a session.
    ///
    /// # Errors
    ///
    /// - [`SessionKitError::ExchangeRejected`] with the verbatim body on a non-success status,
    ///   or `HTTP <status>` when the body is empty or cannot be read.
    /// - [`SessionKitError::MissingAccessToken`] when the body names no token.
    /// - [`SessionKitError::NetworkError`] or [`SessionKitError::SerializationError`] when the
    ///   request or the body is unusable.
    pub async fn exchange(&self, id_token: &str) -> Result<SessionRecord, SessionKitError> {
        let url = Url::parse_with_params(&self.endpoint, &[("id_token", id_token)]).map_err(
            |e| SessionKitError::InvalidInput {
                attribute: "native_exchange_path".to_string(),
                reason: e.to_string(),
            },
        )?;

        log::info!("[Native Bridge] Sending ID token to backend");
        let response = self
            .request
            .handle(
                self.request
                    .post(url.as_str())
                    .header(CONTENT_TYPE, "application/json"),
            )
            .await?;

        let status = response.status();
        log::info!("[Native Bridge] Backend response status: {}", status.as_u16());
        if !status.is_success() {
            let status = status.as_u16();
            let body = rejection_body(status, response.text().await);
            log::error!("[Native Bridge] Backend returned error: {status} {body}");
            return Err(SessionKitError::ExchangeRejected { status, body });
        }

        let body: ExchangeResponse =
            response
                .json()
                .await
                .map_err(|e| SessionKitError::SerializationError {
                    error: format!("Failed to parse exchange response: {e}"),
                })?;
        let session = body.into_session()?;
        log::info!("[Native Bridge] Login successful, token present");
        Ok(session)
    }
}

/// The body of a refused exchange, or `HTTP <status>` when it is empty or unreadable.
fn rejection_body<E: std::fmt::Display>(status: u16, body: Result<String, E>) -> String {
    match body {
        Ok(body) if !body.trim().is_empty() => body,
        Ok(_) => format!("HTTP {status}"),
        Err(e) => {
            log::error!("[Native Bridge] Failed to read error body: {e}");
            format!("HTTP {status}")
        }
    }
}

/// Works out where to go after a native sign-in started from `href`.
///
/// Reads the configured return parameter from the link. Absent, empty or non-http(s)
/// values fall back to the landing location. Anything that is not an absolute URL is a path
/// on the backend origin, so `//host/x` and `/\host/x` stay on the origin.
#[must_use]
pub fn resolve_return_location(href: &str, config: &BridgeConfig) -> String {
    let fallback = || config.landing_location.clone();
    let Ok(origin) = config.origin_url() else {
        return fallback();
    };
    let Ok(link) = origin.join(href) else {
        return fallback();
    };
    let Some(raw) = link
        .query_pairs()
        .find(|(key, _)| key == config.return_parameter.as_str())
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
    else {
        return fallback();
    };

    let resolved = match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(_) => origin
            .join(&format!("/{}", raw.trim_start_matches(['/', '\\'])))
            .ok()
            .filter(|url| url.host_str() == origin.host_str()),
    };
    match resolved {
        Some(url) if matches!(url.scheme(), "http" | "https") => url.into(),
        _ => {
            log::warn!("[Native Bridge] Ignoring unusable return location");
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use test_case::test_case;

    use super::*;
    use crate::test_support::config_for;

    #[test]
    fn test_return_url_relative_path() {
        assert_eq!(
            resolve_return_location(
                "/auth/google/login?return_url=%2Fdashboard",
                &BridgeConfig::default()
            ),
            "https://app.my-coach-finder.com/dashboard"
        );
    }

    #[test]
    fn test_return_url_absolute() {
        assert_eq!(
            resolve_return_location(
                "/auth/google/login?return_url=https%3A%2F%2Fapp.my-coach-finder.com%2Fcoaches%3Fpage%3D2",
                &BridgeConfig::default()
            ),
            "https://app.my-coach-finder.com/coaches?page=2"
        );
    }

    #[test]
    fn test_return_url_absent_or_empty() {
        let config = BridgeConfig::default();
        assert_eq!(
            resolve_return_location("/auth/google/login", &config),
            "https://app.my-coach-finder.com/"
        );
        assert_eq!(
            resolve_return_location("/auth/google/login?return_url=", &config),
            "https://app.my-coach-finder.com/"
        );
    }

    #[test]
    fn test_return_url_with_other_params() {
        assert_eq!(
            resolve_return_location(
                "https://app.my-coach-finder.com/auth/google/login?lang=de&return_url=%2Fprofile&x=1",
                &BridgeConfig::default()
            ),
            "https://app.my-coach-finder.com/profile"
        );
    }

    #[test]
    fn test_return_url_non_network_scheme_falls_back() {
        assert_eq!(
            resolve_return_location(
                "/auth/google/login?return_url=javascript%3Aalert(1)",
                &BridgeConfig::default()
            ),
            "https://app.my-coach-finder.com/"
        );
    }

    #[test_case("%2F%2Fevil.example%2Fx", "https://app.my-coach-finder.com/evil.example/x" ; "network path")]
    #[test_case("%2F%5Cevil.example%2Fx", "https://app.my-coach-finder.com/evil.example/x" ; "backslash network path")]
    #[test_case("%5C%5Cevil.example%2Fx", "https://app.my-coach-finder.com/evil.example/x" ; "double backslash")]
    #[test_case("%2F%09%2Fevil.example%2Fx", "https://app.my-coach-finder.com/" ; "tab smuggled network path")]
    #[test_case("dashboard%3Ftab%3D1", "https://app.my-coach-finder.com/dashboard?tab=1" ; "bare path")]
    fn test_return_url_stays_on_origin(return_url: &str, expected: &str) {
        let href = format!("/auth/google/login?return_url={return_url}");
        assert_eq!(
            resolve_return_location(&href, &BridgeConfig::default()),
            expected
        );
    }

    #[test]
    fn test_rejection_body_falls_back_to_status() {
        assert_eq!(rejection_body::<String>(500, Ok("  ".to_string())), "HTTP 500");
        assert_eq!(
            rejection_body(502, Err("connection reset".to_string())),
            "HTTP 502"
        );
        assert_eq!(
            rejection_body::<String>(401, Ok("Invalid Google token".to_string())),
            "Invalid Google token"
        );
    }

    #[tokio::test]
    async fn test_exchange_rejection_with_empty_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/google/native")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = TokenExchange::new(&config_for(&server.url()))
            .exchange("abc")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SessionKitError::ExchangeRejected { status: 503, ref body } if body == "HTTP 503"
        ));
    }

    #[tokio::test]
    async fn test_exchange_keeps_user_key_order() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/google/native")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"access_token":"xyz","user":{"name":"Ada","id":1,"email":"ada@example.com"}}"#)
            .create_async()
            .await;

        let session = TokenExchange::new(&config_for(&server.url()))
            .exchange("abc")
            .await
            .unwrap();

        assert_eq!(
            session.user,
            r#"{"name":"Ada","id":1,"email":"ada@example.com"}"#
        );
    }

    #[tokio::test]
    async fn test_exchange_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/google/native")
            .match_query(Matcher::UrlEncoded("id_token".into(), "abc".into()))
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(r#"{"access_token":"xyz","user":{"id":1}}"#)
            .create_async()
            .await;

        let session = TokenExchange::new(&config_for(&server.url()))
            .exchange("abc")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(session.token, "xyz");
        assert_eq!(session.user, r#"{"id":1}"#);
    }

    #[tokio::test]
    async fn test_exchange_fallback_token_and_default_user() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/google/native")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"token":"legacy","user":null}"#)
            .create_async()
            .await;

        let session = TokenExchange::new(&config_for(&server.url()))
            .exchange("abc")
            .await
            .unwrap();

        assert_eq!(session.token, "legacy");
        assert_eq!(session.user, "{}");
    }

    #[tokio::test]
    async fn test_exchange_rejection_keeps_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/google/native")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("Invalid Google token")
            .create_async()
            .await;

        let err = TokenExchange::new(&config_for(&server.url()))
            .exchange("abc")
            .await
            .unwrap_err();

        match err {
            SessionKitError::ExchangeRejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "Invalid Google token");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_without_token_field() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/google/native")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"user":{"id":1}}"#)
            .create_async()
            .await;

        let err = TokenExchange::new(&config_for(&server.url()))
            .exchange("abc")
            .await
            .unwrap_err();

        assert!(matches!(err, SessionKitError::MissingAccessToken));
    }

    #[tokio::test]
    async fn test_exchange_unparsable_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/google/native")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = TokenExchange::new(&config_for(&server.url()))
            .exchange("abc")
            .await
            .unwrap_err();

        assert!(matches!(err, SessionKitError::SerializationError { .. }));
    }
}
