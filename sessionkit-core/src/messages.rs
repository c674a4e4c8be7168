//! Typed messages the hosted page exchanges with the bridge in place of a global session
//! object.
//!
//! Requests and responses travel as JSON tagged by `type`:
//!
//! ```json
//! {"type":"saveSession","token":"xyz","user":"{\"id\":1}"}
//! {"type":"saved","durability":"durable"}
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    error::SessionKitError,
    session::{RestoreOutcome, SessionDurability, SessionManager},
};

/// A session request from the hosted page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Enum)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BridgeRequest {
    /// Copy the persisted session into the page, if there is one.
    RestoreSession,
    /// Store a session the page just obtained.
    SaveSession {
        /// Bearer token.
        token: String,
        /// Serialized user.
        user: String,
    },
    /// Forget the session everywhere.
    ClearSession,
}

impl BridgeRequest {
    /// Parses a request sent by the page.
    ///
    /// # Errors
    /// Returns an error if the JSON is invalid or names an unknown request type.
    pub fn from_json(json: &str) -> Result<Self, SessionKitError> {
        serde_json::from_str(json).map_err(|e| SessionKitError::SerializationError {
            error: format!("invalid bridge request json: {e}"),
        })
    }
}

/// The bridge's answer to a [`BridgeRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Enum)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BridgeResponse {
    /// Answer to `restoreSession`.
    Restored {
        /// Whether a session was copied into the page.
        restored: bool,
    },
    /// Answer to `saveSession`.
    Saved {
        /// How far the write got.
        durability: SessionDurability,
    },
    /// Answer to `clearSession`.
    Cleared,
    /// The request could not be understood.
    Error {
        /// What went wrong.
        message: String,
    },
}

impl BridgeResponse {
    /// Serializes the response for the page.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::error!("[Session] Failed to serialize bridge response: {e}");
            r#"{"type":"error","message":"serialization failed"}"#.to_string()
        })
    }
}

/// Runs `request` against `sessions`.
pub(crate) async fn dispatch(sessions: &SessionManager, request: BridgeRequest) -> BridgeResponse {
    match request {
        BridgeRequest::RestoreSession => BridgeResponse::Restored {
            restored: sessions.check_and_restore().await == RestoreOutcome::Restored,
        },
        BridgeRequest::SaveSession { token, user } => BridgeResponse::Saved {
            durability: sessions.save(token, user).await,
        },
        BridgeRequest::ClearSession => {
            sessions.clear().await;
            BridgeResponse::Cleared
        }
    }
}

/// Parses `json`, runs it, and serializes the answer. Malformed input yields an `error`
/// response rather than a failure.
pub(crate) async fn dispatch_json(sessions: &SessionManager, json: &str) -> String {
    let response = match BridgeRequest::from_json(json) {
        Ok(request) => dispatch(sessions, request).await,
        Err(e) => {
            log::warn!("[Session] Rejected bridge message: {e}");
            BridgeResponse::Error {
                message: e.to_string(),
            }
        }
    };
    response.to_json()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::*;
    use crate::store::{MemoryPersistentStore, MemoryVolatileStore, VOLATILE_TOKEN_KEY};
    use crate::VolatileStore;

    fn sessions() -> (Arc<MemoryVolatileStore>, Arc<MemoryPersistentStore>, SessionManager) {
        let page = Arc::new(MemoryVolatileStore::new());
        let prefs = Arc::new(MemoryPersistentStore::new());
        let manager = SessionManager::new(page.clone(), Some(prefs.clone()));
        (page, prefs, manager)
    }

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_parsing() {
        assert_eq!(
            BridgeRequest::from_json(r#"{"type":"restoreSession"}"#).unwrap(),
            BridgeRequest::RestoreSession
        );
        assert_eq!(
            BridgeRequest::from_json(r#"{"type":"saveSession","token":"t","user":"u"}"#).unwrap(),
            BridgeRequest::SaveSession {
                token: "t".to_string(),
                user: "u".to_string()
            }
        );
        assert!(BridgeRequest::from_json(r#"{"type":"saveSession","token":"t"}"#).is_err());
        assert!(BridgeRequest::from_json(r#"{"type":"dropTables"}"#).is_err());
    }

    #[tokio::test]
    async fn test_save_then_restore_through_messages() {
        let (page, _prefs, manager) = sessions();

        let saved = dispatch_json(
            &manager,
            r#"{"type":"saveSession","token":"xyz","user":"{\"id\":1}"}"#,
        )
        .await;
        assert_eq!(parse(&saved), json!({"type": "saved", "durability": "durable"}));

        page.reset();
        let restored = dispatch_json(&manager, r#"{"type":"restoreSession"}"#).await;
        assert_eq!(parse(&restored), json!({"type": "restored", "restored": true}));
        assert_eq!(
            page.get_item(VOLATILE_TOKEN_KEY.to_string()).as_deref(),
            Some("xyz")
        );
    }

    #[tokio::test]
    async fn test_clear_then_restore_misses() {
        let (_page, _prefs, manager) = sessions();
        manager.save("t1".to_string(), "u1".to_string()).await;

        let cleared = dispatch_json(&manager, r#"{"type":"clearSession"}"#).await;
        assert_eq!(parse(&cleared), json!({"type": "cleared"}));

        let restored = dispatch(&manager, BridgeRequest::RestoreSession).await;
        assert_eq!(restored, BridgeResponse::Restored { restored: false });
    }

    #[tokio::test]
    async fn test_page_only_save_without_persistent_store() {
        let manager = SessionManager::new(Arc::new(MemoryVolatileStore::new()), None);
        let response = dispatch(
            &manager,
            BridgeRequest::SaveSession {
                token: "t".to_string(),
                user: "u".to_string(),
            },
        )
        .await;
        assert_eq!(parse(&response.to_json())["durability"], "pageOnly");
    }

    #[tokio::test]
    async fn test_malformed_message_yields_error_response() {
        let (_page, prefs, manager) = sessions();
        let response = parse(&dispatch_json(&manager, "not json").await);
        assert_eq!(response["type"], "error");
        assert!(response["message"]
            .as_str()
            .unwrap()
            .contains("invalid bridge request json"));
        assert_eq!(prefs.write_count(), 0);
    }
}
