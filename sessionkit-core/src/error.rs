use thiserror::Error;

use crate::{sign_in::SignInError, store::StoreError};

/// Error outputs from `SessionKit`
#[derive(Debug, Error, uniffi::Error)]
pub enum SessionKitError {
    /// The presented input is not valid for the requested operation
    #[error("invalid_input_{attribute}: {reason}")]
    InvalidInput {
        /// The attribute that was rejected
        attribute: String,
        /// Why it was rejected
        reason: String,
    },
    /// Unexpected error serializing or deserializing information
    #[error("serialization_error: {error}")]
    SerializationError {
        /// Details of the failure
        error: String,
    },
    /// Network connection error with details
    #[error("network_error at {url}: {error}")]
    NetworkError {
        /// The URL that was requested
        url: String,
        /// The HTTP status, when a response was received
        status: Option<u16>,
        /// Details of the failure
        error: String,
    },
    /// The backend refused the native token exchange. `body` is the raw response text.
    #[error("exchange_rejected ({status}): {body}")]
    ExchangeRejected {
        /// The HTTP status returned by the backend
        status: u16,
        /// The response body, verbatim
        body: String,
    },
    /// The backend accepted the exchange but returned neither `access_token` nor `token`
    #[error("missing_access_token")]
    MissingAccessToken,
    /// A host store failed
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The native sign-in was cancelled or failed
    #[error(transparent)]
    SignIn(#[from] SignInError),
}

impl From<reqwest::Error> for SessionKitError {
    fn from(error: reqwest::Error) -> Self {
        Self::NetworkError {
            url: error
                .url()
                .map_or_else(|| "<unknown>".to_string(), ToString::to_string),
            status: error.status().map(|status| status.as_u16()),
            error: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for SessionKitError {
    fn from(error: serde_json::Error) -> Self {
        Self::SerializationError {
            error: error.to_string(),
        }
    }
}
