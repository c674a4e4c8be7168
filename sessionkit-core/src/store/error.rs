//! Error types for host-provided stores.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the volatile and persistent stores.
#[derive(Debug, Error, uniffi::Error)]
pub enum StoreError {
    /// The page-scoped store refused the operation (quota exceeded, storage disabled).
    #[error("volatile store error: {0}")]
    Volatile(String),

    /// The host's persistent store refused the operation.
    #[error("persistent store error: {0}")]
    Persistent(String),

    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for StoreError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}
