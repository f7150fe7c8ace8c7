//! Errors reported to handshake code by key handles.

use keyproxy_crypto::DigestError;
use thiserror::Error;

/// Failure of a delegated private-key operation.
///
/// The same variants are reported whichever backend serves the handle. Causes
/// behind [`KeyProxyError::OperationFailure`] are deliberately not exposed;
/// backends log them through `tracing` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyProxyError {
    #[error("Invalid argument: `{0}`")]
    ArgumentError(String),
    #[error("Private key operation failed")]
    OperationFailure,
    #[error("Key backend unavailable")]
    BackendUnavailable,
    #[error("Public key does not match private key")]
    KeyPairMismatch,
}

impl From<DigestError> for KeyProxyError {
    fn from(value: DigestError) -> Self {
        Self::ArgumentError(value.to_string())
    }
}
