//! Errors reported by token client libraries.

use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token not present")]
    NotPresent,
    #[error("Token unreachable: `{0}`")]
    Unreachable(String),
    #[error("Authorization denied")]
    AuthorizationDenied,
    #[error("Session closed")]
    SessionClosed,
    #[error("Key not found: `{0}`")]
    KeyNotFound(String),
    #[error("Operation failed")]
    OperationFailed,
    #[error("Device error: `{0}`")]
    Device(String),
}

impl TokenError {
    /// Whether the custodian itself could not be reached, as opposed to refusing or
    /// failing a particular operation.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::NotPresent | Self::Unreachable(_))
    }
}
