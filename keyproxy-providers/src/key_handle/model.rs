//! `struct`s and `enum`s for key handles.

use strum::Display;

/// Whether an RSA operation uses the private or the public exponent.
#[derive(Debug, Copy, Clone, Display, PartialEq, Eq)]
pub enum OperationMode {
    #[strum(serialize = "PRIVATE")]
    Private,
    #[strum(serialize = "PUBLIC")]
    Public,
}

/// Backend a handle was bound to at construction.
#[derive(Debug, Copy, Clone, Display, PartialEq, Eq, Hash)]
pub enum BackendKind {
    #[strum(serialize = "CALLBACK")]
    Callback,
    #[strum(serialize = "TOKEN_SESSION")]
    TokenSession,
    #[strum(serialize = "CUSTOM")]
    Custom,
}

#[derive(Debug, Copy, Clone, Display, PartialEq, Eq)]
pub enum KeyType {
    #[strum(serialize = "RSA")]
    Rsa,
    #[strum(serialize = "EC")]
    Ec,
}

/// Metadata of a handle, the only part of it backends get to see.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub key_length_bytes: usize,
    pub backend_kind: BackendKind,
}
