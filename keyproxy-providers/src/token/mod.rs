//! Client-library view of a hardware token session.
//!
//! A [`TokenSession`] is an already opened (and, where required, logged in) session
//! bound to one certificate on a token. The key proxy only ever borrows it; opening,
//! logging out and closing stay with the integrator.

use strum::Display;

pub mod error;
pub mod imp;
pub mod model;

use error::TokenError;

/// Object handle of a private key inside a token session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TokenObjectHandle(pub u64);

/// Token-side mechanism used for an operation.
#[derive(Debug, Copy, Clone, Display, PartialEq, Eq)]
pub enum TokenMechanism {
    /// PKCS#1 v1.5 block padding performed by the token.
    #[strum(serialize = "CKM_RSA_PKCS")]
    RsaPkcs,
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait TokenSession: Send + Sync {
    /// Resolves the private key that belongs to the session's certificate.
    fn find_private_key(&self) -> Result<TokenObjectHandle, TokenError>;

    /// Modulus length of `key` in bytes.
    fn modulus_length(&self, key: TokenObjectHandle) -> Result<usize, TokenError>;

    fn sign(
        &self,
        key: TokenObjectHandle,
        mechanism: TokenMechanism,
        data: &[u8],
    ) -> Result<Vec<u8>, TokenError>;

    fn decrypt(
        &self,
        key: TokenObjectHandle,
        mechanism: TokenMechanism,
        data: &[u8],
    ) -> Result<Vec<u8>, TokenError>;
}
