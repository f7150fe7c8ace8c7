//! Digest identifiers, PKCS#1 v1.5 encoding helpers and an in-memory RSA key.
//!
//! This crate holds the cryptographic pieces the key proxy needs on its own side of
//! the trust boundary: it never touches key material held by a token. The
//! [`SoftwareRsaKey`][imp::rsa_key::SoftwareRsaKey] is the concrete in-memory private key
//! that delegated handles are expected to be interchangeable with, and is used by the
//! software token and by tests.

use thiserror::Error;

pub mod digest_info;
pub mod imp;
pub mod model;

pub use model::HashAlgorithm;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum DigestError {
    #[error("Unknown hash algorithm identifier `{0}`")]
    UnknownAlgorithm(String),
    #[error("Hash length {actual} does not match {algorithm} digest length {expected}")]
    LengthMismatch {
        algorithm: HashAlgorithm,
        expected: usize,
        actual: usize,
    },
    #[error("Raw mode has no DigestInfo encoding")]
    RawMode,
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum HasherError {
    #[error("Could not hash")]
    CouldNotHash,
    #[error("No hasher available for `{0}`")]
    MissingHasher(HashAlgorithm),
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum RsaKeyError {
    #[error("Could not generate key: `{0}`")]
    CouldNotGenerate(String),
    #[error("Could not parse key: `{0}`")]
    CouldNotParse(String),
    #[error("Digest error: `{0}`")]
    Digest(#[from] DigestError),
    #[error("Could not sign: `{0}`")]
    CouldNotSign(String),
    #[error("Could not decrypt")]
    CouldNotDecrypt,
    #[error("Could not encrypt: `{0}`")]
    CouldNotEncrypt(String),
    #[error("Invalid signature")]
    InvalidSignature,
}

/// Provides hashing.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait Hasher: Send + Sync {
    /// Digest algorithm implemented by this hasher.
    fn algorithm(&self) -> HashAlgorithm;

    fn hash(&self, input: &[u8]) -> Result<Vec<u8>, HasherError>;
}
