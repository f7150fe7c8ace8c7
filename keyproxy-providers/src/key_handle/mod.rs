//! Key handles and the capability set their backends implement.

use std::sync::Arc;

use keyproxy_crypto::{digest_info, imp::rsa_key::verify_signature, HashAlgorithm};
use rsa::{traits::PublicKeyParts, RsaPublicKey};
use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::{buffer::OutputBuffer, token::TokenSession};
use error::KeyProxyError;
use imp::{callback::CallbackBackend, token_session::TokenSessionBackend};
use model::{BackendKind, KeyInfo, KeyType, OperationMode};

pub mod error;
pub mod imp;
pub mod model;


/// Largest supported modulus, 8192 bits.
pub const MAX_KEY_LENGTH_BYTES: usize = 1024;

const CHECK_PAIR_VALUE: [u8; 32] = [0xA5; 32];

/// Private-key operations a backend performs on behalf of a [`KeyHandle`].
///
/// Arguments reach the backend only after the handle validated them, except for
/// anything that depends on the key material (padding, modulus bounds), which is
/// the backend's to check.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait PrivateKeyOperations: Send + Sync {
    /// Writes a PKCS#1 v1.5 signature of exactly `key.key_length_bytes` bytes.
    fn sign(
        &self,
        key: &KeyInfo,
        mode: OperationMode,
        hash_algorithm: HashAlgorithm,
        hash_len: usize,
        hash: &[u8],
        output: &mut OutputBuffer,
    ) -> Result<(), KeyProxyError>;

    /// Decrypts and unpads `ciphertext`, returning the plaintext length.
    fn decrypt(
        &self,
        key: &KeyInfo,
        mode: OperationMode,
        ciphertext: &[u8],
        output: &mut OutputBuffer,
    ) -> Result<usize, KeyProxyError>;
}

/// Backend and its payload, chosen once when a handle is built.
pub enum BackendConfig {
    Callback(CallbackBackend),
    TokenSession(TokenSessionBackend),
}

/// An RSA private key usable for sign and decrypt whose material is never
/// visible to the holder of the handle.
pub struct KeyHandle {
    info: KeyInfo,
    backend: Arc<dyn PrivateKeyOperations>,
}

impl KeyHandle {
    pub fn new(key_length_bytes: usize, config: BackendConfig) -> Result<Self, KeyProxyError> {
        let (backend_kind, backend): (BackendKind, Arc<dyn PrivateKeyOperations>) = match config {
            BackendConfig::Callback(backend) => (BackendKind::Callback, Arc::new(backend)),
            BackendConfig::TokenSession(backend) => {
                (BackendKind::TokenSession, Arc::new(backend))
            }
        };

        Self::build(key_length_bytes, backend_kind, backend)
    }

    /// Handle over an integrator-supplied backend.
    pub fn with_backend(
        key_length_bytes: usize,
        backend: Arc<dyn PrivateKeyOperations>,
    ) -> Result<Self, KeyProxyError> {
        Self::build(key_length_bytes, BackendKind::Custom, backend)
    }

    /// Token-backed handle whose key length is read from the token's key object.
    pub fn from_token_session(session: Arc<dyn TokenSession>) -> Result<Self, KeyProxyError> {
        let backend = TokenSessionBackend::new(session);
        let key_length_bytes = backend.key_length_bytes()?;

        Self::new(key_length_bytes, BackendConfig::TokenSession(backend))
    }

    fn build(
        key_length_bytes: usize,
        backend_kind: BackendKind,
        backend: Arc<dyn PrivateKeyOperations>,
    ) -> Result<Self, KeyProxyError> {
        if key_length_bytes == 0 || key_length_bytes > MAX_KEY_LENGTH_BYTES {
            return Err(KeyProxyError::ArgumentError(format!(
                "key length must be between 1 and {MAX_KEY_LENGTH_BYTES} bytes, got {key_length_bytes}"
            )));
        }

        debug!(%backend_kind, key_length_bytes, "created key handle");

        Ok(Self {
            info: KeyInfo {
                key_length_bytes,
                backend_kind,
            },
            backend,
        })
    }

    pub fn info(&self) -> &KeyInfo {
        &self.info
    }

    pub fn key_length_bytes(&self) -> usize {
        self.info.key_length_bytes
    }

    pub fn bit_length(&self) -> usize {
        self.info.key_length_bytes * 8
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.info.backend_kind
    }

    pub fn name(&self) -> &'static str {
        match self.info.backend_kind {
            BackendKind::Callback => "RSA-alt",
            BackendKind::TokenSession => "RSA-token",
            BackendKind::Custom => "RSA-custom",
        }
    }

    pub fn can_do(&self, key_type: KeyType) -> bool {
        key_type == KeyType::Rsa
    }

    /// Signs `hash` into `output`.
    ///
    /// `hash_len` is only consulted in raw mode (`HashAlgorithm::None`), where it must
    /// equal `hash.len()`; otherwise `hash` must be a digest of `hash_algorithm`.
    /// `output` must hold at least [`Self::key_length_bytes`] bytes. On success it
    /// holds exactly that many; on failure it is left empty.
    pub fn sign(
        &self,
        mode: OperationMode,
        hash_algorithm: HashAlgorithm,
        hash_len: usize,
        hash: &[u8],
        output: &mut OutputBuffer,
    ) -> Result<(), KeyProxyError> {
        check_private_mode(mode)?;

        if hash_algorithm.is_raw() {
            if hash_len == 0 || hash_len != hash.len() {
                return Err(KeyProxyError::ArgumentError(format!(
                    "raw mode hash length {hash_len} does not match {} supplied bytes",
                    hash.len()
                )));
            }
        } else {
            digest_info::check_hash_length(hash_algorithm, hash)?;
        }

        if output.capacity() < self.info.key_length_bytes {
            return Err(KeyProxyError::ArgumentError(format!(
                "output buffer of {} bytes cannot hold a {} byte signature",
                output.capacity(),
                self.info.key_length_bytes
            )));
        }

        output.clear();
        trace!(backend_kind = %self.info.backend_kind, %hash_algorithm, "dispatching sign");

        match self
            .backend
            .sign(&self.info, mode, hash_algorithm, hash_len, hash, output)
        {
            Ok(()) if output.len() == self.info.key_length_bytes => Ok(()),
            Ok(()) => {
                debug!(
                    produced = output.len(),
                    expected = self.info.key_length_bytes,
                    "backend returned a signature of the wrong length"
                );
                output.clear();
                Err(KeyProxyError::OperationFailure)
            }
            Err(error) => {
                output.clear();
                Err(error)
            }
        }
    }

    /// Decrypts a PKCS#1 v1.5 block of exactly [`Self::key_length_bytes`] bytes.
    ///
    /// The capacity of `output` bounds the plaintext; a larger plaintext is an
    /// operation failure. On failure `output` is left empty.
    pub fn decrypt(
        &self,
        mode: OperationMode,
        ciphertext: &[u8],
        output: &mut OutputBuffer,
    ) -> Result<usize, KeyProxyError> {
        check_private_mode(mode)?;

        if ciphertext.len() != self.info.key_length_bytes {
            return Err(KeyProxyError::ArgumentError(format!(
                "ciphertext of {} bytes does not match key length {}",
                ciphertext.len(),
                self.info.key_length_bytes
            )));
        }

        output.clear();
        trace!(backend_kind = %self.info.backend_kind, "dispatching decrypt");

        // no result-dependent work here beyond public lengths
        match self.backend.decrypt(&self.info, mode, ciphertext, output) {
            Ok(plaintext_len) if plaintext_len == output.len() => Ok(plaintext_len),
            Ok(_) => {
                output.clear();
                Err(KeyProxyError::OperationFailure)
            }
            Err(error) => {
                output.clear();
                Err(error)
            }
        }
    }

    /// Private-mode [`Self::sign`] into a freshly sized buffer.
    pub fn sign_to_vec(
        &self,
        hash_algorithm: HashAlgorithm,
        hash: &[u8],
    ) -> Result<Vec<u8>, KeyProxyError> {
        let mut output = OutputBuffer::new(self.info.key_length_bytes);
        self.sign(
            OperationMode::Private,
            hash_algorithm,
            hash.len(),
            hash,
            &mut output,
        )?;
        Ok(output.as_slice().to_vec())
    }

    /// Private-mode [`Self::decrypt`] into a buffer of `output_max_len` bytes.
    pub fn decrypt_to_vec(
        &self,
        ciphertext: &[u8],
        output_max_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>, KeyProxyError> {
        let mut output = OutputBuffer::new(output_max_len);
        self.decrypt(OperationMode::Private, ciphertext, &mut output)?;
        Ok(output.into_bytes())
    }

    /// Checks that `public_key` is the public half of this handle's key by signing
    /// a fixed value through the backend and verifying it.
    pub fn check_pair(&self, public_key: &RsaPublicKey) -> Result<(), KeyProxyError> {
        if public_key.size() != self.info.key_length_bytes {
            return Err(KeyProxyError::KeyPairMismatch);
        }

        let signature = self.sign_to_vec(HashAlgorithm::None, &CHECK_PAIR_VALUE)?;

        verify_signature(public_key, HashAlgorithm::None, &CHECK_PAIR_VALUE, &signature)
            .map_err(|_| KeyProxyError::KeyPairMismatch)
    }
}

impl std::fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHandle").field("info", &self.info).finish()
    }
}

fn check_private_mode(mode: OperationMode) -> Result<(), KeyProxyError> {
    match mode {
        OperationMode::Private => Ok(()),
        OperationMode::Public => Err(KeyProxyError::ArgumentError(
            "private-key operation requested in public mode".to_owned(),
        )),
    }
}
