//! Backend forwarding operations to integrator-supplied closures.

use keyproxy_crypto::HashAlgorithm;

use crate::buffer::OutputBuffer;
use crate::key_handle::{
    error::KeyProxyError,
    model::{KeyInfo, OperationMode},
    PrivateKeyOperations,
};


pub type SignFn = dyn Fn(
        &KeyInfo,
        OperationMode,
        HashAlgorithm,
        usize,
        &[u8],
        &mut OutputBuffer,
    ) -> Result<(), KeyProxyError>
    + Send
    + Sync;

pub type DecryptFn = dyn Fn(&KeyInfo, OperationMode, &[u8], &mut OutputBuffer) -> Result<usize, KeyProxyError>
    + Send
    + Sync;

/// Operations implemented by closures that capture whatever context they need.
///
/// Arguments are handed over exactly as the handle received them.
pub struct CallbackBackend {
    sign: Box<SignFn>,
    decrypt: Box<DecryptFn>,
}

impl CallbackBackend {
    pub fn new<S, D>(sign: S, decrypt: D) -> Self
    where
        S: Fn(
                &KeyInfo,
                OperationMode,
                HashAlgorithm,
                usize,
                &[u8],
                &mut OutputBuffer,
            ) -> Result<(), KeyProxyError>
            + Send
            + Sync
            + 'static,
        D: Fn(&KeyInfo, OperationMode, &[u8], &mut OutputBuffer) -> Result<usize, KeyProxyError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            sign: Box::new(sign),
            decrypt: Box::new(decrypt),
        }
    }
}

impl PrivateKeyOperations for CallbackBackend {
    fn sign(
        &self,
        key: &KeyInfo,
        mode: OperationMode,
        hash_algorithm: HashAlgorithm,
        hash_len: usize,
        hash: &[u8],
        output: &mut OutputBuffer,
    ) -> Result<(), KeyProxyError> {
        (self.sign)(key, mode, hash_algorithm, hash_len, hash, output)
    }

    fn decrypt(
        &self,
        key: &KeyInfo,
        mode: OperationMode,
        ciphertext: &[u8],
        output: &mut OutputBuffer,
    ) -> Result<usize, KeyProxyError> {
        (self.decrypt)(key, mode, ciphertext, output)
    }
}
