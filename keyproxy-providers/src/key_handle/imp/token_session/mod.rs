//! Backend performing operations on a hardware token through an open session.
//!
//! The token pads with `CKM_RSA_PKCS`, so the `DigestInfo` is encoded on this side
//! before the data is handed over. Token failures are folded into the handle error
//! taxonomy: a token that cannot be reached is [`KeyProxyError::BackendUnavailable`],
//! everything else (declined authorization, bad padding, device errors) is
//! [`KeyProxyError::OperationFailure`].

use std::sync::Arc;

use keyproxy_crypto::{digest_info, HashAlgorithm};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::buffer::OutputBuffer;
use crate::key_handle::{
    error::KeyProxyError,
    model::{KeyInfo, OperationMode},
    PrivateKeyOperations,
};
use crate::token::{error::TokenError, TokenMechanism, TokenSession};

#[cfg(test)]
mod test;

pub struct TokenSessionBackend {
    session: Arc<dyn TokenSession>,
}

impl TokenSessionBackend {
    pub fn new(session: Arc<dyn TokenSession>) -> Self {
        Self { session }
    }

    /// Modulus length of the session's private key.
    pub fn key_length_bytes(&self) -> Result<usize, KeyProxyError> {
        let key = self.session.find_private_key().map_err(map_token_error)?;
        self.session.modulus_length(key).map_err(map_token_error)
    }
}

impl PrivateKeyOperations for TokenSessionBackend {
    fn sign(
        &self,
        key: &KeyInfo,
        _mode: OperationMode,
        hash_algorithm: HashAlgorithm,
        _hash_len: usize,
        hash: &[u8],
        output: &mut OutputBuffer,
    ) -> Result<(), KeyProxyError> {
        let data = if hash_algorithm.is_raw() {
            hash.to_vec()
        } else {
            digest_info::encode_digest_info(hash_algorithm, hash)?
        };

        if !digest_info::fits_modulus(hash_algorithm, hash.len(), key.key_length_bytes) {
            debug!(
                %hash_algorithm,
                encoded_len = data.len(),
                key_length_bytes = key.key_length_bytes,
                "message too long for modulus"
            );
            return Err(KeyProxyError::OperationFailure);
        }

        let object = self.session.find_private_key().map_err(map_token_error)?;
        let signature = self
            .session
            .sign(object, TokenMechanism::RsaPkcs, &data)
            .map_err(map_token_error)?;

        if signature.len() != key.key_length_bytes {
            warn!(
                signature_len = signature.len(),
                key_length_bytes = key.key_length_bytes,
                "token returned a signature of unexpected length"
            );
            return Err(KeyProxyError::OperationFailure);
        }

        output
            .write(&signature)
            .map_err(|_| KeyProxyError::OperationFailure)
    }

    fn decrypt(
        &self,
        _key: &KeyInfo,
        _mode: OperationMode,
        ciphertext: &[u8],
        output: &mut OutputBuffer,
    ) -> Result<usize, KeyProxyError> {
        let object = self.session.find_private_key().map_err(map_token_error)?;
        let plaintext = Zeroizing::new(
            self.session
                .decrypt(object, TokenMechanism::RsaPkcs, ciphertext)
                .map_err(map_token_error)?,
        );

        output
            .write(&plaintext)
            .map_err(|_| KeyProxyError::OperationFailure)?;
        Ok(plaintext.len())
    }
}

fn map_token_error(error: TokenError) -> KeyProxyError {
    debug!(%error, "token operation failed");

    if error.is_unavailable() {
        KeyProxyError::BackendUnavailable
    } else {
        KeyProxyError::OperationFailure
    }
}
