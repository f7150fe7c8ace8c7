use std::sync::Arc;

use keyproxy_crypto::imp::rsa_key::{public_key_from_der, verify_signature};
use keyproxy_crypto::HashAlgorithm;
use keyproxy_providers::buffer::OutputBuffer;
use keyproxy_providers::key_handle::{
    error::KeyProxyError,
    imp::callback::CallbackBackend,
    model::{KeyInfo, OperationMode},
    BackendConfig, KeyHandle,
};
use keyproxy_providers::token::{model::Pkcs11Params, TokenSession};
use tracing::info;
use zeroize::Zeroizing;

use super::error::HandleServiceError;

pub struct HandleService {
    pkcs11: Option<Pkcs11Params>,
}

impl HandleService {
    pub fn new(pkcs11: Option<Pkcs11Params>) -> Self {
        Self { pkcs11 }
    }

    pub fn callback_handle<S, D>(
        &self,
        key_length_bytes: usize,
        sign: S,
        decrypt: D,
    ) -> Result<KeyHandle, HandleServiceError>
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
        Ok(KeyHandle::new(
            key_length_bytes,
            BackendConfig::Callback(CallbackBackend::new(sign, decrypt)),
        )?)
    }

    pub fn token_handle(
        &self,
        session: Arc<dyn TokenSession>,
    ) -> Result<KeyHandle, HandleServiceError> {
        Ok(KeyHandle::from_token_session(session)?)
    }

    /// Opens the configured PKCS#11 token and binds a handle to its key.
    pub fn configured_token_handle(&self) -> Result<KeyHandle, HandleServiceError> {
        let params = self
            .pkcs11
            .as_ref()
            .ok_or(HandleServiceError::MissingPkcs11Config)?;

        self.open_pkcs11(params)
    }

    #[cfg(feature = "pkcs11")]
    fn open_pkcs11(&self, params: &Pkcs11Params) -> Result<KeyHandle, HandleServiceError> {
        use keyproxy_providers::token::imp::pkcs11::Pkcs11Session;

        let session = Pkcs11Session::open(params)?;
        info!(certificate_label = %params.certificate_label, "bound handle to PKCS#11 token");
        self.token_handle(Arc::new(session))
    }

    #[cfg(not(feature = "pkcs11"))]
    fn open_pkcs11(&self, params: &Pkcs11Params) -> Result<KeyHandle, HandleServiceError> {
        info!(
            certificate_label = %params.certificate_label,
            "PKCS#11 token configured but support is not compiled in"
        );
        Err(HandleServiceError::Pkcs11Disabled)
    }

    /// Signs `hash` with a textual digest identifier such as `SHA256` or `NONE`.
    pub fn sign(
        &self,
        handle: &KeyHandle,
        hash_algorithm: &str,
        hash: &[u8],
    ) -> Result<Vec<u8>, HandleServiceError> {
        let hash_algorithm = HashAlgorithm::from_name(hash_algorithm).map_err(KeyProxyError::from)?;

        Ok(handle.sign_to_vec(hash_algorithm, hash)?)
    }

    pub fn decrypt(
        &self,
        handle: &KeyHandle,
        ciphertext: &[u8],
        output_max_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>, HandleServiceError> {
        Ok(handle.decrypt_to_vec(ciphertext, output_max_len)?)
    }

    pub fn verify(
        &self,
        public_key_der: &[u8],
        hash_algorithm: &str,
        hash: &[u8],
        signature: &[u8],
    ) -> Result<(), HandleServiceError> {
        let hash_algorithm = HashAlgorithm::from_name(hash_algorithm).map_err(KeyProxyError::from)?;
        let public_key = public_key_from_der(public_key_der)?;

        Ok(verify_signature(&public_key, hash_algorithm, hash, signature)?)
    }

    /// Checks that `public_key_der` (SPKI DER) belongs to the key behind `handle`.
    pub fn check_pair(
        &self,
        handle: &KeyHandle,
        public_key_der: &[u8],
    ) -> Result<(), HandleServiceError> {
        let public_key = public_key_from_der(public_key_der)?;

        Ok(handle.check_pair(&public_key)?)
    }
}
