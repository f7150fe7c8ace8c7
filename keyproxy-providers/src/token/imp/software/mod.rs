//! In-process token backed by an in-memory RSA key.
//!
//! Behaves like a single-certificate PKCS#11 token driven with `CKM_RSA_PKCS`. The
//! presence and authorization switches let integrators and tests exercise the
//! failure paths of a real device (removal, a declined PIN or touch prompt).

use keyproxy_crypto::imp::rsa_key::SoftwareRsaKey;
use parking_lot::RwLock;
use tracing::trace;

use crate::token::{
    error::TokenError, TokenMechanism, TokenObjectHandle, TokenSession,
};


const PRIVATE_KEY_OBJECT: TokenObjectHandle = TokenObjectHandle(1);

#[derive(Debug)]
struct TokenState {
    present: bool,
    authorized: bool,
    operations: usize,
}

pub struct SoftwareToken {
    key: SoftwareRsaKey,
    label: String,
    state: RwLock<TokenState>,
}

impl SoftwareToken {
    pub fn new(label: impl Into<String>, key: SoftwareRsaKey) -> Self {
        Self {
            key,
            label: label.into(),
            state: RwLock::new(TokenState {
                present: true,
                authorized: true,
                operations: 0,
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Simulates inserting or removing the token.
    pub fn set_present(&self, present: bool) {
        self.state.write().present = present;
    }

    /// Simulates the user approving or declining on-device authorization.
    pub fn set_authorized(&self, authorized: bool) {
        self.state.write().authorized = authorized;
    }

    /// Number of private-key operations the token completed successfully.
    pub fn operation_count(&self) -> usize {
        self.state.read().operations
    }

    fn check_present(&self) -> Result<(), TokenError> {
        if self.state.read().present {
            Ok(())
        } else {
            Err(TokenError::NotPresent)
        }
    }

    fn begin_operation(&self, key: TokenObjectHandle) -> Result<(), TokenError> {
        let state = self.state.read();
        if !state.present {
            return Err(TokenError::NotPresent);
        }
        if key != PRIVATE_KEY_OBJECT {
            return Err(TokenError::KeyNotFound(format!("object {}", key.0)));
        }
        if !state.authorized {
            return Err(TokenError::AuthorizationDenied);
        }
        Ok(())
    }

    fn complete_operation<T>(&self, result: Result<T, TokenError>) -> Result<T, TokenError> {
        if result.is_ok() {
            self.state.write().operations += 1;
        }
        result
    }
}

impl TokenSession for SoftwareToken {
    fn find_private_key(&self) -> Result<TokenObjectHandle, TokenError> {
        self.check_present()?;
        trace!(label = %self.label, "resolved private key object");
        Ok(PRIVATE_KEY_OBJECT)
    }

    fn modulus_length(&self, key: TokenObjectHandle) -> Result<usize, TokenError> {
        self.check_present()?;
        if key != PRIVATE_KEY_OBJECT {
            return Err(TokenError::KeyNotFound(format!("object {}", key.0)));
        }
        Ok(self.key.key_length_bytes())
    }

    fn sign(
        &self,
        key: TokenObjectHandle,
        _mechanism: TokenMechanism,
        data: &[u8],
    ) -> Result<Vec<u8>, TokenError> {
        self.begin_operation(key)?;
        self.complete_operation(
            self.key
                .sign_padded(data)
                .map_err(|_| TokenError::OperationFailed),
        )
    }

    fn decrypt(
        &self,
        key: TokenObjectHandle,
        _mechanism: TokenMechanism,
        data: &[u8],
    ) -> Result<Vec<u8>, TokenError> {
        self.begin_operation(key)?;
        self.complete_operation(
            self.key
                .decrypt(data)
                .map(|plaintext| plaintext.to_vec())
                .map_err(|_| TokenError::OperationFailed),
        )
    }
}
