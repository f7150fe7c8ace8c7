use keyproxy_crypto::RsaKeyError;
use keyproxy_providers::key_handle::error::KeyProxyError;
use keyproxy_providers::token::error::TokenError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandleServiceError {
    #[error("Key proxy error: `{0}`")]
    KeyProxy(#[from] KeyProxyError),
    #[error("RSA key error: `{0}`")]
    RsaKey(#[from] RsaKeyError),
    #[error("Token error: `{0}`")]
    Token(#[from] TokenError),
    #[error("Missing PKCS#11 configuration")]
    MissingPkcs11Config,
    #[error("PKCS#11 support is not enabled")]
    Pkcs11Disabled,
}
