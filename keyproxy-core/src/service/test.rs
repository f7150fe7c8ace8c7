use std::sync::{Arc, OnceLock};

use keyproxy_crypto::imp::rsa_key::{encrypt, SoftwareRsaKey};
use keyproxy_providers::key_handle::error::KeyProxyError;
use keyproxy_providers::key_handle::model::BackendKind;
use keyproxy_providers::token::{
    error::TokenError, imp::software::SoftwareToken, MockTokenSession,
};

use super::error::HandleServiceError;
use super::handle_service::HandleService;

fn test_key() -> &'static SoftwareRsaKey {
    static KEY: OnceLock<SoftwareRsaKey> = OnceLock::new();
    KEY.get_or_init(|| SoftwareRsaKey::from_seed("handle-service", 1024).unwrap())
}

fn other_key() -> &'static SoftwareRsaKey {
    static KEY: OnceLock<SoftwareRsaKey> = OnceLock::new();
    KEY.get_or_init(|| SoftwareRsaKey::from_seed("handle-service-other", 1024).unwrap())
}

fn software_token_handle(service: &HandleService) -> keyproxy_providers::key_handle::KeyHandle {
    service
        .token_handle(Arc::new(SoftwareToken::new("server", test_key().clone())))
        .unwrap()
}

#[test]
fn test_sign_and_verify_by_name() {
    let service = HandleService::new(None);
    let handle = software_token_handle(&service);
    let public_key = test_key().public_key_der().unwrap();

    let hash = [0x21u8; 32];
    let signature = service.sign(&handle, "SHA-256", &hash).unwrap();

    assert_eq!(signature.len(), 128);
    service
        .verify(&public_key, "SHA256", &hash, &signature)
        .unwrap();
    assert!(matches!(
        service.verify(&public_key, "SHA384", &[0x21u8; 48], &signature),
        Err(HandleServiceError::RsaKey(_))
    ));
}

#[test]
fn test_sign_unknown_algorithm() {
    let service = HandleService::new(None);
    let handle = software_token_handle(&service);

    assert!(matches!(
        service.sign(&handle, "SHA3-256", &[0u8; 32]),
        Err(HandleServiceError::KeyProxy(KeyProxyError::ArgumentError(_)))
    ));
}

#[test]
fn test_callback_handle_decrypt() {
    let service = HandleService::new(None);
    let key = test_key().clone();

    let handle = service
        .callback_handle(
            key.key_length_bytes(),
            |_, _, _, _, _, _| Err(KeyProxyError::OperationFailure),
            move |_, _, ciphertext, output| {
                let plaintext = key
                    .decrypt(ciphertext)
                    .map_err(|_| KeyProxyError::OperationFailure)?;
                output
                    .write(&plaintext)
                    .map_err(|_| KeyProxyError::OperationFailure)?;
                Ok(plaintext.len())
            },
        )
        .unwrap();
    assert_eq!(handle.backend_kind(), BackendKind::Callback);
    assert_eq!(handle.name(), "RSA-alt");

    let ciphertext = encrypt(&test_key().public_key(), b"pre-master").unwrap();
    let plaintext = service.decrypt(&handle, &ciphertext, 48).unwrap();
    assert_eq!(plaintext.as_slice(), b"pre-master");

    let plaintext = service.decrypt(&handle, &ciphertext, usize::MAX).unwrap();
    assert_eq!(plaintext.as_slice(), b"pre-master");
}

#[test]
fn test_callback_handle_zero_length() {
    let service = HandleService::new(None);

    let result = service.callback_handle(
        0,
        |_, _, _, _, _, _| Ok(()),
        |_, _, _, _| Ok(0),
    );
    assert!(matches!(
        result,
        Err(HandleServiceError::KeyProxy(KeyProxyError::ArgumentError(_)))
    ));
}

#[test]
fn test_check_pair() {
    let service = HandleService::new(None);
    let handle = software_token_handle(&service);

    service
        .check_pair(&handle, &test_key().public_key_der().unwrap())
        .unwrap();
    assert!(matches!(
        service.check_pair(&handle, &other_key().public_key_der().unwrap()),
        Err(HandleServiceError::KeyProxy(KeyProxyError::KeyPairMismatch))
    ));
    assert!(matches!(
        service.check_pair(&handle, b"not der"),
        Err(HandleServiceError::RsaKey(_))
    ));
}

#[test]
fn test_token_handle_unavailable() {
    let mut session = MockTokenSession::default();
    session
        .expect_find_private_key()
        .times(1)
        .returning(|| Err(TokenError::NotPresent));

    let service = HandleService::new(None);
    assert!(matches!(
        service.token_handle(Arc::new(session)),
        Err(HandleServiceError::KeyProxy(KeyProxyError::BackendUnavailable))
    ));
}

#[test]
fn test_configured_token_handle_without_config() {
    let service = HandleService::new(None);

    assert!(matches!(
        service.configured_token_handle(),
        Err(HandleServiceError::MissingPkcs11Config)
    ));
}

#[cfg(not(feature = "pkcs11"))]
#[test]
fn test_configured_token_handle_without_pkcs11_support() {
    use keyproxy_providers::token::model::Pkcs11Params;

    let service = HandleService::new(Some(Pkcs11Params {
        library_path: "/usr/lib/softhsm/libsofthsm2.so".into(),
        slot_id: None,
        certificate_label: "tls-server".to_owned(),
        pin: None,
    }));

    assert!(matches!(
        service.configured_token_handle(),
        Err(HandleServiceError::Pkcs11Disabled)
    ));
}
