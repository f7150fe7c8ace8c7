use std::sync::Arc;

use keyproxy_crypto::digest_info::encode_digest_info;
use keyproxy_crypto::HashAlgorithm;

use super::TokenSessionBackend;
use crate::buffer::OutputBuffer;
use crate::key_handle::{
    error::KeyProxyError,
    model::{BackendKind, OperationMode},
    BackendConfig, KeyHandle,
};
use crate::token::{
    error::TokenError, MockTokenSession, TokenMechanism, TokenObjectHandle,
};

const KEY_OBJECT: TokenObjectHandle = TokenObjectHandle(5);

fn handle(session: MockTokenSession, key_length_bytes: usize) -> KeyHandle {
    KeyHandle::new(
        key_length_bytes,
        BackendConfig::TokenSession(TokenSessionBackend::new(Arc::new(session))),
    )
    .unwrap()
}

fn expect_key(session: &mut MockTokenSession) {
    session
        .expect_find_private_key()
        .times(1)
        .returning(|| Ok(KEY_OBJECT));
}

#[test]
fn test_sign_sends_digest_info() {
    let hash = [0x5au8; 32];
    let expected = encode_digest_info(HashAlgorithm::Sha256, &hash).unwrap();

    let mut session = MockTokenSession::default();
    expect_key(&mut session);
    session
        .expect_sign()
        .times(1)
        .withf(move |key, mechanism, data| {
            *key == KEY_OBJECT && *mechanism == TokenMechanism::RsaPkcs && data == expected
        })
        .returning(|_, _, _| Ok(vec![0xab; 128]));

    let handle = handle(session, 128);
    let mut output = OutputBuffer::new(128);
    handle
        .sign(
            OperationMode::Private,
            HashAlgorithm::Sha256,
            32,
            &hash,
            &mut output,
        )
        .unwrap();

    assert_eq!(output.as_slice(), &[0xab; 128]);
}

#[test]
fn test_sign_raw_sends_value_verbatim() {
    let value = [0x11u8; 36];

    let mut session = MockTokenSession::default();
    expect_key(&mut session);
    session
        .expect_sign()
        .times(1)
        .withf(move |_, _, data| data == value)
        .returning(|_, _, _| Ok(vec![0x01; 128]));

    let handle = handle(session, 128);
    let signature = handle.sign_to_vec(HashAlgorithm::None, &value).unwrap();

    assert_eq!(signature, vec![0x01; 128]);
}

#[test]
fn test_sign_too_long_for_modulus() {
    // no expectations: the token must not be touched
    let session = MockTokenSession::default();
    let handle = handle(session, 64);

    let mut output = OutputBuffer::new(64);
    let result = handle.sign(
        OperationMode::Private,
        HashAlgorithm::Sha512,
        64,
        &[0u8; 64],
        &mut output,
    );

    assert_eq!(result, Err(KeyProxyError::OperationFailure));
    assert!(output.is_empty());
}

#[test]
fn test_sign_token_not_present() {
    let mut session = MockTokenSession::default();
    session
        .expect_find_private_key()
        .times(1)
        .returning(|| Err(TokenError::NotPresent));

    let handle = handle(session, 128);
    assert_eq!(
        handle.sign_to_vec(HashAlgorithm::Sha1, &[0u8; 20]),
        Err(KeyProxyError::BackendUnavailable)
    );
}

#[test]
fn test_sign_authorization_denied() {
    let mut session = MockTokenSession::default();
    expect_key(&mut session);
    session
        .expect_sign()
        .times(1)
        .returning(|_, _, _| Err(TokenError::AuthorizationDenied));

    let handle = handle(session, 128);
    assert_eq!(
        handle.sign_to_vec(HashAlgorithm::Sha1, &[0u8; 20]),
        Err(KeyProxyError::OperationFailure)
    );
}

#[test]
fn test_sign_unexpected_signature_length() {
    let mut session = MockTokenSession::default();
    expect_key(&mut session);
    session
        .expect_sign()
        .times(1)
        .returning(|_, _, _| Ok(vec![0xff; 127]));

    let handle = handle(session, 128);
    let mut output = OutputBuffer::new(256);
    let result = handle.sign(
        OperationMode::Private,
        HashAlgorithm::Md5,
        16,
        &[0u8; 16],
        &mut output,
    );

    assert_eq!(result, Err(KeyProxyError::OperationFailure));
    assert!(output.is_empty());
}

#[test]
fn test_decrypt_writes_plaintext() {
    let mut session = MockTokenSession::default();
    expect_key(&mut session);
    session
        .expect_decrypt()
        .times(1)
        .withf(|key, mechanism, data| {
            *key == KEY_OBJECT && *mechanism == TokenMechanism::RsaPkcs && data.len() == 128
        })
        .returning(|_, _, _| Ok(vec![0x03; 48]));

    let handle = handle(session, 128);
    let mut output = OutputBuffer::new(48);
    let len = handle
        .decrypt(OperationMode::Private, &[0x77; 128], &mut output)
        .unwrap();

    assert_eq!(len, 48);
    assert_eq!(output.as_slice(), &[0x03; 48]);
}

#[test]
fn test_decrypt_plaintext_exceeds_output() {
    let mut session = MockTokenSession::default();
    expect_key(&mut session);
    session
        .expect_decrypt()
        .times(1)
        .returning(|_, _, _| Ok(vec![0x03; 49]));

    let handle = handle(session, 128);
    let mut output = OutputBuffer::new(48);
    let result = handle.decrypt(OperationMode::Private, &[0x77; 128], &mut output);

    assert_eq!(result, Err(KeyProxyError::OperationFailure));
    assert!(output.is_empty());
}

#[test]
fn test_decrypt_bad_padding() {
    let mut session = MockTokenSession::default();
    expect_key(&mut session);
    session
        .expect_decrypt()
        .times(1)
        .returning(|_, _, _| Err(TokenError::OperationFailed));

    let handle = handle(session, 128);
    assert_eq!(
        handle.decrypt_to_vec(&[0x77; 128], 128).err(),
        Some(KeyProxyError::OperationFailure)
    );
}

#[test]
fn test_decrypt_session_closed() {
    let mut session = MockTokenSession::default();
    session
        .expect_find_private_key()
        .times(1)
        .returning(|| Err(TokenError::SessionClosed));

    let handle = handle(session, 128);
    assert_eq!(
        handle.decrypt_to_vec(&[0x77; 128], 128).err(),
        Some(KeyProxyError::OperationFailure)
    );
}

#[test]
fn test_bind_derives_key_length() {
    let mut session = MockTokenSession::default();
    expect_key(&mut session);
    session
        .expect_modulus_length()
        .times(1)
        .withf(|key| *key == KEY_OBJECT)
        .returning(|_| Ok(256));

    let handle = KeyHandle::from_token_session(Arc::new(session)).unwrap();

    assert_eq!(handle.key_length_bytes(), 256);
    assert_eq!(handle.bit_length(), 2048);
    assert_eq!(handle.backend_kind(), BackendKind::TokenSession);
    assert_eq!(handle.name(), "RSA-token");
}

#[test]
fn test_bind_unreachable_token() {
    let mut session = MockTokenSession::default();
    session
        .expect_find_private_key()
        .times(1)
        .returning(|| Err(TokenError::Unreachable("no such library".to_owned())));

    let result = KeyHandle::from_token_session(Arc::new(session));
    assert!(matches!(result, Err(KeyProxyError::BackendUnavailable)));
}
