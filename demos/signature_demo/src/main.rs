use std::sync::Arc;

use anyhow::Context;
use hex_literal::hex;
use keyproxy_core::KeyProxyCore;
use keyproxy_crypto::imp::get_hasher;
use keyproxy_crypto::imp::rsa_key::{encrypt, SoftwareRsaKey};
use keyproxy_crypto::HashAlgorithm;
use keyproxy_providers::key_handle::error::KeyProxyError;
use keyproxy_providers::key_handle::KeyHandle;
use keyproxy_providers::token::imp::software::SoftwareToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let core = KeyProxyCore::new(None).map_err(|err| anyhow::anyhow!("{err}"))?;
    let service = &core.handle_service;

    let key = SoftwareRsaKey::from_seed("signature-demo", 2048).context("key generation")?;
    let public_key = key.public_key();
    let public_key_der = key.public_key_der()?;

    let sign_key = key.clone();
    let decrypt_key = key.clone();
    let callback_handle = service.callback_handle(
        key.key_length_bytes(),
        move |_, _, hash_algorithm, _, hash, output| {
            let signature = sign_key
                .sign(hash_algorithm, hash)
                .map_err(|_| KeyProxyError::OperationFailure)?;
            output
                .write(&signature)
                .map_err(|_| KeyProxyError::OperationFailure)
        },
        move |_, _, ciphertext, output| {
            let plaintext = decrypt_key
                .decrypt(ciphertext)
                .map_err(|_| KeyProxyError::OperationFailure)?;
            output
                .write(&plaintext)
                .map_err(|_| KeyProxyError::OperationFailure)?;
            Ok(plaintext.len())
        },
    )?;
    let token_handle = service.token_handle(Arc::new(SoftwareToken::new("server", key)))?;

    let digest = hex!("d14ccebdae5153c916d82168c1e2a9e39ab056cfd197c64242151773ce1c61f8");
    let transcript_hash = get_hasher(HashAlgorithm::Sha384)?.hash(b"handshake transcript")?;
    let premaster = [0x03u8; 48];
    let ciphertext = encrypt(&public_key, &premaster)?;

    for handle in [&callback_handle, &token_handle] {
        service.check_pair(handle, &public_key_der)?;

        let signature = service.sign(handle, "SHA256", &digest)?;
        service
            .verify(&public_key_der, "SHA256", &digest, &signature)
            .with_context(|| format!("{} signature did not verify", handle.name()))?;

        let transcript_signature = service.sign(handle, "SHA384", &transcript_hash)?;
        service.verify(&public_key_der, "SHA384", &transcript_hash, &transcript_signature)?;

        let plaintext = service.decrypt(handle, &ciphertext, premaster.len())?;
        anyhow::ensure!(
            plaintext.as_slice() == premaster,
            "{} decrypted the wrong plaintext",
            handle.name()
        );

        report(handle, signature.len());
    }

    Ok(())
}

fn report(handle: &KeyHandle, signature_len: usize) {
    info!(
        name = handle.name(),
        backend_kind = %handle.backend_kind(),
        bits = handle.bit_length(),
        signature_len,
        "signed, verified and decrypted through key handle"
    );
}
