//! In-memory RSA private key.

use rand::rngs::OsRng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::digest_info::{check_hash_length, pkcs1v15_scheme};
use crate::{HashAlgorithm, RsaKeyError};

/// RSA private key held in process memory.
///
/// This is what a delegated key handle stands in for: the same sign and decrypt
/// results, computed where the key material is directly readable.
#[derive(Clone)]
pub struct SoftwareRsaKey {
    private_key: RsaPrivateKey,
}

impl SoftwareRsaKey {
    pub fn new(private_key: RsaPrivateKey) -> Self {
        Self { private_key }
    }

    /// Deterministic key derived from `seed`, for fixtures and demos.
    pub fn from_seed(seed: &str, bits: usize) -> Result<Self, RsaKeyError> {
        let hash = Sha256::digest(seed.as_bytes());
        let mut rng = ChaCha20Rng::from_seed(hash.into());
        let private_key = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|err| RsaKeyError::CouldNotGenerate(err.to_string()))?;
        Ok(Self { private_key })
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.private_key.to_public_key()
    }

    pub fn public_key_der(&self) -> Result<Vec<u8>, RsaKeyError> {
        self.private_key
            .to_public_key()
            .to_public_key_der()
            .map(|der| der.into_vec())
            .map_err(|err| RsaKeyError::CouldNotParse(err.to_string()))
    }

    /// Modulus size in bytes.
    pub fn key_length_bytes(&self) -> usize {
        self.private_key.size()
    }

    /// PKCS#1 v1.5 signature over `hash`, which must already be a digest of the
    /// given algorithm (or any value in raw mode).
    pub fn sign(&self, algorithm: HashAlgorithm, hash: &[u8]) -> Result<Vec<u8>, RsaKeyError> {
        check_hash_length(algorithm, hash)?;

        self.private_key
            .sign(pkcs1v15_scheme(algorithm), hash)
            .map_err(|err| RsaKeyError::CouldNotSign(err.to_string()))
    }

    /// Type-1 padding of `data` followed by the private-key transform, i.e. what
    /// `CKM_RSA_PKCS` does when asked to sign.
    pub fn sign_padded(&self, data: &[u8]) -> Result<Vec<u8>, RsaKeyError> {
        self.private_key
            .sign(Pkcs1v15Sign::new_unprefixed(), data)
            .map_err(|err| RsaKeyError::CouldNotSign(err.to_string()))
    }

    /// Private-key transform plus PKCS#1 v1.5 type-2 padding removal.
    ///
    /// Every failure maps to the same error so callers cannot tell a bad block
    /// from a bad padding byte.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, RsaKeyError> {
        self.private_key
            .decrypt(Pkcs1v15Encrypt, ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| RsaKeyError::CouldNotDecrypt)
    }
}

pub fn public_key_from_der(der: &[u8]) -> Result<RsaPublicKey, RsaKeyError> {
    RsaPublicKey::from_public_key_der(der).map_err(|err| RsaKeyError::CouldNotParse(err.to_string()))
}

pub fn verify_signature(
    public_key: &RsaPublicKey,
    algorithm: HashAlgorithm,
    hash: &[u8],
    signature: &[u8],
) -> Result<(), RsaKeyError> {
    public_key
        .verify(pkcs1v15_scheme(algorithm), hash, signature)
        .map_err(|_| RsaKeyError::InvalidSignature)
}

pub fn encrypt(public_key: &RsaPublicKey, plaintext: &[u8]) -> Result<Vec<u8>, RsaKeyError> {
    public_key
        .encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext)
        .map_err(|err| RsaKeyError::CouldNotEncrypt(err.to_string()))
}
