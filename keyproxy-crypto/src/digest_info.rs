//! PKCS#1 v1.5 `DigestInfo` encoding (RFC 8017, section 9.2).
//!
//! Tokens driven with the plain `CKM_RSA_PKCS` mechanism expect the caller to supply
//! the DER-encoded `DigestInfo`; the token only adds the type-1 block padding.

use rsa::Pkcs1v15Sign;

use crate::{DigestError, HashAlgorithm};

/// Bytes added by EMSA-PKCS1-v1_5 block formatting around the encoded message.
pub const PKCS1_PADDING_OVERHEAD: usize = 11;

const MD5_PREFIX: &[u8] = &[
    0x30, 0x20, 0x30, 0x0c, 0x06, 0x08, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x02, 0x05, 0x05,
    0x00, 0x04, 0x10,
];
const SHA1_PREFIX: &[u8] = &[
    0x30, 0x21, 0x30, 0x09, 0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a, 0x05, 0x00, 0x04, 0x14,
];
const SHA224_PREFIX: &[u8] = &[
    0x30, 0x2d, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x04,
    0x05, 0x00, 0x04, 0x1c,
];
const SHA256_PREFIX: &[u8] = &[
    0x30, 0x31, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01,
    0x05, 0x00, 0x04, 0x20,
];
const SHA384_PREFIX: &[u8] = &[
    0x30, 0x41, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x02,
    0x05, 0x00, 0x04, 0x30,
];
const SHA512_PREFIX: &[u8] = &[
    0x30, 0x51, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x03,
    0x05, 0x00, 0x04, 0x40,
];
const RIPEMD160_PREFIX: &[u8] = &[
    0x30, 0x21, 0x30, 0x09, 0x06, 0x05, 0x2b, 0x24, 0x03, 0x02, 0x01, 0x05, 0x00, 0x04, 0x14,
];

/// DER prefix preceding the digest inside `DigestInfo`. Empty for raw mode.
pub fn digest_info_prefix(algorithm: HashAlgorithm) -> &'static [u8] {
    match algorithm {
        HashAlgorithm::None => &[],
        HashAlgorithm::Md5 => MD5_PREFIX,
        HashAlgorithm::Sha1 => SHA1_PREFIX,
        HashAlgorithm::Sha224 => SHA224_PREFIX,
        HashAlgorithm::Sha256 => SHA256_PREFIX,
        HashAlgorithm::Sha384 => SHA384_PREFIX,
        HashAlgorithm::Sha512 => SHA512_PREFIX,
        HashAlgorithm::Ripemd160 => RIPEMD160_PREFIX,
    }
}

/// Checks that `hash` has the length implied by `algorithm`.
///
/// Raw mode accepts any length; the modulus bound is checked by whoever pads.
pub fn check_hash_length(algorithm: HashAlgorithm, hash: &[u8]) -> Result<(), DigestError> {
    match algorithm.digest_len() {
        Some(expected) if expected != hash.len() => Err(DigestError::LengthMismatch {
            algorithm,
            expected,
            actual: hash.len(),
        }),
        _ => Ok(()),
    }
}

/// DER `DigestInfo` for `hash`, ready to be padded with `CKM_RSA_PKCS`.
pub fn encode_digest_info(algorithm: HashAlgorithm, hash: &[u8]) -> Result<Vec<u8>, DigestError> {
    if algorithm.is_raw() {
        return Err(DigestError::RawMode);
    }
    check_hash_length(algorithm, hash)?;

    let prefix = digest_info_prefix(algorithm);
    let mut encoded = Vec::with_capacity(prefix.len() + hash.len());
    encoded.extend_from_slice(prefix);
    encoded.extend_from_slice(hash);
    Ok(encoded)
}

/// Length of the message that gets padded into the RSA block.
pub fn encoded_len(algorithm: HashAlgorithm, hash_len: usize) -> usize {
    digest_info_prefix(algorithm).len() + hash_len
}

/// Whether a signature over `hash_len` bytes fits a modulus of `key_length_bytes`.
pub fn fits_modulus(algorithm: HashAlgorithm, hash_len: usize, key_length_bytes: usize) -> bool {
    encoded_len(algorithm, hash_len) + PKCS1_PADDING_OVERHEAD <= key_length_bytes
}

/// Signature scheme for the `rsa` crate matching `algorithm`.
pub fn pkcs1v15_scheme(algorithm: HashAlgorithm) -> Pkcs1v15Sign {
    match algorithm {
        HashAlgorithm::None => Pkcs1v15Sign::new_unprefixed(),
        other => Pkcs1v15Sign {
            hash_len: other.digest_len(),
            prefix: digest_info_prefix(other).into(),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_prefix_declares_digest_length() {
        for algorithm in HashAlgorithm::ALL.into_iter().filter(|a| !a.is_raw()) {
            let prefix = digest_info_prefix(algorithm);
            let digest_len = algorithm.digest_len().unwrap();

            // outer SEQUENCE length covers everything after the first two bytes
            assert_eq!(prefix[1] as usize, prefix.len() - 2 + digest_len);
            // trailing OCTET STRING header carries the digest length
            assert_eq!(prefix[prefix.len() - 2], 0x04);
            assert_eq!(prefix[prefix.len() - 1] as usize, digest_len);
        }
    }

    #[test]
    fn test_encode_sha256() {
        let hash = [0x11u8; 32];
        let encoded = encode_digest_info(HashAlgorithm::Sha256, &hash).unwrap();

        assert_eq!(encoded.len(), 51);
        assert_eq!(&encoded[..19], SHA256_PREFIX);
        assert_eq!(&encoded[19..], &hash);
    }

    #[test]
    fn test_encode_rejects_wrong_length() {
        let result = encode_digest_info(HashAlgorithm::Sha1, &[0u8; 32]);
        assert_eq!(
            result,
            Err(DigestError::LengthMismatch {
                algorithm: HashAlgorithm::Sha1,
                expected: 20,
                actual: 32
            })
        );
    }

    #[test]
    fn test_encode_rejects_raw_mode() {
        assert_eq!(
            encode_digest_info(HashAlgorithm::None, &[1, 2, 3]),
            Err(DigestError::RawMode)
        );
    }

    #[test]
    fn test_fits_modulus() {
        // SHA-256 DigestInfo is 51 bytes, plus 11 bytes of padding
        assert!(fits_modulus(HashAlgorithm::Sha256, 32, 62));
        assert!(!fits_modulus(HashAlgorithm::Sha256, 32, 61));
        assert!(fits_modulus(HashAlgorithm::None, 117, 128));
        assert!(!fits_modulus(HashAlgorithm::None, 118, 128));
    }
}
