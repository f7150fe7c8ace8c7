use std::sync::Arc;

use crate::{HashAlgorithm, Hasher, HasherError};

pub mod hasher;
pub mod rsa_key;


/// Returns the hasher for `algorithm`.
///
/// Only algorithms a TLS 1.2 handshake still computes locally are provided; MD5 and
/// RIPEMD-160 digests can be signed but not produced here.
pub fn get_hasher(algorithm: HashAlgorithm) -> Result<Arc<dyn Hasher>, HasherError> {
    match algorithm {
        HashAlgorithm::Sha1 => Ok(Arc::new(hasher::sha::SHA1 {})),
        HashAlgorithm::Sha224 => Ok(Arc::new(hasher::sha::SHA224 {})),
        HashAlgorithm::Sha256 => Ok(Arc::new(hasher::sha::SHA256 {})),
        HashAlgorithm::Sha384 => Ok(Arc::new(hasher::sha::SHA384 {})),
        HashAlgorithm::Sha512 => Ok(Arc::new(hasher::sha::SHA512 {})),
        other => Err(HasherError::MissingHasher(other)),
    }
}
