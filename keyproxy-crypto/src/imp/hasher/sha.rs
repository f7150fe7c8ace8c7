use std::io::Read;

use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::{HashAlgorithm, Hasher, HasherError};

macro_rules! impl_sha_hasher {
    ($name: ident, $digest: ty, $algorithm: expr) => {
        pub struct $name {}

        impl $name {
            pub fn hash_reader(reader: &mut impl Read) -> Result<Vec<u8>, HasherError> {
                let mut hasher = <$digest>::new();
                std::io::copy(reader, &mut hasher).map_err(|_| HasherError::CouldNotHash)?;
                Ok(hasher.finalize().to_vec())
            }
        }

        impl Hasher for $name {
            fn algorithm(&self) -> HashAlgorithm {
                $algorithm
            }

            fn hash(&self, input: &[u8]) -> Result<Vec<u8>, HasherError> {
                let mut hasher = <$digest>::new();
                hasher.update(input);
                Ok(hasher.finalize().to_vec())
            }
        }
    };
}

impl_sha_hasher!(SHA1, Sha1, HashAlgorithm::Sha1);
impl_sha_hasher!(SHA224, Sha224, HashAlgorithm::Sha224);
impl_sha_hasher!(SHA256, Sha256, HashAlgorithm::Sha256);
impl_sha_hasher!(SHA384, Sha384, HashAlgorithm::Sha384);
impl_sha_hasher!(SHA512, Sha512, HashAlgorithm::Sha512);
