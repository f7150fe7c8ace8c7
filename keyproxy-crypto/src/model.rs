use strum::{Display, EnumString};

use crate::DigestError;

/// Digest algorithm a PKCS#1 v1.5 signature is computed over.
///
/// `None` signs an already-formed value verbatim (raw mode).
#[derive(Debug, Copy, Clone, Display, EnumString, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashAlgorithm {
    #[strum(serialize = "NONE")]
    None,
    #[strum(serialize = "MD5")]
    Md5,
    #[strum(to_string = "SHA1", serialize = "SHA-1")]
    Sha1,
    #[strum(to_string = "SHA224", serialize = "SHA-224")]
    Sha224,
    #[strum(to_string = "SHA256", serialize = "SHA-256")]
    Sha256,
    #[strum(to_string = "SHA384", serialize = "SHA-384")]
    Sha384,
    #[strum(to_string = "SHA512", serialize = "SHA-512")]
    Sha512,
    #[strum(serialize = "RIPEMD160")]
    Ripemd160,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 8] = [
        HashAlgorithm::None,
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
        HashAlgorithm::Ripemd160,
    ];

    /// Maps the numeric message-digest identifiers used by TLS libraries.
    pub fn from_id(id: u8) -> Result<Self, DigestError> {
        match id {
            0 => Ok(Self::None),
            3 => Ok(Self::Md5),
            4 => Ok(Self::Sha1),
            5 => Ok(Self::Sha224),
            6 => Ok(Self::Sha256),
            7 => Ok(Self::Sha384),
            8 => Ok(Self::Sha512),
            9 => Ok(Self::Ripemd160),
            other => Err(DigestError::UnknownAlgorithm(other.to_string())),
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Md5 => 3,
            Self::Sha1 => 4,
            Self::Sha224 => 5,
            Self::Sha256 => 6,
            Self::Sha384 => 7,
            Self::Sha512 => 8,
            Self::Ripemd160 => 9,
        }
    }

    /// Parses a textual identifier such as `SHA256` or `SHA-256`.
    pub fn from_name(name: &str) -> Result<Self, DigestError> {
        name.parse()
            .map_err(|_| DigestError::UnknownAlgorithm(name.to_owned()))
    }

    /// Digest size in bytes, `None` for raw mode.
    pub fn digest_len(&self) -> Option<usize> {
        match self {
            Self::None => None,
            Self::Md5 => Some(16),
            Self::Sha1 | Self::Ripemd160 => Some(20),
            Self::Sha224 => Some(28),
            Self::Sha256 => Some(32),
            Self::Sha384 => Some(48),
            Self::Sha512 => Some(64),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::None)
    }
}
