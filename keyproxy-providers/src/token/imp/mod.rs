#[cfg(feature = "pkcs11")]
pub mod pkcs11;
pub mod software;
