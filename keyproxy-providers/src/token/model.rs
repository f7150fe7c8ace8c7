//! `struct`s for token configuration.

use std::path::PathBuf;

use serde::Deserialize;
use zeroize::Zeroizing;

/// Parameters for opening a PKCS#11 token session.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pkcs11Params {
    /// Path of the PKCS#11 module to load.
    pub library_path: PathBuf,
    /// Slot to open; the first slot with a token when absent.
    pub slot_id: Option<u64>,
    /// `CKA_LABEL` of the certificate whose private key is used.
    pub certificate_label: String,
    /// User PIN; sessions are used without login when absent.
    pub pin: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for Pkcs11Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pkcs11Params")
            .field("library_path", &self.library_path)
            .field("slot_id", &self.slot_id)
            .field("certificate_label", &self.certificate_label)
            .field("pin", &self.pin.as_ref().map(|_| "***"))
            .finish()
    }
}
