//! Service layer of the key proxy.
//!
//! The providers crate gives full control over handles and backends. This crate
//! wires them from configuration for the common cases:
//!
//! ```ignore rust
//! // `None` initializes the core with the default configuration
//! let core = KeyProxyCore::new(None).unwrap();
//!
//! let handle = core
//!     .handle_service
//!     .token_handle(Arc::new(SoftwareToken::new("server", key)))?;
//! let signature = core.handle_service.sign(&handle, "SHA256", &digest)?;
//! ```

use std::error::Error;

use config::KeyProxyConfig;
use service::handle_service::HandleService;

pub mod config;
pub mod service;

pub struct KeyProxyCore {
    pub handle_service: HandleService,
}

impl Default for KeyProxyCore {
    fn default() -> Self {
        Self {
            handle_service: HandleService::new(None),
        }
    }
}

impl KeyProxyCore {
    pub fn new(config: Option<KeyProxyConfig>) -> Result<Self, Box<dyn Error>> {
        let config = config.unwrap_or_default();

        if let Some(pkcs11) = &config.pkcs11 {
            tracing::debug!(?pkcs11, "PKCS#11 token configured");
        }

        Ok(Self {
            handle_service: HandleService::new(config.pkcs11),
        })
    }
}
