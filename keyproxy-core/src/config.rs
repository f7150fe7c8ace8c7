use keyproxy_providers::token::model::Pkcs11Params;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not parse config: `{0}`")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyProxyConfig {
    /// Token opened by [`HandleService::configured_token_handle`][crate::service::handle_service::HandleService::configured_token_handle].
    #[serde(default)]
    pub pkcs11: Option<Pkcs11Params>,
}

impl KeyProxyConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
