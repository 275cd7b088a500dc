use serde::{Deserialize, Serialize};

mod config_loader;
pub use config_loader::*;

/// Runtime view of the JWT settings with the secret as raw bytes, built once
/// at startup and handed to the token service.
#[derive(Clone)]
pub struct JwtRuntimeConfig {
    pub secret: Vec<u8>,
    pub expiry_hours: u64,
}

impl From<&AppConfig> for JwtRuntimeConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            secret: config.security.jwt.secret.clone().into_bytes(),
            expiry_hours: config.security.jwt.expiry_hours,
        }
    }
}

// Don't accidentally log the signing secret
impl std::fmt::Debug for JwtRuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtRuntimeConfig")
            .field("secret", &"[REDACTED]")
            .field("expiry_hours", &self.expiry_hours)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub port: u16,
    pub address: String,
}

impl From<&AppConfig> for Server {
    fn from(config: &AppConfig) -> Self {
        Self {
            port: config.server.port,
            address: config.server.host.clone(),
        }
    }
}
