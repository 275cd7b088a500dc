use anyhow::Context;
use app_error::{AppError, AppErrorExt, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user record key)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: u64,
}

impl JwtService {
    /// An empty secret is a configuration error and must fail here, at
    /// startup, rather than on the first request.
    pub fn new(secret: &[u8], expiry_hours: u64) -> AppResult<Self> {
        if secret.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT signing secret must not be empty"
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry_hours,
        })
    }

    pub fn generate_token(&self, user_key: &str) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.expiry_hours as i64);

        let claims = Claims {
            sub: user_key.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to sign token")
            .server_err()
    }

    /// Bad signature, expired token and malformed claims all collapse into
    /// the same error so clients cannot tell the cases apart. The root cause
    /// is only visible in server-side debug logs.
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| {
                debug!("Token validation failed: {}", e);
                AppError::token_invalid()
            })?;

        Ok(token_data.claims)
    }
}
