use app_config::Argon2Config;
use app_error::{AppError, AppResult};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::{debug, warn};

/// Argon2 password hasher with cost parameters taken from configuration,
/// built once at startup.
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn new(config: &Argon2Config) -> AppResult<Self> {
        let algorithm = match config.variant.as_str() {
            "argon2id" => Algorithm::Argon2id,
            "argon2i" => Algorithm::Argon2i,
            "argon2d" => Algorithm::Argon2d,
            other => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Unknown argon2 variant '{}'",
                    other
                )));
            }
        };

        let params = Params::new(config.memory, config.iterations, config.parallelism, None)
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid argon2 parameters: {}", e))
            })?;

        Ok(Self {
            argon2: Argon2::new(algorithm, Version::V0x13, params),
        })
    }

    /// Hash a password into a salted PHC string
    pub fn hash(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        debug!("Hashing password");
        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                AppError::ServerError(anyhow::anyhow!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash. Never errors: a malformed
    /// stored hash is reported the same way as a wrong password, so callers
    /// respond with one uniform "invalid credentials" outcome.
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(password_hash) {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Stored password hash is malformed: {}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}
