use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{debug, info, warn};

use app_error::{AppError, AppErrorExt, AppResult};

/// Complete application configuration loaded from JSON
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub database: SurrealDbConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SurrealDbConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub namespace: String,
    pub database: String,
    pub pool: DbPoolConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DbPoolConfig {
    pub size: usize,
    pub connection_timeout: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SecurityConfig {
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub password: PasswordConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: u64,
    pub algorithm: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_number: bool,
    pub require_special: bool,
    pub argon2: Argon2Config,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Argon2Config {
    pub variant: String,
    pub memory: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitoringConfig {
    pub sentry: SentryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SentryConfig {
    pub dsn: String,
    pub sample_rate: f32,
    pub environment: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
        debug!("Configuration loaded from file");
        Ok(config)
    }

    /// Load configuration: `APP_CONFIG_PATH` if set, else the embedded
    /// default document. Always validated before use.
    pub fn load() -> AppResult<Self> {
        let config = if let Ok(path) = std::env::var("APP_CONFIG_PATH") {
            let conf = Self::from_file(&path)
                .with_context(|| format!("Failed to load config file '{}'", path))
                .config_err()?;
            info!("Loaded configuration from: {}", path);
            conf
        } else {
            let config_content = std::str::from_utf8(include_bytes!("../res/app-config.json"))
                .expect("Invalid UTF-8");

            match serde_json::from_str::<AppConfig>(config_content) {
                Ok(conf) => {
                    info!("Loaded embedded configuration: {:?}", conf.environment);
                    conf
                }
                Err(e) => {
                    warn!(
                        "Failed to parse embedded config: {}. Using default configuration.",
                        e
                    );
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Vec::new();
        let is_production = self.environment == "production";

        // Database
        if self.database.endpoint.trim().is_empty() {
            errors.push("Database endpoint cannot be empty".to_string());
        } else if is_production
            && !self.database.endpoint.starts_with("wss://")
            && !self.database.endpoint.contains("memory")
        {
            errors.push(
                "Production should use a secure 'wss://' database connection".to_string(),
            );
        }

        if self.database.namespace.trim().is_empty() {
            errors.push("Database namespace cannot be empty".to_string());
        }

        if self.database.database.trim().is_empty() {
            errors.push("Database name cannot be empty".to_string());
        }

        if is_production {
            if self.database.username == "root" {
                errors.push("Using default 'root' username in production is insecure".to_string());
            }
            if self.database.password == "root" {
                errors.push("Using default 'root' password in production is insecure".to_string());
            }
        }

        // Server
        if self.server.host.trim().is_empty() {
            errors.push("Server host cannot be empty".to_string());
        }

        if self.server.port == 0 {
            errors.push("Server port cannot be 0".to_string());
        }

        // Security: an absent signing secret must fail here, at startup,
        // never at request time.
        if self.security.jwt.secret.trim().is_empty() {
            errors.push("JWT secret cannot be empty".to_string());
        } else if is_production
            && (self.security.jwt.secret.len() < 32
                || self.security.jwt.secret == "your-strong-secret-key-here")
        {
            errors.push("JWT secret is not secure for production use".to_string());
        }

        if self.security.jwt.expiry_hours == 0 {
            errors.push("JWT expiry must be at least one hour".to_string());
        }

        // Tokens are signed with a symmetric MAC; nothing else is supported
        if self.security.jwt.algorithm != "HS256" {
            errors.push(format!(
                "Unsupported JWT algorithm '{}': only HS256 is supported",
                self.security.jwt.algorithm
            ));
        }

        if self.security.password.argon2.memory == 0
            || self.security.password.argon2.iterations == 0
            || self.security.password.argon2.parallelism == 0
        {
            errors.push("Argon2 cost parameters must be non-zero".to_string());
        }

        // Monitoring
        if is_production && self.monitoring.sentry.dsn.trim().is_empty() {
            errors.push("Sentry DSN should be configured in production".to_string());
        }

        if !errors.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Invalid configuration: {}",
                errors.join(", ")
            )));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            database: SurrealDbConfig {
                endpoint: "ws://localhost:8000".to_string(),
                username: "root".to_string(),
                password: "root".to_string(),
                namespace: "accounts".to_string(),
                database: "userService".to_string(),
                pool: DbPoolConfig {
                    size: 5,
                    connection_timeout: 5000,
                },
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                body_limit: 1048576, // 1MB
            },
            security: SecurityConfig {
                jwt: JwtConfig {
                    secret: "default-insecure-jwt-secret-do-not-use-in-production".to_string(),
                    expiry_hours: 24,
                    algorithm: "HS256".to_string(),
                },
                cors: CorsConfig {
                    allowed_origins: vec!["*".to_string()],
                    allowed_methods: vec![
                        "GET".to_string(),
                        "POST".to_string(),
                        "PUT".to_string(),
                        "DELETE".to_string(),
                        "OPTIONS".to_string(),
                    ],
                    allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
                },
                // Permissive by default; individual deployments tighten this
                // through their config file.
                password: PasswordConfig {
                    min_length: 6,
                    require_uppercase: false,
                    require_lowercase: false,
                    require_number: false,
                    require_special: false,
                    argon2: Argon2Config {
                        variant: "argon2id".to_string(),
                        memory: 19456,
                        iterations: 2,
                        parallelism: 1,
                    },
                },
            },
            monitoring: MonitoringConfig {
                sentry: SentryConfig {
                    dsn: "".to_string(),
                    sample_rate: 1.0,
                    environment: "development".to_string(),
                },
                logging: LoggingConfig {
                    level: "info".to_string(),
                    format: "json".to_string(),
                },
            },
        }
    }
}
